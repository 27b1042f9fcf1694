//! Preference persistence for profile and settings state.
//!
//! # Responsibility
//! - Persist named scalar values with typed, defaulted reads.
//! - Expose typed profile/settings views over the well-known keys.
//!
//! # Invariants
//! - Preference access is keyed by name and needs no cache above the store.

pub mod keys;
pub mod profile;
pub mod settings;
pub mod store;
