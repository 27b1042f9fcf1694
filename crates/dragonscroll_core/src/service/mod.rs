//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record store calls into the operations the UI invokes.
//! - Keep presentation code decoupled from storage details.

pub mod catalog;
