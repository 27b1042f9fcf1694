//! Domain model for the book catalog.
//!
//! # Invariants
//! - Every book is identified by a store-assigned, never-reused `BookId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod book;
