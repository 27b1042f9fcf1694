//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the book persistence contract.
//! - Isolate SQLite query details from the catalog cache.
//!
//! # Invariants
//! - Writes only accept `NewBook`, so validation happens before SQL.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod book_repo;
pub mod record_store;
