//! Core persistence for Dragon Scroll.
//! This crate is the single source of truth for the book catalog and the
//! profile/settings preferences.

pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod prefs;
pub mod repo;
pub mod service;

pub use config::{Config, ConfigError};
pub use context::{ContextError, CoreContext};
pub use error::ErrorKind;
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::book::{Book, BookId, BookValidationError, NewBook};
pub use prefs::profile::Profile;
pub use prefs::settings::{text_size_multiplier_from_percent, DarkMode, Settings, Theme};
pub use prefs::store::{PrefError, PrefResult, PrefValue, PreferenceStore};
pub use repo::book_repo::{BookRepository, RepoError, RepoResult, SqliteBookRepository};
pub use repo::record_store::RecordStore;
pub use service::catalog::{CatalogCache, CatalogError, CatalogResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
