//! Explicitly constructed owner of the core stores.
//!
//! One `CoreContext` per data directory: it opens the record store and the
//! preference store, loads the catalog, and hands out shared handles. The
//! owning process creates it at startup and drops it at shutdown.

use crate::config::{Config, ConfigError};
use crate::error::ErrorKind;
use crate::prefs::profile::Profile;
use crate::prefs::settings::Settings;
use crate::prefs::store::{PrefError, PrefResult, PreferenceStore};
use crate::repo::book_repo::RepoError;
use crate::repo::record_store::RecordStore;
use crate::service::catalog::{CatalogCache, CatalogError, CatalogResult};
use log::info;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Records(#[from] RepoError),
    #[error(transparent)]
    Preferences(#[from] PrefError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ContextError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::StorageFault,
            Self::Records(err) => err.kind(),
            Self::Preferences(err) => err.kind(),
            Self::Catalog(err) => err.kind(),
        }
    }
}

pub struct CoreContext {
    records: Arc<RecordStore>,
    preferences: Arc<PreferenceStore>,
    catalog: CatalogCache,
}

impl CoreContext {
    /// Opens both stores under `config.data_dir` and loads the catalog.
    pub fn open(config: &Config) -> Result<Self, ContextError> {
        config.ensure_data_dir()?;
        let records = RecordStore::open(config.books_db_path())?;
        let preferences = PreferenceStore::open(config.preferences_path())?;
        let context = Self::from_stores(records, preferences)?;
        info!(
            "event=context_open module=core status=ok data_dir={}",
            config.data_dir.display()
        );
        Ok(context)
    }

    /// In-memory record store plus a preference file at `prefs_path`.
    pub fn open_in_memory(prefs_path: impl AsRef<Path>) -> Result<Self, ContextError> {
        let records = RecordStore::open_in_memory()?;
        let preferences = PreferenceStore::open(prefs_path)?;
        Self::from_stores(records, preferences)
    }

    /// Builds a context around already opened stores.
    pub fn from_stores(
        records: RecordStore,
        preferences: PreferenceStore,
    ) -> Result<Self, ContextError> {
        let records = Arc::new(records);
        let catalog = CatalogCache::new(Arc::clone(&records));
        catalog.load()?;

        Ok(Self {
            records,
            preferences: Arc::new(preferences),
            catalog,
        })
    }

    /// Record store for reads. Book mutations go through [`CoreContext::catalog`]
    /// so the cached list stays in step.
    pub fn records(&self) -> &Arc<RecordStore> {
        &self.records
    }

    pub fn preferences(&self) -> &Arc<PreferenceStore> {
        &self.preferences
    }

    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    pub fn profile(&self) -> Profile {
        Profile::new(Arc::clone(&self.preferences))
    }

    pub fn settings(&self) -> Settings {
        Settings::new(Arc::clone(&self.preferences))
    }

    /// Irreversibly deletes every book, keeping the catalog in step.
    pub fn nuke_database(&self) -> CatalogResult<()> {
        self.catalog.nuke()
    }

    pub fn clear_preferences(&self) -> PrefResult<()> {
        self.preferences.clear_all()
    }
}
