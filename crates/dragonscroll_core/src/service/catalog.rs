//! In-memory book list mirrored from the record store.
//!
//! # Responsibility
//! - Hold the ordered list the presentation layer renders.
//! - Write every mutation through to `RecordStore` before touching the list.
//!
//! # Invariants
//! - After any operation returns, `snapshot()` equals `RecordStore::get_all()`.
//! - A store failure never leaves a phantom or missing entry in the list.
//! - Mutations hold the list's write lock for the whole write-through, so
//!   readers never see the store and the list disagree.
//! - Lock order is always list → store; the store never calls back in.

use crate::error::ErrorKind;
use crate::model::book::{Book, BookId, BookValidationError, NewBook};
use crate::repo::book_repo::RepoError;
use crate::repo::record_store::RecordStore;
use log::{error, info, warn};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] BookValidationError),
    #[error("book not found: {0}")]
    NotFound(BookId),
    #[error("catalog index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("catalog used before load()")]
    NotLoaded,
    #[error("catalog lock poisoned; call load() to rebuild")]
    LockPoisoned,
    #[error(transparent)]
    Store(RepoError),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::NotLoaded => ErrorKind::NotLoaded,
            Self::LockPoisoned => ErrorKind::StorageFault,
            Self::Store(err) => err.kind(),
        }
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

/// Write-through cache over a shared [`RecordStore`].
///
/// Starts `Unloaded`; every operation except [`CatalogCache::load`] fails
/// with `CatalogError::NotLoaded` until the first successful load.
pub struct CatalogCache {
    records: Arc<RecordStore>,
    books: RwLock<Option<Vec<Book>>>,
}

impl CatalogCache {
    pub fn new(records: Arc<RecordStore>) -> Self {
        Self {
            records,
            books: RwLock::new(None),
        }
    }

    /// Underlying store, for reads such as counts.
    ///
    /// Mutations issued here bypass the list. Call [`CatalogCache::load`]
    /// afterwards to bring the list back in line with the store.
    pub fn records(&self) -> &Arc<RecordStore> {
        &self.records
    }

    /// (Re)builds the list from the store.
    ///
    /// Also the recovery path after a poisoned lock: the list is replaced
    /// wholesale from the source of truth.
    pub fn load(&self) -> CatalogResult<()> {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        let loaded = self.records.get_all()?;
        info!(
            "event=catalog_load module=catalog status=ok len={}",
            loaded.len()
        );
        *books = Some(loaded);
        drop(books);
        self.books.clear_poison();
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.books
            .read()
            .map(|books| books.is_some())
            .unwrap_or(false)
    }

    /// Validates, inserts into the store, then appends the stored record.
    pub fn add(&self, title: &str, author: &str) -> CatalogResult<Book> {
        let new_book = NewBook::new(title, author)?;

        let mut guard = self.write()?;
        let books = loaded_mut(&mut guard)?;
        let book = self.records.insert_new(new_book)?;
        books.push(book.clone());

        info!(
            "event=catalog_add module=catalog status=ok id={} len={}",
            book.id,
            books.len()
        );
        Ok(book)
    }

    /// Deletes the book at `index` from the store, then from the list.
    ///
    /// When the store no longer has the row the stale entry is dropped from
    /// the list as well, and `NotFound` is still returned.
    pub fn remove_at(&self, index: usize) -> CatalogResult<Book> {
        let mut guard = self.write()?;
        let books = loaded_mut(&mut guard)?;
        let id = match books.get(index) {
            Some(book) => book.id,
            None => {
                return Err(CatalogError::IndexOutOfRange {
                    index,
                    len: books.len(),
                })
            }
        };

        match self.records.delete(id) {
            Ok(()) => {
                let removed = books.remove(index);
                info!(
                    "event=catalog_remove module=catalog status=ok id={id} len={}",
                    books.len()
                );
                Ok(removed)
            }
            Err(RepoError::NotFound(missing)) => {
                books.remove(index);
                warn!(
                    "event=catalog_remove module=catalog status=stale id={missing} len={}",
                    books.len()
                );
                Err(CatalogError::NotFound(missing))
            }
            Err(err) => {
                error!("event=catalog_remove module=catalog status=error id={id} error={err}");
                Err(err.into())
            }
        }
    }

    /// Nukes the store and empties the list in one step.
    pub fn nuke(&self) -> CatalogResult<()> {
        let mut guard = self.write()?;
        let books = loaded_mut(&mut guard)?;
        self.records.nuke()?;
        books.clear();
        info!("event=catalog_nuke module=catalog status=ok");
        Ok(())
    }

    pub fn is_empty(&self) -> CatalogResult<bool> {
        let guard = self.read()?;
        Ok(loaded(&guard)?.is_empty())
    }

    pub fn len(&self) -> CatalogResult<usize> {
        let guard = self.read()?;
        Ok(loaded(&guard)?.len())
    }

    pub fn get(&self, index: usize) -> CatalogResult<Book> {
        let guard = self.read()?;
        let books = loaded(&guard)?;
        books
            .get(index)
            .cloned()
            .ok_or(CatalogError::IndexOutOfRange {
                index,
                len: books.len(),
            })
    }

    /// Owned copy of the current list, in display order.
    pub fn snapshot(&self) -> CatalogResult<Vec<Book>> {
        let guard = self.read()?;
        Ok(loaded(&guard)?.clone())
    }

    fn read(&self) -> CatalogResult<RwLockReadGuard<'_, Option<Vec<Book>>>> {
        self.books.read().map_err(|_| CatalogError::LockPoisoned)
    }

    fn write(&self) -> CatalogResult<RwLockWriteGuard<'_, Option<Vec<Book>>>> {
        self.books.write().map_err(|_| CatalogError::LockPoisoned)
    }
}

fn loaded(books: &Option<Vec<Book>>) -> CatalogResult<&Vec<Book>> {
    books.as_ref().ok_or(CatalogError::NotLoaded)
}

fn loaded_mut(books: &mut Option<Vec<Book>>) -> CatalogResult<&mut Vec<Book>> {
    books.as_mut().ok_or(CatalogError::NotLoaded)
}
