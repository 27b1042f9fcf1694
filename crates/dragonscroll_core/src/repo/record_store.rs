//! Durable book table with its own serialization boundary.
//!
//! # Responsibility
//! - Own one SQLite connection for the lifetime of the store.
//! - Serialize every statement through a single mutex.
//! - Emit metadata-only `record_*` logging events.
//!
//! # Invariants
//! - Ids are monotonic and never reused until `nuke` resets the sequence.
//! - Reads return owned snapshots; no live reference escapes the lock.

use crate::db::{open_db, open_db_in_memory};
use crate::model::book::{Book, BookId, NewBook};
use crate::repo::book_repo::{BookRepository, RepoError, RepoResult, SqliteBookRepository};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

/// Shared, thread-safe handle over the `books` table.
pub struct RecordStore {
    conn: Mutex<Connection>,
}

impl RecordStore {
    /// Opens the store at `path`, creating the database when absent.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens an ephemeral store, mostly for tests.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps a connection after checking it carries the expected schema.
    pub fn from_connection(mut conn: Connection) -> RepoResult<Self> {
        SqliteBookRepository::try_new(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Validates and inserts a book, returning its assigned id.
    pub fn insert(&self, title: &str, author: &str) -> RepoResult<BookId> {
        let book = NewBook::new(title, author)?;
        self.insert_new(book).map(|book| book.id)
    }

    /// Inserts an already validated book and returns the stored record.
    pub fn insert_new(&self, book: NewBook) -> RepoResult<Book> {
        let result = self.with_repo(|repo| repo.insert_book(&book));
        match result {
            Ok(id) => {
                info!("event=record_insert module=repo status=ok id={id}");
                Ok(book.into_book(id))
            }
            Err(err) => {
                error!(
                    "event=record_insert module=repo status=error error_kind={} error={}",
                    err.kind(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Deletes one book. Unknown ids fail with `RepoError::NotFound`.
    pub fn delete(&self, id: BookId) -> RepoResult<()> {
        match self.with_repo(|repo| repo.delete_book(id)) {
            Ok(()) => {
                info!("event=record_delete module=repo status=ok id={id}");
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=record_delete module=repo status=error id={id} error_kind={} error={}",
                    err.kind(),
                    err
                );
                Err(err)
            }
        }
    }

    pub fn get(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.with_repo(|repo| repo.get_book(id))
    }

    /// Returns every book in insertion order.
    pub fn get_all(&self) -> RepoResult<Vec<Book>> {
        self.with_repo(|repo| repo.list_books())
    }

    pub fn get_count(&self) -> RepoResult<usize> {
        self.with_repo(|repo| repo.count_books())
    }

    /// Deletes every book and resets the id sequence. Irreversible.
    pub fn nuke(&self) -> RepoResult<()> {
        match self.with_repo(|repo| repo.nuke_books()) {
            Ok(()) => {
                info!("event=record_nuke module=repo status=ok");
                Ok(())
            }
            Err(err) => {
                error!("event=record_nuke module=repo status=error error={err}");
                Err(err)
            }
        }
    }

    fn with_repo<T>(
        &self,
        op: impl FnOnce(&mut SqliteBookRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let mut conn = self.conn.lock().map_err(|_| RepoError::LockPoisoned)?;
        let mut repo = SqliteBookRepository::new_unchecked(&mut conn);
        op(&mut repo)
    }
}
