//! Book repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the CRUD + reset statements over the `books` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Ids come from SQLite `AUTOINCREMENT`; the repository never computes one.
//! - `list_books` orders by id, which is insertion order.
//! - `nuke_books` clears rows and the id sequence in one transaction.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::error::ErrorKind;
use crate::model::book::{Book, BookId, BookValidationError, NewBook};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use thiserror::Error;

const BOOKS_TABLE: &str = "books";
const BOOKS_REQUIRED_COLUMNS: &[&str] = &["id", "title", "author"];
const BOOK_SELECT_SQL: &str = "SELECT id, title, author FROM books";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for book persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] BookValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("book not found: {0}")]
    NotFound(BookId),
    #[error("invalid persisted book data: {0}")]
    InvalidData(String),
    #[error(
        "connection schema version {actual_version} does not match expected {expected_version}"
    )]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("required table `{0}` is missing")]
    MissingRequiredTable(&'static str),
    #[error("required column `{table}.{column}` is missing")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    #[error("record store lock poisoned")]
    LockPoisoned,
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::StorageFault,
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for book persistence.
pub trait BookRepository {
    /// Inserts one validated book and returns its assigned id.
    fn insert_book(&mut self, book: &NewBook) -> RepoResult<BookId>;
    /// Hard-deletes one book. Missing ids yield `RepoError::NotFound`.
    fn delete_book(&mut self, id: BookId) -> RepoResult<()>;
    /// Gets one book by id.
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    /// Lists all books in insertion order.
    fn list_books(&self) -> RepoResult<Vec<Book>>;
    /// Counts stored books.
    fn count_books(&self) -> RepoResult<usize>;
    /// Deletes every book and resets the id sequence.
    fn nuke_books(&mut self) -> RepoResult<()>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not have the expected shape.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Wraps a connection already verified by [`SqliteBookRepository::try_new`].
    pub(crate) fn new_unchecked(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn insert_book(&mut self, book: &NewBook) -> RepoResult<BookId> {
        self.conn.execute(
            "INSERT INTO books (title, author) VALUES (?1, ?2);",
            params![book.title(), book.author()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn delete_book(&mut self, id: BookId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM books WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt.query_row([id], read_book_row).optional()?;
        row.map(validate_book_row).transpose()
    }

    fn list_books(&self) -> RepoResult<Vec<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut books = Vec::new();

        while let Some(row) = rows.next()? {
            books.push(validate_book_row(read_book_row(row)?)?);
        }

        Ok(books)
    }

    fn count_books(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative book count `{count}`")))
    }

    fn nuke_books(&mut self) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM books;", [])?;
        // sqlite_sequence holds the AUTOINCREMENT high-water mark.
        tx.execute("DELETE FROM sqlite_sequence WHERE name = ?1;", [BOOKS_TABLE])?;
        tx.commit()?;
        Ok(())
    }
}

fn read_book_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get("id")?,
        title: row.get("title")?,
        author: row.get("author")?,
    })
}

fn validate_book_row(book: Book) -> RepoResult<Book> {
    if book.title.trim().is_empty() || book.author.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "book {} has an empty title or author",
            book.id
        )));
    }
    Ok(book)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [BOOKS_TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(BOOKS_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([BOOKS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for &column in BOOKS_REQUIRED_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: BOOKS_TABLE,
                column,
            });
        }
    }

    Ok(())
}
