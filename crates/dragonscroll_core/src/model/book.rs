//! Book domain model.
//!
//! # Responsibility
//! - Define the persisted book record and its validated insert payload.
//!
//! # Invariants
//! - `id` is assigned by the record store only; callers never choose it.
//! - `title` and `author` are trimmed and non-empty.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store-assigned book identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type BookId = i64;

/// One persisted book entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
}

/// Validation failures for book input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BookValidationError {
    #[error("book title must not be empty")]
    EmptyTitle,
    #[error("book author must not be empty")]
    EmptyAuthor,
}

/// Validated, id-less payload accepted by the record store.
///
/// Construction is the only validation point, so a `NewBook` in hand is
/// always insertable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    title: String,
    author: String,
}

impl NewBook {
    /// Trims both fields and rejects empty results.
    ///
    /// Title is checked first, so input with both fields empty reports
    /// `EmptyTitle`.
    pub fn new(
        title: impl AsRef<str>,
        author: impl AsRef<str>,
    ) -> Result<Self, BookValidationError> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }
        let author = author.as_ref().trim();
        if author.is_empty() {
            return Err(BookValidationError::EmptyAuthor);
        }

        Ok(Self {
            title: title.to_string(),
            author: author.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Attaches the store-assigned id.
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
        }
    }
}
