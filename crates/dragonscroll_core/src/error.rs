//! Cross-layer error classification.
//!
//! Each layer owns its own error enum; `ErrorKind` is the shared taxonomy
//! callers branch on when deciding whether to re-prompt, report or abort.

use std::fmt::{Display, Formatter};

/// Coarse classification shared by every core error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller-supplied data failed a precondition. Nothing was mutated.
    Validation,
    /// Storage medium unavailable, corrupt or otherwise unusable.
    StorageFault,
    /// Referenced record does not exist.
    NotFound,
    /// Referenced cache position does not exist.
    IndexOutOfRange,
    /// Catalog used before `load()`.
    NotLoaded,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::StorageFault => "storage_fault",
            Self::NotFound => "not_found",
            Self::IndexOutOfRange => "index_out_of_range",
            Self::NotLoaded => "not_loaded",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
