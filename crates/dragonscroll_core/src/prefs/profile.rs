//! Typed profile view over the preference store.

use crate::prefs::keys::{
    DEFAULT_PROFILE_NAME, PROFILE_FAVORITE_BOOK, PROFILE_IMAGE_URI, PROFILE_NAME,
};
use crate::prefs::store::{PrefError, PrefResult, PreferenceStore};
use crate::repo::book_repo::RepoResult;
use crate::repo::record_store::RecordStore;
use std::sync::Arc;

/// Profile fields: display name, picture reference and favorite book.
#[derive(Clone)]
pub struct Profile {
    prefs: Arc<PreferenceStore>,
}

impl Profile {
    pub fn new(prefs: Arc<PreferenceStore>) -> Self {
        Self { prefs }
    }

    pub fn name(&self) -> String {
        self.prefs.get_string(PROFILE_NAME, DEFAULT_PROFILE_NAME)
    }

    /// Stores a trimmed display name. Blank names are rejected and the
    /// previous name stays in place.
    pub fn set_name(&self, name: &str) -> PrefResult<()> {
        let name = non_blank(PROFILE_NAME, name)?;
        self.prefs.set_string(PROFILE_NAME, name)
    }

    /// Picture reference (URI). Only the reference is persisted.
    pub fn image_uri(&self) -> Option<String> {
        self.prefs.get_opt_string(PROFILE_IMAGE_URI)
    }

    pub fn set_image_uri(&self, uri: &str) -> PrefResult<()> {
        let uri = non_blank(PROFILE_IMAGE_URI, uri)?;
        self.prefs.set_string(PROFILE_IMAGE_URI, uri)
    }

    pub fn clear_image_uri(&self) -> PrefResult<()> {
        self.prefs.remove(PROFILE_IMAGE_URI).map(|_| ())
    }

    pub fn favorite_book(&self) -> Option<String> {
        self.prefs.get_opt_string(PROFILE_FAVORITE_BOOK)
    }

    pub fn set_favorite_book(&self, title: &str) -> PrefResult<()> {
        let title = non_blank(PROFILE_FAVORITE_BOOK, title)?;
        self.prefs.set_string(PROFILE_FAVORITE_BOOK, title)
    }

    pub fn clear_favorite_book(&self) -> PrefResult<()> {
        self.prefs.remove(PROFILE_FAVORITE_BOOK).map(|_| ())
    }

    /// Number of books shown as read on the profile.
    pub fn books_read(&self, records: &RecordStore) -> RepoResult<usize> {
        records.get_count()
    }
}

fn non_blank<'a>(key: &str, value: &'a str) -> PrefResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PrefError::invalid(key, "value must not be blank"));
    }
    Ok(trimmed)
}
