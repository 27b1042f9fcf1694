//! Durable key/value preference store.
//!
//! # Responsibility
//! - Persist named scalar values (text, integer, float) in one JSON file.
//! - Provide typed reads that fall back to caller-supplied defaults.
//!
//! # Invariants
//! - Writes are durable on return: the file is replaced atomically
//!   (temp file, fsync, rename) before the in-memory map changes.
//! - A failed write leaves both the file and the in-memory map untouched.
//! - The in-memory map is only ever replaced wholesale, so a poisoned lock
//!   still guards a consistent value and is recovered instead of reported.

use crate::error::ErrorKind;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};
use thiserror::Error;

const PREF_FILE_VERSION: u32 = 1;

pub type PrefResult<T> = Result<T, PrefError>;

#[derive(Debug, Error)]
pub enum PrefError {
    #[error("invalid preference `{key}`: {reason}")]
    Invalid { key: String, reason: String },
    #[error("failed to access preference file `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("preference file `{path}` is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("preference file `{path}` has unsupported version {version}")]
    UnsupportedVersion { path: PathBuf, version: u32 },
    #[error("failed to encode preferences: {0}")]
    Encode(#[source] serde_json::Error),
}

impl PrefError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid { .. } => ErrorKind::Validation,
            _ => ErrorKind::StorageFault,
        }
    }

    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// One stored scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PrefValue {
    Text(String),
    Int(i64),
    Float(f64),
}

#[derive(Debug, Serialize, Deserialize)]
struct PrefFile {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, PrefValue>,
}

/// Preference store backed by a single JSON file.
pub struct PreferenceStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, PrefValue>>,
}

impl PreferenceStore {
    /// Opens the store at `path`, creating an empty file when absent.
    ///
    /// # Errors
    /// - `Corrupt` when the file exists but cannot be parsed. The file is
    ///   left in place so it can be inspected.
    pub fn open(path: impl AsRef<Path>) -> PrefResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            read_pref_file(&path)?
        } else {
            let empty = BTreeMap::new();
            write_pref_file(&path, &empty)?;
            info!(
                "event=pref_open module=prefs status=created path={}",
                path.display()
            );
            empty
        };

        info!(
            "event=pref_open module=prefs status=ok entries={}",
            entries.len()
        );
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the text stored under `key`, or `default` when absent or
    /// stored with another type.
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get_opt_string(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Returns the text stored under `key`, if any.
    pub fn get_opt_string(&self, key: &str) -> Option<String> {
        match self.read().get(key) {
            Some(PrefValue::Text(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.read().get(key) {
            Some(PrefValue::Int(value)) => *value,
            _ => default,
        }
    }

    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        match self.read().get(key) {
            Some(PrefValue::Float(value)) => *value,
            _ => default,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn set_string(&self, key: &str, value: impl Into<String>) -> PrefResult<()> {
        self.set(key, PrefValue::Text(value.into()))
    }

    pub fn set_int(&self, key: &str, value: i64) -> PrefResult<()> {
        self.set(key, PrefValue::Int(value))
    }

    /// Stores a float. Non-finite values are rejected since JSON cannot
    /// represent them.
    pub fn set_float(&self, key: &str, value: f64) -> PrefResult<()> {
        if !value.is_finite() {
            return Err(PrefError::invalid(key, "float value must be finite"));
        }
        self.set(key, PrefValue::Float(value))
    }

    /// Removes one entry. Returns whether it existed.
    pub fn remove(&self, key: &str) -> PrefResult<bool> {
        let mut entries = self.write();
        if !entries.contains_key(key) {
            return Ok(false);
        }

        let mut next = entries.clone();
        next.remove(key);
        self.commit(&mut entries, next, "pref_remove", key)?;
        Ok(true)
    }

    /// Removes every entry; later reads return their supplied defaults.
    pub fn clear_all(&self) -> PrefResult<()> {
        let mut entries = self.write();
        let cleared = entries.len();
        self.commit(&mut entries, BTreeMap::new(), "pref_clear", "*")?;
        info!("event=pref_clear module=prefs status=ok cleared={cleared}");
        Ok(())
    }

    fn set(&self, key: &str, value: PrefValue) -> PrefResult<()> {
        if key.trim().is_empty() {
            return Err(PrefError::invalid(key, "key must not be empty"));
        }

        let mut entries = self.write();
        let mut next = entries.clone();
        next.insert(key.to_string(), value);
        self.commit(&mut entries, next, "pref_set", key)
    }

    /// Persists `next` and only then swaps it in.
    fn commit(
        &self,
        entries: &mut RwLockWriteGuard<'_, BTreeMap<String, PrefValue>>,
        next: BTreeMap<String, PrefValue>,
        event: &str,
        key: &str,
    ) -> PrefResult<()> {
        if let Err(err) = write_pref_file(&self.path, &next) {
            error!("event={event} module=prefs status=error key={key} error={err}");
            return Err(err);
        }
        **entries = next;
        info!("event={event} module=prefs status=ok key={key}");
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, PrefValue>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, PrefValue>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_pref_file(path: &Path) -> PrefResult<BTreeMap<String, PrefValue>> {
    let content = fs::read_to_string(path).map_err(|source| PrefError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: PrefFile = serde_json::from_str(&content).map_err(|source| PrefError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    if file.version != PREF_FILE_VERSION {
        return Err(PrefError::UnsupportedVersion {
            path: path.to_path_buf(),
            version: file.version,
        });
    }
    Ok(file.entries)
}

fn write_pref_file(path: &Path, entries: &BTreeMap<String, PrefValue>) -> PrefResult<()> {
    let file = PrefFile {
        version: PREF_FILE_VERSION,
        entries: entries.clone(),
    };
    let bytes = serde_json::to_vec_pretty(&file).map_err(PrefError::Encode)?;
    atomic_write(path, &bytes).map_err(|source| PrefError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `data` to a sibling temp file, syncs it, then renames it over
/// `path` so readers never see a partial file. The parent directory is
/// synced afterwards so the rename itself survives a crash.
fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir)?;
    }

    let temp_path = path.with_extension("json.tmp");
    if let Err(err) = write_and_rename(&temp_path, path, data) {
        // Best effort cleanup; the write error is returned.
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    match parent {
        Some(dir) => sync_dir(dir),
        None => Ok(()),
    }
}

fn write_and_rename(temp_path: &Path, path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp_path, path)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
