//! Client-local preference storage.
//!
//! This module provides:
//! - A small key/value trait the chat session persists its toggles through
//! - A file-backed store (one file per key) for real sessions
//! - An in-memory store for tests and throwaway sessions

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const NAME_KEY: &str = "hridayai_name";
pub const DARK_MODE_KEY: &str = "hridayai_dark";
pub const FRIENDLY_MODE_KEY: &str = "hridayai_friendly";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to create storage directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {key}: {source}")]
    Write { key: String, source: std::io::Error },

    #[error("Failed to delete {key}: {source}")]
    Delete { key: String, source: std::io::Error },

    #[error("Storage lock poisoned")]
    Poisoned,
}

pub type StorageResult<T> = Result<T, StorageError>;

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;

    fn get_flag(&self, key: &str) -> Option<bool> {
        match self.get(key)?.trim() {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        }
    }

    fn set_flag(&self, key: &str, value: bool) -> StorageResult<()> {
        self.set(key, if value { "1" } else { "0" })
    }
}

// ============================================
// File-backed store
// ============================================

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform local data directory, or `cache/prefs` when there is none.
    pub fn default_location() -> Self {
        let root = dirs::data_local_dir()
            .map(|dir| dir.join("hridayai").join("prefs"))
            .unwrap_or_else(|| PathBuf::from("cache").join("prefs"));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        fs::create_dir_all(&self.root).map_err(|source| StorageError::CreateDir {
            path: self.root.clone(),
            source,
        })?;
        fs::write(self.path_for(key), value).map_err(|source| StorageError::Write {
            key: key.to_string(),
            source,
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path).map_err(|source| StorageError::Delete {
                key: key.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

// ============================================
// In-memory store
// ============================================

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// Sanitize storage key for filesystem use
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect()
}

// ============================================
// User preferences
// ============================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserPreferences {
    pub display_name: Option<String>,
    pub dark_mode: bool,
    pub friendly_mode: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            display_name: None,
            dark_mode: false,
            friendly_mode: true,
        }
    }
}

impl UserPreferences {
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let defaults = Self::default();
        Self {
            display_name: store
                .get(NAME_KEY)
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            dark_mode: store.get_flag(DARK_MODE_KEY).unwrap_or(defaults.dark_mode),
            friendly_mode: store
                .get_flag(FRIENDLY_MODE_KEY)
                .unwrap_or(defaults.friendly_mode),
        }
    }
}
