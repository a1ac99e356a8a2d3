//! String key-value persistence, used for the high score.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::KnightError;

pub const HIGH_SCORE_KEY: &str = "knightHighScore";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), KnightError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KnightError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A RON map on disk, rewritten in full on every `set`.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens `path`.  A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(source) => ron::from_str(&source).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring corrupt store");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    /// `$HOME/.knight_store.ron`, falling back to the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".knight_store.ron")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KnightError> {
        self.entries.insert(key.to_string(), value.to_string());
        let fail = |details: String| KnightError::Store {
            key: key.to_string(),
            details,
        };
        let text = ron::to_string(&self.entries).map_err(|e| fail(e.to_string()))?;
        fs::write(&self.path, text).map_err(|e| fail(e.to_string()))?;
        debug!(key, path = %self.path.display(), "Store written");
        Ok(())
    }
}

/// Missing or malformed values read as zero.
pub fn load_high_score(store: &dyn KeyValueStore) -> u32 {
    store
        .get(HIGH_SCORE_KEY)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

/// Persist `score` if it beats the stored value.  Returns whether it did.
pub fn save_high_score(store: &mut dyn KeyValueStore, score: u32) -> Result<bool, KnightError> {
    if score <= load_high_score(store) {
        return Ok(false);
    }
    store.set(HIGH_SCORE_KEY, &score.to_string())?;
    Ok(true)
}
