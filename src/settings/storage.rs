use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::utils;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Storage quota exceeded")]
    QuotaExceeded,
}

/// Origin-scoped key/value area holding string values
pub trait KeyValueStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Key/value area persisted as one JSON object file per origin
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage for `origin` inside `dir`
    pub fn for_origin(dir: &Path, origin: &str) -> Self {
        Self {
            path: dir.join(utils::storage_file_name(origin)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs_err::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        let staging = self.path.with_extension("json.tmp");
        fs_err::write(&staging, content)?;
        fs_err::rename(&staging, &self.path)?;
        Ok(())
    }

    /// Entries to write over, and whether the file on disk was corrupt.
    /// A corrupt file is replaced rather than merged.
    fn read_for_write(&self) -> Result<(BTreeMap<String, String>, bool), StorageError> {
        match self.read_all() {
            Ok(entries) => Ok((entries, false)),
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!("Overwriting corrupt storage file {}: {}", self.path.display(), e);
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let (mut entries, _) = self.read_for_write()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let (mut entries, corrupt) = self.read_for_write()?;
        if entries.remove(key).is_some() || corrupt {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// In-process key/value area for ephemeral sessions and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_string(), value.to_string());
        storage
    }

    /// Make every subsequent write fail as if the quota were exhausted
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::QuotaExceeded);
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::QuotaExceeded);
        }
        self.entries.remove(key);
        Ok(())
    }
}
