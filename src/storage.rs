use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{PortalError, Result};

/// Durable string key/value store (the browser's localStorage).
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, rewritten on every `set`
///
/// A missing file reads as empty; the file is created on first write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStorage {
    /// Open (or prepare to create) the store at `path`
    ///
    /// # Errors
    /// * `PortalError::Storage` if the file exists but cannot be read or parsed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            read_values(&path)?
        } else {
            HashMap::new()
        };
        Ok(FileStorage { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|e| PortalError::Storage(e.to_string()))?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values)
            .map_err(|e| PortalError::Storage(e.to_string()))?;
        let mut file =
            File::create(&self.path).map_err(|e| PortalError::Storage(e.to_string()))?;
        file.write_all(json.as_bytes())
            .map_err(|e| PortalError::Storage(e.to_string()))
    }
}

fn read_values(path: &Path) -> Result<HashMap<String, String>> {
    let mut contents = String::new();
    File::open(path)
        .and_then(|mut f| f.read_to_string(&mut contents))
        .map_err(|e| PortalError::Storage(format!("{}: {}", path.display(), e)))?;

    if contents.trim().is_empty() {
        return Ok(HashMap::new());
    }
    serde_json::from_str(&contents)
        .map_err(|e| PortalError::Storage(format!("{}: {}", path.display(), e)))
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/portal.json");

        let mut store = FileStorage::open(&path).unwrap();
        assert_eq!(store.get("sidebarCollapsed"), None);
        store.set("sidebarCollapsed", "true").unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("sidebarCollapsed").as_deref(), Some("true"));
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(FileStorage::open(&path), Err(PortalError::Storage(_))));
    }
}
