//! Namespaced key/value persistence.
//!
//! Each namespace is one JSON object stored at `<base>/<namespace>.json`
//! with restricted permissions (0600). Values are strings; callers decide how
//! to encode richer data.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};

/// Durable string storage split into namespaces.
pub trait KeyValueStore: Send + Sync {
    /// Reads a key. Missing namespaces and keys yield `None`.
    ///
    /// # Errors
    /// Returns an error if the backing data exists but cannot be read.
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>>;

    /// Writes a key, creating the namespace if needed.
    ///
    /// # Errors
    /// Returns an error if the backing data cannot be written.
    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()>;

    /// Removes a key. Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns an error if the backing data cannot be written.
    fn remove(&self, namespace: &str, key: &str) -> Result<()>;
}

type Namespace = BTreeMap<String, String>;

/// File-backed store rooted at a directory (usually `STAFFDESK_HOME`).
#[derive(Debug)]
pub struct FileStore {
    base: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Returns the file backing a namespace.
    pub fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.base.join(format!("{namespace}.json"))
    }

    fn load(&self, namespace: &str) -> Result<Namespace> {
        let path = self.namespace_path(namespace);
        if !path.exists() {
            return Ok(Namespace::new());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Namespace::new());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn save(&self, namespace: &str, data: &Namespace) -> Result<()> {
        let path = self.namespace_path(namespace);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(data)
            .with_context(|| format!("Failed to serialize namespace {namespace}"))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        Ok(())
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        let _guard = self.guard();
        Ok(self.load(namespace)?.remove(key))
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        let _guard = self.guard();
        let mut data = self.load(namespace)?;
        data.insert(key.to_string(), value.to_string());
        self.save(namespace, &data)
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<()> {
        let _guard = self.guard();
        let mut data = self.load(namespace)?;
        if data.remove(key).is_some() {
            self.save(namespace, &data)?;
        }
        Ok(())
    }
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, Namespace>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_data<R>(&self, f: impl FnOnce(&mut HashMap<String, Namespace>) -> R) -> R {
        let mut data = self
            .data
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut data)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        Ok(self.with_data(|data| data.get(namespace).and_then(|ns| ns.get(key).cloned())))
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        self.with_data(|data| {
            data.entry(namespace.to_string())
                .or_default()
                .insert(key.to_string(), value.to_string());
        });
        Ok(())
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<()> {
        self.with_data(|data| {
            if let Some(ns) = data.get_mut(namespace) {
                ns.remove(key);
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_file_store_round_trip_survives_reopen() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("session", "token", "abc").unwrap();
        store.set("session", "refresh", "def").unwrap();

        let reopened = FileStore::new(dir.path());
        assert_eq!(
            reopened.get("session", "token").unwrap().as_deref(),
            Some("abc")
        );
        assert_eq!(
            reopened.get("session", "refresh").unwrap().as_deref(),
            Some("def")
        );
    }

    #[test]
    fn test_file_store_missing_namespace_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        assert_eq!(store.get("session", "token").unwrap(), None);
        store.remove("session", "token").unwrap();
        assert!(!store.namespace_path("session").exists());
    }

    #[test]
    fn test_file_store_namespaces_are_separate_files() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("session", "token", "abc").unwrap();
        store.set("theme-storage", "theme", "light").unwrap();

        assert!(dir.path().join("session.json").exists());
        assert!(dir.path().join("theme-storage.json").exists());
        assert_eq!(store.get("session", "theme").unwrap(), None);
    }

    #[test]
    fn test_file_store_remove_key() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("session", "token", "abc").unwrap();
        store.remove("session", "token").unwrap();
        assert_eq!(store.get("session", "token").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("session.json"), "{not json").unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.get("session", "token").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("session", "token", "abc").unwrap();

        let mode = fs::metadata(store.namespace_path("session"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        store.set("a", "k", "v").unwrap();
        assert_eq!(store.get("a", "k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.get("b", "k").unwrap(), None);
        store.remove("a", "k").unwrap();
        assert_eq!(store.get("a", "k").unwrap(), None);
    }
}
