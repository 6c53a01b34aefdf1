//! Local key/value storage for the login form.
//!
//! The form only persists one thing: the remembered license key. Storage is
//! reached through the [`KeyValueStore`] trait so the controller can run
//! against an in-memory store in tests and a file-backed store in the CLI.
//!
//! ## File location
//!
//! [`FileStore::default_location`] resolves to:
//! - Windows: `%APPDATA%\keylogin\local_storage.json`
//! - macOS: `~/Library/Application Support/keylogin/local_storage.json`
//! - Linux: `~/.local/share/keylogin/local_storage.json`
//!
//! The remembered key is stored in plaintext.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::{LoginError, LoginResult};

/// Store key holding `"true"` when the user asked to remember the key.
pub const REMEMBER_KEY: &str = "rememberKey";
/// Store key holding the plaintext license key.
pub const LICENSE_KEY: &str = "licenseKey";

const STORAGE_FILE: &str = "local_storage.json";
const APP_DIR: &str = "keylogin";

/// Flat string key/value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> LoginResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> LoginResult<()>;
    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> LoginResult<()>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> LoginResult<Option<String>> {
        let entries = self.entries.lock().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> LoginResult<()> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> LoginResult<()> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> LoginError {
    LoginError::Io(std::io::Error::new(
        ErrorKind::Other,
        "storage lock poisoned",
    ))
}

/// JSON file holding a flat string map.
///
/// Every operation reads and rewrites the whole file; the map holds two
/// entries at most.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform application data directory, if one exists.
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join(APP_DIR).join(STORAGE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> LoginResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(data) if data.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(LoginError::Io(e)),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> LoginResult<()> {
        if map.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(LoginError::Io(e)),
            };
        }

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(map)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> LoginResult<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> LoginResult<()> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)?;
        tracing::debug!(key, path = %self.path.display(), "Saved value to local storage");
        Ok(())
    }

    fn remove(&self, key: &str) -> LoginResult<()> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
            tracing::debug!(key, path = %self.path.display(), "Removed value from local storage");
        }
        Ok(())
    }
}

/// The remembered-key pair as held in a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RememberedKey {
    pub remember: bool,
    pub license_key: String,
}

impl RememberedKey {
    /// Load the remembered key, if the remember flag is set and a key exists.
    pub fn load(store: &dyn KeyValueStore) -> LoginResult<Option<Self>> {
        let remember = store.get(REMEMBER_KEY)?.as_deref() == Some("true");
        if !remember {
            return Ok(None);
        }

        Ok(store.get(LICENSE_KEY)?.map(|license_key| Self {
            remember,
            license_key,
        }))
    }

    /// Persist the key and set the remember flag.
    pub fn save(store: &dyn KeyValueStore, license_key: &str) -> LoginResult<()> {
        store.set(REMEMBER_KEY, "true")?;
        store.set(LICENSE_KEY, license_key)
    }

    /// Remove both the flag and the key.
    pub fn clear(store: &dyn KeyValueStore) -> LoginResult<()> {
        store.remove(REMEMBER_KEY)?;
        store.remove(LICENSE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store() -> FileStore {
        let path = std::env::temp_dir()
            .join(format!("keylogin-store-{}", uuid::Uuid::new_v4()))
            .join(STORAGE_FILE);
        FileStore::new(path)
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let store = scratch_store();
        store.set(LICENSE_KEY, "ABC-123").unwrap();

        let reopened = FileStore::new(store.path());
        assert_eq!(reopened.get(LICENSE_KEY).unwrap().as_deref(), Some("ABC-123"));

        reopened.remove(LICENSE_KEY).unwrap();
        assert!(!store.path().exists(), "empty store should delete its file");
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let store = scratch_store();
        assert_eq!(store.get(REMEMBER_KEY).unwrap(), None);
        store.remove(REMEMBER_KEY).unwrap();
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let store = scratch_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(
            store.get(LICENSE_KEY),
            Err(LoginError::Serialization(_))
        ));
    }

    #[test]
    fn remembered_key_requires_flag() {
        let store = MemoryStore::new();
        store.set(LICENSE_KEY, "ABC-123").unwrap();
        assert_eq!(RememberedKey::load(&store).unwrap(), None);

        RememberedKey::save(&store, "ABC-123").unwrap();
        assert_eq!(
            RememberedKey::load(&store).unwrap(),
            Some(RememberedKey {
                remember: true,
                license_key: "ABC-123".to_string()
            })
        );

        RememberedKey::clear(&store).unwrap();
        assert_eq!(store.get(LICENSE_KEY).unwrap(), None);
        assert_eq!(store.get(REMEMBER_KEY).unwrap(), None);
    }

    #[test]
    fn default_location_is_under_app_dir() {
        if let Some(store) = FileStore::default_location() {
            assert!(store.path().ends_with(Path::new(APP_DIR).join(STORAGE_FILE)));
        }
    }
}
