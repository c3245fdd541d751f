use crate::github::RepositoryRecord;
use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key-value storage adapter behind the session cache
///
/// The original client kept its session in ambient browser storage; here
/// the surface is an explicit adapter so callers choose where state
/// lives.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn clear(&self, key: &str) -> Result<()>;
}

/// In-memory storage for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| Error::Internal("Session store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Internal("Session store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Internal("Session store lock poisoned".to_string()))?;
        values.remove(key);
        Ok(())
    }
}

/// JSON-file-backed storage, the CLI's stand-in for browser storage
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_map(&self) -> Result<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                Error::Internal(format!(
                    "Corrupt session store {}: {e}",
                    self.path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(map)
            .map_err(|e| Error::Internal(format!("Failed to encode session store: {e}")))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn clear(&self, key: &str) -> Result<()> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

const KEY_USER_ID: &str = "user_id";
const KEY_USERNAME: &str = "username";
const KEY_REPOS: &str = "repos";

/// Session state of the signed-in user: identity plus the cached
/// repository listing
pub struct UserSession<S: Storage> {
    storage: S,
}

impl<S: Storage> UserSession<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn user_id(&self) -> Result<Option<String>> {
        self.storage.get(KEY_USER_ID)
    }

    pub fn set_user_id(&self, user_id: &str) -> Result<()> {
        self.storage.set(KEY_USER_ID, user_id)
    }

    pub fn username(&self) -> Result<Option<String>> {
        self.storage.get(KEY_USERNAME)
    }

    pub fn set_username(&self, username: &str) -> Result<()> {
        self.storage.set(KEY_USERNAME, username)
    }

    pub fn cached_repos(&self) -> Result<Option<Vec<RepositoryRecord>>> {
        self.get_json(KEY_REPOS)
    }

    pub fn cache_repos(&self, repos: &[RepositoryRecord]) -> Result<()> {
        self.set_json(KEY_REPOS, &repos)
    }

    /// Drop everything, as a sign-out does
    pub fn clear_all(&self) -> Result<()> {
        self.storage.clear(KEY_USER_ID)?;
        self.storage.clear(KEY_USERNAME)?;
        self.storage.clear(KEY_REPOS)
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.storage.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| Error::Internal(format!("Corrupt session value '{key}': {e}"))),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| Error::Internal(format!("Failed to encode session value '{key}': {e}")))?;
        self.storage.set(key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::default();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));

        storage.clear("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_storage_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let storage = FileStorage::new(path.clone());
        storage.set("username", "jane").unwrap();

        // A second instance reads what the first wrote
        let reopened = FileStorage::new(path);
        assert_eq!(
            reopened.get("username").unwrap().as_deref(),
            Some("jane")
        );

        reopened.clear("username").unwrap();
        assert_eq!(reopened.get("username").unwrap(), None);
    }

    #[test]
    fn test_session_caches_repos() {
        let session = UserSession::new(MemoryStorage::default());
        assert!(session.cached_repos().unwrap().is_none());

        let repos = vec![RepositoryRecord {
            name: "file-ops".to_string(),
            full_name: "acme/file-ops".to_string(),
            clone_url: "https://github.com/acme/file-ops.git".to_string(),
            default_branch: "main".to_string(),
            owner: "acme".to_string(),
            pushed_at: Utc::now(),
            created_at: None,
        }];
        session.cache_repos(&repos).unwrap();

        let cached = session.cached_repos().unwrap().unwrap();
        assert_eq!(cached, repos);
    }

    #[test]
    fn test_clear_all_signs_out() {
        let session = UserSession::new(MemoryStorage::default());
        session.set_user_id("u-1").unwrap();
        session.set_username("jane").unwrap();
        session.cache_repos(&[]).unwrap();

        session.clear_all().unwrap();
        assert!(session.user_id().unwrap().is_none());
        assert!(session.username().unwrap().is_none());
        assert!(session.cached_repos().unwrap().is_none());
    }
}
