//! JSON-file backed store.
//!
//! The whole store is one JSON object. It is read once on first use and
//! rewritten on every change through a sibling temp file plus rename, so a
//! reader never observes a half-written file.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use super::{KeyValueStore, StoreError};

type Entries = BTreeMap<String, String>;

/// Store persisted to a JSON file on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    cache: Mutex<Option<Entries>>,
}

impl FileStore {
    /// Open a store at `path`. The file is created on the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn load(&self) -> Result<Entries, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Entries::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, entries: &Entries) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(entries)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!(path = %self.path.display(), keys = entries.len(), "State file written");
        Ok(())
    }

    /// Run `f` against a copy of the loaded entries. A reported change is
    /// written to disk first and only then becomes visible to later calls.
    async fn with_entries<R>(
        &self,
        f: impl FnOnce(&mut Entries) -> (R, bool) + Send,
    ) -> Result<R, StoreError> {
        let mut cache = self.cache.lock().await;
        let mut next = match cache.as_ref() {
            Some(entries) => entries.clone(),
            None => self.load().await?,
        };

        let (result, changed) = f(&mut next);
        if changed {
            self.persist(&next).await?;
        }
        *cache = Some(next);
        Ok(result)
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_entries(|entries| (entries.get(key).cloned(), false))
            .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_entries(|entries| {
            let previous = entries.insert(key.to_owned(), value.to_owned());
            ((), previous.as_deref() != Some(value))
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.with_entries(|entries| ((), entries.remove(key).is_some()))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("salesdesk-store-{}-{name}", std::process::id()))
            .join("state.json")
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let store = FileStore::new(scratch_path("missing"));
        assert_eq!(store.get("auth_token").await.unwrap(), None);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let path = scratch_path("reopen");
        let store = FileStore::new(&path);
        store.set("server_host", "10.0.0.2").await.unwrap();
        store.set("auth_token", "tok1").await.unwrap();
        store.remove("auth_token").await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("server_host").await.unwrap().as_deref(),
            Some("10.0.0.2")
        );
        assert_eq!(reopened.get("auth_token").await.unwrap(), None);
        assert!(!store.temp_path().exists());

        tokio::fs::remove_dir_all(path.parent().unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_write_leaves_previous_value() {
        let path = scratch_path("failed-write");
        let store = FileStore::new(&path);
        store.set("auth_token", "tok1").await.unwrap();

        // A directory in the temp file's place makes the next write fail.
        tokio::fs::create_dir_all(store.temp_path()).await.unwrap();

        assert!(matches!(
            store.set("auth_token", "tok2").await,
            Err(StoreError::Io(_))
        ));
        assert!(store.remove("auth_token").await.is_err());
        assert_eq!(store.get("auth_token").await.unwrap().as_deref(), Some("tok1"));

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("auth_token").await.unwrap().as_deref(), Some("tok1"));

        tokio::fs::remove_dir_all(path.parent().unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let path = scratch_path("corrupt");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, b"not json").await.unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get("auth_token").await,
            Err(StoreError::Serialization(_))
        ));

        tokio::fs::remove_dir_all(path.parent().unwrap()).await.unwrap();
    }
}
