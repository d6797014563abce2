// SPDX-License-Identifier: MPL-2.0

//! Persistent key-value slot for the scan configuration
//!
//! Each key is one file under `$XDG_CONFIG_HOME/barcodetoweb/v1/`, readable
//! only by the owner. Writes go to a temporary file that is renamed over the
//! old value, so a reader sees either the previous or the new blob.

use crate::config::Configuration;
use crate::constants::{APP_ID, CONFIG_STORE_KEY};
use crate::errors::StoreError;
use std::collections::HashMap;
use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Store layout version, part of the directory path
const STORE_VERSION: &str = "v1";

/// App-private string slots
pub trait ConfigStore: Send + Sync {
    /// Read a slot. `Ok(None)` when it was never written.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace a slot's value
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Load the stored configuration.
///
/// Missing, unreadable or corrupt data all give `None`; the caller shows the
/// "scan a configuration" prompt instead of failing.
pub fn load_configuration(store: &dyn ConfigStore) -> Option<Configuration> {
    let raw = match store.read(CONFIG_STORE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No stored configuration");
            return None;
        }
        Err(e) => {
            warn!(error = %e, "Could not read stored configuration");
            return None;
        }
    };

    match Configuration::from_json(&raw) {
        Ok(config) => {
            info!(activities = config.activities().len(), "Loaded stored configuration");
            Some(config)
        }
        Err(e) => {
            warn!(error = %e, "Stored configuration is corrupt, ignoring it");
            None
        }
    }
}

/// Persist a configuration as one JSON blob under the fixed key
pub fn save_configuration(store: &dyn ConfigStore, config: &Configuration) -> Result<(), StoreError> {
    let json = config.to_json()?;
    store.write(CONFIG_STORE_KEY, &json)?;
    info!(activities = config.activities().len(), "Configuration saved");
    Ok(())
}

/// [`load_configuration`] on the blocking pool
pub async fn load_configuration_async(store: Arc<dyn ConfigStore>) -> Option<Configuration> {
    tokio::task::spawn_blocking(move || load_configuration(store.as_ref()))
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Configuration load task panicked");
            None
        })
}

/// [`save_configuration`] on the blocking pool
pub async fn save_configuration_async(
    store: Arc<dyn ConfigStore>,
    config: Configuration,
) -> Result<(), StoreError> {
    tokio::task::spawn_blocking(move || save_configuration(store.as_ref(), &config))
        .await
        .map_err(|e| StoreError::WriteFailed(e.to_string()))?
}

/// File-backed store, one file per key
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    root: PathBuf,
}

impl FileConfigStore {
    /// Store rooted at an explicit directory (the version subdirectory is
    /// appended)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into().join(STORE_VERSION),
        }
    }

    /// Store under the user's configuration directory
    pub fn default_location() -> Result<Self, StoreError> {
        let base = dirs::config_dir().ok_or(StoreError::NoStoreDirectory)?;
        Ok(Self::new(base.join(APP_ID)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn ensure_root(&self) -> io::Result<()> {
        DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(&self.root)
    }
}

impl ConfigStore for FileConfigStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::ReadFailed(format!("{}: {}", path.display(), e))),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let write_err = |e: io::Error| StoreError::WriteFailed(e.to_string());

        self.ensure_root().map_err(write_err)?;

        let path = self.path_for(key);
        let tmp_path = self.root.join(format!(".{}.tmp", key));

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&tmp_path)
            .map_err(write_err)?;
        file.write_all(value.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);

        fs::rename(&tmp_path, &path).map_err(write_err)?;
        debug!(path = %path.display(), bytes = value.len(), "Store slot written");
        Ok(())
    }
}

/// In-memory store for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    slots: Mutex<HashMap<String, String>>,
    fail_writes: bool,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail
    pub fn failing() -> Self {
        Self {
            slots: Mutex::default(),
            fail_writes: true,
        }
    }

    /// Store pre-filled with one slot
    pub fn with_slot(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut slots) = store.slots.lock() {
            slots.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl ConfigStore for MemoryConfigStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let slots = self
            .slots
            .lock()
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::WriteFailed("store is read-only".to_string()));
        }
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    const SAMPLE: &str = r#"{"t":"_bc2w-conf","a":[{"n":"One","u":"https://one.example","r":"^\\d+$"},{"n":"Two","u":"https://two.example","t":"n"}]}"#;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileConfigStore::new(dir.path());
        let config = Configuration::from_json(SAMPLE).expect("valid json");

        save_configuration(&store, &config).expect("save");
        let loaded = load_configuration(&store).expect("stored configuration");

        assert_eq!(loaded, config);
        assert_eq!(loaded.activities()[1].name, "Two");
    }

    #[test]
    fn test_file_store_is_owner_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileConfigStore::new(dir.path());
        store.write("config", "{}").expect("write");

        let mode = fs::metadata(store.root().join("config"))
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_write_overwrites_previous_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileConfigStore::new(dir.path());

        store.write("config", "first").expect("write");
        store.write("config", "second").expect("write");

        assert_eq!(store.read("config").expect("read").as_deref(), Some("second"));
        assert!(!store.root().join(".config.tmp").exists());
    }

    #[test]
    fn test_missing_slot_loads_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileConfigStore::new(dir.path());

        assert_eq!(store.read("config").expect("read"), None);
        assert!(load_configuration(&store).is_none());
    }

    #[test]
    fn test_corrupt_slot_degrades_to_none() {
        let store = MemoryConfigStore::with_slot("config", "{not json");
        assert!(load_configuration(&store).is_none());
    }

    #[test]
    fn test_untagged_stored_blob_is_still_used() {
        let store = MemoryConfigStore::with_slot("config", r#"{"a":[{"n":"X","u":"https://x"}]}"#);
        let config = load_configuration(&store).expect("configuration");
        assert!(config.has_activities());
    }

    #[test]
    fn test_failing_store_reports_error() {
        let store = MemoryConfigStore::failing();
        let config = Configuration::from_json(SAMPLE).expect("valid json");
        assert!(matches!(
            save_configuration(&store, &config),
            Err(StoreError::WriteFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_async_round_trip() {
        let store: Arc<dyn ConfigStore> = Arc::new(MemoryConfigStore::new());
        let config = Configuration::from_json(SAMPLE).expect("valid json");

        save_configuration_async(store.clone(), config.clone())
            .await
            .expect("save");
        assert_eq!(load_configuration_async(store).await, Some(config));
    }
}
