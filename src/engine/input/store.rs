// Persistence of per-device configurations

use super::config::{Archetype, DeviceConfig};
use super::InputError;
use anyhow::Result;
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key/value storage for serialized configurations
pub trait ConfigStore {
    /// Raw stored document for `key`, if any
    fn read(&self, key: &str) -> Option<String>;

    /// Replace the stored document for `key`
    fn write(&mut self, key: &str, document: &str) -> Result<()>;
}

/// Storage key of a device's configuration document
pub fn storage_key(device_name: &str) -> String {
    format!("{}-config", device_name)
}

/// In-memory store, lost on drop
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, document: &str) -> Result<()> {
        self.entries.insert(key.to_string(), document.to_string());
        Ok(())
    }
}

/// Directory-backed store writing one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    base_path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Full path of the file backing `key`
    pub fn resolve_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }
}

impl ConfigStore for JsonFileStore {
    fn read(&self, key: &str) -> Option<String> {
        let path = self.resolve_path(key);
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn write(&mut self, key: &str, document: &str) -> Result<()> {
        fs::create_dir_all(&self.base_path).map_err(InputError::from)?;
        let path = self.resolve_path(key);
        fs::write(&path, document)
            .map_err(|e| InputError::Store(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(())
    }
}

/// Parse a stored document, discarding anything that is not a JSON object
fn parse_document(key: &str, document: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(document) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            warn!("Stored config {} is not an object, ignoring it", key);
            None
        }
        Err(e) => {
            warn!("Stored config {} is malformed, ignoring it: {}", key, e);
            None
        }
    }
}

/// Load the stored configuration of a device for one archetype.
/// Absent or malformed entries yield `None`.
pub fn load_device_config(
    store: &dyn ConfigStore,
    device_name: &str,
    archetype: Archetype,
) -> Option<DeviceConfig> {
    let key = storage_key(device_name);
    let document = store.read(&key)?;
    let mut map = parse_document(&key, &document)?;
    let entry = map.remove(archetype.as_str())?;

    let parsed = serde_json::from_value(entry)
        .map_err(InputError::from)
        .and_then(DeviceConfig::from_stored);
    match parsed {
        Ok(config) => {
            debug!("Loaded stored {} config for {}", archetype, device_name);
            Some(config)
        }
        Err(e) => {
            warn!(
                "Stored {} config for {} is invalid, using defaults: {}",
                archetype, device_name, e
            );
            None
        }
    }
}

/// Store the configuration of a device for one archetype, keeping the
/// entries of other archetypes intact
pub fn save_device_config(
    store: &mut dyn ConfigStore,
    device_name: &str,
    archetype: Archetype,
    config: &DeviceConfig,
) -> Result<()> {
    let key = storage_key(device_name);
    let mut map = store
        .read(&key)
        .and_then(|document| parse_document(&key, &document))
        .unwrap_or_default();

    map.insert(
        archetype.as_str().to_string(),
        serde_json::to_value(config.to_stored()).map_err(InputError::from)?,
    );

    let document = serde_json::to_string_pretty(&Value::Object(map)).map_err(InputError::from)?;
    store.write(&key, &document)?;
    debug!("Saved {} config for {}", archetype, device_name);
    Ok(())
}
