//! Key-value storage behind the whole-collection persistence model.
//!
//! Every collection is a single JSON document under one key and is
//! rewritten in full on every mutation. The backends only move strings;
//! [`JsonStore`] layers serde on top.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn delete(&self, key: &str) -> anyhow::Result<()>;
}

/// JSON access for any [`KeyValueStore`], trait objects included.
pub trait JsonStore {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>>;
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> anyhow::Result<()>;
}

impl<S: KeyValueStore + ?Sized> JsonStore for S {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        match self.get(key)? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("corrupt JSON under key {}", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

// === In-memory ===

#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

// === Files on disk ===

/// One `<key>.json` file per key. Keys are percent-encoded into file names.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("cannot create data directory {}", root.display()))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("cannot read key {}", key)),
        }
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("cannot write key {}", key))?;
        fs::rename(&tmp, &path).with_context(|| format!("cannot write key {}", key))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("cannot delete key {}", key)),
        }
    }
}

// === Spin key-value ===

#[cfg(target_arch = "wasm32")]
pub struct SpinStore {
    inner: spin_sdk::key_value::Store,
}

#[cfg(target_arch = "wasm32")]
impl SpinStore {
    pub fn open_default() -> anyhow::Result<Self> {
        let inner = spin_sdk::key_value::Store::open_default()
            .map_err(|e| anyhow::anyhow!("KV store must exist: {:?}", e))?;
        Ok(Self { inner })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for SpinStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let bytes = self
            .inner
            .get(key)
            .map_err(|e| anyhow::anyhow!("kv get {}: {:?}", key, e))?;
        Ok(bytes.map(String::from_utf8).transpose()?)
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.inner
            .set(key, value.as_bytes())
            .map_err(|e| anyhow::anyhow!("kv set {}: {:?}", key, e))
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.inner
            .delete(key)
            .map_err(|e| anyhow::anyhow!("kv delete {}: {:?}", key, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_json() {
        let store = MemoryStore::new();
        store.set_json("ids", &vec!["a", "b"]).unwrap();
        let ids: Vec<String> = store.get_json("ids").unwrap().unwrap();
        assert_eq!(ids, vec!["a", "b"]);

        store.delete("ids").unwrap();
        assert!(store.get_json::<Vec<String>>("ids").unwrap().is_none());
    }

    #[test]
    fn file_store_treats_missing_files_as_absent() {
        let dir = std::env::temp_dir().join(format!("chatter-store-{}", uuid::Uuid::new_v4()));
        let store = FileStore::open(&dir).unwrap();

        assert!(store.get("token:abc").unwrap().is_none());
        store.set("token:abc", "{}").unwrap();
        assert_eq!(store.get("token:abc").unwrap().as_deref(), Some("{}"));
        store.delete("token:abc").unwrap();
        store.delete("token:abc").unwrap();
        assert!(store.get("token:abc").unwrap().is_none());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn corrupt_json_is_an_error() {
        let store = MemoryStore::new();
        store.set("users", "not json").unwrap();
        assert!(store.get_json::<Vec<String>>("users").is_err());
    }
}
