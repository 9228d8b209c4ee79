mod config;
pub mod database;
mod persistence;

pub use config::{Config, NotificationsConfig, TimerConfig};
pub use database::{Database, SessionRecord, Stats};
pub use persistence::{Persistence, PROJECTS_KEY, TASKS_KEY};

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::error::StorageError;

/// Returns `~/.config/pomodoro-noir[-dev]/` based on NOIR_ENV.
///
/// Set NOIR_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("NOIR_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomodoro-noir-dev")
    } else {
        base_dir.join("pomodoro-noir")
    };

    std::fs::create_dir_all(&dir).map_err(StorageError::DataDir)?;
    Ok(dir)
}

/// Durable string key-value storage.
pub trait KvStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KvStore + ?Sized> KvStore for Rc<S> {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).kv_get(key)
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).kv_set(key, value)
    }
}

/// In-process store for hosts without a disk and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.kv_get("tasks").unwrap().is_none());
        store.kv_set("tasks", "[]").unwrap();
        assert_eq!(store.kv_get("tasks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn shared_store_sees_writes() {
        let store = Rc::new(MemoryStore::new());
        let handle = Rc::clone(&store);
        handle.kv_set("k", "v").unwrap();
        assert_eq!(store.kv_get("k").unwrap().as_deref(), Some("v"));
    }
}
