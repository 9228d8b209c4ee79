//! Writes the task and project collections to a key-value store whenever the
//! binder reports a change, and reads them back at startup.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::KvStore;
use crate::error::StorageError;
use crate::task::{CollectionObserver, ProjectList, Task};

pub const TASKS_KEY: &str = "tasks";
pub const PROJECTS_KEY: &str = "projects";

pub struct Persistence<S: KvStore> {
    store: S,
}

impl<S: KvStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stored tasks in list order; empty when missing or unreadable.
    pub fn load_tasks(&self) -> Vec<Task> {
        self.load_or(TASKS_KEY, Vec::new)
    }

    /// Stored projects; the default list when missing or unreadable.
    pub fn load_projects(&self) -> ProjectList {
        self.load_or(PROJECTS_KEY, ProjectList::default)
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        self.save(TASKS_KEY, tasks)
    }

    pub fn save_projects(&self, projects: &[String]) -> Result<(), StorageError> {
        self.save(PROJECTS_KEY, projects)
    }

    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|source| StorageError::Encoding {
            key: key.to_string(),
            source,
        })?;
        self.store.kv_set(key, &json)
    }

    fn load_or<T: DeserializeOwned>(&self, key: &str, default: impl FnOnce() -> T) -> T {
        match self.store.kv_get(key) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(key, error = %e, "stored collection is corrupt, using default");
                    default()
                }
            },
            Ok(None) => default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read stored collection, using default");
                default()
            }
        }
    }
}

impl<S: KvStore> CollectionObserver for Persistence<S> {
    fn tasks_changed(&mut self, tasks: &[Task]) {
        if let Err(e) = self.save_tasks(tasks) {
            tracing::warn!(error = %e, "failed to persist tasks");
        }
    }

    fn projects_changed(&mut self, projects: &[String]) {
        if let Err(e) = self.save_projects(projects) {
            tracing::warn!(error = %e, "failed to persist projects");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::rc::Rc;

    struct BrokenStore;

    impl KvStore for BrokenStore {
        fn kv_get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Locked)
        }

        fn kv_set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Locked)
        }
    }

    #[test]
    fn missing_keys_give_defaults() {
        let persistence = Persistence::new(MemoryStore::new());
        assert!(persistence.load_tasks().is_empty());
        assert_eq!(persistence.load_projects(), ProjectList::default());
    }

    #[test]
    fn corrupt_data_gives_defaults() {
        let store = MemoryStore::new();
        store.kv_set(TASKS_KEY, "{not json").unwrap();
        store.kv_set(PROJECTS_KEY, "42").unwrap();
        let persistence = Persistence::new(store);
        assert!(persistence.load_tasks().is_empty());
        assert_eq!(persistence.load_projects(), ProjectList::default());
    }

    #[test]
    fn unreadable_store_gives_defaults_and_writes_are_swallowed() {
        let mut persistence = Persistence::new(BrokenStore);
        assert!(persistence.load_tasks().is_empty());
        assert_eq!(persistence.load_projects().names().len(), 3);
        persistence.tasks_changed(&[]);
        persistence.projects_changed(&["Work".to_string()]);
    }

    #[test]
    fn observer_writes_full_collections() {
        let store = Rc::new(MemoryStore::new());
        let mut persistence = Persistence::new(Rc::clone(&store));

        let mut task = Task::new("Draft", Some(2), Some("Work".into())).unwrap();
        task.saved_remaining_secs = Some(870);
        persistence.tasks_changed(std::slice::from_ref(&task));
        persistence.projects_changed(&["Work".to_string(), "Home".to_string()]);

        let reader = Persistence::new(store);
        assert_eq!(reader.load_tasks(), vec![task]);
        assert_eq!(reader.load_projects().names(), ["Work", "Home"]);
    }

    #[test]
    fn empty_stored_project_list_is_respected() {
        let store = MemoryStore::new();
        store.kv_set(PROJECTS_KEY, "[]").unwrap();
        assert!(Persistence::new(store).load_projects().names().is_empty());
    }
}
