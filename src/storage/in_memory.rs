//! In-memory record store for testing and development

use crate::core::entity::Entity;
use anyhow::{Result, anyhow};
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Thread-safe in-memory store keyed by record id
///
/// Insertion order is preserved so list endpoints return rows in a
/// stable order. Cheap to clone; all clones share the same data.
#[derive(Clone)]
pub struct MemoryStore<T: Entity> {
    data: Arc<RwLock<IndexMap<Uuid, T>>>,
}

impl<T: Entity> MemoryStore<T> {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Insert a record under its id
    pub fn add(&self, record: T) -> Result<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        data.insert(record.id(), record);
        Ok(())
    }

    /// Get a record by id
    pub fn get(&self, id: &Uuid) -> Result<Option<T>> {
        let data = self
            .data
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(data.get(id).cloned())
    }

    /// List all records in insertion order
    pub fn list(&self) -> Result<Vec<T>> {
        let data = self
            .data
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(data.values().cloned().collect())
    }

    /// Replace an existing record
    pub fn update(&self, record: T) -> Result<T> {
        let mut data = self
            .data
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let id = record.id();
        if !data.contains_key(&id) {
            return Err(anyhow!("{} not found: {}", T::resource_name_singular(), id));
        }

        data.insert(id, record.clone());
        Ok(record)
    }

    /// Remove a record by id
    ///
    /// Removing an absent id is not an error; the remaining records keep
    /// their relative order.
    pub fn delete(&self, id: &Uuid) -> Result<Option<T>> {
        let mut data = self
            .data
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(data.shift_remove(id))
    }

    /// Number of stored records
    pub fn count(&self) -> Result<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(data.len())
    }

    /// Count records matching a predicate
    pub fn count_where(&self, predicate: impl Fn(&T) -> bool) -> Result<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(data.values().filter(|r| predicate(r)).count())
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldValue;
    use chrono::{DateTime, Utc};

    #[derive(Clone, Debug, serde::Serialize)]
    struct Widget {
        id: Uuid,
        name: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    }

    impl Widget {
        fn new(name: &str) -> Self {
            let now = Utc::now();
            Self {
                id: Uuid::new_v4(),
                name: name.to_string(),
                created_at: now,
                updated_at: now,
            }
        }
    }

    impl Entity for Widget {
        fn resource_name() -> &'static str {
            "widgets"
        }
        fn resource_name_singular() -> &'static str {
            "widget"
        }
        fn id(&self) -> Uuid {
            self.id
        }
        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }
        fn updated_at(&self) -> DateTime<Utc> {
            self.updated_at
        }
    }

    impl crate::core::entity::Record for Widget {
        fn display_name(&self) -> &str {
            &self.name
        }
        fn field_keys() -> &'static [&'static str] {
            &["id", "name"]
        }
        fn field_value(&self, field: &str) -> Option<FieldValue> {
            match field {
                "id" => Some(self.id.into()),
                "name" => Some(self.name.clone().into()),
                _ => None,
            }
        }
        fn set_field(
            &mut self,
            field: &str,
            value: FieldValue,
        ) -> Result<(), crate::core::error::GridError> {
            match field {
                "name" => {
                    self.name = value.coerce_string();
                    Ok(())
                }
                _ => Err(crate::core::entity::unknown_field::<Self>(field)),
            }
        }
        fn touch(&mut self) {
            self.updated_at = Utc::now();
        }
    }

    #[test]
    fn test_add_get_list() {
        let store = MemoryStore::new();
        let a = Widget::new("a");
        let b = Widget::new("b");

        store.add(a.clone()).unwrap();
        store.add(b.clone()).unwrap();

        assert_eq!(store.get(&a.id).unwrap().unwrap().name, "a");
        let names: Vec<String> = store.list().unwrap().into_iter().map(|w| w.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_update_existing() {
        let store = MemoryStore::new();
        let mut widget = Widget::new("a");
        store.add(widget.clone()).unwrap();

        widget.name = "renamed".to_string();
        store.update(widget.clone()).unwrap();
        assert_eq!(store.get(&widget.id).unwrap().unwrap().name, "renamed");
    }

    #[test]
    fn test_update_missing_fails() {
        let store = MemoryStore::new();
        let widget = Widget::new("ghost");
        assert!(store.update(widget).is_err());
    }

    #[test]
    fn test_delete_preserves_order() {
        let store = MemoryStore::new();
        let a = Widget::new("a");
        let b = Widget::new("b");
        let c = Widget::new("c");
        for w in [&a, &b, &c] {
            store.add(w.clone()).unwrap();
        }

        store.delete(&b.id).unwrap();
        let names: Vec<String> = store.list().unwrap().into_iter().map(|w| w.name).collect();
        assert_eq!(names, vec!["a", "c"]);

        // Deleting an absent id is a no-op
        assert!(store.delete(&b.id).unwrap().is_none());
    }

    #[test]
    fn test_count_where() {
        let store = MemoryStore::new();
        store.add(Widget::new("soap")).unwrap();
        store.add(Widget::new("soap dish")).unwrap();
        store.add(Widget::new("towel")).unwrap();

        assert_eq!(store.count().unwrap(), 3);
        assert_eq!(
            store.count_where(|w| w.name.starts_with("soap")).unwrap(),
            2
        );
    }
}
