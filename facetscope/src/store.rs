//! Saved collection definitions

use crate::error::{Error, Result};
use crate::model::Collection;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;

/// Persistence of collection definitions
pub trait CollectionStore: Send + Sync {
    fn get(&self, id: &str) -> Result<Collection>;

    /// Create an empty collection over engine collection `name`
    fn create(&self, name: &str, label: &str) -> Result<Collection>;

    /// Insert or replace; assigns an id when the collection has none
    fn save(&self, collection: Collection) -> Result<Collection>;

    fn list_all(&self) -> Result<Vec<Collection>>;

    fn delete(&self, id: &str) -> Result<()>;
}

/// Process-local store, lost on restart
#[derive(Default)]
pub struct InMemoryCollectionStore {
    collections: RwLock<BTreeMap<String, Collection>>,
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `collections`
    pub fn with_collections(collections: impl IntoIterator<Item = Collection>) -> Result<Self> {
        let store = Self::new();
        for collection in collections {
            store.save(collection)?;
        }
        Ok(store)
    }

    /// Store pre-filled from a JSON array of collections
    pub fn from_seed_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read seed file {:?}: {}", path, e)))?;
        let collections: Vec<Collection> = serde_json::from_str(&content)?;
        tracing::info!("Seeding {} collections from {:?}", collections.len(), path);
        Self::with_collections(collections)
    }
}

impl CollectionStore for InMemoryCollectionStore {
    fn get(&self, id: &str) -> Result<Collection> {
        self.collections
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("collection '{}'", id)))
    }

    fn create(&self, name: &str, label: &str) -> Result<Collection> {
        let label = if label.is_empty() { name } else { label };
        self.save(Collection::new(name, label))
    }

    fn save(&self, mut collection: Collection) -> Result<Collection> {
        if collection.name.trim().is_empty() {
            return Err(Error::MalformedQuery("collection has no name".to_string()));
        }
        let id = match &collection.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        collection.id = Some(id.clone());
        self.collections.write().insert(id, collection.clone());
        Ok(collection)
    }

    fn list_all(&self) -> Result<Vec<Collection>> {
        Ok(self.collections.read().values().cloned().collect())
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.collections
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("collection '{}'", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_assigns_id() {
        let store = InMemoryCollectionStore::new();
        let created = store.create("logs", "").unwrap();
        let id = created.id.clone().unwrap();
        assert_eq!(created.label, "logs");
        assert_eq!(store.get(&id).unwrap(), created);
    }

    #[test]
    fn test_save_replaces_existing() {
        let store = InMemoryCollectionStore::new();
        let mut collection = store.create("logs", "Logs").unwrap();
        collection.label = "Application logs".to_string();
        store.save(collection.clone()).unwrap();

        assert_eq!(store.list_all().unwrap().len(), 1);
        let id = collection.id.unwrap();
        assert_eq!(store.get(&id).unwrap().label, "Application logs");
    }

    #[test]
    fn test_unknown_ids() {
        let store = InMemoryCollectionStore::new();
        assert!(matches!(store.get("nope"), Err(Error::NotFound(_))));
        assert!(matches!(store.delete("nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_delete() {
        let store = InMemoryCollectionStore::new();
        let id = store.create("logs", "Logs").unwrap().id.unwrap();
        store.delete(&id).unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }
}
