use crate::db::{Database, ResourceStore};
use crate::errors::StoreError;
use crate::models::resource::Resource;
use tracing::info;

/// Sled tree per collection, records stored as JSON since the payload is
/// free-form anyway.
fn tree_name(collection: &str) -> String {
    format!("resources:{}", collection)
}

#[derive(Clone)]
pub struct ResourceRepository {
    db: Database,
}

impl ResourceRepository {
    pub fn new(db: Database) -> Self {
        ResourceRepository { db }
    }

    fn put(&self, tree: &sled::Tree, resource: &Resource) -> Result<(), StoreError> {
        let encoded =
            serde_json::to_vec(resource).map_err(|e| StoreError::Encode(e.to_string()))?;
        tree.insert(resource.id.as_bytes(), encoded)?;
        Ok(())
    }
}

impl ResourceStore for ResourceRepository {
    fn create(
        &self,
        collection: &str,
        owner_id: &str,
        data: serde_json::Value,
    ) -> Result<Resource, StoreError> {
        let tree = self.db.db.open_tree(tree_name(collection))?;
        let now = chrono::Utc::now();

        let resource = Resource {
            id: uuid::Uuid::new_v4().to_string(),
            collection: collection.to_string(),
            owner_id: owner_id.to_string(),
            data,
            created_at: now,
            updated_at: now,
        };

        self.put(&tree, &resource)?;

        info!(
            collection = %collection,
            resource_id = %resource.id,
            owner_id = %owner_id,
            "Resource created in database"
        );

        Ok(resource)
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Resource>, StoreError> {
        let tree = self.db.db.open_tree(tree_name(collection))?;

        match tree.get(id.as_bytes())? {
            Some(data) => {
                let resource = serde_json::from_slice(&data)
                    .map_err(|e| StoreError::Decode(e.to_string()))?;
                Ok(Some(resource))
            }
            None => Ok(None),
        }
    }

    fn list(&self, collection: &str) -> Result<Vec<Resource>, StoreError> {
        let tree = self.db.db.open_tree(tree_name(collection))?;

        let mut resources = Vec::new();
        for entry in tree.iter() {
            let (_, data) = entry?;
            let resource =
                serde_json::from_slice(&data).map_err(|e| StoreError::Decode(e.to_string()))?;
            resources.push(resource);
        }
        Ok(resources)
    }

    fn update(
        &self,
        collection: &str,
        id: &str,
        data: serde_json::Value,
    ) -> Result<Option<Resource>, StoreError> {
        let tree = self.db.db.open_tree(tree_name(collection))?;

        let mut resource = match self.get(collection, id)? {
            Some(r) => r,
            None => return Ok(None),
        };

        resource.data = data;
        resource.updated_at = chrono::Utc::now();
        self.put(&tree, &resource)?;

        info!(collection = %collection, resource_id = %id, "Resource updated in database");

        Ok(Some(resource))
    }

    fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let tree = self.db.db.open_tree(tree_name(collection))?;

        let removed = tree.remove(id.as_bytes())?.is_some();
        if removed {
            info!(collection = %collection, resource_id = %id, "Resource deleted from database");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repo() -> ResourceRepository {
        ResourceRepository::new(Database::in_memory().unwrap())
    }

    #[test]
    fn test_create_and_get() {
        let repo = repo();
        let created = repo
            .create("products", "user-1", json!({"name": "Widget", "price": 9.99}))
            .unwrap();

        let fetched = repo.get("products", &created.id).unwrap().unwrap();
        assert_eq!(fetched.owner_id, "user-1");
        assert_eq!(fetched.data["name"], "Widget");
    }

    #[test]
    fn test_collections_are_separate() {
        let repo = repo();
        let created = repo
            .create("products", "user-1", json!({"name": "Widget"}))
            .unwrap();

        assert!(repo.get("protected_data", &created.id).unwrap().is_none());
    }

    #[test]
    fn test_list() {
        let repo = repo();
        repo.create("products", "user-1", json!({"name": "A"})).unwrap();
        repo.create("products", "user-1", json!({"name": "B"})).unwrap();

        let all = repo.list("products").unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_update() {
        let repo = repo();
        let created = repo
            .create("products", "user-1", json!({"name": "Widget"}))
            .unwrap();

        let updated = repo
            .update("products", &created.id, json!({"name": "Gadget"}))
            .unwrap()
            .unwrap();
        assert_eq!(updated.data["name"], "Gadget");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn test_update_missing_is_none() {
        let repo = repo();
        let result = repo.update("products", "no-such-id", json!({})).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_delete() {
        let repo = repo();
        let created = repo
            .create("products", "user-1", json!({"name": "Widget"}))
            .unwrap();

        assert!(repo.delete("products", &created.id).unwrap());
        assert!(!repo.delete("products", &created.id).unwrap());
        assert!(repo.get("products", &created.id).unwrap().is_none());
    }
}
