pub mod resource_repository;
pub mod user_repository;

use crate::errors::StoreError;
use crate::models::resource::Resource;
use crate::models::user::User;

/// Narrow contract the credential verifier depends on. Handlers hold the
/// concrete sled-backed repository; `authenticate` only sees this trait.
pub trait UserStore {
    fn create(&self, user: User) -> Result<User, StoreError>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;
}

/// Contract of the resource collaborator sitting behind the token guard.
pub trait ResourceStore {
    fn create(
        &self,
        collection: &str,
        owner_id: &str,
        data: serde_json::Value,
    ) -> Result<Resource, StoreError>;
    fn get(&self, collection: &str, id: &str) -> Result<Option<Resource>, StoreError>;
    fn list(&self, collection: &str) -> Result<Vec<Resource>, StoreError>;
    fn update(
        &self,
        collection: &str,
        id: &str,
        data: serde_json::Value,
    ) -> Result<Option<Resource>, StoreError>;
    fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct Database {
    pub db: sled::Db,
}

impl Database {
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Database { db })
    }

    #[allow(dead_code)]
    pub fn in_memory() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Database { db })
    }
}
