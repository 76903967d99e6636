use crate::db::{Database, UserStore};
use crate::errors::StoreError;
use crate::models::user::User;
use bincode::{Decode, Encode};
use std::str;
use tracing::info;

const USERS_TREE: &str = "users";
const EMAIL_INDEX_TREE: &str = "email_index";

#[derive(Debug, Encode, Decode)]
pub struct StoredUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64, // Store as timestamp
}

impl From<User> for StoredUser {
    fn from(user: User) -> Self {
        StoredUser {
            id: user.id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at.timestamp(),
        }
    }
}

impl From<StoredUser> for User {
    fn from(stored: StoredUser) -> Self {
        User {
            id: stored.id,
            username: stored.username,
            email: stored.email,
            password_hash: stored.password_hash,
            created_at: chrono::DateTime::from_timestamp(stored.created_at, 0)
                .unwrap_or_else(chrono::Utc::now),
        }
    }
}

#[derive(Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        UserRepository { db }
    }
}

impl UserStore for UserRepository {
    fn create(&self, user: User) -> Result<User, StoreError> {
        let users_tree = self.db.db.open_tree(USERS_TREE)?;
        let email_index = self.db.db.open_tree(EMAIL_INDEX_TREE)?;

        // Emails are stored normalized; uniqueness is on the normalized form.
        if email_index.contains_key(user.email.as_bytes())? {
            return Err(StoreError::DuplicateEmail);
        }

        let stored_user = StoredUser::from(user.clone());
        let encoded = bincode::encode_to_vec(&stored_user, bincode::config::standard())
            .map_err(|e| StoreError::Encode(e.to_string()))?;

        users_tree.insert(user.id.as_bytes(), encoded.as_slice())?;
        email_index.insert(user.email.as_bytes(), user.id.as_bytes())?;

        info!(user_id = %user.id, email = %user.email, "User created in database");

        Ok(user)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let users_tree = self.db.db.open_tree(USERS_TREE)?;

        match users_tree.get(id.as_bytes())? {
            Some(data) => {
                let (stored_user, _): (StoredUser, usize) =
                    bincode::decode_from_slice(&data, bincode::config::standard())
                        .map_err(|e| StoreError::Decode(e.to_string()))?;
                Ok(Some(User::from(stored_user)))
            }
            None => Ok(None),
        }
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email_index = self.db.db.open_tree(EMAIL_INDEX_TREE)?;

        match email_index.get(email.as_bytes())? {
            Some(user_id) => {
                let id = str::from_utf8(&user_id)
                    .map_err(|e| StoreError::Decode(format!("invalid user id: {}", e)))?;
                self.find_by_id(id)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_user() -> User {
        User {
            id: uuid::Uuid::new_v4().to_string(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hashed_password".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_and_find_user() {
        let db = Database::in_memory().unwrap();
        let repo = UserRepository::new(db);
        let user = create_test_user();

        let created = repo.create(user.clone()).unwrap();
        assert_eq!(created.id, user.id);

        let retrieved = repo.find_by_id(&user.id).unwrap().unwrap();
        assert_eq!(retrieved.email, user.email);
    }

    #[test]
    fn test_find_by_email() {
        let db = Database::in_memory().unwrap();
        let repo = UserRepository::new(db);
        let user = create_test_user();

        repo.create(user.clone()).unwrap();

        let retrieved = repo.find_by_email(&user.email).unwrap().unwrap();
        assert_eq!(retrieved.id, user.id);
    }

    #[test]
    fn test_find_unknown_email() {
        let db = Database::in_memory().unwrap();
        let repo = UserRepository::new(db);

        let retrieved = repo.find_by_email("nobody@example.com").unwrap();
        assert!(retrieved.is_none());
    }

    #[test]
    fn test_duplicate_email() {
        let db = Database::in_memory().unwrap();
        let repo = UserRepository::new(db);
        let user1 = create_test_user();

        repo.create(user1.clone()).unwrap();

        let mut user2 = create_test_user();
        user2.id = uuid::Uuid::new_v4().to_string();
        user2.email = user1.email.clone();

        let result = repo.create(user2);
        assert!(matches!(result, Err(StoreError::DuplicateEmail)));
    }
}
