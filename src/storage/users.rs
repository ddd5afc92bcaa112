//! User repository for JSON storage
//!
//! Manages loading and saving users to users.json, with an email index

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TrailError;
use crate::models::{User, UserId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct UserData {
    users: Vec<User>,
}

/// Repository for user persistence
pub struct UserRepository {
    path: PathBuf,
    data: RwLock<HashMap<UserId, User>>,
    /// Index: normalized email -> user_id
    by_email: RwLock<HashMap<String, UserId>>,
}

impl UserRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_email: RwLock::new(HashMap::new()),
        }
    }

    /// Load users from disk
    pub fn load(&self) -> Result<(), TrailError> {
        let file_data: UserData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_email = self.by_email.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        by_email.clear();

        for user in file_data.users {
            by_email.insert(User::normalize_email(&user.email), user.id);
            data.insert(user.id, user);
        }

        Ok(())
    }

    /// Save users to disk
    pub fn save(&self) -> Result<(), TrailError> {
        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        write_json_atomic(&self.path, &UserData { users })
    }

    pub fn get(&self, id: UserId) -> Result<Option<User>, TrailError> {
        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Get a user by email (case-insensitive)
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>, TrailError> {
        let id = {
            let by_email = self.by_email.read().map_err(|e| {
                TrailError::Storage(format!("Failed to acquire read lock: {}", e))
            })?;
            by_email.get(&User::normalize_email(email)).copied()
        };

        match id {
            Some(id) => self.get(id),
            None => Ok(None),
        }
    }

    /// Find a user by email or id
    pub fn find(&self, identifier: &str) -> Result<Option<User>, TrailError> {
        if let Some(user) = self.get_by_email(identifier)? {
            return Ok(Some(user));
        }

        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.values().find(|u| u.id.matches(identifier)).cloned())
    }

    /// All users, oldest first
    pub fn get_all(&self) -> Result<Vec<User>, TrailError> {
        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    /// Insert or update a user, keeping the email index current
    pub fn upsert(&self, user: User) -> Result<(), TrailError> {
        let mut data = self.data.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_email = self.by_email.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if let Some(previous) = data.get(&user.id) {
            by_email.remove(&User::normalize_email(&previous.email));
        }

        by_email.insert(User::normalize_email(&user.email), user.id);
        data.insert(user.id, user);
        Ok(())
    }

    pub fn delete(&self, id: UserId) -> Result<Option<User>, TrailError> {
        let mut data = self.data.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_email = self.by_email.write().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let removed = data.remove(&id);
        if let Some(user) = &removed {
            by_email.remove(&User::normalize_email(&user.email));
        }
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize, TrailError> {
        let data = self.data.read().map_err(|e| {
            TrailError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, UserRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = UserRepository::new(temp_dir.path().join("users.json"));
        repo.load().unwrap();
        (temp_dir, repo)
    }

    #[test]
    fn test_get_by_email_case_insensitive() {
        let (_temp_dir, repo) = create_test_repo();
        let user = User::new("Ada", "Ada@Example.com", Role::Admin);
        repo.upsert(user.clone()).unwrap();

        let found = repo.get_by_email("ada@example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[test]
    fn test_find_by_id() {
        let (_temp_dir, repo) = create_test_repo();
        let user = User::new("Bob", "bob@example.com", Role::Member);
        repo.upsert(user.clone()).unwrap();

        let found = repo.find(&user.id.to_string()).unwrap().unwrap();
        assert_eq!(found.email, "bob@example.com");
    }

    #[test]
    fn test_email_change_updates_index() {
        let (_temp_dir, repo) = create_test_repo();
        let mut user = User::new("Cy", "old@example.com", Role::Member);
        repo.upsert(user.clone()).unwrap();

        user.email = "new@example.com".into();
        repo.upsert(user).unwrap();

        assert!(repo.get_by_email("old@example.com").unwrap().is_none());
        assert!(repo.get_by_email("new@example.com").unwrap().is_some());
    }

    #[test]
    fn test_save_reload_and_delete() {
        let (temp_dir, repo) = create_test_repo();
        let user = User::new("Di", "di@example.com", Role::Member);
        repo.upsert(user.clone()).unwrap();
        repo.save().unwrap();

        let reloaded = UserRepository::new(temp_dir.path().join("users.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 1);

        assert!(reloaded.delete(user.id).unwrap().is_some());
        assert!(reloaded.get_by_email("di@example.com").unwrap().is_none());
    }
}
