//! User service
//!
//! Adding and removing users is an admin operation. Removing a user never
//! removes their tasks or history: references to them are set to null.

use tracing::info;

use super::Actor;
use crate::error::{TrailError, TrailResult};
use crate::models::{Role, User};
use crate::storage::Storage;

/// Service for user management
pub struct UserService<'a> {
    storage: &'a Storage,
}

impl<'a> UserService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Add a user; emails are unique (case-insensitive)
    pub fn add(&self, name: &str, email: &str, role: Role, actor: Actor<'_>) -> TrailResult<User> {
        actor.require_admin("add users")?;

        let name = name.trim();
        if name.is_empty() {
            return Err(TrailError::Validation("User name cannot be empty".into()));
        }

        let email = email.trim();
        if !is_plausible_email(email) {
            return Err(TrailError::Validation(format!(
                "Invalid email address '{}'",
                email
            )));
        }

        if self.storage.users.get_by_email(email)?.is_some() {
            return Err(TrailError::Duplicate {
                entity_type: "User",
                identifier: email.to_string(),
            });
        }

        let user = User::new(name, email, role);
        self.storage.users.upsert(user.clone())?;
        self.storage.users.save()?;

        info!(user = %user.id, role = %user.role, "added user");
        Ok(user)
    }

    /// Find a user by email or id
    pub fn find(&self, identifier: &str) -> TrailResult<Option<User>> {
        self.storage.users.find(identifier)
    }

    /// Like [`find`](Self::find), but a miss is an error
    pub fn require(&self, identifier: &str) -> TrailResult<User> {
        self.find(identifier)?
            .ok_or_else(|| TrailError::user_not_found(identifier))
    }

    /// List all users, oldest first
    pub fn list(&self) -> TrailResult<Vec<User>> {
        self.storage.users.get_all()
    }

    /// Delete a user, detaching their tasks and audit entries
    pub fn delete(&self, identifier: &str, actor: Actor<'_>) -> TrailResult<User> {
        actor.require_admin("delete users")?;

        let user = self.require(identifier)?;
        self.storage.delete_user(user.id)?;
        self.storage.commit()?;

        info!(user = %user.id, "deleted user");
        Ok(user)
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
