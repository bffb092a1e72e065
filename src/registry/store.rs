//! User registry implementation
//!
//! Admission control for identities, independent of message routing.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::error::RegistryError;
use super::user::User;

/// Registry of admitted users
///
/// Thread-safe via `RwLock`. Admission and removal take the write lock;
/// lookups share the read lock.
pub struct UserRegistry {
    /// Map of user id to admitted record
    users: RwLock<HashMap<String, User>>,

    /// Once cancelled, new admissions fail fast
    cancel: Option<CancellationToken>,
}

impl UserRegistry {
    /// Create a registry with no cancellation signal
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            cancel: None,
        }
    }

    /// Create a registry that stops admitting users once `token` is cancelled
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            cancel: Some(token),
        }
    }

    /// Admit a user
    ///
    /// Fails with `Cancelled` if the cancellation signal already fired (checked
    /// before validation), `Invalid` if the record is malformed, and `Conflict`
    /// if the id is taken.
    pub async fn add_user(&self, user: User) -> Result<(), RegistryError> {
        if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(RegistryError::Cancelled);
        }

        user.validate()?;

        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(RegistryError::Conflict(user.id));
        }

        tracing::info!(user = %user.id, "User admitted");
        users.insert(user.id.clone(), user);

        Ok(())
    }

    /// Remove an admitted user
    pub async fn remove_user(&self, id: &str) -> Result<(), RegistryError> {
        let mut users = self.users.write().await;

        match users.remove(id) {
            Some(_) => {
                tracing::info!(user = %id, "User removed");
                Ok(())
            }
            None => Err(RegistryError::NotFound(id.to_string())),
        }
    }

    /// Look up an admitted user
    pub async fn get_user(&self, id: &str) -> Result<User, RegistryError> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Check whether a user id is admitted
    pub async fn contains(&self, id: &str) -> bool {
        self.users.read().await.contains_key(id)
    }

    /// Number of admitted users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::registry::ValidationError;

    #[tokio::test]
    async fn test_add_user() {
        let registry = UserRegistry::new();

        registry
            .add_user(User::new("u1", "Ann", "ann@example.com"))
            .await
            .unwrap();
        assert!(registry.contains("u1").await);

        // Same id again, even with different fields
        let result = registry
            .add_user(User::new("u1", "Other", "other@example.com"))
            .await;
        assert_eq!(result, Err(RegistryError::Conflict("u1".into())));

        // Original record untouched
        let user = registry.get_user("u1").await.unwrap();
        assert_eq!(user.name, "Ann");
    }

    #[tokio::test]
    async fn test_add_invalid_user() {
        let registry = UserRegistry::new();

        let result = registry.add_user(User::new("u2", "", "bad")).await;
        assert!(matches!(result, Err(RegistryError::Invalid(_))));

        let result = registry
            .add_user(User::new("u3", "Bob", "bob-at-example.com"))
            .await;
        assert_eq!(
            result,
            Err(RegistryError::Invalid(ValidationError::InvalidEmail))
        );

        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_user() {
        let registry = UserRegistry::new();
        registry
            .add_user(User::new("u1", "Ann", "ann@example.com"))
            .await
            .unwrap();

        registry.remove_user("u1").await.unwrap();
        assert_eq!(
            registry.get_user("u1").await,
            Err(RegistryError::NotFound("u1".into()))
        );

        // Removing again fails
        assert_eq!(
            registry.remove_user("u1").await,
            Err(RegistryError::NotFound("u1".into()))
        );

        // Id is free to be re-admitted with new fields
        registry
            .add_user(User::new("u1", "Annie", "annie@example.com"))
            .await
            .unwrap();
        assert_eq!(registry.get_user("u1").await.unwrap().name, "Annie");
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let registry = UserRegistry::new();
        assert_eq!(
            registry.get_user("ghost").await,
            Err(RegistryError::NotFound("ghost".into()))
        );
    }

    #[tokio::test]
    async fn test_cancelled_registry() {
        let token = CancellationToken::new();
        let registry = UserRegistry::with_cancellation(token.clone());

        registry
            .add_user(User::new("u1", "Ann", "ann@example.com"))
            .await
            .unwrap();

        token.cancel();

        // Cancellation wins over validation
        let result = registry.add_user(User::new("", "", "")).await;
        assert_eq!(result, Err(RegistryError::Cancelled));

        // Reads and removals still work
        assert!(registry.get_user("u1").await.is_ok());
        registry.remove_user("u1").await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_admission_same_id() {
        let registry = Arc::new(UserRegistry::new());

        let mut handles = Vec::new();
        for i in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry
                    .add_user(User::new("dup", format!("N{}", i), "n@example.com"))
                    .await
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 1);
        assert_eq!(registry.len().await, 1);
    }
}
