//! Redis points storage implementation

use std::fmt;

use async_trait::async_trait;
use futures::future::try_join_all;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, info};

use crate::domain::points::{CounterField, Points, PointsStorage, UserScore};
use crate::domain::DomainError;

/// Key of the set holding every user id ever written
pub const USERS_LIST_KEY: &str = "USERS_LIST";

/// Rejects user ids whose hash key would collide with the known-users set
fn check_user_id(user_id: &str) -> Result<(), DomainError> {
    if user_id == USERS_LIST_KEY {
        return Err(DomainError::validation(format!(
            "User id '{}' is reserved for the known-users set",
            user_id
        )));
    }

    Ok(())
}

/// Configuration for Redis points storage
#[derive(Debug, Clone)]
pub struct RedisPointsConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
}

impl Default for RedisPointsConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
        }
    }
}

impl RedisPointsConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

/// Redis points storage
///
/// Layout:
/// - one hash per user, keyed by user id, with `POINTS_USED` and `POINTS_RECEIVED` fields
/// - one set at `USERS_LIST` with every known user id
///
/// Increments go through `HINCRBY`, so concurrent writers never lose updates.
/// A first write increments the counter before adding the id to the
/// known-users set; an enumerating reader can briefly see a user record that
/// is not listed yet, but never a listed user without a record.
#[derive(Clone)]
pub struct RedisPointsStorage {
    connection: ConnectionManager,
    config: RedisPointsConfig,
}

impl fmt::Debug for RedisPointsStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisPointsStorage")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisPointsStorage {
    /// Connects to Redis; fails if the URL is invalid or the server unreachable
    pub async fn new(config: RedisPointsConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::storage(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to Redis: {}", e)))?;

        info!(prefix = ?config.key_prefix, "Connected points storage to Redis");

        Ok(Self { connection, config })
    }

    /// Connects with default configuration for the given URL
    pub async fn with_url(url: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(RedisPointsConfig::new(url)).await
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    async fn get_counter(&self, user_id: &str, field: CounterField) -> Result<Points, DomainError> {
        check_user_id(user_id)?;
        let mut conn = self.connection.clone();

        let value: Option<Points> = conn
            .hget(self.prefix_key(user_id), field.as_str())
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to read {} of '{}': {}", field, user_id, e))
            })?;

        Ok(value.unwrap_or(0))
    }

    async fn add_counter(
        &self,
        user_id: &str,
        field: CounterField,
        amount: Points,
    ) -> Result<(), DomainError> {
        check_user_id(user_id)?;
        let delta = i64::try_from(amount).map_err(|_| {
            DomainError::validation(format!("Amount {} exceeds the Redis integer range", amount))
        })?;
        let mut conn = self.connection.clone();

        let total: i64 = conn
            .hincr(self.prefix_key(user_id), field.as_str(), delta)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to increment {} of '{}': {}",
                    field, user_id, e
                ))
            })?;

        // SADD is idempotent, so every write re-asserts membership
        let _: usize = conn
            .sadd(self.prefix_key(USERS_LIST_KEY), user_id)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to register user '{}': {}", user_id, e))
            })?;

        debug!(user_id, %field, amount, total, "Incremented counter");
        Ok(())
    }
}

#[async_trait]
impl PointsStorage for RedisPointsStorage {
    async fn user_exists(&self, user_id: &str) -> Result<bool, DomainError> {
        check_user_id(user_id)?;
        let mut conn = self.connection.clone();

        let exists: bool = conn.exists(self.prefix_key(user_id)).await.map_err(|e| {
            DomainError::storage(format!("Failed to check user '{}': {}", user_id, e))
        })?;

        Ok(exists)
    }

    async fn get_points_used(&self, user_id: &str) -> Result<Points, DomainError> {
        self.get_counter(user_id, CounterField::PointsUsed).await
    }

    async fn add_points_used(&self, user_id: &str, amount: Points) -> Result<(), DomainError> {
        self.add_counter(user_id, CounterField::PointsUsed, amount)
            .await
    }

    async fn get_points_received(&self, user_id: &str) -> Result<Points, DomainError> {
        self.get_counter(user_id, CounterField::PointsReceived)
            .await
    }

    async fn add_points_received(
        &self,
        user_id: &str,
        amount: Points,
    ) -> Result<(), DomainError> {
        self.add_counter(user_id, CounterField::PointsReceived, amount)
            .await
    }

    async fn get_all_users_with_scores(&self) -> Result<Vec<UserScore>, DomainError> {
        let mut conn = self.connection.clone();

        let users: Vec<String> = conn
            .smembers(self.prefix_key(USERS_LIST_KEY))
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        try_join_all(users.into_iter().map(|user_id| async move {
            let points = self.get_points_received(&user_id).await?;
            Ok::<_, DomainError>(UserScore::new(user_id, points))
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    // Note: most of these tests require a running Redis instance
    // Run with: cargo test -- --ignored

    async fn connect(prefix: &str) -> RedisPointsStorage {
        let config = RedisPointsConfig::new("redis://127.0.0.1:6379").with_key_prefix(prefix);
        let storage = RedisPointsStorage::new(config).await.unwrap();
        cleanup(&storage).await;
        storage
    }

    async fn cleanup(storage: &RedisPointsStorage) {
        let mut conn = storage.connection.clone();
        let users: Vec<String> = conn
            .smembers(storage.prefix_key(USERS_LIST_KEY))
            .await
            .unwrap();

        for user in users {
            let _: usize = conn.del(storage.prefix_key(&user)).await.unwrap();
        }

        let _: usize = conn.del(storage.prefix_key(USERS_LIST_KEY)).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_url_fails_construction() {
        let result = RedisPointsStorage::with_url("not a redis url").await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }

    #[test]
    fn test_users_list_key_is_not_a_valid_user_id() {
        let result = check_user_id(USERS_LIST_KEY);
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        assert!(check_user_id("alice").is_ok());
        assert!(check_user_id("users_list").is_ok());
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_rejects_reserved_user_id() {
        let storage = connect("test-reserved").await;

        storage.add_points_used("alice", 1).await.unwrap();

        assert!(matches!(
            storage.user_exists(USERS_LIST_KEY).await,
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            storage.add_points_used(USERS_LIST_KEY, 1).await,
            Err(DomainError::Validation { .. })
        ));

        cleanup(&storage).await;
    }

    #[test]
    fn test_config_builder() {
        let config = RedisPointsConfig::new("redis://localhost").with_key_prefix("ledger");

        assert_eq!(config.url, "redis://localhost");
        assert_eq!(config.key_prefix, Some("ledger".to_string()));
        assert_eq!(RedisPointsConfig::default().key_prefix, None);
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_unseen_user_reads_zero() {
        let storage = connect("test-unseen").await;

        assert_eq!(storage.get_points_used("dave").await.unwrap(), 0);
        assert_eq!(storage.get_points_received("dave").await.unwrap(), 0);
        assert!(!storage.user_exists("dave").await.unwrap());
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_add_and_enumerate() {
        let storage = connect("test-enumerate").await;

        storage.add_points_received("alice", 3).await.unwrap();
        storage.add_points_received("alice", 4).await.unwrap();
        storage.add_points_used("bob", 5).await.unwrap();

        assert!(storage.user_exists("alice").await.unwrap());
        assert_eq!(storage.get_points_received("alice").await.unwrap(), 7);
        assert_eq!(storage.get_points_used("bob").await.unwrap(), 5);

        let mut scores = storage.get_all_users_with_scores().await.unwrap();
        scores.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        assert_eq!(
            scores,
            vec![UserScore::new("alice", 7), UserScore::new("bob", 0)]
        );

        cleanup(&storage).await;
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_concurrent_increments() {
        let storage = Arc::new(connect("test-concurrent").await);
        let mut handles = Vec::new();

        for _ in 0..10 {
            let storage = Arc::clone(&storage);
            handles.push(tokio::spawn(async move {
                for _ in 0..20 {
                    storage.add_points_used("hank", 1).await.unwrap();
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(storage.get_points_used("hank").await.unwrap(), 200);
        assert_eq!(storage.get_all_users_with_scores().await.unwrap().len(), 1);

        cleanup(&storage).await;
    }
}
