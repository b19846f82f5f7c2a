//! In-memory points storage implementation

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::points::{CounterField, Points, PointsStorage, UserScore};
use crate::domain::DomainError;

/// Configuration for in-memory points storage
#[derive(Debug, Clone, Default)]
pub struct InMemoryPointsConfig {
    /// Report 0 for users that never received points when enumerating,
    /// instead of failing with `NotFound`
    pub zero_fill_scores: bool,
}

impl InMemoryPointsConfig {
    /// Sets whether enumeration fills missing received counters with 0
    pub fn with_zero_fill_scores(mut self, zero_fill: bool) -> Self {
        self.zero_fill_scores = zero_fill;
        self
    }
}

type UserRecord = HashMap<CounterField, Points>;

/// In-memory points storage
///
/// Each instance is an independent store; data is lost when it is dropped.
/// The map of users doubles as the known-users set.
#[derive(Debug, Default)]
pub struct InMemoryPointsStorage {
    users: RwLock<HashMap<String, UserRecord>>,
    config: InMemoryPointsConfig,
}

impl InMemoryPointsStorage {
    /// Creates a new empty storage with default configuration
    pub fn new() -> Self {
        Self::with_config(InMemoryPointsConfig::default())
    }

    /// Creates a new empty storage with the given configuration
    pub fn with_config(config: InMemoryPointsConfig) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            config,
        }
    }

    fn get_counter(&self, user_id: &str, field: CounterField) -> Result<Points, DomainError> {
        let users = self
            .users
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(users
            .get(user_id)
            .and_then(|record| record.get(&field))
            .copied()
            .unwrap_or(0))
    }

    fn add_counter(
        &self,
        user_id: &str,
        field: CounterField,
        amount: Points,
    ) -> Result<(), DomainError> {
        let mut users = self
            .users
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        let counter = users
            .entry(user_id.to_string())
            .or_default()
            .entry(field)
            .or_insert(0);

        *counter = counter.checked_add(amount).ok_or_else(|| {
            DomainError::validation(format!(
                "Adding {} to {} of '{}' overflows",
                amount, field, user_id
            ))
        })?;

        Ok(())
    }
}

#[async_trait]
impl PointsStorage for InMemoryPointsStorage {
    async fn user_exists(&self, user_id: &str) -> Result<bool, DomainError> {
        let users = self
            .users
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(users.contains_key(user_id))
    }

    async fn get_points_used(&self, user_id: &str) -> Result<Points, DomainError> {
        self.get_counter(user_id, CounterField::PointsUsed)
    }

    async fn add_points_used(&self, user_id: &str, amount: Points) -> Result<(), DomainError> {
        self.add_counter(user_id, CounterField::PointsUsed, amount)
    }

    async fn get_points_received(&self, user_id: &str) -> Result<Points, DomainError> {
        self.get_counter(user_id, CounterField::PointsReceived)
    }

    async fn add_points_received(
        &self,
        user_id: &str,
        amount: Points,
    ) -> Result<(), DomainError> {
        self.add_counter(user_id, CounterField::PointsReceived, amount)
    }

    async fn get_all_users_with_scores(&self) -> Result<Vec<UserScore>, DomainError> {
        let users = self
            .users
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        users
            .iter()
            .map(|(user_id, record)| {
                match record.get(&CounterField::PointsReceived) {
                    Some(points) => Ok(UserScore::new(user_id.clone(), *points)),
                    None if self.config.zero_fill_scores => Ok(UserScore::new(user_id.clone(), 0)),
                    None => Err(DomainError::not_found(format!(
                        "User '{}' has no {} counter",
                        user_id,
                        CounterField::PointsReceived
                    ))),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_fresh_user_does_not_exist() {
        let storage = InMemoryPointsStorage::new();

        assert!(!storage.user_exists("nobody").await.unwrap());
        assert!(storage.get_all_users_with_scores().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unseen_user_reads_zero() {
        let storage = InMemoryPointsStorage::new();

        assert_eq!(storage.get_points_used("dave").await.unwrap(), 0);
        assert_eq!(storage.get_points_received("dave").await.unwrap(), 0);
        assert!(!storage.user_exists("dave").await.unwrap());
    }

    #[tokio::test]
    async fn test_received_points_are_enumerated() {
        let storage = InMemoryPointsStorage::new();

        storage.add_points_received("alice", 10).await.unwrap();

        assert_eq!(storage.get_points_received("alice").await.unwrap(), 10);
        assert_eq!(
            storage.get_all_users_with_scores().await.unwrap(),
            vec![UserScore::new("alice", 10)]
        );
    }

    #[tokio::test]
    async fn test_used_points_accumulate() {
        let storage = InMemoryPointsStorage::new();

        storage.add_points_used("bob", 5).await.unwrap();
        storage.add_points_used("bob", 3).await.unwrap();

        assert_eq!(storage.get_points_used("bob").await.unwrap(), 8);
        assert!(storage.user_exists("bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_known_user_missing_field_reads_zero() {
        let storage = InMemoryPointsStorage::new();

        storage.add_points_used("bob", 5).await.unwrap();

        assert_eq!(storage.get_points_received("bob").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_enumerating_user_without_received_counter_fails() {
        let storage = InMemoryPointsStorage::new();

        storage.add_points_used("carol", 2).await.unwrap();

        let err = storage.get_all_users_with_scores().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_zero_fill_scores_reports_missing_counter_as_zero() {
        let storage = InMemoryPointsStorage::with_config(
            InMemoryPointsConfig::default().with_zero_fill_scores(true),
        );

        storage.add_points_used("carol", 2).await.unwrap();
        storage.add_points_received("alice", 4).await.unwrap();

        let mut scores = storage.get_all_users_with_scores().await.unwrap();
        scores.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        assert_eq!(
            scores,
            vec![UserScore::new("alice", 4), UserScore::new("carol", 0)]
        );
    }

    #[tokio::test]
    async fn test_repeated_writes_enumerate_user_once() {
        let storage = InMemoryPointsStorage::new();

        storage.add_points_received("erin", 1).await.unwrap();
        storage.add_points_received("erin", 1).await.unwrap();
        storage.add_points_used("erin", 1).await.unwrap();

        let scores = storage.get_all_users_with_scores().await.unwrap();
        assert_eq!(scores, vec![UserScore::new("erin", 2)]);
    }

    #[tokio::test]
    async fn test_addition_order_does_not_matter() {
        let forward = InMemoryPointsStorage::new();
        forward.add_points_received("frank", 3).await.unwrap();
        forward.add_points_received("frank", 4).await.unwrap();

        let reverse = InMemoryPointsStorage::new();
        reverse.add_points_received("frank", 4).await.unwrap();
        reverse.add_points_received("frank", 3).await.unwrap();

        let single = InMemoryPointsStorage::new();
        single.add_points_received("frank", 7).await.unwrap();

        assert_eq!(forward.get_points_received("frank").await.unwrap(), 7);
        assert_eq!(reverse.get_points_received("frank").await.unwrap(), 7);
        assert_eq!(single.get_points_received("frank").await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_instances_are_independent() {
        let first = InMemoryPointsStorage::new();
        let second = InMemoryPointsStorage::new();

        first.add_points_received("alice", 10).await.unwrap();

        assert!(first.user_exists("alice").await.unwrap());
        assert!(!second.user_exists("alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_overflow_is_rejected() {
        let storage = InMemoryPointsStorage::new();

        storage.add_points_used("gina", Points::MAX).await.unwrap();
        let result = storage.add_points_used("gina", 1).await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert_eq!(storage.get_points_used("gina").await.unwrap(), Points::MAX);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let storage = Arc::new(InMemoryPointsStorage::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let storage = Arc::clone(&storage);
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    storage.add_points_used("hank", 1).await.unwrap();
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(storage.get_points_used("hank").await.unwrap(), 400);
    }
}
