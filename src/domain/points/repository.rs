//! Points storage trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use super::{Points, UserScore};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Backend-agnostic ledger of per-user point counters
///
/// Counters only grow through this trait: there is no set or decrement.
/// A user record is created implicitly by the first `add_*` call and is
/// never removed.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PointsStorage: Send + Sync + Debug {
    /// Returns true if the user has any recorded entry
    async fn user_exists(&self, user_id: &str) -> Result<bool, DomainError>;

    /// Returns the accumulated used-points total, 0 if never recorded
    async fn get_points_used(&self, user_id: &str) -> Result<Points, DomainError>;

    /// Atomically adds `amount` to the used-points counter
    async fn add_points_used(&self, user_id: &str, amount: Points) -> Result<(), DomainError>;

    /// Returns the accumulated received-points total, 0 if never recorded
    async fn get_points_received(&self, user_id: &str) -> Result<Points, DomainError>;

    /// Atomically adds `amount` to the received-points counter
    async fn add_points_received(&self, user_id: &str, amount: Points)
        -> Result<(), DomainError>;

    /// Lists every known user with their received-points total, in no particular order
    async fn get_all_users_with_scores(&self) -> Result<Vec<UserScore>, DomainError>;
}
