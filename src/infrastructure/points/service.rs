//! Points service - allowance checks and leaderboards over any storage backend

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::points::{Points, PointsStorage, UserScore};
use crate::domain::DomainError;

/// Result of a give request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiveOutcome {
    /// Points moved from giver allowance to receiver total
    Given { amount: Points },
    /// Giver has fewer points left than requested; nothing was written
    Insufficient { remaining: Points },
}

/// Caller-side accounting on top of a `PointsStorage`
///
/// Every giver has a fixed allowance. Points used are never reset by the
/// ledger, so the allowance caps the lifetime total unless an external job
/// resets the store.
#[derive(Debug, Clone)]
pub struct PointsService {
    storage: Arc<dyn PointsStorage>,
    allowance: Points,
}

impl PointsService {
    pub fn new(storage: Arc<dyn PointsStorage>, allowance: Points) -> Self {
        Self { storage, allowance }
    }

    pub fn allowance(&self) -> Points {
        self.allowance
    }

    pub fn storage(&self) -> &Arc<dyn PointsStorage> {
        &self.storage
    }

    /// Points the user may still give
    pub async fn points_remaining(&self, user_id: &str) -> Result<Points, DomainError> {
        validate_user_id(user_id)?;
        let used = self.storage.get_points_used(user_id).await?;
        Ok(self.allowance.saturating_sub(used))
    }

    /// Total points the user has been given
    pub async fn points_received(&self, user_id: &str) -> Result<Points, DomainError> {
        validate_user_id(user_id)?;
        self.storage.get_points_received(user_id).await
    }

    /// Gives `amount` points from `giver` to `receiver` if the giver has enough left
    pub async fn give(
        &self,
        giver: &str,
        receiver: &str,
        amount: Points,
    ) -> Result<GiveOutcome, DomainError> {
        validate_user_id(giver)?;
        validate_user_id(receiver)?;

        if amount == 0 {
            return Err(DomainError::validation("Amount must be greater than zero"));
        }

        let remaining = self.points_remaining(giver).await?;

        if remaining < amount {
            warn!(giver, receiver, amount, remaining, "Give refused, not enough points");
            return Ok(GiveOutcome::Insufficient { remaining });
        }

        self.storage.add_points_received(receiver, amount).await?;
        self.storage.add_points_used(giver, amount).await?;

        debug!(giver, receiver, amount, "Points given");
        Ok(GiveOutcome::Given { amount })
    }

    /// Gives everything the giver has left
    pub async fn give_remaining(
        &self,
        giver: &str,
        receiver: &str,
    ) -> Result<GiveOutcome, DomainError> {
        let remaining = self.points_remaining(giver).await?;

        if remaining == 0 {
            return Ok(GiveOutcome::Insufficient { remaining });
        }

        self.give(giver, receiver, remaining).await
    }

    /// Users ranked by received points, highest first, ties by user id
    pub async fn leaderboard(&self, limit: Option<usize>) -> Result<Vec<UserScore>, DomainError> {
        let mut scores = self.storage.get_all_users_with_scores().await?;

        scores.sort_by(|a, b| {
            b.points_received
                .cmp(&a.points_received)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        if let Some(limit) = limit {
            scores.truncate(limit);
        }

        Ok(scores)
    }
}

fn validate_user_id(user_id: &str) -> Result<(), DomainError> {
    if user_id.trim().is_empty() {
        return Err(DomainError::validation("User id cannot be empty"));
    }

    Ok(())
}
