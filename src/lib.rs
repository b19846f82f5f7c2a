//! Points Ledger
//!
//! Per-user accounting for a points-based incentive scheme:
//! - Points used and points received counters per user
//! - Enumeration of every known user with their received total
//! - Interchangeable storage backends (in-memory, Redis)
//!
//! Callers hold an `Arc<dyn PointsStorage>` and never depend on which backend
//! is active. Backends are built by `PointsStorageFactory` from a
//! `StorageConfig`, usually read from the environment.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{DomainError, Points, PointsStorage, UserScore};
pub use infrastructure::points::{
    GiveOutcome, InMemoryPointsStorage, PointsService, PointsStorageFactory, StorageConfig,
    StorageType,
};
#[cfg(feature = "redis")]
pub use infrastructure::points::RedisPointsStorage;
