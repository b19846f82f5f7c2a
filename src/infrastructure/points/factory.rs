//! Points storage factory for runtime selection

use std::sync::Arc;

use crate::domain::points::PointsStorage;
use crate::domain::DomainError;

use super::in_memory::{InMemoryPointsConfig, InMemoryPointsStorage};
#[cfg(feature = "redis")]
use super::redis::{RedisPointsConfig, RedisPointsStorage};

/// Supported storage backends
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StorageType {
    /// Process-local map, lost on exit
    #[default]
    InMemory,
    /// Redis server
    Redis,
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageType::InMemory => write!(f, "inmemory"),
            StorageType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inmemory" | "in_memory" | "memory" => Ok(StorageType::InMemory),
            "redis" => Ok(StorageType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown storage type: {}. Valid types: inmemory, redis",
                s
            ))),
        }
    }
}

/// Configuration for the storage factory
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Backend to create
    pub storage_type: StorageType,
    /// Redis URL (required for Redis type)
    pub redis_url: Option<String>,
    /// Key prefix for namespacing (Redis only)
    pub key_prefix: Option<String>,
    /// Enumerate users without received points as 0 (in-memory only).
    /// On by default so both backends list givers with a score of 0.
    pub zero_fill_scores: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::InMemory,
            redis_url: None,
            key_prefix: None,
            zero_fill_scores: true,
        }
    }
}

impl StorageConfig {
    /// Creates a new configuration for in-memory storage
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates a new configuration for Redis storage
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            storage_type: StorageType::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets zero-filling of missing scores (in-memory only)
    pub fn with_zero_fill_scores(mut self, zero_fill: bool) -> Self {
        self.zero_fill_scores = zero_fill;
        self
    }

    /// Creates config from environment variables
    pub fn from_env() -> Result<Self, DomainError> {
        let storage_type = std::env::var("STORAGE_TYPE")
            .unwrap_or_else(|_| "inmemory".to_string())
            .parse()?;

        let redis_url = std::env::var("REDIS_URL").ok();
        let key_prefix = std::env::var("LEDGER_KEY_PREFIX").ok();

        let zero_fill_scores =
            parse_zero_fill(std::env::var("LEDGER_ZERO_FILL_SCORES").ok().as_deref())?;

        Ok(Self {
            storage_type,
            redis_url,
            key_prefix,
            zero_fill_scores,
        })
    }
}

fn parse_zero_fill(value: Option<&str>) -> Result<bool, DomainError> {
    match value {
        None => Ok(true),
        Some(v) => v.trim().to_lowercase().parse().map_err(|_| {
            DomainError::configuration(format!(
                "Invalid LEDGER_ZERO_FILL_SCORES: {}. Valid values: true, false",
                v
            ))
        }),
    }
}

/// Factory for creating points storage instances
#[derive(Debug, Default)]
pub struct PointsStorageFactory;

impl PointsStorageFactory {
    /// Creates a new storage factory
    pub fn new() -> Self {
        Self
    }

    /// Creates a storage instance based on configuration
    pub async fn create(
        &self,
        config: &StorageConfig,
    ) -> Result<Arc<dyn PointsStorage>, DomainError> {
        match config.storage_type {
            StorageType::InMemory => {
                let in_memory_config =
                    InMemoryPointsConfig::default().with_zero_fill_scores(config.zero_fill_scores);

                Ok(Arc::new(InMemoryPointsStorage::with_config(in_memory_config)))
            }
            StorageType::Redis => self.create_redis(config).await,
        }
    }

    /// Creates an in-memory storage with the factory defaults
    pub fn create_in_memory(&self) -> Arc<dyn PointsStorage> {
        let config = InMemoryPointsConfig::default()
            .with_zero_fill_scores(StorageConfig::default().zero_fill_scores);

        Arc::new(InMemoryPointsStorage::with_config(config))
    }

    #[cfg(feature = "redis")]
    async fn create_redis(
        &self,
        config: &StorageConfig,
    ) -> Result<Arc<dyn PointsStorage>, DomainError> {
        let url = config.redis_url.clone().ok_or_else(|| {
            DomainError::configuration("Redis URL is required for Redis storage type")
        })?;

        let mut redis_config = RedisPointsConfig::new(url);

        if let Some(prefix) = &config.key_prefix {
            redis_config = redis_config.with_key_prefix(prefix.clone());
        }

        let storage = RedisPointsStorage::new(redis_config).await?;
        Ok(Arc::new(storage))
    }

    #[cfg(not(feature = "redis"))]
    async fn create_redis(
        &self,
        _config: &StorageConfig,
    ) -> Result<Arc<dyn PointsStorage>, DomainError> {
        Err(DomainError::configuration(
            "Redis storage requested but this build was compiled without the `redis` feature",
        ))
    }
}
