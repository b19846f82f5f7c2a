//! Points infrastructure - storage backends, factory and service

mod factory;
mod in_memory;
#[cfg(feature = "redis")]
mod redis;
mod service;

pub use factory::{PointsStorageFactory, StorageConfig, StorageType};
pub use in_memory::{InMemoryPointsConfig, InMemoryPointsStorage};
#[cfg(feature = "redis")]
pub use self::redis::{RedisPointsConfig, RedisPointsStorage, USERS_LIST_KEY};
pub use service::{GiveOutcome, PointsService};
