//! Domain layer - Core entities and contracts

pub mod error;
pub mod points;

pub use error::DomainError;
pub use points::{CounterField, Points, PointsStorage, UserScore};
