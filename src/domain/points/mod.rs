//! Points domain - per-user counters and the storage contract

mod field;
mod repository;

pub use field::{CounterField, Points, UserScore};
pub use repository::PointsStorage;

#[cfg(test)]
pub use repository::MockPointsStorage;
