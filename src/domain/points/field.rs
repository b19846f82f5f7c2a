//! Counter fields and score entries

use std::fmt;

use serde::Serialize;

/// Point amounts and counter values
pub type Points = u64;

/// Named counter kept per user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterField {
    /// Points the user has handed out
    PointsUsed,
    /// Points the user has been given
    PointsReceived,
}

impl CounterField {
    /// Field name as persisted in the user record
    pub const fn as_str(&self) -> &'static str {
        match self {
            CounterField::PointsUsed => "POINTS_USED",
            CounterField::PointsReceived => "POINTS_RECEIVED",
        }
    }
}

impl fmt::Display for CounterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One enumerated user and their received-points total
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserScore {
    pub user_id: String,
    pub points_received: Points,
}

impl UserScore {
    pub fn new(user_id: impl Into<String>, points_received: Points) -> Self {
        Self {
            user_id: user_id.into(),
            points_received,
        }
    }
}
