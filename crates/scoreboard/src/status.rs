//! Win/lose outcome tags carried by score updates.

use derive_getters::Getters;
use derive_new::new;
use serde::Deserialize;
use strum::{Display, EnumString};

/// Outcome reported for a user in a score update.
///
/// Parsing is case-sensitive: only `"Win"` and `"Lose"` are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum ScoreStatus {
    /// Adds one point.
    Win,
    /// Removes one point.
    Lose,
}

impl ScoreStatus {
    /// Score adjustment applied for this outcome.
    pub fn delta(self) -> i64 {
        match self {
            Self::Win => 1,
            Self::Lose => -1,
        }
    }
}

/// One entry of a score-update batch as received on the wire.
///
/// `status` stays a raw string so an unrecognised value can be reported
/// back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Getters, new)]
pub struct ScoreUpdate {
    name: String,
    status: String,
}
