use crate::domain::values::score::Score;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Strategy name under which the weighted aggregate of all strategies is stored.
pub const COMBINED_STRATEGY: &str = "combined";

/// A persisted scoring record for one (user, opportunity, strategy) tuple.
///
/// At most one active row exists per tuple; the `combined` pseudo-strategy
/// holds the weighted aggregate served on the read path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub user_id: i64,
    pub opportunity_id: i64,
    pub strategy: String,
    pub score: Score,
    pub explanation: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn new(
        user_id: i64,
        opportunity_id: i64,
        strategy: String,
        score: Score,
        explanation: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            opportunity_id,
            strategy,
            score,
            explanation,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_combined(&self) -> bool {
        self.strategy == COMBINED_STRATEGY
    }
}
