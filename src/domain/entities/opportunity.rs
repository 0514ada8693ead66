use crate::domain::values::opportunity_status::OpportunityStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A posted opening students can apply to ("vaga").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: OpportunityStatus,
    /// Application deadline, when the poster set one.
    pub deadline: Option<NaiveDate>,
    /// Tagged interest ids, deduplicated.
    pub interest_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}
