use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A platform user. The recommendation subsystem only reads users; account
/// management lives elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Only students receive recommendations.
    pub is_student: bool,
    /// Batch recompute skips unverified accounts.
    pub email_verified: bool,
    /// Declared interest ids, deduplicated.
    pub interest_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}
