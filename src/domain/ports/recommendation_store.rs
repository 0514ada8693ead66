use crate::domain::entities::recommendation::Recommendation;
use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};

/// Recommendation system statistics, computed over active combined rows.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RecommendationStats {
    pub total_active_recommendations: usize,
    pub users_with_recommendations: usize,
    pub average_recommendations_per_user: f64,
}

/// Persistence of per-strategy and combined scores.
///
/// Rows move absent → active → inactive → purged. Both replace methods are
/// atomic: on failure mid-batch the whole write rolls back and prior active
/// rows stay intact. Readers relying on this need the database to prevent
/// dirty reads (SQLite's serialized default is more than enough).
pub trait RecommendationStore: Send + Sync {
    /// Full rebuild: delete every row for the user, then insert `rows`.
    fn replace_for_user(&self, user_id: i64, rows: &[Recommendation]) -> Result<(), DomainError>;

    /// Targeted rebuild: delete the named strategy's rows plus the combined
    /// rows for the user, then insert `rows`. Other strategies' rows are
    /// left untouched.
    fn replace_strategy_for_user(
        &self,
        user_id: i64,
        strategy: &str,
        rows: &[Recommendation],
    ) -> Result<(), DomainError>;

    /// Active combined rows for the user, best score first.
    fn active_combined(&self, user_id: i64, limit: usize)
        -> Result<Vec<Recommendation>, DomainError>;

    /// Every active row for one (user, opportunity) pair, combined included.
    fn active_for_pair(
        &self,
        user_id: i64,
        opportunity_id: i64,
    ) -> Result<Vec<Recommendation>, DomainError>;

    /// Every active non-combined row for the user, used for recombination
    /// during a targeted recompute.
    fn active_strategy_rows(&self, user_id: i64) -> Result<Vec<Recommendation>, DomainError>;

    /// Deactivate every user's rows for the opportunity. Returns the number
    /// of rows flipped.
    fn deactivate_for_opportunity(&self, opportunity_id: i64) -> Result<usize, DomainError>;

    /// Deactivate all of a user's rows. Returns the number of rows flipped.
    fn deactivate_for_user(&self, user_id: i64) -> Result<usize, DomainError>;

    /// Whether an active combined row updated at or after `cutoff` exists.
    fn has_fresh_combined(&self, user_id: i64, cutoff: DateTime<Utc>)
        -> Result<bool, DomainError>;

    /// Delete inactive rows last updated before `cutoff`. Returns the number
    /// of rows removed.
    fn purge_inactive(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;

    fn stats(&self) -> Result<RecommendationStats, DomainError>;
}
