use crate::domain::error::DomainError;
use std::collections::HashSet;

/// Read-only view of submitted applications, used for exclusion filtering.
pub trait ApplicationLog: Send + Sync {
    /// Ids of opportunities the user has applied to.
    fn applied_opportunity_ids(&self, user_id: i64) -> Result<HashSet<i64>, DomainError>;

    fn has_applied(&self, user_id: i64, opportunity_id: i64) -> Result<bool, DomainError>;
}
