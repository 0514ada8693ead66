use crate::domain::entities::opportunity::Opportunity;
use crate::domain::error::DomainError;
use crate::domain::ports::strategy::OpportunitySnapshot;

/// Read-only view of the platform's opportunity postings.
pub trait OpportunityDirectory: Send + Sync {
    fn get_opportunity(&self, id: i64) -> Result<Option<Opportunity>, DomainError>;

    /// Every open opportunity with its tag set and application count.
    fn list_open(&self) -> Result<Vec<OpportunitySnapshot>, DomainError>;
}
