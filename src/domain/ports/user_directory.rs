use crate::domain::entities::user::User;
use crate::domain::error::DomainError;
use std::collections::HashMap;

/// Read-only view of the platform's user accounts.
pub trait UserDirectory: Send + Sync {
    fn get_user(&self, id: i64) -> Result<Option<User>, DomainError>;

    /// Users eligible for batch recompute: students with a verified email.
    fn list_eligible_students(&self) -> Result<Vec<User>, DomainError>;

    /// Names for the given interest ids. Unknown ids are simply absent.
    fn interest_names(&self, ids: &[i64]) -> Result<HashMap<i64, String>, DomainError>;
}
