use serde::{Deserialize, Serialize};

/// Immutable reference data: a declarable interest topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interest {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
}
