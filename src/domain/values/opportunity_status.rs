use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a posted opportunity. Only [`OpportunityStatus::EmAndamento`]
/// (open) opportunities are eligible for recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStatus {
    Aguardando,
    EmAnalise,
    Finalizada,
    Encerrada,
    EmAndamento,
}

impl OpportunityStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, OpportunityStatus::EmAndamento)
    }
}

impl fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpportunityStatus::Aguardando => write!(f, "aguardando"),
            OpportunityStatus::EmAnalise => write!(f, "em_analise"),
            OpportunityStatus::Finalizada => write!(f, "finalizada"),
            OpportunityStatus::Encerrada => write!(f, "encerrada"),
            OpportunityStatus::EmAndamento => write!(f, "em_andamento"),
        }
    }
}

impl FromStr for OpportunityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aguardando" => Ok(OpportunityStatus::Aguardando),
            "em_analise" => Ok(OpportunityStatus::EmAnalise),
            "finalizada" => Ok(OpportunityStatus::Finalizada),
            "encerrada" => Ok(OpportunityStatus::Encerrada),
            "em_andamento" => Ok(OpportunityStatus::EmAndamento),
            _ => Err(format!("Unknown opportunity status: {s}")),
        }
    }
}
