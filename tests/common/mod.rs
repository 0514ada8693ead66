//! Shared test helpers.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use oportuna::domain::entities::user::User;
use oportuna::domain::ports::strategy::{OpportunitySnapshot, RecommendationContext};
use oportuna::domain::values::opportunity_status::OpportunityStatus;
use oportuna::Oportuna;

pub fn setup() -> Oportuna {
    Oportuna::new(":memory:").unwrap()
}

pub fn seed_student(op: &Oportuna, name: &str, interest_ids: &[i64]) -> i64 {
    op.user_add(
        name,
        &format!("{name}@universidade.br"),
        true,
        true,
        interest_ids,
    )
    .unwrap()
}

pub fn seed_open_opportunity(op: &Oportuna, title: &str, interest_ids: &[i64]) -> i64 {
    op.opportunity_add(
        title,
        "Descrição da vaga",
        OpportunityStatus::EmAndamento,
        None,
        interest_ids,
    )
    .unwrap()
}

/// Build a scoring context directly, bypassing storage, for strategy tests.
pub fn make_context(
    interests: Vec<(i64, &str)>,
    opportunities: Vec<OpportunitySnapshot>,
    applied: Vec<i64>,
) -> RecommendationContext {
    let interest_ids: Vec<i64> = interests.iter().map(|(id, _)| *id).collect();
    RecommendationContext {
        user: User {
            id: 1,
            name: "Aluna".to_string(),
            email: "aluna@universidade.br".to_string(),
            is_student: true,
            email_verified: true,
            interest_ids,
            created_at: Utc::now(),
        },
        interests: interests
            .into_iter()
            .map(|(id, name)| (id, name.to_string()))
            .collect::<HashMap<i64, String>>(),
        open_opportunities: opportunities,
        applied: applied.into_iter().collect::<HashSet<i64>>(),
    }
}

pub fn make_snapshot(id: i64, interest_ids: &[i64], application_count: usize) -> OpportunitySnapshot {
    OpportunitySnapshot {
        id,
        title: format!("Vaga {id}"),
        interest_ids: interest_ids.iter().copied().collect(),
        application_count,
    }
}
