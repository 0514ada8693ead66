//! Strategy port for per-user opportunity scoring.
//!
//! Defines the [`RecommendationStrategy`] trait and supporting types. Each
//! strategy is a named, independently-weighted scorer producing relevance
//! scores for one user across the open opportunities.
//!
//! # Overview
//!
//! The strategy system is designed for extensibility:
//!
//! - Implement [`RecommendationStrategy`] to add new scoring algorithms
//! - Use [`RecommendationContext`] to access the snapshot under scoring
//! - Return [`ScoredOpportunity`] values; the engine applies weights and ranks

use std::collections::{HashMap, HashSet};

use crate::domain::entities::user::User;
use crate::domain::error::DomainError;
use crate::domain::values::score::Score;

/// One strategy's verdict on one opportunity.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScoredOpportunity {
    pub opportunity_id: i64,
    /// Raw strategy score, before weighting.
    pub score: Score,
    /// Human-readable justification shown to the student.
    pub explanation: String,
}

/// Snapshot of everything an opportunity exposes to scoring.
#[derive(Debug, Clone)]
pub struct OpportunitySnapshot {
    pub id: i64,
    pub title: String,
    /// Tagged interest ids.
    pub interest_ids: HashSet<i64>,
    /// Derived count of submitted applications.
    pub application_count: usize,
}

/// Context provided to strategies during a recompute.
///
/// Prefetched from storage so strategies stay pure functions of
/// `(snapshot, user)` and never touch the database themselves.
pub struct RecommendationContext {
    /// The user being scored for.
    pub user: User,
    /// The user's interest ids, with names for explanations.
    pub interests: HashMap<i64, String>,
    /// Every opportunity currently in the open status.
    pub open_opportunities: Vec<OpportunitySnapshot>,
    /// Ids of opportunities this user already applied to.
    pub applied: HashSet<i64>,
}

/// Trait for recommendation scoring strategies.
///
/// Implement this to add new algorithms; the engine picks up registered
/// strategies without modification. A strategy must skip opportunities the
/// user already applied to, and returns no entry at all (not a zero-score
/// entry) for opportunities it has no signal on.
pub trait RecommendationStrategy: Send + Sync {
    /// Stable identifier, used as the storage key and as the unit of
    /// targeted recompute.
    fn name(&self) -> &'static str;

    /// End-user description of what this strategy ranks by.
    fn description(&self) -> &'static str;

    /// Fixed contribution factor applied during combination.
    fn weight(&self) -> f64;

    /// Score the open opportunities for the context's user.
    fn recommend(&self, ctx: &RecommendationContext) -> Result<Vec<ScoredOpportunity>, DomainError>;
}
