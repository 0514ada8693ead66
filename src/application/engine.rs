//! Recommendation engine — runs every registered strategy for one user and
//! combines their weighted scores into a ranked list.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::application::strategies::common_interests::CommonInterestsStrategy;
use crate::application::strategies::popularity::PopularityStrategy;
use crate::domain::entities::user::User;
use crate::domain::error::DomainError;
use crate::domain::ports::application_log::ApplicationLog;
use crate::domain::ports::opportunity_directory::OpportunityDirectory;
use crate::domain::ports::strategy::{RecommendationContext, RecommendationStrategy};
use crate::domain::ports::user_directory::UserDirectory;

/// Shown when a stored row references a strategy that is no longer registered.
pub const FALLBACK_DESCRIPTION: &str = "Estratégia personalizada";

/// One strategy's contribution to a combined recommendation.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyContribution {
    pub name: String,
    /// Raw strategy score, before weighting.
    pub score: f64,
    pub weight: f64,
    pub explanation: String,
}

/// Weighted aggregate for one opportunity.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedRecommendation {
    pub opportunity_id: i64,
    pub total_score: f64,
    /// Contributions in strategy registration order.
    pub strategies: Vec<StrategyContribution>,
}

pub struct RecommendationEngine {
    users: Arc<dyn UserDirectory>,
    opportunities: Arc<dyn OpportunityDirectory>,
    applications: Arc<dyn ApplicationLog>,
    strategies: Vec<Box<dyn RecommendationStrategy>>,
}

impl RecommendationEngine {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        opportunities: Arc<dyn OpportunityDirectory>,
        applications: Arc<dyn ApplicationLog>,
    ) -> Self {
        Self::with_strategies(
            users,
            opportunities,
            applications,
            vec![
                Box::new(CommonInterestsStrategy),
                Box::new(PopularityStrategy),
            ],
        )
    }

    /// Construct with an explicit strategy set. Registration order is fixed
    /// and determines explanation ordering, never scores.
    pub fn with_strategies(
        users: Arc<dyn UserDirectory>,
        opportunities: Arc<dyn OpportunityDirectory>,
        applications: Arc<dyn ApplicationLog>,
        strategies: Vec<Box<dyn RecommendationStrategy>>,
    ) -> Self {
        Self {
            users,
            opportunities,
            applications,
            strategies,
        }
    }

    pub fn all_strategies(&self) -> &[Box<dyn RecommendationStrategy>] {
        &self.strategies
    }

    pub fn strategy_by_name(&self, name: &str) -> Option<&dyn RecommendationStrategy> {
        self.strategies
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    pub fn describe(&self, name: &str) -> &'static str {
        self.strategy_by_name(name)
            .map(|s| s.description())
            .unwrap_or(FALLBACK_DESCRIPTION)
    }

    /// Snapshot everything the strategies need for one user, so scoring
    /// itself never touches storage.
    pub fn build_context(&self, user: User) -> Result<RecommendationContext, DomainError> {
        let interests = self.users.interest_names(&user.interest_ids)?;
        let open_opportunities = self.opportunities.list_open()?;
        let applied = self.applications.applied_opportunity_ids(user.id)?;
        Ok(RecommendationContext {
            user,
            interests,
            open_opportunities,
            applied,
        })
    }

    /// Run every strategy and aggregate weighted scores per opportunity.
    ///
    /// A failing strategy is logged and contributes nothing; the others
    /// still run. Results sort by total score descending, with opportunity
    /// id ascending as the tie-break so repeated runs rank identically.
    pub fn combined(
        &self,
        ctx: &RecommendationContext,
        limit: Option<usize>,
    ) -> Vec<CombinedRecommendation> {
        let mut by_opportunity: BTreeMap<i64, CombinedRecommendation> = BTreeMap::new();

        for strategy in &self.strategies {
            let scored = match strategy.recommend(ctx) {
                Ok(scored) => scored,
                Err(e) => {
                    warn!(
                        strategy = strategy.name(),
                        user_id = ctx.user.id,
                        error = %e,
                        "strategy failed, contributing nothing this run"
                    );
                    continue;
                }
            };

            let weight = strategy.weight();
            for entry in scored {
                let combined = by_opportunity
                    .entry(entry.opportunity_id)
                    .or_insert_with(|| CombinedRecommendation {
                        opportunity_id: entry.opportunity_id,
                        total_score: 0.0,
                        strategies: Vec::new(),
                    });
                combined.total_score += entry.score.value() * weight;
                combined.strategies.push(StrategyContribution {
                    name: strategy.name().to_string(),
                    score: entry.score.value(),
                    weight,
                    explanation: entry.explanation,
                });
            }
        }

        let mut ranked: Vec<CombinedRecommendation> = by_opportunity.into_values().collect();
        ranked.sort_by(|a, b| {
            b.total_score
                .partial_cmp(&a.total_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.opportunity_id.cmp(&b.opportunity_id))
        });
        if let Some(max) = limit {
            ranked.truncate(max);
        }
        ranked
    }
}
