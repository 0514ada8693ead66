//! Popularity strategy.
//!
//! Scores each open opportunity by its application count relative to the
//! most-applied open opportunity. Zero-count opportunities carry no signal
//! and are excluded, so when no applications exist at all the strategy
//! yields nothing.

use crate::domain::error::DomainError;
use crate::domain::ports::strategy::{
    RecommendationContext, RecommendationStrategy, ScoredOpportunity,
};
use crate::domain::values::score::Score;

/// Recommends the opportunities other students are applying to.
pub struct PopularityStrategy;

impl RecommendationStrategy for PopularityStrategy {
    fn name(&self) -> &'static str {
        "popular"
    }

    fn description(&self) -> &'static str {
        "Baseado na popularidade entre outros estudantes"
    }

    fn weight(&self) -> f64 {
        0.3
    }

    fn recommend(
        &self,
        ctx: &RecommendationContext,
    ) -> Result<Vec<ScoredOpportunity>, DomainError> {
        let mut recommendations = Vec::new();

        let max = ctx
            .open_opportunities
            .iter()
            .map(|o| o.application_count)
            .max()
            .unwrap_or(0);
        if max == 0 {
            return Ok(recommendations);
        }

        for opp in &ctx.open_opportunities {
            if ctx.applied.contains(&opp.id) {
                continue;
            }
            if opp.application_count == 0 {
                continue;
            }

            let score = Score::new(opp.application_count as f64 / max as f64)
                .map_err(DomainError::InvalidInput)?;

            recommendations.push(ScoredOpportunity {
                opportunity_id: opp.id,
                score,
                explanation: format!(
                    "Esta oportunidade já atraiu {} candidato(s)",
                    opp.application_count
                ),
            });
        }

        Ok(recommendations)
    }
}
