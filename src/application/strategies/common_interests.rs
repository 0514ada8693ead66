//! Common-interests strategy.
//!
//! Scores an opportunity by the fraction of its tagged interests the user
//! shares. The denominator is the opportunity's tag set, so postings that are
//! mostly about the user's interests outrank postings carrying many unrelated
//! tags. Untagged opportunities have no defined overlap and are skipped.

use crate::domain::error::DomainError;
use crate::domain::ports::strategy::{
    RecommendationContext, RecommendationStrategy, ScoredOpportunity,
};
use crate::domain::values::score::Score;

/// Recommends opportunities sharing declared interests with the user.
pub struct CommonInterestsStrategy;

impl RecommendationStrategy for CommonInterestsStrategy {
    fn name(&self) -> &'static str {
        "common_interests"
    }

    fn description(&self) -> &'static str {
        "Baseado nos seus interesses em comum"
    }

    fn weight(&self) -> f64 {
        0.7
    }

    fn recommend(
        &self,
        ctx: &RecommendationContext,
    ) -> Result<Vec<ScoredOpportunity>, DomainError> {
        let mut recommendations = Vec::new();

        if ctx.interests.is_empty() {
            return Ok(recommendations);
        }

        for opp in &ctx.open_opportunities {
            if ctx.applied.contains(&opp.id) {
                continue;
            }
            if opp.interest_ids.is_empty() {
                continue;
            }

            let mut common: Vec<i64> = ctx
                .interests
                .keys()
                .filter(|id| opp.interest_ids.contains(*id))
                .copied()
                .collect();
            if common.is_empty() {
                continue;
            }
            // Sorted so the explanation reads the same on every recompute.
            common.sort_unstable();

            let score = Score::new(common.len() as f64 / opp.interest_ids.len() as f64)
                .map_err(DomainError::InvalidInput)?;

            let names: Vec<&str> = common
                .iter()
                .filter_map(|id| ctx.interests.get(id).map(|n| n.as_str()))
                .collect();
            let mut explanation = format!(
                "Você tem {} interesse(s) em comum: {}",
                common.len(),
                names.iter().take(3).copied().collect::<Vec<_>>().join(", ")
            );
            if names.len() > 3 {
                explanation.push_str(&format!(" e mais {}", names.len() - 3));
            }

            recommendations.push(ScoredOpportunity {
                opportunity_id: opp.id,
                score,
                explanation,
            });
        }

        Ok(recommendations)
    }
}
