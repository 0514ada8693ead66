//! Orchestration of recompute, serving, and invalidation.
//!
//! The service exclusively owns writes to stored recommendation rows. The
//! read path ([`RecommendationService::get_recommendations`]) never computes
//! anything — it serves whatever the last recompute persisted, filtered
//! against live opportunity state.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::application::engine::RecommendationEngine;
use crate::domain::entities::opportunity::Opportunity;
use crate::domain::entities::recommendation::{Recommendation, COMBINED_STRATEGY};
use crate::domain::error::DomainError;
use crate::domain::ports::opportunity_directory::OpportunityDirectory;
use crate::domain::ports::recommendation_store::{RecommendationStats, RecommendationStore};
use crate::domain::ports::user_directory::UserDirectory;
use crate::domain::values::opportunity_status::OpportunityStatus;
use crate::domain::values::score::Score;

/// How old an active combined row may get before the batch refreshes it.
pub const DEFAULT_MAX_AGE_HOURS: i64 = 48;
/// How long deactivated rows are kept before the purge removes them.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Opportunity fields surfaced alongside a recommendation.
#[derive(Debug, Clone, Serialize)]
pub struct OpportunitySummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: OpportunityStatus,
    pub deadline: Option<NaiveDate>,
}

impl From<&Opportunity> for OpportunitySummary {
    fn from(opp: &Opportunity) -> Self {
        Self {
            id: opp.id,
            title: opp.title.clone(),
            description: opp.description.clone(),
            status: opp.status,
            deadline: opp.deadline,
        }
    }
}

/// One strategy's stored verdict, as served to callers.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyBreakdown {
    pub name: String,
    pub description: String,
    pub score: f64,
    pub explanation: String,
}

/// One entry of a user's ranked feed.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationView {
    pub opportunity_id: i64,
    pub opportunity: OpportunitySummary,
    pub total_score: f64,
    pub strategies: Vec<StrategyBreakdown>,
    pub updated_at: DateTime<Utc>,
}

/// Per-strategy breakdown for one (user, opportunity) pair.
#[derive(Debug, Clone, Serialize)]
pub struct ExplanationView {
    pub user_id: i64,
    pub opportunity_id: i64,
    pub total_score: f64,
    pub strategies: Vec<StrategyBreakdown>,
}

/// Result of a batch recompute over the eligible population.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub eligible: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// True when a stop request ended the batch before all users ran.
    pub interrupted: bool,
}

pub struct RecommendationService {
    engine: RecommendationEngine,
    store: Arc<dyn RecommendationStore>,
    users: Arc<dyn UserDirectory>,
    opportunities: Arc<dyn OpportunityDirectory>,
}

impl RecommendationService {
    pub fn new(
        engine: RecommendationEngine,
        store: Arc<dyn RecommendationStore>,
        users: Arc<dyn UserDirectory>,
        opportunities: Arc<dyn OpportunityDirectory>,
    ) -> Self {
        Self {
            engine,
            store,
            users,
            opportunities,
        }
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Full rebuild of one user's rows: every strategy plus the combined
    /// aggregate, replacing all prior rows in a single transaction. Returns
    /// how many opportunities were stored.
    pub fn recompute_all(&self, user_id: i64) -> Result<usize, DomainError> {
        let user = self
            .users
            .get_user(user_id)?
            .ok_or_else(|| DomainError::NotFound(format!("User not found: {user_id}")))?;
        let ctx = self.engine.build_context(user)?;
        let combined = self.engine.combined(&ctx, None);

        let mut rows = Vec::new();
        for rec in &combined {
            let mut bullets = Vec::with_capacity(rec.strategies.len());
            for part in &rec.strategies {
                rows.push(Recommendation::new(
                    user_id,
                    rec.opportunity_id,
                    part.name.clone(),
                    Score::new(part.score).map_err(DomainError::InvalidInput)?,
                    part.explanation.clone(),
                ));
                bullets.push(format!("• {}", part.explanation));
            }
            rows.push(Recommendation::new(
                user_id,
                rec.opportunity_id,
                COMBINED_STRATEGY.to_string(),
                Score::new(rec.total_score).map_err(DomainError::InvalidInput)?,
                bullets.join("\n"),
            ));
        }

        self.store.replace_for_user(user_id, &rows)?;
        info!(
            user_id,
            opportunities = combined.len(),
            "stored recommendations"
        );
        Ok(combined.len())
    }

    /// Targeted rebuild of one strategy's rows. The combined rows are
    /// recombined from the fresh scores plus the other strategies'
    /// still-active rows, because weights apply across the whole set.
    pub fn recompute_strategy(&self, user_id: i64, strategy_name: &str) -> Result<usize, DomainError> {
        let strategy = self
            .engine
            .strategy_by_name(strategy_name)
            .ok_or_else(|| DomainError::NotFound(format!("Unknown strategy: {strategy_name}")))?;
        let user = self
            .users
            .get_user(user_id)?
            .ok_or_else(|| DomainError::NotFound(format!("User not found: {user_id}")))?;
        let ctx = self.engine.build_context(user)?;
        let fresh = strategy.recommend(&ctx)?;

        // Union of refreshed scores and the untouched strategies' rows,
        // keyed (opportunity, strategy). At most one active row per key.
        let mut by_opportunity: BTreeMap<i64, HashMap<String, (f64, String)>> = BTreeMap::new();
        for row in self.store.active_strategy_rows(user_id)? {
            if row.strategy == strategy_name {
                continue;
            }
            by_opportunity
                .entry(row.opportunity_id)
                .or_default()
                .insert(row.strategy, (row.score.value(), row.explanation));
        }
        for entry in &fresh {
            by_opportunity
                .entry(entry.opportunity_id)
                .or_default()
                .insert(
                    strategy_name.to_string(),
                    (entry.score.value(), entry.explanation.clone()),
                );
        }

        let mut rows = Vec::new();
        for entry in &fresh {
            rows.push(Recommendation::new(
                user_id,
                entry.opportunity_id,
                strategy_name.to_string(),
                entry.score,
                entry.explanation.clone(),
            ));
        }
        let mut stored = 0usize;
        for (opportunity_id, parts) in &by_opportunity {
            let mut total = 0.0;
            let mut bullets = Vec::new();
            // Walk in registration order so explanations keep a stable order.
            // Rows from strategies no longer registered have no weight and
            // are dropped from the aggregate.
            for registered in self.engine.all_strategies() {
                if let Some((raw, explanation)) = parts.get(registered.name()) {
                    total += raw * registered.weight();
                    bullets.push(format!("• {explanation}"));
                }
            }
            if bullets.is_empty() {
                continue;
            }
            rows.push(Recommendation::new(
                user_id,
                *opportunity_id,
                COMBINED_STRATEGY.to_string(),
                Score::new(total).map_err(DomainError::InvalidInput)?,
                bullets.join("\n"),
            ));
            stored += 1;
        }

        self.store
            .replace_strategy_for_user(user_id, strategy_name, &rows)?;
        info!(
            user_id,
            strategy = strategy_name,
            opportunities = stored,
            "stored targeted recompute"
        );
        Ok(stored)
    }

    /// Serve the stored ranking. Never computes; closed or deleted
    /// opportunities still present in the cache are filtered out.
    pub fn get_recommendations(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<RecommendationView>, DomainError> {
        let user = self
            .users
            .get_user(user_id)?
            .ok_or_else(|| DomainError::NotFound(format!("User not found: {user_id}")))?;
        if !user.is_student {
            return Err(DomainError::Forbidden(
                "Apenas estudantes podem receber recomendações".to_string(),
            ));
        }

        let combined = self.store.active_combined(user_id, limit)?;
        let mut result = Vec::new();
        for rec in combined {
            let opp = match self.opportunities.get_opportunity(rec.opportunity_id)? {
                Some(opp) if opp.status.is_open() => opp,
                _ => continue,
            };
            let strategies = self
                .store
                .active_for_pair(user_id, rec.opportunity_id)?
                .into_iter()
                .filter(|row| !row.is_combined())
                .map(|row| {
                    let description = self.engine.describe(&row.strategy).to_string();
                    StrategyBreakdown {
                        description,
                        score: row.score.value(),
                        explanation: row.explanation,
                        name: row.strategy,
                    }
                })
                .collect();
            result.push(RecommendationView {
                opportunity_id: rec.opportunity_id,
                opportunity: OpportunitySummary::from(&opp),
                total_score: rec.score.value(),
                strategies,
                updated_at: rec.updated_at,
            });
        }
        Ok(result)
    }

    /// Breakdown for one pair, `None` when no active combined row exists.
    pub fn get_explanation(
        &self,
        user_id: i64,
        opportunity_id: i64,
    ) -> Result<Option<ExplanationView>, DomainError> {
        let rows = self.store.active_for_pair(user_id, opportunity_id)?;
        let Some(combined) = rows.iter().find(|row| row.is_combined()) else {
            return Ok(None);
        };
        let total_score = combined.score.value();
        let strategies = rows
            .iter()
            .filter(|row| !row.is_combined())
            .map(|row| StrategyBreakdown {
                name: row.strategy.clone(),
                description: self.engine.describe(&row.strategy).to_string(),
                score: row.score.value(),
                explanation: row.explanation.clone(),
            })
            .collect();
        Ok(Some(ExplanationView {
            user_id,
            opportunity_id,
            total_score,
            strategies,
        }))
    }

    /// True when no active combined row younger than `max_age_hours` exists.
    /// Used by the scheduled batch, never on the request path.
    pub fn should_refresh(&self, user_id: i64, max_age_hours: i64) -> Result<bool, DomainError> {
        let cutoff = Utc::now() - chrono::Duration::hours(max_age_hours);
        Ok(!self.store.has_fresh_combined(user_id, cutoff)?)
    }

    /// Recompute only when stale. Returns whether a recompute ran.
    pub fn refresh_if_needed(&self, user_id: i64, max_age_hours: i64) -> Result<bool, DomainError> {
        if self.should_refresh(user_id, max_age_hours)? {
            self.recompute_all(user_id)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Recompute every eligible user (students with a verified email), with
    /// an inter-user delay to bound database load. A stop request takes
    /// effect between users, never mid-user, so no rebuild is cut short.
    pub fn recompute_all_users(
        &self,
        delay: Duration,
        stop: &AtomicBool,
    ) -> Result<BatchOutcome, DomainError> {
        let users = self.users.list_eligible_students()?;
        let mut outcome = BatchOutcome {
            eligible: users.len(),
            succeeded: 0,
            failed: 0,
            interrupted: false,
        };

        for (i, user) in users.iter().enumerate() {
            if stop.load(Ordering::Relaxed) {
                outcome.interrupted = true;
                break;
            }
            match self.recompute_all(user.id) {
                Ok(_) => outcome.succeeded += 1,
                Err(e) => {
                    warn!(user_id = user.id, error = %e, "batch recompute failed for user");
                    outcome.failed += 1;
                }
            }
            if i + 1 < users.len() && !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }
        Ok(outcome)
    }

    /// Deactivate every user's rows for an opportunity (e.g. it closed).
    pub fn invalidate_for_opportunity(&self, opportunity_id: i64) -> Result<usize, DomainError> {
        let count = self.store.deactivate_for_opportunity(opportunity_id)?;
        info!(opportunity_id, count, "invalidated recommendations for opportunity");
        Ok(count)
    }

    /// Deactivate all of a user's rows (e.g. account changes).
    pub fn invalidate_for_user(&self, user_id: i64) -> Result<usize, DomainError> {
        let count = self.store.deactivate_for_user(user_id)?;
        info!(user_id, count, "invalidated recommendations for user");
        Ok(count)
    }

    /// Remove rows deactivated longer than `retention_days` ago.
    pub fn purge_inactive(&self, retention_days: i64) -> Result<usize, DomainError> {
        let cutoff = Utc::now() - chrono::Duration::days(retention_days);
        self.store.purge_inactive(cutoff)
    }

    pub fn stats(&self) -> Result<RecommendationStats, DomainError> {
        self.store.stats()
    }
}
