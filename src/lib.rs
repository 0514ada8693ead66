pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::engine::RecommendationEngine;
use crate::application::service::{
    BatchOutcome, ExplanationView, RecommendationService, RecommendationView,
    DEFAULT_MAX_AGE_HOURS,
};
use crate::domain::error::DomainError;
use crate::domain::ports::application_log::ApplicationLog;
use crate::domain::ports::opportunity_directory::OpportunityDirectory;
use crate::domain::ports::recommendation_store::{RecommendationStats, RecommendationStore};
use crate::domain::ports::user_directory::UserDirectory;
use crate::domain::values::opportunity_status::OpportunityStatus;
use crate::infrastructure::sqlite::catalog::SqliteCatalog;
use crate::infrastructure::sqlite::migrations::run_migrations;
use crate::infrastructure::sqlite::recommendation_repo::SqliteRecommendationStore;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Explicitly constructed facade wiring catalog, engine, and service. Write
/// operations feed the matching invalidation and recompute events through to
/// the service, so callers never have to remember them.
pub struct Oportuna {
    catalog: Arc<SqliteCatalog>,
    service: Arc<RecommendationService>,
}

impl Oportuna {
    pub fn new(db_path: &str) -> Result<Self, DomainError> {
        let conn1 = Connection::open(db_path)
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn1
            .pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        let conn2 = Connection::open(db_path)
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn2
            .pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;

        // Each connection gets the schema; with a file path the second run
        // is a no-op, with :memory: the connections are distinct databases
        // (the catalog and the store touch disjoint tables).
        run_migrations(&conn1)?;
        run_migrations(&conn2)?;

        let catalog = Arc::new(SqliteCatalog::new(conn1));
        let store: Arc<dyn RecommendationStore> = Arc::new(SqliteRecommendationStore::new(conn2));

        let users: Arc<dyn UserDirectory> = catalog.clone();
        let opportunities: Arc<dyn OpportunityDirectory> = catalog.clone();
        let applications: Arc<dyn ApplicationLog> = catalog.clone();

        let engine = RecommendationEngine::new(users.clone(), opportunities.clone(), applications);
        let service = Arc::new(RecommendationService::new(
            engine,
            store,
            users,
            opportunities,
        ));

        Ok(Self { catalog, service })
    }

    pub fn service(&self) -> Arc<RecommendationService> {
        self.service.clone()
    }

    pub fn catalog(&self) -> Arc<SqliteCatalog> {
        self.catalog.clone()
    }

    // ── catalog writes, with recommendation events wired in ─────────────

    pub fn user_add(
        &self,
        name: &str,
        email: &str,
        is_student: bool,
        email_verified: bool,
        interest_ids: &[i64],
    ) -> Result<i64, DomainError> {
        let id = self.catalog.add_user(name, email, is_student, email_verified)?;
        if !interest_ids.is_empty() {
            self.catalog.set_user_interests(id, interest_ids)?;
        }
        Ok(id)
    }

    pub fn interest_add(&self, name: &str, category: Option<&str>) -> Result<i64, DomainError> {
        self.catalog.add_interest(name, category)
    }

    pub fn opportunity_add(
        &self,
        title: &str,
        description: &str,
        status: OpportunityStatus,
        deadline: Option<NaiveDate>,
        interest_ids: &[i64],
    ) -> Result<i64, DomainError> {
        self.catalog
            .add_opportunity(title, description, status, deadline, interest_ids)
    }

    /// Status change; leaving the open status invalidates every user's
    /// stored rows for the opportunity.
    pub fn opportunity_set_status(
        &self,
        opportunity_id: i64,
        status: OpportunityStatus,
    ) -> Result<(), DomainError> {
        self.catalog.set_opportunity_status(opportunity_id, status)?;
        if !status.is_open() {
            self.service.invalidate_for_opportunity(opportunity_id)?;
        }
        Ok(())
    }

    /// Replace a user's interests; only the common-interests scores can
    /// move, so the targeted recompute path handles it.
    pub fn user_set_interests(&self, user_id: i64, interest_ids: &[i64]) -> Result<(), DomainError> {
        self.catalog.set_user_interests(user_id, interest_ids)?;
        self.service.recompute_strategy(user_id, "common_interests")?;
        Ok(())
    }

    /// Submit an application. The user's exclusion set changed, so their
    /// feed is rebuilt now; everyone else's popularity shift is picked up
    /// by the periodic batch.
    pub fn apply(&self, user_id: i64, opportunity_id: i64) -> Result<(), DomainError> {
        self.catalog.record_application(user_id, opportunity_id)?;
        self.service.recompute_all(user_id)?;
        Ok(())
    }

    pub fn withdraw(&self, user_id: i64, opportunity_id: i64) -> Result<(), DomainError> {
        self.catalog.withdraw_application(user_id, opportunity_id)?;
        self.service.recompute_all(user_id)?;
        Ok(())
    }

    // ── recommendation surface ───────────────────────────────────────────

    pub fn recommendations(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<RecommendationView>, DomainError> {
        self.service.get_recommendations(user_id, limit)
    }

    pub fn explanation(
        &self,
        user_id: i64,
        opportunity_id: i64,
    ) -> Result<Option<ExplanationView>, DomainError> {
        self.service.get_explanation(user_id, opportunity_id)
    }

    pub fn refresh_user(&self, user_id: i64) -> Result<usize, DomainError> {
        self.service.recompute_all(user_id)
    }

    pub fn refresh_strategy(&self, user_id: i64, strategy: &str) -> Result<usize, DomainError> {
        self.service.recompute_strategy(user_id, strategy)
    }

    pub fn refresh_all_users(&self, delay: Duration) -> Result<BatchOutcome, DomainError> {
        let stop = AtomicBool::new(false);
        self.service.recompute_all_users(delay, &stop)
    }

    pub fn invalidate_opportunity(&self, opportunity_id: i64) -> Result<usize, DomainError> {
        self.service.invalidate_for_opportunity(opportunity_id)
    }

    pub fn invalidate_user(&self, user_id: i64) -> Result<usize, DomainError> {
        self.service.invalidate_for_user(user_id)
    }

    pub fn should_refresh(&self, user_id: i64) -> Result<bool, DomainError> {
        self.service.should_refresh(user_id, DEFAULT_MAX_AGE_HOURS)
    }

    pub fn purge(&self, retention_days: i64) -> Result<usize, DomainError> {
        self.service.purge_inactive(retention_days)
    }

    pub fn stats(&self) -> Result<RecommendationStats, DomainError> {
        self.service.stats()
    }
}
