use crate::domain::entities::recommendation::{Recommendation, COMBINED_STRATEGY};
use crate::domain::error::DomainError;
use crate::domain::ports::recommendation_store::{RecommendationStats, RecommendationStore};
use crate::domain::values::score::Score;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::Mutex;

const SELECT_COLS: &str =
    "user_id, opportunity_id, strategy, score, explanation, active, created_at, updated_at";

pub struct SqliteRecommendationStore {
    conn: Mutex<Connection>,
}

impl SqliteRecommendationStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_recommendation(row: &rusqlite::Row) -> Result<Recommendation, rusqlite::Error> {
        let score_val: f64 = row.get(3)?;
        let active_int: i32 = row.get(5)?;
        let created_str: String = row.get(6)?;
        let updated_str: String = row.get(7)?;

        Ok(Recommendation {
            user_id: row.get(0)?,
            opportunity_id: row.get(1)?,
            strategy: row.get(2)?,
            // The schema CHECK keeps stored scores in range; anything else
            // is a corrupt row and gets dropped by the caller's filter_map.
            score: Score::new(score_val)
                .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(3, score_val as i64))?,
            explanation: row.get(4)?,
            active: active_int != 0,
            created_at: DateTime::parse_from_rfc3339(&created_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            updated_at: DateTime::parse_from_rfc3339(&updated_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }

    fn insert_rows(tx: &rusqlite::Transaction, rows: &[Recommendation]) -> Result<(), DomainError> {
        let mut stmt = tx
            .prepare(
                "INSERT INTO recommendations (user_id, opportunity_id, strategy, score, explanation, active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        for row in rows {
            stmt.execute(params![
                row.user_id,
                row.opportunity_id,
                row.strategy,
                row.score.value(),
                row.explanation,
                row.active as i32,
                row.created_at.to_rfc3339(),
                row.updated_at.to_rfc3339(),
            ])
            .map_err(|e| DomainError::Database(format!("Failed to insert recommendation: {e}")))?;
        }
        Ok(())
    }
}

impl RecommendationStore for SqliteRecommendationStore {
    fn replace_for_user(&self, user_id: i64, rows: &[Recommendation]) -> Result<(), DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        tx.execute(
            "DELETE FROM recommendations WHERE user_id = ?1",
            params![user_id],
        )
        .map_err(|e| DomainError::Database(e.to_string()))?;
        Self::insert_rows(&tx, rows)?;
        tx.commit()
            .map_err(|e| DomainError::Database(format!("Failed to commit rebuild: {e}")))
    }

    fn replace_strategy_for_user(
        &self,
        user_id: i64,
        strategy: &str,
        rows: &[Recommendation],
    ) -> Result<(), DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        tx.execute(
            "DELETE FROM recommendations WHERE user_id = ?1 AND strategy IN (?2, ?3)",
            params![user_id, strategy, COMBINED_STRATEGY],
        )
        .map_err(|e| DomainError::Database(e.to_string()))?;
        Self::insert_rows(&tx, rows)?;
        tx.commit()
            .map_err(|e| DomainError::Database(format!("Failed to commit rebuild: {e}")))
    }

    fn active_combined(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<Recommendation>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM recommendations
             WHERE user_id = ?1 AND strategy = ?2 AND active = 1
             ORDER BY score DESC, opportunity_id ASC LIMIT ?3"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(
                params![user_id, COMBINED_STRATEGY, limit as i64],
                Self::row_to_recommendation,
            )
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    fn active_for_pair(
        &self,
        user_id: i64,
        opportunity_id: i64,
    ) -> Result<Vec<Recommendation>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM recommendations
             WHERE user_id = ?1 AND opportunity_id = ?2 AND active = 1
             ORDER BY strategy"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![user_id, opportunity_id], Self::row_to_recommendation)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    fn active_strategy_rows(&self, user_id: i64) -> Result<Vec<Recommendation>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM recommendations
             WHERE user_id = ?1 AND active = 1 AND strategy != ?2
             ORDER BY opportunity_id, strategy"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![user_id, COMBINED_STRATEGY], Self::row_to_recommendation)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    fn deactivate_for_opportunity(&self, opportunity_id: i64) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let count = conn
            .execute(
                "UPDATE recommendations SET active = 0, updated_at = ?1
                 WHERE opportunity_id = ?2 AND active = 1",
                params![Utc::now().to_rfc3339(), opportunity_id],
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(count)
    }

    fn deactivate_for_user(&self, user_id: i64) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let count = conn
            .execute(
                "UPDATE recommendations SET active = 0, updated_at = ?1
                 WHERE user_id = ?2 AND active = 1",
                params![Utc::now().to_rfc3339(), user_id],
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(count)
    }

    fn has_fresh_combined(
        &self,
        user_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT 1 FROM recommendations
                 WHERE user_id = ?1 AND strategy = ?2 AND active = 1 AND updated_at >= ?3
                 LIMIT 1",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(
                params![user_id, COMBINED_STRATEGY, cutoff.to_rfc3339()],
                |_| Ok(()),
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().is_some())
    }

    fn purge_inactive(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let count = conn
            .execute(
                "DELETE FROM recommendations WHERE active = 0 AND updated_at < ?1",
                params![cutoff.to_rfc3339()],
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(count)
    }

    fn stats(&self) -> Result<RecommendationStats, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let total: usize = conn
            .query_row(
                "SELECT COUNT(*) FROM recommendations WHERE active = 1 AND strategy = ?1",
                params![COMBINED_STRATEGY],
                |r| r.get(0),
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let users: usize = conn
            .query_row(
                "SELECT COUNT(DISTINCT user_id) FROM recommendations WHERE active = 1 AND strategy = ?1",
                params![COMBINED_STRATEGY],
                |r| r.get(0),
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let average = if users > 0 {
            (total as f64 / users as f64 * 100.0).round() / 100.0
        } else {
            0.0
        };
        Ok(RecommendationStats {
            total_active_recommendations: total,
            users_with_recommendations: users,
            average_recommendations_per_user: average,
        })
    }
}
