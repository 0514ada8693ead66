//! SQLite adapter for the platform catalog: users, interests, opportunities,
//! and applications. Implements the read ports the engine consumes, plus the
//! write operations the CLI front end needs.

use crate::domain::entities::interest::Interest;
use crate::domain::entities::opportunity::Opportunity;
use crate::domain::entities::user::User;
use crate::domain::error::DomainError;
use crate::domain::ports::application_log::ApplicationLog;
use crate::domain::ports::opportunity_directory::OpportunityDirectory;
use crate::domain::ports::strategy::OpportunitySnapshot;
use crate::domain::ports::user_directory::UserDirectory;
use crate::domain::values::opportunity_status::OpportunityStatus;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, DomainError> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    fn parse_timestamp(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn user_interest_ids(conn: &Connection, user_id: i64) -> Result<Vec<i64>, DomainError> {
        let mut stmt = conn
            .prepare("SELECT interest_id FROM user_interests WHERE user_id = ?1 ORDER BY interest_id")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(ids)
    }

    fn opportunity_interest_ids(
        conn: &Connection,
        opportunity_id: i64,
    ) -> Result<Vec<i64>, DomainError> {
        let mut stmt = conn
            .prepare(
                "SELECT interest_id FROM opportunity_interests WHERE opportunity_id = ?1 ORDER BY interest_id",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let ids = stmt
            .query_map(params![opportunity_id], |row| row.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(ids)
    }

    // ── writes, used by the CLI front end ────────────────────────────────

    pub fn add_user(
        &self,
        name: &str,
        email: &str,
        is_student: bool,
        email_verified: bool,
    ) -> Result<i64, DomainError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (name, email, is_student, email_verified, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                name,
                email,
                is_student as i32,
                email_verified as i32,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to add user: {e}")))?;
        Ok(conn.last_insert_rowid())
    }

    pub fn add_interest(&self, name: &str, category: Option<&str>) -> Result<i64, DomainError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO interests (name, category) VALUES (?1, ?2)",
            params![name, category],
        )
        .map_err(|e| DomainError::Database(format!("Failed to add interest: {e}")))?;
        Ok(conn.last_insert_rowid())
    }

    pub fn add_opportunity(
        &self,
        title: &str,
        description: &str,
        status: OpportunityStatus,
        deadline: Option<NaiveDate>,
        interest_ids: &[i64],
    ) -> Result<i64, DomainError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        tx.execute(
            "INSERT INTO opportunities (title, description, status, deadline, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                title,
                description,
                status.to_string(),
                deadline.map(|d| d.to_string()),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to add opportunity: {e}")))?;
        let id = tx.last_insert_rowid();
        for interest_id in interest_ids {
            tx.execute(
                "INSERT OR IGNORE INTO opportunity_interests (opportunity_id, interest_id) VALUES (?1, ?2)",
                params![id, interest_id],
            )
            .map_err(|e| DomainError::Database(format!("Failed to tag opportunity: {e}")))?;
        }
        tx.commit()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(id)
    }

    /// Replace-set of a user's declared interests.
    pub fn set_user_interests(&self, user_id: i64, interest_ids: &[i64]) -> Result<(), DomainError> {
        let mut conn = self.lock()?;
        let exists: bool = conn
            .query_row("SELECT 1 FROM users WHERE id = ?1", params![user_id], |_| Ok(true))
            .unwrap_or(false);
        if !exists {
            return Err(DomainError::NotFound(format!("User not found: {user_id}")));
        }
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        tx.execute(
            "DELETE FROM user_interests WHERE user_id = ?1",
            params![user_id],
        )
        .map_err(|e| DomainError::Database(e.to_string()))?;
        for interest_id in interest_ids {
            tx.execute(
                "INSERT OR IGNORE INTO user_interests (user_id, interest_id) VALUES (?1, ?2)",
                params![user_id, interest_id],
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        }
        tx.commit()
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    pub fn set_opportunity_status(
        &self,
        opportunity_id: i64,
        status: OpportunityStatus,
    ) -> Result<(), DomainError> {
        let conn = self.lock()?;
        let rows = conn
            .execute(
                "UPDATE opportunities SET status = ?1 WHERE id = ?2",
                params![status.to_string(), opportunity_id],
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        if rows == 0 {
            return Err(DomainError::NotFound(format!(
                "Opportunity not found: {opportunity_id}"
            )));
        }
        Ok(())
    }

    pub fn record_application(&self, user_id: i64, opportunity_id: i64) -> Result<(), DomainError> {
        let conn = self.lock()?;
        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM opportunities WHERE id = ?1",
                params![opportunity_id],
                |_| Ok(true),
            )
            .unwrap_or(false);
        if !exists {
            return Err(DomainError::NotFound(format!(
                "Opportunity not found: {opportunity_id}"
            )));
        }
        conn.execute(
            "INSERT INTO applications (user_id, opportunity_id, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, opportunity_id, Utc::now().to_rfc3339()],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DomainError::InvalidInput(format!(
                    "User {user_id} already applied to opportunity {opportunity_id}"
                ))
            }
            other => DomainError::Database(format!("Failed to record application: {other}")),
        })?;
        Ok(())
    }

    pub fn withdraw_application(&self, user_id: i64, opportunity_id: i64) -> Result<(), DomainError> {
        let conn = self.lock()?;
        let rows = conn
            .execute(
                "DELETE FROM applications WHERE user_id = ?1 AND opportunity_id = ?2",
                params![user_id, opportunity_id],
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        if rows == 0 {
            return Err(DomainError::NotFound(format!(
                "No application from user {user_id} for opportunity {opportunity_id}"
            )));
        }
        Ok(())
    }

    pub fn get_interest(&self, id: i64) -> Result<Option<Interest>, DomainError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, name, category FROM interests WHERE id = ?1")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], |row| {
                Ok(Interest {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    category: row.get(2)?,
                })
            })
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }
}

impl UserDirectory for SqliteCatalog {
    fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, email, is_student, email_verified, created_at FROM users WHERE id = ?1",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], |row| {
                let is_student: i32 = row.get(3)?;
                let email_verified: i32 = row.get(4)?;
                let created_str: String = row.get(5)?;
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    is_student: is_student != 0,
                    email_verified: email_verified != 0,
                    interest_ids: Vec::new(),
                    created_at: Self::parse_timestamp(&created_str),
                })
            })
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let user = rows.next().and_then(|r| r.ok());
        drop(rows);
        drop(stmt);
        match user {
            Some(mut user) => {
                user.interest_ids = Self::user_interest_ids(&conn, user.id)?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    fn list_eligible_students(&self) -> Result<Vec<User>, DomainError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, email, is_student, email_verified, created_at FROM users
                 WHERE is_student = 1 AND email_verified = 1 ORDER BY id",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut users: Vec<User> = stmt
            .query_map([], |row| {
                let created_str: String = row.get(5)?;
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    is_student: true,
                    email_verified: true,
                    interest_ids: Vec::new(),
                    created_at: Self::parse_timestamp(&created_str),
                })
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);
        for user in &mut users {
            user.interest_ids = Self::user_interest_ids(&conn, user.id)?;
        }
        Ok(users)
    }

    fn interest_names(&self, ids: &[i64]) -> Result<HashMap<i64, String>, DomainError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT name FROM interests WHERE id = ?1")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut names = HashMap::new();
        for id in ids {
            let mut rows = stmt
                .query_map(params![id], |row| row.get::<_, String>(0))
                .map_err(|e| DomainError::Database(e.to_string()))?;
            if let Some(Ok(name)) = rows.next() {
                names.insert(*id, name);
            }
        }
        Ok(names)
    }
}

impl OpportunityDirectory for SqliteCatalog {
    fn get_opportunity(&self, id: i64) -> Result<Option<Opportunity>, DomainError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title, description, status, deadline, created_at FROM opportunities WHERE id = ?1",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], |row| {
                let status_str: String = row.get(3)?;
                let deadline_str: Option<String> = row.get(4)?;
                let created_str: String = row.get(5)?;
                Ok(Opportunity {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    status: status_str.parse().map_err(|_| {
                        rusqlite::Error::InvalidParameterName(status_str.clone())
                    })?,
                    deadline: deadline_str
                        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
                    interest_ids: Vec::new(),
                    created_at: Self::parse_timestamp(&created_str),
                })
            })
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let opp = rows.next().and_then(|r| r.ok());
        drop(rows);
        drop(stmt);
        match opp {
            Some(mut opp) => {
                opp.interest_ids = Self::opportunity_interest_ids(&conn, opp.id)?;
                Ok(Some(opp))
            }
            None => Ok(None),
        }
    }

    fn list_open(&self) -> Result<Vec<OpportunitySnapshot>, DomainError> {
        let conn = self.lock()?;

        let mut tag_stmt = conn
            .prepare("SELECT opportunity_id, interest_id FROM opportunity_interests")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut tags: HashMap<i64, HashSet<i64>> = HashMap::new();
        let tag_rows = tag_stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        for row in tag_rows.filter_map(|r| r.ok()) {
            tags.entry(row.0).or_default().insert(row.1);
        }

        let mut count_stmt = conn
            .prepare("SELECT opportunity_id, COUNT(*) FROM applications GROUP BY opportunity_id")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut counts: HashMap<i64, usize> = HashMap::new();
        let count_rows = count_stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, usize>(1)?)))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        for row in count_rows.filter_map(|r| r.ok()) {
            counts.insert(row.0, row.1);
        }

        let mut stmt = conn
            .prepare(
                "SELECT id, title FROM opportunities WHERE status = 'em_andamento' ORDER BY id",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let snapshots = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .map(|(id, title)| OpportunitySnapshot {
                id,
                title,
                interest_ids: tags.remove(&id).unwrap_or_default(),
                application_count: counts.get(&id).copied().unwrap_or(0),
            })
            .collect();
        Ok(snapshots)
    }
}

impl ApplicationLog for SqliteCatalog {
    fn applied_opportunity_ids(&self, user_id: i64) -> Result<HashSet<i64>, DomainError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT opportunity_id FROM applications WHERE user_id = ?1")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(ids)
    }

    fn has_applied(&self, user_id: i64, opportunity_id: i64) -> Result<bool, DomainError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT 1 FROM applications WHERE user_id = ?1 AND opportunity_id = ?2 LIMIT 1")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![user_id, opportunity_id], |_| Ok(()))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().is_some())
    }
}
