//! SQLite menu-state store.
//!
//! Implements `MenuStateStore` from `navguard-core`: an upserted
//! `menu_states` row per user and an append-only `activity_log`.

use chrono::{DateTime, Utc};
use navguard_core::repository::MenuStateStore;
use navguard_types::activity::ActivityRecord;
use navguard_types::error::RepositoryError;
use navguard_types::user::UserId;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MenuStateStore`.
pub struct SqliteMenuStateStore {
    pool: DatabasePool,
}

impl SqliteMenuStateStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Most recent activity entries for a user, newest first.
    pub async fn recent_activity(
        &self,
        user_id: &UserId,
        limit: i64,
    ) -> Result<Vec<ActivityRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM activity_log WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(user_id.as_str())
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let activity_row =
                ActivityRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            records.push(activity_row.into_record()?);
        }
        Ok(records)
    }

    /// Last time a user's menu state was written.
    pub async fn updated_at(
        &self,
        user_id: &UserId,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let row = sqlx::query("SELECT updated_at FROM menu_states WHERE user_id = ?")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|row| {
            let raw: String = row
                .try_get("updated_at")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            parse_datetime(&raw)
        })
        .transpose()
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ActivityRow {
    id: String,
    user_id: String,
    event_name: String,
    payload: String,
    created_at: String,
}

impl ActivityRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            event_name: row.try_get("event_name")?,
            payload: row.try_get("payload")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_record(self) -> Result<ActivityRecord, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid activity id: {e}")))?;
        let payload: serde_json::Value = serde_json::from_str(&self.payload)
            .map_err(|e| RepositoryError::Query(format!("invalid JSON payload: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(ActivityRecord {
            id,
            user_id: UserId::new(self.user_id),
            event_name: self.event_name,
            payload,
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// MenuStateStore implementation
// ---------------------------------------------------------------------------

impl MenuStateStore for SqliteMenuStateStore {
    async fn store_menu_state(&self, user_id: &UserId, menu_tag: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO menu_states (user_id, menu, updated_at) VALUES (?, ?, ?)
               ON CONFLICT(user_id) DO UPDATE SET menu = excluded.menu, updated_at = excluded.updated_at"#,
        )
        .bind(user_id.as_str())
        .bind(menu_tag)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_menu_state(&self, user_id: &UserId) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT menu FROM menu_states WHERE user_id = ?")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let menu: String = row
                    .try_get("menu")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(menu))
            }
            None => Ok(None),
        }
    }

    async fn log_activity(
        &self,
        user_id: &UserId,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        let record = ActivityRecord::new(user_id.clone(), event_name, payload.clone());
        let payload = serde_json::to_string(&record.payload)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize payload: {e}")))?;

        sqlx::query(
            r#"INSERT INTO activity_log (id, user_id, event_name, payload, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(record.id.to_string())
        .bind(record.user_id.as_str())
        .bind(&record.event_name)
        .bind(payload)
        .bind(format_datetime(&record.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}
