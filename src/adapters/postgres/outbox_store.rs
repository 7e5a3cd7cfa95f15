//! PostgreSQL outbox store.
//!
//! Units of work insert into `event_outbox`; this adapter is the relay's view
//! of the same table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::rows::db_error;
use crate::domain::foundation::{DomainError, ErrorCode, MessageEnvelope};
use crate::ports::{OutboxEntry, OutboxStatus, OutboxStore};

#[derive(Clone)]
pub struct PostgresOutboxStore {
    pool: PgPool,
}

impl PostgresOutboxStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OutboxRow {
    id: Uuid,
    envelope: String,
    status: String,
    attempts: i32,
    last_error: Option<String>,
    created_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
}

impl TryFrom<OutboxRow> for OutboxEntry {
    type Error = DomainError;

    fn try_from(row: OutboxRow) -> Result<Self, Self::Error> {
        let event: MessageEnvelope = serde_json::from_str(&row.envelope).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid outbox envelope {}: {}", row.id, e),
            )
        })?;

        Ok(OutboxEntry {
            id: row.id,
            event,
            status: parse_status(&row.status)?,
            created_at: row.created_at,
            processed_at: row.processed_at,
            attempts: u32::try_from(row.attempts).unwrap_or(0),
            last_error: row.last_error,
        })
    }
}

fn parse_status(s: &str) -> Result<OutboxStatus, DomainError> {
    match s {
        "pending" => Ok(OutboxStatus::Pending),
        "published" => Ok(OutboxStatus::Published),
        "failed" => Ok(OutboxStatus::Failed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid outbox status value: {}", s),
        )),
    }
}

#[async_trait]
impl OutboxStore for PostgresOutboxStore {
    async fn get_pending(&self, limit: u32) -> Result<Vec<OutboxEntry>, DomainError> {
        let rows: Vec<OutboxRow> = sqlx::query_as(
            r#"
            SELECT id, envelope::TEXT AS envelope, status, attempts, last_error,
                   created_at, processed_at
            FROM event_outbox
            WHERE status <> 'published'
            ORDER BY created_at, id
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch outbox entries", e))?;

        rows.into_iter().map(OutboxEntry::try_from).collect()
    }

    async fn mark_published(&self, id: Uuid) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE event_outbox SET
                status = $2,
                attempts = attempts + 1,
                processed_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(OutboxStatus::Published.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark outbox entry published", e))?;

        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE event_outbox SET
                status = $2,
                attempts = attempts + 1,
                last_error = $3,
                processed_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(OutboxStatus::Failed.as_str())
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark outbox entry failed", e))?;

        Ok(())
    }

    async fn cleanup_old(&self, older_than_hours: u32) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM event_outbox
            WHERE status = 'published'
              AND processed_at < NOW() - make_interval(hours => $1)
            "#,
        )
        .bind(i32::try_from(older_than_hours).unwrap_or(i32::MAX))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to clean up outbox", e))?;

        Ok(result.rows_affected())
    }
}
