//! PostgreSQL read repositories.
//!
//! Plain pooled reads; none of these take row locks.

use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{
    db_error, EventRow, RegistrationRow, TicketRow, TicketTypeRow, TransactionRow,
    REGISTRATION_COLUMNS, TICKET_COLUMNS, TICKET_TYPE_COLUMNS, TRANSACTION_COLUMNS,
};
use crate::domain::catalog::EventDetails;
use crate::domain::foundation::{
    DomainError, EventId, RegistrationId, TicketTypeId, Timestamp,
};
use crate::domain::inventory::TicketType;
use crate::domain::payment::Transaction;
use crate::domain::registration::Registration;
use crate::domain::ticket::{Ticket, TicketCode};
use crate::ports::{
    EventCatalog, RegistrationRepository, TicketRepository, TicketTypeRepository,
    TransactionRepository,
};

/// PostgreSQL implementation of the TicketTypeRepository port.
#[derive(Clone)]
pub struct PostgresTicketTypeRepository {
    pool: PgPool,
}

impl PostgresTicketTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketTypeRepository for PostgresTicketTypeRepository {
    async fn find_by_id(&self, id: &TicketTypeId) -> Result<Option<TicketType>, DomainError> {
        let sql = format!("SELECT {} FROM ticket_types WHERE id = $1", TICKET_TYPE_COLUMNS);
        let row: Option<TicketTypeRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch ticket type", e))?;

        row.map(TicketType::try_from).transpose()
    }

    async fn find_by_event(&self, event_id: &EventId) -> Result<Vec<TicketType>, DomainError> {
        let sql = format!(
            "SELECT {} FROM ticket_types WHERE event_id = $1 ORDER BY created_at, id",
            TICKET_TYPE_COLUMNS
        );
        let rows: Vec<TicketTypeRow> = sqlx::query_as(&sql)
            .bind(event_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list ticket types", e))?;

        rows.into_iter().map(TicketType::try_from).collect()
    }
}

/// PostgreSQL implementation of the RegistrationRepository port.
#[derive(Clone)]
pub struct PostgresRegistrationRepository {
    pool: PgPool,
}

impl PostgresRegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationRepository for PostgresRegistrationRepository {
    async fn find_by_id(&self, id: &RegistrationId) -> Result<Option<Registration>, DomainError> {
        let sql = format!("SELECT {} FROM registrations WHERE id = $1", REGISTRATION_COLUMNS);
        let row: Option<RegistrationRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch registration", e))?;

        row.map(Registration::try_from).transpose()
    }

    async fn find_unpaid_older_than(
        &self,
        cutoff: Timestamp,
        limit: u32,
    ) -> Result<Vec<Registration>, DomainError> {
        let sql = format!(
            "SELECT {} FROM registrations r \
             WHERE r.status = 'PENDING' AND r.created_at < $1 \
             AND NOT EXISTS (SELECT 1 FROM transactions t WHERE t.registration_id = r.id) \
             ORDER BY r.created_at LIMIT $2",
            REGISTRATION_COLUMNS
        );
        let rows: Vec<RegistrationRow> = sqlx::query_as(&sql)
            .bind(cutoff.as_datetime())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list unpaid registrations", e))?;

        rows.into_iter().map(Registration::try_from).collect()
    }
}

/// PostgreSQL implementation of the TransactionRepository port.
#[derive(Clone)]
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        let sql = format!("SELECT {} FROM transactions WHERE reference = $1", TRANSACTION_COLUMNS);
        let row: Option<TransactionRow> = sqlx::query_as(&sql)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch transaction", e))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn find_pending_for_registration(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<Option<Transaction>, DomainError> {
        let sql = format!(
            "SELECT {} FROM transactions \
             WHERE registration_id = $1 AND status = 'PENDING' \
             ORDER BY created_at DESC LIMIT 1",
            TRANSACTION_COLUMNS
        );
        let row: Option<TransactionRow> = sqlx::query_as(&sql)
            .bind(registration_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch pending transaction", e))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn find_pending_older_than(
        &self,
        cutoff: Timestamp,
        limit: u32,
    ) -> Result<Vec<Transaction>, DomainError> {
        let sql = format!(
            "SELECT {} FROM transactions \
             WHERE status = 'PENDING' AND created_at < $1 \
             ORDER BY created_at LIMIT $2",
            TRANSACTION_COLUMNS
        );
        let rows: Vec<TransactionRow> = sqlx::query_as(&sql)
            .bind(cutoff.as_datetime())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list stale transactions", e))?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn find_captured_unissued(&self, limit: u32) -> Result<Vec<Transaction>, DomainError> {
        let sql = format!(
            "SELECT {} FROM transactions \
             WHERE status = 'SUCCESS' \
             AND registration_id IN (SELECT id FROM registrations WHERE status = 'PENDING') \
             ORDER BY created_at LIMIT $1",
            TRANSACTION_COLUMNS
        );
        let rows: Vec<TransactionRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list captured transactions", e))?;

        rows.into_iter().map(Transaction::try_from).collect()
    }
}

/// PostgreSQL implementation of the TicketRepository port.
#[derive(Clone)]
pub struct PostgresTicketRepository {
    pool: PgPool,
}

impl PostgresTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for PostgresTicketRepository {
    async fn find_by_registration(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<Vec<Ticket>, DomainError> {
        let sql = format!(
            "SELECT {} FROM tickets WHERE registration_id = $1 ORDER BY issued_at, code",
            TICKET_COLUMNS
        );
        let rows: Vec<TicketRow> = sqlx::query_as(&sql)
            .bind(registration_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list tickets", e))?;

        rows.into_iter().map(Ticket::try_from).collect()
    }

    async fn find_by_code(&self, code: &TicketCode) -> Result<Option<Ticket>, DomainError> {
        let sql = format!("SELECT {} FROM tickets WHERE code = $1", TICKET_COLUMNS);
        let row: Option<TicketRow> = sqlx::query_as(&sql)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch ticket", e))?;

        row.map(Ticket::try_from).transpose()
    }
}

/// Reads event metadata from the `events` table maintained by event management.
#[derive(Clone)]
pub struct PostgresEventCatalog {
    pool: PgPool,
}

impl PostgresEventCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventCatalog for PostgresEventCatalog {
    async fn find_event(&self, id: &EventId) -> Result<Option<EventDetails>, DomainError> {
        let row: Option<EventRow> = sqlx::query_as(
            "SELECT id, name, venue, starts_at, ends_at, is_virtual FROM events WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch event", e))?;

        Ok(row.map(EventDetails::from))
    }
}
