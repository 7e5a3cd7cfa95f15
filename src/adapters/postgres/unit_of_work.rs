//! PostgreSQL unit of work.
//!
//! Wraps one `sqlx::Transaction`. `lock_*` methods read with
//! `SELECT ... FOR UPDATE`, so the row stays locked until commit or rollback
//! and concurrent purchases of the same ticket type queue up behind each other.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

use super::rows::{
    db_error, map_write_error, to_i32, RegistrationRow, TicketRow, TicketTypeRow, TransactionRow,
    REGISTRATION_COLUMNS, TICKET_COLUMNS, TICKET_TYPE_COLUMNS, TRANSACTION_COLUMNS,
};
use crate::domain::foundation::{
    DomainError, ErrorCode, MessageEnvelope, RegistrationId, TicketTypeId,
};
use crate::domain::inventory::TicketType;
use crate::domain::payment::Transaction;
use crate::domain::registration::Registration;
use crate::domain::ticket::{Ticket, TicketCode};
use crate::ports::{UnitOfWork, UnitOfWorkFactory};

/// Opens PostgreSQL units of work from a connection pool.
#[derive(Clone)]
pub struct PostgresUnitOfWorkFactory {
    pool: PgPool,
}

impl PostgresUnitOfWorkFactory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PostgresUnitOfWorkFactory {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;
        Ok(Box::new(PostgresUnitOfWork { tx }))
    }
}

pub struct PostgresUnitOfWork {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn lock_ticket_type(
        &mut self,
        id: &TicketTypeId,
    ) -> Result<Option<TicketType>, DomainError> {
        let sql = format!(
            "SELECT {} FROM ticket_types WHERE id = $1 FOR UPDATE",
            TICKET_TYPE_COLUMNS
        );
        let row: Option<TicketTypeRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| db_error("Failed to lock ticket type", e))?;

        row.map(TicketType::try_from).transpose()
    }

    async fn update_ticket_type(&mut self, ticket_type: &TicketType) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE ticket_types SET
                sold_count = $2,
                is_active = $3,
                version = $4
            WHERE id = $1
            "#,
        )
        .bind(ticket_type.id.as_uuid())
        .bind(to_i32("sold_count", ticket_type.sold_count)?)
        .bind(ticket_type.is_active)
        .bind(ticket_type.version)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to update ticket type", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::TicketTypeNotFound,
                format!("Ticket type {} not found", ticket_type.id),
            ));
        }
        Ok(())
    }

    async fn lock_registration(
        &mut self,
        id: &RegistrationId,
    ) -> Result<Option<Registration>, DomainError> {
        let sql = format!(
            "SELECT {} FROM registrations WHERE id = $1 FOR UPDATE",
            REGISTRATION_COLUMNS
        );
        let row: Option<RegistrationRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| db_error("Failed to lock registration", e))?;

        row.map(Registration::try_from).transpose()
    }

    async fn insert_registration(
        &mut self,
        registration: &Registration,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO registrations (
                id, event_id, ticket_type_id, buyer_name, buyer_email, requested_quantity,
                status, payment_method, registered_by, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(registration.id.as_uuid())
        .bind(registration.event_id.as_uuid())
        .bind(registration.ticket_type_id.as_uuid())
        .bind(&registration.buyer.full_name)
        .bind(&registration.buyer.email)
        .bind(to_i32("requested_quantity", registration.requested_quantity)?)
        .bind(registration.status.as_str())
        .bind(registration.payment_method.map(|m| m.as_str()))
        .bind(registration.registered_by.as_ref().map(|u| u.as_str()))
        .bind(registration.created_at.as_datetime())
        .bind(registration.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "registrations_pkey",
                "Registration already exists",
                "Failed to insert registration",
            )
        })?;

        Ok(())
    }

    async fn update_registration(
        &mut self,
        registration: &Registration,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE registrations SET
                status = $2,
                payment_method = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(registration.id.as_uuid())
        .bind(registration.status.as_str())
        .bind(registration.payment_method.map(|m| m.as_str()))
        .bind(registration.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to update registration", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::RegistrationNotFound,
                format!("Registration {} not found", registration.id),
            ));
        }
        Ok(())
    }

    async fn lock_transaction(
        &mut self,
        reference: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE reference = $1 FOR UPDATE",
            TRANSACTION_COLUMNS
        );
        let row: Option<TransactionRow> = sqlx::query_as(&sql)
            .bind(reference)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| db_error("Failed to lock transaction", e))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, reference, registration_id, amount, status, payment_method, channel,
                buyer_email, buyer_name, authorization_url, created_at, updated_at
            ) VALUES ($1, $2, $3, $4::NUMERIC, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(&transaction.reference)
        .bind(transaction.registration_id.as_uuid())
        .bind(transaction.amount.to_string())
        .bind(transaction.status.as_str())
        .bind(transaction.payment_method.as_str())
        .bind(&transaction.channel)
        .bind(&transaction.buyer_email)
        .bind(&transaction.buyer_name)
        .bind(&transaction.authorization_url)
        .bind(transaction.created_at.as_datetime())
        .bind(transaction.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "transactions_reference_key",
                "Transaction reference already exists",
                "Failed to insert transaction",
            )
        })?;

        Ok(())
    }

    async fn update_transaction(&mut self, transaction: &Transaction) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE transactions SET
                status = $2,
                channel = $3,
                updated_at = $4
            WHERE reference = $1
            "#,
        )
        .bind(&transaction.reference)
        .bind(transaction.status.as_str())
        .bind(&transaction.channel)
        .bind(transaction.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to update transaction", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::TransactionNotFound,
                format!("Transaction {} not found", transaction.reference),
            ));
        }
        Ok(())
    }

    async fn has_transaction(
        &mut self,
        registration_id: &RegistrationId,
    ) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM transactions WHERE registration_id = $1)",
        )
        .bind(registration_id.as_uuid())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to check transactions", e))?;

        Ok(exists)
    }

    async fn insert_tickets(&mut self, tickets: &[Ticket]) -> Result<(), DomainError> {
        for ticket in tickets {
            sqlx::query(
                r#"
                INSERT INTO tickets (
                    id, event_id, ticket_type_id, registration_id, code, verification_url,
                    verification_token, status, issued_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(ticket.id.as_uuid())
            .bind(ticket.event_id.as_uuid())
            .bind(ticket.ticket_type_id.as_uuid())
            .bind(ticket.registration_id.as_uuid())
            .bind(ticket.code.as_str())
            .bind(&ticket.verification_url)
            .bind(&ticket.verification_token)
            .bind(ticket.status.as_str())
            .bind(ticket.issued_at.as_datetime())
            .bind(ticket.updated_at.as_datetime())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                map_write_error(
                    e,
                    "tickets_code_key",
                    "Ticket code already taken",
                    "Failed to insert ticket",
                )
            })?;
        }

        Ok(())
    }

    async fn lock_ticket(&mut self, code: &TicketCode) -> Result<Option<Ticket>, DomainError> {
        let sql = format!(
            "SELECT {} FROM tickets WHERE code = $1 FOR UPDATE",
            TICKET_COLUMNS
        );
        let row: Option<TicketRow> = sqlx::query_as(&sql)
            .bind(code.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| db_error("Failed to lock ticket", e))?;

        row.map(Ticket::try_from).transpose()
    }

    async fn update_ticket(&mut self, ticket: &Ticket) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE tickets SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(ticket.id.as_uuid())
            .bind(ticket.status.as_str())
            .bind(ticket.updated_at.as_datetime())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| db_error("Failed to update ticket", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::TicketNotFound,
                format!("Ticket {} not found", ticket.code.as_str()),
            ));
        }
        Ok(())
    }

    async fn stage_event(&mut self, event: MessageEnvelope) -> Result<(), DomainError> {
        let envelope = serde_json::to_string(&event).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize message: {}", e),
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO event_outbox (
                id, message_id, event_type, aggregate_id, aggregate_type, envelope, status
            ) VALUES ($1, $2, $3, $4, $5, $6::JSONB, 'pending')
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(event.message_id.as_str())
        .bind(&event.event_type)
        .bind(&event.aggregate_id)
        .bind(&event.aggregate_type)
        .bind(envelope)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to stage outbox event", e))?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| db_error("Failed to roll back transaction", e))
    }
}
