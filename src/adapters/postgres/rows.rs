//! Database row representations shared by the unit of work and the readers.
//!
//! NUMERIC columns travel as text (`price::TEXT`) and are parsed into `Money`
//! so no decimal codec is needed on the wire.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::catalog::EventDetails;
use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, Money, RegistrationId, TicketId, TicketTypeId, Timestamp,
    TransactionId, UserId,
};
use crate::domain::inventory::TicketType;
use crate::domain::payment::{PaymentMethod, Transaction, TransactionStatus};
use crate::domain::registration::{Buyer, Registration, RegistrationStatus};
use crate::domain::ticket::{Ticket, TicketCode, TicketStatus};

pub(super) const TICKET_TYPE_COLUMNS: &str = "id, event_id, name, price::TEXT AS price, quantity, \
     sold_count, is_paid, is_active, version";

pub(super) const REGISTRATION_COLUMNS: &str = "id, event_id, ticket_type_id, buyer_name, \
     buyer_email, requested_quantity, status, payment_method, registered_by, created_at, updated_at";

pub(super) const TRANSACTION_COLUMNS: &str = "id, reference, registration_id, \
     amount::TEXT AS amount, status, payment_method, channel, buyer_email, buyer_name, \
     authorization_url, created_at, updated_at";

pub(super) const TICKET_COLUMNS: &str = "id, event_id, ticket_type_id, registration_id, code, \
     verification_url, verification_token, status, issued_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct EventRow {
    id: Uuid,
    name: String,
    venue: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    is_virtual: bool,
}

impl From<EventRow> for EventDetails {
    fn from(row: EventRow) -> Self {
        EventDetails {
            id: EventId::from_uuid(row.id),
            name: row.name,
            venue: row.venue,
            starts_at: Timestamp::from_datetime(row.starts_at),
            ends_at: Timestamp::from_datetime(row.ends_at),
            is_virtual: row.is_virtual,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct TicketTypeRow {
    id: Uuid,
    event_id: Uuid,
    name: String,
    price: String,
    quantity: i32,
    sold_count: i32,
    is_paid: bool,
    is_active: bool,
    version: i64,
}

impl TryFrom<TicketTypeRow> for TicketType {
    type Error = DomainError;

    fn try_from(row: TicketTypeRow) -> Result<Self, Self::Error> {
        Ok(TicketType {
            id: TicketTypeId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            name: row.name,
            price: parse_money("price", &row.price)?,
            quantity: to_u32("quantity", row.quantity)?,
            sold_count: to_u32("sold_count", row.sold_count)?,
            is_paid: row.is_paid,
            is_active: row.is_active,
            version: row.version,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct RegistrationRow {
    id: Uuid,
    event_id: Uuid,
    ticket_type_id: Uuid,
    buyer_name: String,
    buyer_email: String,
    requested_quantity: i32,
    status: String,
    payment_method: Option<String>,
    registered_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = DomainError;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        let status: RegistrationStatus = row.status.parse().map_err(|e| corrupt("status", e))?;
        let payment_method = row
            .payment_method
            .as_deref()
            .map(str::parse::<PaymentMethod>)
            .transpose()
            .map_err(|e| corrupt("payment_method", e))?;
        let registered_by = row
            .registered_by
            .map(UserId::new)
            .transpose()
            .map_err(|e| corrupt("registered_by", e))?;

        Ok(Registration {
            id: RegistrationId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            ticket_type_id: TicketTypeId::from_uuid(row.ticket_type_id),
            // Stored values were normalized on the way in.
            buyer: Buyer {
                full_name: row.buyer_name,
                email: row.buyer_email,
            },
            requested_quantity: to_u32("requested_quantity", row.requested_quantity)?,
            status,
            payment_method,
            registered_by,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct TransactionRow {
    id: Uuid,
    reference: String,
    registration_id: Uuid,
    amount: String,
    status: String,
    payment_method: String,
    channel: Option<String>,
    buyer_email: String,
    buyer_name: String,
    authorization_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let status: TransactionStatus = row.status.parse().map_err(|e| corrupt("status", e))?;
        let payment_method: PaymentMethod = row
            .payment_method
            .parse()
            .map_err(|e| corrupt("payment_method", e))?;

        Ok(Transaction {
            id: TransactionId::from_uuid(row.id),
            reference: row.reference,
            registration_id: RegistrationId::from_uuid(row.registration_id),
            amount: parse_money("amount", &row.amount)?,
            status,
            payment_method,
            channel: row.channel,
            buyer_email: row.buyer_email,
            buyer_name: row.buyer_name,
            authorization_url: row.authorization_url,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct TicketRow {
    id: Uuid,
    event_id: Uuid,
    ticket_type_id: Uuid,
    registration_id: Uuid,
    code: String,
    verification_url: String,
    verification_token: String,
    status: String,
    issued_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = DomainError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let status: TicketStatus = row.status.parse().map_err(|e| corrupt("status", e))?;

        Ok(Ticket {
            id: TicketId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            ticket_type_id: TicketTypeId::from_uuid(row.ticket_type_id),
            registration_id: RegistrationId::from_uuid(row.registration_id),
            code: TicketCode::new(row.code).map_err(|e| corrupt("code", e))?,
            verification_url: row.verification_url,
            verification_token: row.verification_token,
            status,
            issued_at: Timestamp::from_datetime(row.issued_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_money(field: &str, raw: &str) -> Result<Money, DomainError> {
    raw.parse::<Money>().map_err(|e| corrupt(field, e))
}

fn to_u32(field: &str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|_| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid {} value: {}", field, value),
        )
    })
}

pub(super) fn to_i32(field: &str, value: u32) -> Result<i32, DomainError> {
    i32::try_from(value).map_err(|_| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("{} {} exceeds storage range", field, value),
        )
    })
}

fn corrupt(field: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} value: {}", field, err),
    )
}

/// Maps a sqlx error, turning a violation of `constraint` into `Conflict`.
pub(super) fn map_write_error(
    e: sqlx::Error,
    constraint: &str,
    conflict_message: &str,
    context: &str,
) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.constraint() == Some(constraint) {
            return DomainError::new(ErrorCode::Conflict, conflict_message);
        }
    }
    db_error(context, e)
}

pub(super) fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket_type_row() -> TicketTypeRow {
        TicketTypeRow {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            name: "General".to_string(),
            price: "2500.00".to_string(),
            quantity: 100,
            sold_count: 40,
            is_paid: true,
            is_active: true,
            version: 40,
        }
    }

    #[test]
    fn ticket_type_row_converts_price_and_counters() {
        let tt = TicketType::try_from(ticket_type_row()).unwrap();
        assert_eq!(tt.price, "2500".parse::<Money>().unwrap());
        assert_eq!(tt.remaining(), 60);
        assert_eq!(tt.version, 40);
    }

    #[test]
    fn negative_counter_is_a_database_error() {
        let mut row = ticket_type_row();
        row.sold_count = -1;
        let err = TicketType::try_from(row).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn unknown_status_is_a_database_error() {
        let now = Utc::now();
        let row = RegistrationRow {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            ticket_type_id: Uuid::new_v4(),
            buyer_name: "Ada".to_string(),
            buyer_email: "ada@example.com".to_string(),
            requested_quantity: 1,
            status: "ON_HOLD".to_string(),
            payment_method: None,
            registered_by: None,
            created_at: now,
            updated_at: now,
        };
        let err = Registration::try_from(row).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.contains("status"));
    }

    #[test]
    fn transaction_row_parses_method_and_status() {
        let now = Utc::now();
        let row = TransactionRow {
            id: Uuid::new_v4(),
            reference: "ref_abc".to_string(),
            registration_id: Uuid::new_v4(),
            amount: "5000.00".to_string(),
            status: "SUCCESS".to_string(),
            payment_method: "bank_transfer".to_string(),
            channel: Some("card".to_string()),
            buyer_email: "ada@example.com".to_string(),
            buyer_name: "Ada".to_string(),
            authorization_url: "https://checkout.example/abc".to_string(),
            created_at: now,
            updated_at: now,
        };
        let tx = Transaction::try_from(row).unwrap();
        assert_eq!(tx.status, TransactionStatus::Success);
        assert_eq!(tx.payment_method, PaymentMethod::BankTransfer);
    }

    #[test]
    fn oversized_quantity_is_rejected_before_binding() {
        assert!(to_i32("quantity", 10).is_ok());
        assert_eq!(
            to_i32("quantity", u32::MAX).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }
}
