//! PostgreSQL adapters - Database implementations of the storage ports.
//!
//! - `PostgresUnitOfWorkFactory` - Transactional writes with row locks and outbox staging
//! - `PostgresTicketTypeRepository`, `PostgresRegistrationRepository`,
//!   `PostgresTransactionRepository`, `PostgresTicketRepository` - Pooled reads
//! - `PostgresEventCatalog` - Event metadata
//! - `PostgresOutboxStore` - Relay side of `event_outbox`
//!
//! Schema lives in `migrations/` and is applied with [`MIGRATOR`].

mod outbox_store;
mod repositories;
mod rows;
mod unit_of_work;

pub use outbox_store::PostgresOutboxStore;
pub use repositories::{
    PostgresEventCatalog, PostgresRegistrationRepository, PostgresTicketRepository,
    PostgresTicketTypeRepository, PostgresTransactionRepository,
};
pub use unit_of_work::{PostgresUnitOfWork, PostgresUnitOfWorkFactory};

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
