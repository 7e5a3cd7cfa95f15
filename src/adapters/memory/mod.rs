//! In-process adapters for tests and local runs.

mod store;

pub use store::{InMemoryTicketingStore, InMemoryUnitOfWork};
