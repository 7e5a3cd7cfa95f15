//! In-memory ticketing store for tests and local runs.
//!
//! Implements every storage port over one shared state. A unit of work takes
//! the state lock for its whole lifetime and writes into a staged copy, which
//! replaces the shared state on commit. This gives the same guarantees as the
//! Postgres adapter (serialized writers, all-or-nothing visibility) within a
//! single process.
//!
//! Reads through the repository ports also take the state lock, so a task
//! must not read through a repository while it holds an open unit of work.
//! Event metadata lives behind its own lock and is safe to read at any time.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use crate::domain::catalog::EventDetails;
use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, MessageEnvelope, RegistrationId, TicketTypeId, Timestamp,
};
use crate::domain::inventory::TicketType;
use crate::domain::payment::{Transaction, TransactionStatus};
use crate::domain::registration::Registration;
use crate::domain::ticket::{Ticket, TicketCode};
use crate::ports::{
    EventCatalog, OutboxEntry, OutboxStatus, OutboxStore, RegistrationRepository,
    TicketRepository, TicketTypeRepository, TransactionRepository, UnitOfWork,
    UnitOfWorkFactory,
};

#[derive(Debug, Clone, Default)]
struct StoreState {
    ticket_types: Vec<TicketType>,
    registrations: HashMap<RegistrationId, Registration>,
    transactions: Vec<Transaction>,
    tickets: Vec<Ticket>,
    outbox: Vec<OutboxEntry>,
}

/// Fault switches for exercising rollback paths.
#[derive(Debug, Default)]
struct Faults {
    ticket_inserts: AtomicBool,
    event_staging: AtomicBool,
}

/// Shared in-process store. Cloning yields another handle to the same data.
#[derive(Clone, Default)]
pub struct InMemoryTicketingStore {
    state: Arc<Mutex<StoreState>>,
    events: Arc<RwLock<HashMap<EventId, EventDetails>>>,
    faults: Arc<Faults>,
}

impl InMemoryTicketingStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Seeding ===

    pub async fn add_event(&self, event: EventDetails) {
        self.events.write().await.insert(event.id, event);
    }

    pub async fn add_ticket_type(&self, ticket_type: TicketType) {
        self.state.lock().await.ticket_types.push(ticket_type);
    }

    // === Fault injection ===

    /// Makes every `insert_tickets` fail until switched off.
    pub fn fail_ticket_inserts(&self, fail: bool) {
        self.faults.ticket_inserts.store(fail, Ordering::SeqCst);
    }

    /// Makes every `stage_event` fail until switched off.
    pub fn fail_event_staging(&self, fail: bool) {
        self.faults.event_staging.store(fail, Ordering::SeqCst);
    }

    // === Test Helpers ===

    pub async fn ticket_type(&self, id: &TicketTypeId) -> Option<TicketType> {
        self.state
            .lock()
            .await
            .ticket_types
            .iter()
            .find(|t| t.id == *id)
            .cloned()
    }

    pub async fn registration(&self, id: &RegistrationId) -> Option<Registration> {
        self.state.lock().await.registrations.get(id).cloned()
    }

    pub async fn registrations(&self) -> Vec<Registration> {
        self.state.lock().await.registrations.values().cloned().collect()
    }

    pub async fn transaction(&self, reference: &str) -> Option<Transaction> {
        self.state
            .lock()
            .await
            .transactions
            .iter()
            .find(|t| t.reference == reference)
            .cloned()
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().await.transactions.clone()
    }

    pub async fn tickets(&self) -> Vec<Ticket> {
        self.state.lock().await.tickets.clone()
    }

    pub async fn outbox_entries(&self) -> Vec<OutboxEntry> {
        self.state.lock().await.outbox.clone()
    }

    /// Event types in the outbox, in staging order.
    pub async fn outbox_event_types(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .outbox
            .iter()
            .map(|e| e.event.event_type.clone())
            .collect()
    }

    /// Backdates a registration so reconciliation considers it abandoned.
    pub async fn backdate_registration(&self, id: &RegistrationId, secs: i64) {
        if let Some(registration) = self.state.lock().await.registrations.get_mut(id) {
            registration.created_at = registration.created_at.minus_secs(secs);
        }
    }

    /// Backdates a transaction so reconciliation considers it stale.
    pub async fn backdate_transaction(&self, reference: &str, secs: i64) {
        let mut state = self.state.lock().await;
        if let Some(tx) = state
            .transactions
            .iter_mut()
            .find(|t| t.reference == reference)
        {
            tx.created_at = tx.created_at.minus_secs(secs);
        }
    }
}

fn conflict(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::Conflict, message)
}

fn missing(code: ErrorCode, what: impl std::fmt::Display) -> DomainError {
    DomainError::new(code, format!("{} not found", what))
}

// ════════════════════════════════════════════════════════════════════════════
// Unit of work
// ════════════════════════════════════════════════════════════════════════════

/// Holds the state lock and a staged copy of the state.
pub struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<StoreState>,
    staged: StoreState,
    faults: Arc<Faults>,
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryTicketingStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DomainError> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(InMemoryUnitOfWork {
            guard,
            staged,
            faults: self.faults.clone(),
        }))
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn lock_ticket_type(
        &mut self,
        id: &TicketTypeId,
    ) -> Result<Option<TicketType>, DomainError> {
        Ok(self.staged.ticket_types.iter().find(|t| t.id == *id).cloned())
    }

    async fn update_ticket_type(&mut self, ticket_type: &TicketType) -> Result<(), DomainError> {
        let slot = self
            .staged
            .ticket_types
            .iter_mut()
            .find(|t| t.id == ticket_type.id)
            .ok_or_else(|| missing(ErrorCode::TicketTypeNotFound, ticket_type.id))?;
        *slot = ticket_type.clone();
        Ok(())
    }

    async fn lock_registration(
        &mut self,
        id: &RegistrationId,
    ) -> Result<Option<Registration>, DomainError> {
        Ok(self.staged.registrations.get(id).cloned())
    }

    async fn insert_registration(
        &mut self,
        registration: &Registration,
    ) -> Result<(), DomainError> {
        if self.staged.registrations.contains_key(&registration.id) {
            return Err(conflict(format!(
                "Registration {} already exists",
                registration.id
            )));
        }
        self.staged
            .registrations
            .insert(registration.id, registration.clone());
        Ok(())
    }

    async fn update_registration(
        &mut self,
        registration: &Registration,
    ) -> Result<(), DomainError> {
        let slot = self
            .staged
            .registrations
            .get_mut(&registration.id)
            .ok_or_else(|| missing(ErrorCode::RegistrationNotFound, registration.id))?;
        *slot = registration.clone();
        Ok(())
    }

    async fn lock_transaction(
        &mut self,
        reference: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        Ok(self
            .staged
            .transactions
            .iter()
            .find(|t| t.reference == reference)
            .cloned())
    }

    async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), DomainError> {
        if self
            .staged
            .transactions
            .iter()
            .any(|t| t.reference == transaction.reference)
        {
            return Err(conflict(format!(
                "Transaction reference {} already exists",
                transaction.reference
            )));
        }
        self.staged.transactions.push(transaction.clone());
        Ok(())
    }

    async fn update_transaction(&mut self, transaction: &Transaction) -> Result<(), DomainError> {
        let slot = self
            .staged
            .transactions
            .iter_mut()
            .find(|t| t.reference == transaction.reference)
            .ok_or_else(|| missing(ErrorCode::TransactionNotFound, &transaction.reference))?;
        *slot = transaction.clone();
        Ok(())
    }

    async fn has_transaction(
        &mut self,
        registration_id: &RegistrationId,
    ) -> Result<bool, DomainError> {
        Ok(self
            .staged
            .transactions
            .iter()
            .any(|t| t.registration_id == *registration_id))
    }

    async fn insert_tickets(&mut self, tickets: &[Ticket]) -> Result<(), DomainError> {
        if self.faults.ticket_inserts.load(Ordering::SeqCst) {
            return Err(DomainError::database("ticket insert failed (injected)"));
        }
        for (i, ticket) in tickets.iter().enumerate() {
            let taken = self.staged.tickets.iter().any(|t| t.code == ticket.code)
                || tickets[..i].iter().any(|t| t.code == ticket.code);
            if taken {
                return Err(conflict(format!("Ticket code {} already exists", ticket.code)));
            }
        }
        self.staged.tickets.extend_from_slice(tickets);
        Ok(())
    }

    async fn lock_ticket(&mut self, code: &TicketCode) -> Result<Option<Ticket>, DomainError> {
        Ok(self.staged.tickets.iter().find(|t| t.code == *code).cloned())
    }

    async fn update_ticket(&mut self, ticket: &Ticket) -> Result<(), DomainError> {
        let slot = self
            .staged
            .tickets
            .iter_mut()
            .find(|t| t.id == ticket.id)
            .ok_or_else(|| missing(ErrorCode::TicketNotFound, &ticket.code))?;
        *slot = ticket.clone();
        Ok(())
    }

    async fn stage_event(&mut self, event: MessageEnvelope) -> Result<(), DomainError> {
        if self.faults.event_staging.load(Ordering::SeqCst) {
            return Err(DomainError::database("outbox write failed (injected)"));
        }
        self.staged.outbox.push(OutboxEntry::new(event));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let InMemoryUnitOfWork {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Read ports
// ════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl TicketTypeRepository for InMemoryTicketingStore {
    async fn find_by_id(&self, id: &TicketTypeId) -> Result<Option<TicketType>, DomainError> {
        Ok(self.ticket_type(id).await)
    }

    async fn find_by_event(&self, event_id: &EventId) -> Result<Vec<TicketType>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .ticket_types
            .iter()
            .filter(|t| t.event_id == *event_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryTicketingStore {
    async fn find_by_id(&self, id: &RegistrationId) -> Result<Option<Registration>, DomainError> {
        Ok(self.registration(id).await)
    }

    async fn find_unpaid_older_than(
        &self,
        cutoff: Timestamp,
        limit: u32,
    ) -> Result<Vec<Registration>, DomainError> {
        let state = self.state.lock().await;
        let mut unpaid: Vec<Registration> = state
            .registrations
            .values()
            .filter(|r| r.is_pending() && r.created_at.is_before(&cutoff))
            .filter(|r| !state.transactions.iter().any(|t| t.registration_id == r.id))
            .cloned()
            .collect();
        unpaid.sort_by_key(|r| r.created_at);
        unpaid.truncate(limit as usize);
        Ok(unpaid)
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTicketingStore {
    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        Ok(self.transaction(reference).await)
    }

    async fn find_pending_for_registration(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<Option<Transaction>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .transactions
            .iter()
            .find(|t| {
                t.registration_id == *registration_id && t.status == TransactionStatus::Pending
            })
            .cloned())
    }

    async fn find_pending_older_than(
        &self,
        cutoff: Timestamp,
        limit: u32,
    ) -> Result<Vec<Transaction>, DomainError> {
        let mut pending: Vec<Transaction> = self
            .state
            .lock()
            .await
            .transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Pending && t.created_at.is_before(&cutoff))
            .cloned()
            .collect();
        pending.sort_by_key(|t| t.created_at);
        pending.truncate(limit as usize);
        Ok(pending)
    }

    async fn find_captured_unissued(&self, limit: u32) -> Result<Vec<Transaction>, DomainError> {
        let state = self.state.lock().await;
        let mut captured: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Success)
            .filter(|t| {
                state
                    .registrations
                    .get(&t.registration_id)
                    .is_some_and(|r| r.is_pending())
            })
            .cloned()
            .collect();
        captured.sort_by_key(|t| t.created_at);
        captured.truncate(limit as usize);
        Ok(captured)
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketingStore {
    async fn find_by_registration(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<Vec<Ticket>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .tickets
            .iter()
            .filter(|t| t.registration_id == *registration_id)
            .cloned()
            .collect())
    }

    async fn find_by_code(&self, code: &TicketCode) -> Result<Option<Ticket>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .tickets
            .iter()
            .find(|t| t.code == *code)
            .cloned())
    }
}

#[async_trait]
impl EventCatalog for InMemoryTicketingStore {
    async fn find_event(&self, id: &EventId) -> Result<Option<EventDetails>, DomainError> {
        Ok(self.events.read().await.get(id).cloned())
    }
}

#[async_trait]
impl OutboxStore for InMemoryTicketingStore {
    async fn get_pending(&self, limit: u32) -> Result<Vec<OutboxEntry>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .outbox
            .iter()
            .filter(|e| e.is_deliverable())
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn mark_published(&self, id: Uuid) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let entry = state
            .outbox
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| missing(ErrorCode::InternalError, format!("Outbox entry {}", id)))?;
        entry.mark_published();
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let entry = state
            .outbox
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| missing(ErrorCode::InternalError, format!("Outbox entry {}", id)))?;
        entry.mark_failed(error);
        Ok(())
    }

    async fn cleanup_old(&self, older_than_hours: u32) -> Result<u64, DomainError> {
        let cutoff = chrono::Utc::now() - chrono::Duration::hours(i64::from(older_than_hours));
        let mut state = self.state.lock().await;
        let before = state.outbox.len();
        state.outbox.retain(|e| {
            !(e.status == OutboxStatus::Published
                && e.processed_at.map(|at| at < cutoff).unwrap_or(false))
        });
        Ok((before - state.outbox.len()) as u64)
    }
}
