//! TicketIssuer - mints tickets for a registration, all or nothing.
//!
//! Within one unit of work the issuer commits the inventory sale, inserts
//! one ticket per unit, confirms the registration and stages a
//! `TicketPurchasedEvent`. If any step fails nothing is kept, and the
//! registration is marked FAILED in a separate unit of work.

use std::sync::Arc;

use crate::application::handlers::inventory::InventoryLedger;
use crate::domain::foundation::{RegistrationId, SerializableDomainEvent};
use crate::domain::inventory::Reservation;
use crate::domain::registration::{IssuancePolicy, RegistrationStatus};
use crate::domain::ticket::{IssuanceError, Ticket, TicketPurchasedEvent};
use crate::ports::{
    EventCatalog, TicketCodeGenerator, TicketRepository, TokenRenderer, UnitOfWork,
    UnitOfWorkFactory,
};

/// Issuer settings.
#[derive(Debug, Clone)]
pub struct TicketIssuerConfig {
    /// Base of the scan URL; the ticket code is appended as the last segment.
    pub verification_base_url: String,
}

impl TicketIssuerConfig {
    pub fn verification_url(&self, code: &str) -> String {
        format!(
            "{}/{}",
            self.verification_base_url.trim_end_matches('/'),
            code
        )
    }
}

enum Minted {
    Fresh(Vec<Ticket>),
    AlreadyConfirmed,
}

pub struct TicketIssuer {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    tickets: Arc<dyn TicketRepository>,
    catalog: Arc<dyn EventCatalog>,
    ledger: Arc<InventoryLedger>,
    code_generator: Arc<dyn TicketCodeGenerator>,
    token_renderer: Arc<dyn TokenRenderer>,
    config: TicketIssuerConfig,
}

impl TicketIssuer {
    pub fn new(
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        tickets: Arc<dyn TicketRepository>,
        catalog: Arc<dyn EventCatalog>,
        ledger: Arc<InventoryLedger>,
        code_generator: Arc<dyn TicketCodeGenerator>,
        token_renderer: Arc<dyn TokenRenderer>,
        config: TicketIssuerConfig,
    ) -> Self {
        Self {
            uow_factory,
            tickets,
            catalog,
            ledger,
            code_generator,
            token_renderer,
            config,
        }
    }

    /// Issues the tickets of a PENDING registration.
    ///
    /// A CONFIRMED registration returns its existing tickets and mints nothing.
    ///
    /// # Errors
    ///
    /// - `RegistrationNotFound`, `TicketTypeNotFound`, `EventNotFound`
    /// - `RegistrationFailed` if the registration already failed
    /// - `OutOfStock` if capacity ran out since the reservation
    /// - `IoFailure` if code generation, token rendering or storage failed
    pub async fn issue(
        &self,
        registration_id: RegistrationId,
    ) -> Result<Vec<Ticket>, IssuanceError> {
        match self.mint(registration_id).await? {
            Minted::Fresh(tickets) => Ok(tickets),
            Minted::AlreadyConfirmed => {
                Ok(self.tickets.find_by_registration(&registration_id).await?)
            }
        }
    }

    /// Finishes issuance for a registration whose payment was captured but
    /// whose tickets were never minted.
    ///
    /// Returns `None` if another caller confirmed the registration first.
    pub async fn resume(
        &self,
        registration_id: RegistrationId,
    ) -> Result<Option<Vec<Ticket>>, IssuanceError> {
        match self.mint(registration_id).await? {
            Minted::Fresh(tickets) => Ok(Some(tickets)),
            Minted::AlreadyConfirmed => Ok(None),
        }
    }

    async fn mint(&self, registration_id: RegistrationId) -> Result<Minted, IssuanceError> {
        let mut uow = self.uow_factory.begin().await?;

        let outcome = self.mint_in(uow.as_mut(), registration_id).await;

        match outcome {
            Ok(Minted::Fresh(tickets)) => match uow.commit().await {
                Ok(()) => {
                    tracing::info!(
                        registration_id = %registration_id,
                        tickets = tickets.len(),
                        "Tickets issued"
                    );
                    Ok(Minted::Fresh(tickets))
                }
                Err(e) => {
                    let err = IssuanceError::from(e);
                    self.record_failure(registration_id, &err).await;
                    Err(err)
                }
            },
            Ok(Minted::AlreadyConfirmed) => {
                self.discard(uow).await;
                tracing::debug!(
                    registration_id = %registration_id,
                    "Registration already confirmed"
                );
                Ok(Minted::AlreadyConfirmed)
            }
            Err(err) => {
                self.discard(uow).await;
                if !matches!(
                    err,
                    IssuanceError::RegistrationNotFound(_) | IssuanceError::RegistrationFailed(_)
                ) {
                    self.record_failure(registration_id, &err).await;
                }
                Err(err)
            }
        }
    }

    async fn mint_in(
        &self,
        uow: &mut dyn UnitOfWork,
        registration_id: RegistrationId,
    ) -> Result<Minted, IssuanceError> {
        let mut registration = uow
            .lock_registration(&registration_id)
            .await?
            .ok_or(IssuanceError::RegistrationNotFound(registration_id))?;

        match registration.status {
            RegistrationStatus::Confirmed => return Ok(Minted::AlreadyConfirmed),
            RegistrationStatus::Failed => {
                return Err(IssuanceError::RegistrationFailed(registration_id))
            }
            RegistrationStatus::Pending => {}
        }

        let event = self
            .catalog
            .find_event(&registration.event_id)
            .await?
            .ok_or(IssuanceError::EventNotFound(registration.event_id))?;

        let ticket_type = uow
            .lock_ticket_type(&registration.ticket_type_id)
            .await?
            .ok_or(IssuanceError::TicketTypeNotFound(registration.ticket_type_id))?;

        let units =
            IssuancePolicy::units_to_mint(&ticket_type, &event, registration.requested_quantity);

        let mut tickets = Vec::with_capacity(units as usize);
        for _ in 0..units {
            let code = self.code_generator.generate().map_err(IssuanceError::io)?;
            let verification_url = self.config.verification_url(code.as_str());
            let verification_token = self
                .token_renderer
                .render(&verification_url)
                .map_err(IssuanceError::io)?;
            tickets.push(Ticket::issue(
                event.id,
                ticket_type.id,
                registration.id,
                code,
                verification_url,
                verification_token,
            ));
        }

        self.ledger
            .commit_in(&mut *uow, Reservation::new(ticket_type.id, units))
            .await?;

        uow.insert_tickets(&tickets).await.map_err(IssuanceError::io)?;

        registration.confirm().map_err(IssuanceError::io)?;
        uow.update_registration(&registration).await?;

        let envelope = TicketPurchasedEvent::new(
            registration.id,
            registration.buyer.clone(),
            &tickets,
            event,
        )
        .to_envelope()?
        .with_correlation_id(registration.id.to_string());
        uow.stage_event(envelope).await?;

        Ok(Minted::Fresh(tickets))
    }

    async fn discard(&self, uow: Box<dyn UnitOfWork>) {
        if let Err(e) = uow.rollback().await {
            tracing::warn!(error = %e, "Rollback failed");
        }
    }

    /// Marks the registration FAILED after a rolled-back issuance.
    async fn record_failure(&self, registration_id: RegistrationId, cause: &IssuanceError) {
        tracing::error!(
            registration_id = %registration_id,
            error = %cause,
            "Ticket issuance failed, registration marked FAILED"
        );

        if let Err(e) = self.mark_failed(registration_id).await {
            tracing::error!(
                registration_id = %registration_id,
                error = %e,
                "Could not mark registration FAILED"
            );
        }
    }

    async fn mark_failed(&self, registration_id: RegistrationId) -> Result<(), IssuanceError> {
        let mut uow = self.uow_factory.begin().await?;
        let registration = uow.lock_registration(&registration_id).await?;

        match registration {
            Some(mut registration) if registration.is_pending() => {
                registration.fail().map_err(IssuanceError::io)?;
                uow.update_registration(&registration).await?;
                uow.commit().await?;
            }
            _ => self.discard(uow).await,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryTicketingStore;
    use crate::domain::catalog::EventDetails;
    use crate::domain::foundation::{DomainError, ErrorCode, EventId, Money, Timestamp};
    use crate::domain::inventory::TicketType;
    use crate::domain::registration::{Buyer, Registration};
    use crate::domain::ticket::TicketCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct SequentialCodes {
        next: AtomicU32,
    }

    impl SequentialCodes {
        fn new() -> Self {
            Self {
                next: AtomicU32::new(1),
            }
        }
    }

    impl TicketCodeGenerator for SequentialCodes {
        fn generate(&self) -> Result<TicketCode, DomainError> {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            Ok(TicketCode::new(format!("CODE{:04}", n))?)
        }
    }

    struct RepeatingCodes;

    impl TicketCodeGenerator for RepeatingCodes {
        fn generate(&self) -> Result<TicketCode, DomainError> {
            Ok(TicketCode::new("SAME")?)
        }
    }

    struct PlainTokens;

    impl TokenRenderer for PlainTokens {
        fn render(&self, verification_url: &str) -> Result<String, DomainError> {
            Ok(format!("token:{}", verification_url))
        }
    }

    struct BrokenTokens;

    impl TokenRenderer for BrokenTokens {
        fn render(&self, _verification_url: &str) -> Result<String, DomainError> {
            Err(DomainError::new(ErrorCode::InternalError, "encoder crashed"))
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        store: InMemoryTicketingStore,
        ticket_type: TicketType,
        event: EventDetails,
    }

    async fn fixture(price: &str, quantity: u32, is_virtual: bool) -> Fixture {
        let store = InMemoryTicketingStore::new();
        let now = Timestamp::now();
        let event = EventDetails {
            id: EventId::new(),
            name: "RustConf".to_string(),
            venue: "Hall A".to_string(),
            starts_at: now.plus_secs(3600),
            ends_at: now.plus_secs(7200),
            is_virtual,
        };
        let ticket_type =
            TicketType::new(event.id, "General", price.parse::<Money>().unwrap(), quantity)
                .unwrap();
        store.add_event(event.clone()).await;
        store.add_ticket_type(ticket_type.clone()).await;
        Fixture {
            store,
            ticket_type,
            event,
        }
    }

    fn issuer_with(
        store: &InMemoryTicketingStore,
        codes: Arc<dyn TicketCodeGenerator>,
        tokens: Arc<dyn TokenRenderer>,
    ) -> TicketIssuer {
        let shared = Arc::new(store.clone());
        let ledger = Arc::new(InventoryLedger::new(shared.clone(), shared.clone()));
        TicketIssuer::new(
            shared.clone(),
            shared.clone(),
            shared,
            ledger,
            codes,
            tokens,
            TicketIssuerConfig {
                verification_base_url: "https://tickets.example.com/verify/".to_string(),
            },
        )
    }

    fn issuer(store: &InMemoryTicketingStore) -> TicketIssuer {
        issuer_with(store, Arc::new(SequentialCodes::new()), Arc::new(PlainTokens))
    }

    async fn pending_registration(f: &Fixture, quantity: u32) -> Registration {
        let registration = Registration::new(
            f.event.id,
            f.ticket_type.id,
            Buyer::new("Ada Obi", "ada@example.com").unwrap(),
            quantity,
            None,
            None,
        );
        let mut uow = f.store.begin().await.unwrap();
        uow.insert_registration(&registration).await.unwrap();
        uow.commit().await.unwrap();
        registration
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn issues_one_ticket_per_unit_for_paid_in_person_events() {
        let f = fixture("25.00", 10, false).await;
        let registration = pending_registration(&f, 3).await;

        let tickets = issuer(&f.store).issue(registration.id).await.unwrap();

        assert_eq!(tickets.len(), 3);
        assert_eq!(f.store.tickets().await.len(), 3);
        assert_eq!(f.store.ticket_type(&f.ticket_type.id).await.unwrap().sold_count, 3);
        let stored = f.store.registration(&registration.id).await.unwrap();
        assert_eq!(stored.status, RegistrationStatus::Confirmed);
        assert_eq!(
            f.store.outbox_event_types().await,
            vec!["tickets.purchased.v1".to_string()]
        );
    }

    #[tokio::test]
    async fn builds_verification_url_and_token_from_code() {
        let f = fixture("0", 10, false).await;
        let registration = pending_registration(&f, 1).await;

        let tickets = issuer(&f.store).issue(registration.id).await.unwrap();

        let ticket = &tickets[0];
        assert_eq!(
            ticket.verification_url,
            format!("https://tickets.example.com/verify/{}", ticket.code)
        );
        assert_eq!(
            ticket.verification_token,
            format!("token:{}", ticket.verification_url)
        );
    }

    #[tokio::test]
    async fn free_types_mint_a_single_ticket() {
        let f = fixture("0", 10, false).await;
        let registration = pending_registration(&f, 4).await;

        let tickets = issuer(&f.store).issue(registration.id).await.unwrap();

        assert_eq!(tickets.len(), 1);
        assert_eq!(f.store.ticket_type(&f.ticket_type.id).await.unwrap().sold_count, 1);
    }

    #[tokio::test]
    async fn virtual_paid_events_mint_one_pass() {
        let f = fixture("40.00", 10, true).await;
        let registration = pending_registration(&f, 3).await;

        let tickets = issuer(&f.store).issue(registration.id).await.unwrap();

        assert_eq!(tickets.len(), 1);
    }

    #[tokio::test]
    async fn confirmed_registration_returns_existing_tickets() {
        let f = fixture("25.00", 10, false).await;
        let registration = pending_registration(&f, 2).await;
        let issuer = issuer(&f.store);

        let first = issuer.issue(registration.id).await.unwrap();
        let second = issuer.issue(registration.id).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(f.store.tickets().await.len(), 2);
        assert_eq!(f.store.ticket_type(&f.ticket_type.id).await.unwrap().sold_count, 2);
        assert_eq!(f.store.outbox_entries().await.len(), 1);
    }

    #[tokio::test]
    async fn resume_mints_only_for_unconfirmed_registrations() {
        let f = fixture("25.00", 10, false).await;
        let registration = pending_registration(&f, 2).await;
        let issuer = issuer(&f.store);

        let resumed = issuer.resume(registration.id).await.unwrap();
        let again = issuer.resume(registration.id).await.unwrap();

        assert_eq!(resumed.map(|t| t.len()), Some(2));
        assert!(again.is_none());
        assert_eq!(f.store.tickets().await.len(), 2);
    }

    #[tokio::test]
    async fn out_of_stock_rolls_back_and_fails_registration() {
        let f = fixture("25.00", 2, false).await;
        let registration = pending_registration(&f, 3).await;

        let err = issuer(&f.store).issue(registration.id).await.unwrap_err();

        assert!(matches!(err, IssuanceError::OutOfStock { requested: 3, .. }));
        assert!(f.store.tickets().await.is_empty());
        assert_eq!(f.store.ticket_type(&f.ticket_type.id).await.unwrap().sold_count, 0);
        let stored = f.store.registration(&registration.id).await.unwrap();
        assert_eq!(stored.status, RegistrationStatus::Failed);
        assert!(f.store.outbox_entries().await.is_empty());
    }

    #[tokio::test]
    async fn token_failure_is_io_failure_with_full_rollback() {
        let f = fixture("25.00", 10, false).await;
        let registration = pending_registration(&f, 2).await;
        let issuer = issuer_with(
            &f.store,
            Arc::new(SequentialCodes::new()),
            Arc::new(BrokenTokens),
        );

        let err = issuer.issue(registration.id).await.unwrap_err();

        assert!(matches!(err, IssuanceError::IoFailure(_)));
        assert!(f.store.tickets().await.is_empty());
        assert_eq!(f.store.ticket_type(&f.ticket_type.id).await.unwrap().sold_count, 0);
        assert_eq!(
            f.store.registration(&registration.id).await.unwrap().status,
            RegistrationStatus::Failed
        );
    }

    #[tokio::test]
    async fn storage_failure_after_sale_undoes_the_sale() {
        let f = fixture("25.00", 10, false).await;
        let registration = pending_registration(&f, 2).await;
        f.store.fail_ticket_inserts(true);

        let err = issuer(&f.store).issue(registration.id).await.unwrap_err();

        assert!(matches!(err, IssuanceError::IoFailure(_)));
        assert_eq!(f.store.ticket_type(&f.ticket_type.id).await.unwrap().sold_count, 0);
        assert_eq!(
            f.store.registration(&registration.id).await.unwrap().status,
            RegistrationStatus::Failed
        );
    }

    #[tokio::test]
    async fn duplicate_codes_within_a_batch_are_rejected() {
        let f = fixture("25.00", 10, false).await;
        let registration = pending_registration(&f, 2).await;
        let issuer = issuer_with(&f.store, Arc::new(RepeatingCodes), Arc::new(PlainTokens));

        let err = issuer.issue(registration.id).await.unwrap_err();

        assert!(matches!(err, IssuanceError::IoFailure(_)));
        assert!(f.store.tickets().await.is_empty());
    }

    #[tokio::test]
    async fn failed_registration_is_rejected() {
        let f = fixture("25.00", 10, false).await;
        let registration = pending_registration(&f, 1).await;
        let issuer = issuer(&f.store);
        f.store.fail_ticket_inserts(true);
        issuer.issue(registration.id).await.unwrap_err();
        f.store.fail_ticket_inserts(false);

        let err = issuer.issue(registration.id).await.unwrap_err();

        assert_eq!(err, IssuanceError::RegistrationFailed(registration.id));
    }

    #[tokio::test]
    async fn unknown_registration_is_not_found() {
        let f = fixture("25.00", 10, false).await;
        let unknown = RegistrationId::new();

        let err = issuer(&f.store).issue(unknown).await.unwrap_err();

        assert_eq!(err, IssuanceError::RegistrationNotFound(unknown));
    }

    #[tokio::test]
    async fn ticket_codes_are_unique_across_registrations() {
        let f = fixture("0", 10, false).await;
        let issuer = issuer(&f.store);

        for _ in 0..5 {
            let registration = pending_registration(&f, 1).await;
            issuer.issue(registration.id).await.unwrap();
        }

        let mut codes: Vec<String> = f
            .store
            .tickets()
            .await
            .iter()
            .map(|t| t.code.to_string())
            .collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 5);
    }
}
