//! RegisterForEventHandler - accepts a purchase request.
//!
//! Free ticket types are issued before the call returns. Paid ticket types
//! open a gateway payment and leave the registration PENDING until the
//! gateway reports back.

use std::sync::Arc;

use crate::application::handlers::inventory::InventoryLedger;
use crate::application::handlers::payment::{InitiatePaymentCommand, InitiatePaymentHandler};
use crate::application::handlers::ticket::TicketIssuer;
use crate::domain::foundation::{EventId, TicketTypeId, UserId, ValidationError};
use crate::domain::inventory::Reservation;
use crate::domain::payment::{PaymentInstrument, Transaction};
use crate::domain::registration::{Buyer, IssuancePolicy, Registration, RegistrationError};
use crate::domain::ticket::Ticket;
use crate::ports::{
    EventCatalog, RegistrationRepository, TicketTypeRepository, UnitOfWork, UnitOfWorkFactory,
};

/// Default per-request ticket limit.
pub const DEFAULT_MAX_QUANTITY: u32 = 10;

/// Command to register for an event.
#[derive(Debug, Clone)]
pub struct RegisterForEventCommand {
    pub event_id: EventId,
    pub ticket_type_id: TicketTypeId,
    pub quantity: u32,
    pub full_name: String,
    pub email: String,
    /// Required for paid ticket types.
    pub payment_instrument: Option<PaymentInstrument>,
    /// Authenticated principal, if the caller is signed in.
    pub registered_by: Option<UserId>,
}

/// Result of a registration.
#[derive(Debug, Clone)]
pub enum RegisterForEventResult {
    /// Free registration, tickets already issued.
    Confirmed {
        registration: Registration,
        tickets: Vec<Ticket>,
    },
    /// Paid registration; the buyer completes payment at the transaction's
    /// authorization URL.
    AwaitingPayment {
        registration: Registration,
        transaction: Transaction,
    },
}

impl RegisterForEventResult {
    pub fn registration(&self) -> &Registration {
        match self {
            RegisterForEventResult::Confirmed { registration, .. }
            | RegisterForEventResult::AwaitingPayment { registration, .. } => registration,
        }
    }
}

pub struct RegisterForEventHandler {
    catalog: Arc<dyn EventCatalog>,
    ticket_types: Arc<dyn TicketTypeRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    ledger: Arc<InventoryLedger>,
    issuer: Arc<TicketIssuer>,
    payments: Arc<InitiatePaymentHandler>,
    max_quantity: u32,
}

impl RegisterForEventHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<dyn EventCatalog>,
        ticket_types: Arc<dyn TicketTypeRepository>,
        registrations: Arc<dyn RegistrationRepository>,
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        ledger: Arc<InventoryLedger>,
        issuer: Arc<TicketIssuer>,
        payments: Arc<InitiatePaymentHandler>,
        max_quantity: u32,
    ) -> Self {
        Self {
            catalog,
            ticket_types,
            registrations,
            uow_factory,
            ledger,
            issuer,
            payments,
            max_quantity,
        }
    }

    pub async fn handle(
        &self,
        cmd: RegisterForEventCommand,
    ) -> Result<RegisterForEventResult, RegistrationError> {
        // 1. Validate request
        if cmd.quantity == 0 || cmd.quantity > self.max_quantity {
            return Err(ValidationError::out_of_range(
                "quantity",
                1,
                i64::from(self.max_quantity),
                i64::from(cmd.quantity),
            )
            .into());
        }
        let buyer = Buyer::new(cmd.full_name, cmd.email)?;

        // 2. Resolve event and ticket type
        let event = self
            .catalog
            .find_event(&cmd.event_id)
            .await?
            .ok_or(RegistrationError::EventNotFound(cmd.event_id))?;

        let ticket_type = self
            .ticket_types
            .find_by_id(&cmd.ticket_type_id)
            .await?
            .filter(|tt| tt.event_id == event.id)
            .ok_or(RegistrationError::TicketTypeNotFound(cmd.ticket_type_id))?;

        // 3. Fail fast if the units are not available
        let units = IssuancePolicy::units_to_mint(&ticket_type, &event, cmd.quantity);
        let reservation = self.ledger.reserve(ticket_type.id, units).await?;

        if !ticket_type.is_paid {
            return self
                .register_free(
                    cmd.event_id,
                    cmd.ticket_type_id,
                    buyer,
                    cmd.quantity,
                    cmd.registered_by,
                    reservation,
                )
                .await;
        }

        let Some(instrument) = cmd.payment_instrument else {
            self.ledger.release(reservation);
            return Err(RegistrationError::bad_request(
                "payment instrument is required for paid tickets",
            ));
        };

        // 4. Persist the PENDING registration
        let registration = Registration::new(
            cmd.event_id,
            cmd.ticket_type_id,
            buyer.clone(),
            cmd.quantity,
            Some(instrument.method),
            cmd.registered_by,
        );
        self.insert(&registration).await?;
        self.ledger.release(reservation);

        // 5. Open the payment. On failure the registration stays PENDING so
        // POST /payment can retry; reconciliation fails it after expiry.
        let payment = self
            .payments
            .handle(InitiatePaymentCommand {
                registration_id: registration.id,
                buyer,
                instrument,
            })
            .await
            .map_err(|e| {
                tracing::warn!(
                    registration_id = %registration.id,
                    error = %e,
                    "Payment could not be opened, registration left pending until retry or expiry"
                );
                e
            })?;

        tracing::info!(
            registration_id = %registration.id,
            reference = %payment.transaction.reference,
            "Paid registration awaiting payment"
        );

        Ok(RegisterForEventResult::AwaitingPayment {
            registration,
            transaction: payment.transaction,
        })
    }

    async fn register_free(
        &self,
        event_id: EventId,
        ticket_type_id: TicketTypeId,
        buyer: Buyer,
        requested: u32,
        registered_by: Option<UserId>,
        reservation: Reservation,
    ) -> Result<RegisterForEventResult, RegistrationError> {
        let registration = Registration::new(
            event_id,
            ticket_type_id,
            buyer,
            requested,
            None,
            registered_by,
        );
        self.insert(&registration).await?;
        self.ledger.release(reservation);

        let tickets = self.issuer.issue(registration.id).await?;

        let registration = self
            .registrations
            .find_by_id(&registration.id)
            .await?
            .unwrap_or(registration);

        tracing::info!(
            registration_id = %registration.id,
            tickets = tickets.len(),
            "Free registration confirmed"
        );

        Ok(RegisterForEventResult::Confirmed {
            registration,
            tickets,
        })
    }

    async fn insert(&self, registration: &Registration) -> Result<(), RegistrationError> {
        let mut uow = self.uow_factory.begin().await?;
        uow.insert_registration(registration).await?;
        uow.commit().await?;
        Ok(())
    }
}
