//! InitiatePaymentHandler - opens a gateway payment for a PENDING paid registration.
//!
//! Used by intake for new paid registrations and by `POST /payment` to resume
//! checkout. A registration never has more than one open transaction: if one
//! is already PENDING it is returned instead of opening another.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{MessageId, RegistrationId, SerializableDomainEvent, Timestamp};
use crate::domain::payment::{PaymentError, PaymentInstrument, Transaction};
use crate::domain::registration::{Buyer, IssuancePolicy, ProcessPaymentEvent};
use crate::ports::{
    EventCatalog, InitializePaymentRequest, PaymentGateway, RegistrationRepository,
    TicketTypeRepository, TransactionRepository, UnitOfWorkFactory,
};

/// Command to open (or resume) payment for a registration.
#[derive(Debug, Clone)]
pub struct InitiatePaymentCommand {
    pub registration_id: RegistrationId,
    pub buyer: Buyer,
    pub instrument: PaymentInstrument,
}

/// Result of payment initiation.
#[derive(Debug, Clone)]
pub struct InitiatePaymentResult {
    pub transaction: Transaction,
    /// True if an already-open transaction was returned.
    pub resumed: bool,
}

pub struct InitiatePaymentHandler {
    registrations: Arc<dyn RegistrationRepository>,
    ticket_types: Arc<dyn TicketTypeRepository>,
    transactions: Arc<dyn TransactionRepository>,
    catalog: Arc<dyn EventCatalog>,
    gateway: Arc<dyn PaymentGateway>,
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    gateway_timeout: Duration,
}

impl InitiatePaymentHandler {
    pub fn new(
        registrations: Arc<dyn RegistrationRepository>,
        ticket_types: Arc<dyn TicketTypeRepository>,
        transactions: Arc<dyn TransactionRepository>,
        catalog: Arc<dyn EventCatalog>,
        gateway: Arc<dyn PaymentGateway>,
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        gateway_timeout: Duration,
    ) -> Self {
        Self {
            registrations,
            ticket_types,
            transactions,
            catalog,
            gateway,
            uow_factory,
            gateway_timeout,
        }
    }

    pub async fn handle(
        &self,
        cmd: InitiatePaymentCommand,
    ) -> Result<InitiatePaymentResult, PaymentError> {
        // 1. Registration must exist and still be waiting for payment
        let registration = self
            .registrations
            .find_by_id(&cmd.registration_id)
            .await?
            .ok_or(PaymentError::RegistrationNotFound(cmd.registration_id))?;

        if !registration.is_pending() {
            return Err(PaymentError::InvalidState(format!(
                "registration {} is {}",
                registration.id, registration.status
            )));
        }

        // 2. Resume an open checkout
        if let Some(transaction) = self
            .transactions
            .find_pending_for_registration(&registration.id)
            .await?
        {
            tracing::debug!(
                registration_id = %registration.id,
                reference = %transaction.reference,
                "Returning open transaction"
            );
            return Ok(InitiatePaymentResult {
                transaction,
                resumed: true,
            });
        }

        // 3. Price the registration
        let ticket_type = self
            .ticket_types
            .find_by_id(&registration.ticket_type_id)
            .await?
            .ok_or_else(|| {
                PaymentError::InvalidState(format!(
                    "ticket type {} no longer exists",
                    registration.ticket_type_id
                ))
            })?;

        if !ticket_type.is_paid {
            return Err(PaymentError::InvalidState(
                "free ticket types do not take payment".to_string(),
            ));
        }

        let event = self
            .catalog
            .find_event(&registration.event_id)
            .await?
            .ok_or_else(|| {
                PaymentError::InvalidState(format!(
                    "event {} no longer exists",
                    registration.event_id
                ))
            })?;

        let units =
            IssuancePolicy::units_to_mint(&ticket_type, &event, registration.requested_quantity);
        let amount = IssuancePolicy::amount_due(&ticket_type, units);
        let amount_minor = amount
            .to_minor_units()
            .map_err(|e| PaymentError::InvalidAmount(e.to_string()))?;

        // 4. Open the payment with the gateway
        let request = InitializePaymentRequest {
            amount_minor,
            email: cmd.buyer.email.clone(),
            payment_method: cmd.instrument.method,
            registration_id: registration.id,
        };
        let session = tokio::time::timeout(self.gateway_timeout, self.gateway.initialize(request))
            .await
            .map_err(|_| PaymentError::timeout(self.gateway_timeout.as_secs()))??;

        // 5. Record the transaction and announce it, atomically
        let transaction = Transaction::open(
            session.reference,
            registration.id,
            amount,
            cmd.instrument.method,
            &cmd.buyer,
            session.authorization_url,
        );

        let event = ProcessPaymentEvent {
            message_id: MessageId::new(),
            registration_id: registration.id,
            transaction_reference: transaction.reference.clone(),
            authorization_url: transaction.authorization_url.clone(),
            buyer_name: cmd.buyer.full_name.clone(),
            buyer_email: cmd.buyer.email.clone(),
            amount: transaction.amount.clone(),
            payment_method: transaction.payment_method,
            requested_at: Timestamp::now(),
        };
        let envelope = event
            .to_envelope()?
            .with_correlation_id(registration.id.to_string());

        let mut uow = self.uow_factory.begin().await?;
        let still_pending = uow
            .lock_registration(&registration.id)
            .await?
            .is_some_and(|r| r.is_pending());
        if !still_pending {
            uow.rollback().await?;
            tracing::warn!(
                registration_id = %registration.id,
                reference = %transaction.reference,
                "Registration closed while checkout was opening, transaction not recorded"
            );
            return Err(PaymentError::InvalidState(format!(
                "registration {} is no longer pending",
                registration.id
            )));
        }
        uow.insert_transaction(&transaction).await?;
        uow.stage_event(envelope).await?;
        uow.commit().await?;

        tracing::info!(
            registration_id = %registration.id,
            reference = %transaction.reference,
            amount = %transaction.amount,
            "Payment initiated"
        );

        Ok(InitiatePaymentResult {
            transaction,
            resumed: false,
        })
    }
}
