//! PaymentSettlement - applies a final payment outcome exactly once.
//!
//! Shared by the webhook handler and the reconciliation job. The transaction
//! row is locked for the whole check-then-write, so a callback racing the job
//! (or a redelivered callback) finds the transaction already settled and
//! becomes a no-op.
//!
//! Settling and issuing are separate units of work. A captured payment whose
//! registration is still PENDING (the process stopped between the two) is
//! picked up again by the next redelivery or reconciliation run.

use std::sync::Arc;

use crate::application::handlers::ticket::TicketIssuer;
use crate::domain::foundation::{RegistrationId, SerializableDomainEvent};
use crate::domain::payment::{
    PaymentOutcome, PaymentStatusEvent, SettlementError, Transaction, TransactionStatus,
};
use crate::domain::ticket::{IssuanceError, Ticket};
use crate::ports::{UnitOfWork, UnitOfWorkFactory};

/// What applying an outcome did.
#[derive(Debug, Clone)]
pub enum SettlementResult {
    /// The transaction moved to a terminal status. For SUCCESS, `tickets`
    /// holds the minted tickets.
    Settled {
        transaction: Transaction,
        tickets: Vec<Ticket>,
    },
    /// Payment was captured but tickets could not be minted. The
    /// registration is FAILED and operators must follow up.
    IssuanceFailed {
        transaction: Transaction,
        error: IssuanceError,
    },
    /// The payment had been captured earlier but its tickets were never
    /// minted; they were minted now.
    Recovered {
        transaction: Transaction,
        tickets: Vec<Ticket>,
    },
    /// The transaction had already reached a terminal status.
    AlreadySettled { status: TransactionStatus },
}

enum Settle {
    Applied(Transaction),
    AlreadyTerminal(TransactionStatus),
    CapturedUnissued(Transaction),
}

pub struct PaymentSettlement {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    issuer: Arc<TicketIssuer>,
}

impl PaymentSettlement {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>, issuer: Arc<TicketIssuer>) -> Self {
        Self {
            uow_factory,
            issuer,
        }
    }

    pub async fn apply_outcome(
        &self,
        reference: &str,
        outcome: PaymentOutcome,
        channel: Option<String>,
    ) -> Result<SettlementResult, SettlementError> {
        let mut uow = self.uow_factory.begin().await?;

        let transaction = match self
            .settle_in(uow.as_mut(), reference, outcome, channel)
            .await
        {
            Ok(Settle::Applied(transaction)) => transaction,
            Ok(Settle::AlreadyTerminal(status)) => {
                uow.rollback().await?;
                tracing::info!(reference, status = %status, "Transaction already settled");
                return Ok(SettlementResult::AlreadySettled { status });
            }
            Ok(Settle::CapturedUnissued(transaction)) => {
                uow.rollback().await?;
                tracing::warn!(
                    reference,
                    registration_id = %transaction.registration_id,
                    "Captured payment has no tickets, resuming issuance"
                );
                return Ok(self.finish_issuance(transaction).await);
            }
            Err(e) => {
                if let Err(rollback_err) = uow.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                return Err(e);
            }
        };

        uow.commit().await?;
        tracing::info!(
            reference,
            registration_id = %transaction.registration_id,
            status = %transaction.status,
            "Payment settled"
        );

        if transaction.status != TransactionStatus::Success {
            return Ok(SettlementResult::Settled {
                transaction,
                tickets: Vec::new(),
            });
        }

        match self.issuer.issue(transaction.registration_id).await {
            Ok(tickets) => Ok(SettlementResult::Settled {
                transaction,
                tickets,
            }),
            Err(error) => {
                tracing::error!(
                    reference,
                    registration_id = %transaction.registration_id,
                    error = %error,
                    "Payment captured but ticket issuance failed"
                );
                Ok(SettlementResult::IssuanceFailed { transaction, error })
            }
        }
    }

    /// Mints the tickets of a captured payment whose registration is still
    /// PENDING. Safe to call concurrently with any other issuance attempt.
    pub async fn finish_issuance(&self, transaction: Transaction) -> SettlementResult {
        match self.issuer.resume(transaction.registration_id).await {
            Ok(Some(tickets)) => {
                tracing::info!(
                    reference = %transaction.reference,
                    registration_id = %transaction.registration_id,
                    tickets = tickets.len(),
                    "Issuance recovered for captured payment"
                );
                SettlementResult::Recovered {
                    transaction,
                    tickets,
                }
            }
            Ok(None) => SettlementResult::AlreadySettled {
                status: transaction.status,
            },
            Err(error) => {
                tracing::error!(
                    reference = %transaction.reference,
                    registration_id = %transaction.registration_id,
                    error = %error,
                    "Payment captured but ticket issuance failed"
                );
                SettlementResult::IssuanceFailed { transaction, error }
            }
        }
    }

    /// Fails a PENDING registration that never got a transaction.
    ///
    /// Returns `false` if the registration gained a transaction or left
    /// PENDING since it was listed.
    pub async fn abandon_unpaid(
        &self,
        registration_id: RegistrationId,
    ) -> Result<bool, SettlementError> {
        let mut uow = self.uow_factory.begin().await?;

        let Some(mut registration) = uow.lock_registration(&registration_id).await? else {
            uow.rollback().await?;
            return Ok(false);
        };
        if !registration.is_pending() || uow.has_transaction(&registration_id).await? {
            uow.rollback().await?;
            return Ok(false);
        }

        registration
            .fail()
            .map_err(|e| SettlementError::Infrastructure(e.to_string()))?;
        uow.update_registration(&registration).await?;
        uow.commit().await?;

        tracing::info!(
            registration_id = %registration_id,
            "Unpaid registration abandoned"
        );
        Ok(true)
    }

    async fn settle_in(
        &self,
        uow: &mut dyn UnitOfWork,
        reference: &str,
        outcome: PaymentOutcome,
        channel: Option<String>,
    ) -> Result<Settle, SettlementError> {
        let mut transaction = uow
            .lock_transaction(reference)
            .await?
            .ok_or_else(|| SettlementError::TransactionNotFound(reference.to_string()))?;

        if transaction.is_settled() {
            if transaction.status == TransactionStatus::Success {
                let stranded = uow
                    .lock_registration(&transaction.registration_id)
                    .await?
                    .is_some_and(|registration| registration.is_pending());
                if stranded {
                    return Ok(Settle::CapturedUnissued(transaction));
                }
            }
            return Ok(Settle::AlreadyTerminal(transaction.status));
        }

        transaction
            .settle(outcome, channel)
            .map_err(|e| SettlementError::Infrastructure(e.to_string()))?;
        uow.update_transaction(&transaction).await?;

        if outcome == PaymentOutcome::Failed {
            if let Some(mut registration) =
                uow.lock_registration(&transaction.registration_id).await?
            {
                if registration.is_pending() {
                    registration
                        .fail()
                        .map_err(|e| SettlementError::Infrastructure(e.to_string()))?;
                    uow.update_registration(&registration).await?;
                }
            }
        }

        let envelope = PaymentStatusEvent::for_transaction(&transaction)
            .to_envelope()?
            .with_correlation_id(transaction.registration_id.to_string());
        uow.stage_event(envelope).await?;

        Ok(Settle::Applied(transaction))
    }
}
