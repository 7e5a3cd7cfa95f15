//! ReconcilePendingPaymentsHandler - settles payments whose callback never arrived.
//!
//! Scans PENDING transactions older than `stale_after`, asks the gateway for
//! their current status, and settles them through `PaymentSettlement`, the
//! same path the webhook uses. A callback that races the job is therefore
//! applied at most once.
//!
//! Each run also closes two gaps no callback will ever fill:
//! - captured payments whose tickets were never minted get issued
//! - PENDING registrations that never got a transaction (the gateway refused
//!   to open a checkout) are failed once older than `expire_after`

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::payment::{PaymentError, PaymentOutcome, Transaction};
use crate::ports::{PaymentGateway, RegistrationRepository, TransactionRepository};

use super::settlement::{PaymentSettlement, SettlementResult};

/// Reconciliation thresholds.
#[derive(Debug, Clone)]
pub struct ReconciliationConfig {
    /// Transactions younger than this are left to the webhook.
    pub stale_after: Duration,
    /// Still-pending transactions, and unpaid registrations, older than this
    /// are failed.
    pub expire_after: Duration,
    /// Maximum transactions examined per run.
    pub batch_size: u32,
    pub gateway_timeout: Duration,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(15 * 60),
            expire_after: Duration::from_secs(24 * 60 * 60),
            batch_size: 50,
            gateway_timeout: Duration::from_secs(10),
        }
    }
}

/// Counts from one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub examined: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Failed because they stayed pending past `expire_after`.
    pub expired: usize,
    pub still_pending: usize,
    /// Captured payments whose tickets were minted by this run.
    pub recovered: usize,
    /// Registrations failed because no transaction was ever opened.
    pub abandoned: usize,
    /// Gateway or storage errors; retried next run.
    pub errors: usize,
}

enum Decision {
    Apply(PaymentOutcome, Option<String>),
    Expire,
    Wait,
}

pub struct ReconcilePendingPaymentsHandler {
    transactions: Arc<dyn TransactionRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    gateway: Arc<dyn PaymentGateway>,
    settlement: Arc<PaymentSettlement>,
    config: ReconciliationConfig,
}

impl ReconcilePendingPaymentsHandler {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        registrations: Arc<dyn RegistrationRepository>,
        gateway: Arc<dyn PaymentGateway>,
        settlement: Arc<PaymentSettlement>,
        config: ReconciliationConfig,
    ) -> Self {
        Self {
            transactions,
            registrations,
            gateway,
            settlement,
            config,
        }
    }

    /// Runs one reconciliation pass as of `now`.
    ///
    /// Only failing to list candidates aborts the run; per-item errors are
    /// counted and logged.
    pub async fn handle(&self, now: Timestamp) -> Result<ReconciliationReport, DomainError> {
        let cutoff = now.minus(self.config.stale_after);
        let expiry_cutoff = now.minus(self.config.expire_after);
        let pending = self
            .transactions
            .find_pending_older_than(cutoff, self.config.batch_size)
            .await?;

        let mut report = ReconciliationReport {
            examined: pending.len(),
            ..Default::default()
        };

        for transaction in pending {
            let decision = match self.decide(&transaction, &expiry_cutoff).await {
                Ok(decision) => decision,
                Err(e) => {
                    tracing::warn!(
                        reference = %transaction.reference,
                        error = %e,
                        "Gateway verification failed, retrying next run"
                    );
                    report.errors += 1;
                    continue;
                }
            };

            let (outcome, channel, expired) = match decision {
                Decision::Wait => {
                    report.still_pending += 1;
                    continue;
                }
                Decision::Expire => (PaymentOutcome::Failed, None, true),
                Decision::Apply(outcome, channel) => (outcome, channel, false),
            };

            match self
                .settlement
                .apply_outcome(&transaction.reference, outcome, channel)
                .await
            {
                Ok(SettlementResult::AlreadySettled { .. }) => {}
                Ok(_) => match (outcome, expired) {
                    (PaymentOutcome::Success, _) => report.succeeded += 1,
                    (PaymentOutcome::Failed, true) => report.expired += 1,
                    (PaymentOutcome::Failed, false) => report.failed += 1,
                },
                Err(e) => {
                    tracing::warn!(
                        reference = %transaction.reference,
                        error = %e,
                        "Reconciliation could not settle transaction"
                    );
                    report.errors += 1;
                }
            }
        }

        self.recover_captured(&mut report).await?;
        self.abandon_unpaid(expiry_cutoff, &mut report).await?;

        if report.examined + report.recovered + report.abandoned + report.errors > 0 {
            tracing::info!(
                examined = report.examined,
                succeeded = report.succeeded,
                failed = report.failed,
                expired = report.expired,
                still_pending = report.still_pending,
                recovered = report.recovered,
                abandoned = report.abandoned,
                errors = report.errors,
                "Reconciliation run complete"
            );
        }

        Ok(report)
    }

    async fn recover_captured(&self, report: &mut ReconciliationReport) -> Result<(), DomainError> {
        let captured = self
            .transactions
            .find_captured_unissued(self.config.batch_size)
            .await?;

        for transaction in captured {
            match self.settlement.finish_issuance(transaction).await {
                SettlementResult::Recovered { .. } => report.recovered += 1,
                SettlementResult::IssuanceFailed { .. } => report.errors += 1,
                _ => {}
            }
        }
        Ok(())
    }

    async fn abandon_unpaid(
        &self,
        cutoff: Timestamp,
        report: &mut ReconciliationReport,
    ) -> Result<(), DomainError> {
        let unpaid = self
            .registrations
            .find_unpaid_older_than(cutoff, self.config.batch_size)
            .await?;

        for registration in unpaid {
            match self.settlement.abandon_unpaid(registration.id).await {
                Ok(true) => report.abandoned += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        registration_id = %registration.id,
                        error = %e,
                        "Could not abandon unpaid registration"
                    );
                    report.errors += 1;
                }
            }
        }
        Ok(())
    }

    async fn decide(
        &self,
        transaction: &Transaction,
        expiry_cutoff: &Timestamp,
    ) -> Result<Decision, PaymentError> {
        let verified = tokio::time::timeout(
            self.config.gateway_timeout,
            self.gateway.verify(&transaction.reference),
        )
        .await
        .map_err(|_| PaymentError::timeout(self.config.gateway_timeout.as_secs()))??;

        Ok(match verified.status.outcome() {
            Some(outcome) => Decision::Apply(outcome, verified.channel),
            None if transaction.created_at.is_before(expiry_cutoff) => Decision::Expire,
            None => Decision::Wait,
        })
    }
}
