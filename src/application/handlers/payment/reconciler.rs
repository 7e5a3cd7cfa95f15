//! PaymentReconciler - runs reconciliation on an interval.
//!
//! ## Graceful Shutdown
//!
//! The loop listens on a watch channel and returns once `true` is sent.
//! A run in progress completes first.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::domain::foundation::Timestamp;

use super::reconcile_pending_payments::ReconcilePendingPaymentsHandler;

pub struct PaymentReconciler {
    handler: Arc<ReconcilePendingPaymentsHandler>,
    interval: Duration,
}

impl PaymentReconciler {
    pub fn new(handler: Arc<ReconcilePendingPaymentsHandler>, interval: Duration) -> Self {
        Self { handler, interval }
    }

    /// Run until the shutdown signal is received.
    ///
    /// A failed run is logged and retried on the next tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("Payment reconciler stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.handler.handle(Timestamp::now()).await {
                        tracing::error!(error = %e, "Payment reconciliation run failed");
                    }
                }
            }
        }
    }
}
