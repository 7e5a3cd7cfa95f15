//! End-to-end purchase scenarios over the in-memory store.
//!
//! Free registration, sold-out paid registration, paid registration settled by
//! webhook, and the reconciliation fallback when no webhook arrives.

mod common;

use boxoffice::application::{
    HandlePaymentWebhookResult, InitiatePaymentCommand, RegisterForEventResult,
    VerifyTicketCommand,
};
use boxoffice::domain::foundation::{EventId, RegistrationId, Timestamp};
use boxoffice::domain::payment::{PaymentError, PaymentInstrument, PaymentMethod, TransactionStatus};
use boxoffice::domain::registration::{RegistrationError, RegistrationStatus};
use boxoffice::domain::ticket::TicketStatus;
use boxoffice::ports::GatewayPaymentStatus;

use common::{register_cmd, signed_webhook, upcoming_event, TestApp, VERIFY_BASE_URL};

// =============================================================================
// Free registrations
// =============================================================================

#[tokio::test]
async fn free_registration_is_coerced_to_one_ticket() {
    let app = TestApp::new().await;
    let general = app.add_ticket_type("General", "0", 100).await;

    let result = app
        .register
        .handle(register_cmd(app.event.id, &general, 3, None))
        .await
        .unwrap();

    let RegisterForEventResult::Confirmed {
        registration,
        tickets,
    } = result
    else {
        panic!("free registration should confirm immediately");
    };
    assert_eq!(registration.status, RegistrationStatus::Confirmed);
    assert_eq!(registration.requested_quantity, 3);
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].status, TicketStatus::Active);
    assert!(tickets[0].verification_url.starts_with(VERIFY_BASE_URL));
    assert!(tickets[0]
        .verification_url
        .contains(tickets[0].code.as_str()));
    assert_eq!(app.sold_count(&general).await, 1);
    assert!(app.gateway.initialize_calls().is_empty());
    assert_eq!(
        app.store.outbox_event_types().await,
        vec!["tickets.purchased.v1".to_string()]
    );
}

#[tokio::test]
async fn free_registration_ignores_payment_instrument() {
    let app = TestApp::new().await;
    let general = app.add_ticket_type("General", "0", 10).await;

    let result = app
        .register
        .handle(register_cmd(
            app.event.id,
            &general,
            1,
            Some(PaymentMethod::Card),
        ))
        .await
        .unwrap();

    assert!(matches!(result, RegisterForEventResult::Confirmed { .. }));
    assert!(app.store.transactions().await.is_empty());
}

#[tokio::test]
async fn last_free_ticket_deactivates_the_type() {
    let app = TestApp::new().await;
    let general = app.add_ticket_type("General", "0", 1).await;

    app.register
        .handle(register_cmd(app.event.id, &general, 1, None))
        .await
        .unwrap();
    let err = app
        .register
        .handle(register_cmd(app.event.id, &general, 1, None))
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::OutOfStock { remaining: 0, .. }));
    let stored = app.store.ticket_type(&general.id).await.unwrap();
    assert_eq!(stored.sold_count, 1);
    assert!(!stored.is_active);
    assert_eq!(app.store.registrations().await.len(), 1);
}

// =============================================================================
// Paid registrations
// =============================================================================

#[tokio::test]
async fn sold_out_paid_registration_has_no_side_effects() {
    let app = TestApp::new().await;
    let vip = app.add_ticket_type("VIP", "50.00", 2).await;

    let first = app
        .register
        .handle(register_cmd(app.event.id, &vip, 2, Some(PaymentMethod::Card)))
        .await
        .unwrap();
    let RegisterForEventResult::AwaitingPayment { transaction, .. } = first else {
        panic!("paid registration should await payment");
    };
    app.webhook
        .handle(signed_webhook("charge.success", &transaction.reference))
        .await
        .unwrap();
    let registrations_before = app.store.registrations().await.len();
    let outbox_before = app.store.outbox_entries().await.len();

    let err = app
        .register
        .handle(register_cmd(app.event.id, &vip, 1, Some(PaymentMethod::Card)))
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::OutOfStock { requested: 1, .. }));
    assert_eq!(app.store.registrations().await.len(), registrations_before);
    assert_eq!(app.store.transactions().await.len(), 1);
    assert_eq!(app.store.outbox_entries().await.len(), outbox_before);
    assert_eq!(app.gateway.initialize_calls().len(), 1);
}

#[tokio::test]
async fn paid_registration_without_instrument_is_rejected() {
    let app = TestApp::new().await;
    let vip = app.add_ticket_type("VIP", "50.00", 10).await;

    let err = app
        .register
        .handle(register_cmd(app.event.id, &vip, 1, None))
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::BadRequest(_)));
    assert!(app.store.registrations().await.is_empty());
    assert!(app.gateway.initialize_calls().is_empty());
}

#[tokio::test]
async fn paid_registration_then_webhook_issues_tickets() {
    let app = TestApp::new().await;
    let vip = app.add_ticket_type("VIP", "49.995", 10).await;

    let result = app
        .register
        .handle(register_cmd(app.event.id, &vip, 2, Some(PaymentMethod::Card)))
        .await
        .unwrap();
    let RegisterForEventResult::AwaitingPayment {
        registration,
        transaction,
    } = result
    else {
        panic!("paid registration should await payment");
    };
    assert_eq!(registration.status, RegistrationStatus::Pending);
    assert_eq!(transaction.status, TransactionStatus::Pending);
    assert_eq!(app.sold_count(&vip).await, 0);
    assert_eq!(
        app.store.outbox_event_types().await,
        vec!["payment.requested.v1".to_string()]
    );
    // 2 x 49.995 = 99.99 -> 9999 minor units
    assert_eq!(app.gateway.initialize_calls()[0].amount_minor, 9999);

    let settled = app
        .webhook
        .handle(signed_webhook("charge.success", &transaction.reference))
        .await
        .unwrap();

    assert!(matches!(
        settled,
        HandlePaymentWebhookResult::Settled {
            status: TransactionStatus::Success,
            tickets_issued: 2,
            ..
        }
    ));
    assert_eq!(
        app.store.registration(&registration.id).await.unwrap().status,
        RegistrationStatus::Confirmed
    );
    assert_eq!(app.sold_count(&vip).await, 2);
    assert_eq!(app.store.tickets().await.len(), 2);
    assert_eq!(
        app.store.outbox_event_types().await,
        vec![
            "payment.requested.v1".to_string(),
            "payment.status.v1".to_string(),
            "tickets.purchased.v1".to_string(),
        ]
    );
}

#[tokio::test]
async fn failed_charge_mints_nothing() {
    let app = TestApp::new().await;
    let vip = app.add_ticket_type("VIP", "50.00", 10).await;
    let RegisterForEventResult::AwaitingPayment {
        registration,
        transaction,
    } = app
        .register
        .handle(register_cmd(app.event.id, &vip, 1, Some(PaymentMethod::Ussd)))
        .await
        .unwrap()
    else {
        panic!("paid registration should await payment");
    };

    app.webhook
        .handle(signed_webhook("charge.failed", &transaction.reference))
        .await
        .unwrap();

    assert_eq!(
        app.store.registration(&registration.id).await.unwrap().status,
        RegistrationStatus::Failed
    );
    assert!(app.store.tickets().await.is_empty());
    assert_eq!(app.sold_count(&vip).await, 0);
}

#[tokio::test]
async fn virtual_event_sells_one_pass_per_registration() {
    let app = TestApp::with_event(upcoming_event(true)).await;
    let pass = app.add_ticket_type("Stream", "20.00", 10).await;

    let RegisterForEventResult::AwaitingPayment { transaction, .. } = app
        .register
        .handle(register_cmd(app.event.id, &pass, 4, Some(PaymentMethod::Card)))
        .await
        .unwrap()
    else {
        panic!("paid registration should await payment");
    };
    assert_eq!(transaction.amount.to_string(), "20.00");

    app.webhook
        .handle(signed_webhook("charge.success", &transaction.reference))
        .await
        .unwrap();

    assert_eq!(app.store.tickets().await.len(), 1);
    assert_eq!(app.sold_count(&pass).await, 1);
}

#[tokio::test]
async fn unknown_event_is_not_found() {
    let app = TestApp::new().await;
    let general = app.add_ticket_type("General", "0", 10).await;

    let err = app
        .register
        .handle(register_cmd(EventId::new(), &general, 1, None))
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::EventNotFound(_)));
}

// =============================================================================
// Reconciliation
// =============================================================================

#[tokio::test]
async fn reconciliation_settles_payment_without_webhook() {
    let app = TestApp::new().await;
    let vip = app.add_ticket_type("VIP", "50.00", 10).await;
    let RegisterForEventResult::AwaitingPayment {
        registration,
        transaction,
    } = app
        .register
        .handle(register_cmd(app.event.id, &vip, 1, Some(PaymentMethod::Card)))
        .await
        .unwrap()
    else {
        panic!("paid registration should await payment");
    };
    app.store.backdate_transaction(&transaction.reference, 120).await;
    app.gateway
        .set_status(transaction.reference.clone(), GatewayPaymentStatus::Success);

    let report = app.reconcile.handle(Timestamp::now()).await.unwrap();

    assert_eq!(report.examined, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(
        app.store.registration(&registration.id).await.unwrap().status,
        RegistrationStatus::Confirmed
    );
    assert_eq!(app.store.tickets().await.len(), 1);

    // A late webhook finds the transaction already settled.
    let late = app
        .webhook
        .handle(signed_webhook("charge.success", &transaction.reference))
        .await;
    assert!(late.is_err());
    assert_eq!(app.store.tickets().await.len(), 1);
}

#[tokio::test]
async fn reconciliation_leaves_fresh_transactions_to_the_webhook() {
    let app = TestApp::new().await;
    let vip = app.add_ticket_type("VIP", "50.00", 10).await;
    app.register
        .handle(register_cmd(app.event.id, &vip, 1, Some(PaymentMethod::Card)))
        .await
        .unwrap();

    let report = app.reconcile.handle(Timestamp::now()).await.unwrap();

    assert_eq!(report.examined, 0);
    assert!(app.gateway.verify_calls().is_empty());
}

// =============================================================================
// Interrupted purchases
// =============================================================================

async fn captured_but_unissued(app: &TestApp, quantity: u32) -> (RegistrationId, String) {
    let vip = app.add_ticket_type("VIP", "50.00", 10).await;
    let RegisterForEventResult::AwaitingPayment {
        registration,
        transaction,
    } = app
        .register
        .handle(register_cmd(app.event.id, &vip, quantity, Some(PaymentMethod::Card)))
        .await
        .unwrap()
    else {
        panic!("paid registration should await payment");
    };
    app.capture_without_issuing(&transaction.reference).await;
    (registration.id, transaction.reference)
}

#[tokio::test]
async fn redelivered_webhook_issues_tickets_for_interrupted_capture() {
    let app = TestApp::new().await;
    let (registration_id, reference) = captured_but_unissued(&app, 2).await;

    let result = app
        .webhook
        .handle(signed_webhook("charge.success", &reference))
        .await
        .unwrap();

    assert!(matches!(
        result,
        HandlePaymentWebhookResult::Recovered { tickets_issued: 2, .. }
    ));
    assert_eq!(
        app.store.registration(&registration_id).await.unwrap().status,
        RegistrationStatus::Confirmed
    );
    assert_eq!(app.store.tickets().await.len(), 2);
    assert!(app
        .store
        .outbox_event_types()
        .await
        .contains(&"tickets.purchased.v1".to_string()));
}

#[tokio::test]
async fn reconciliation_issues_tickets_for_interrupted_capture() {
    let app = TestApp::new().await;
    let (registration_id, reference) = captured_but_unissued(&app, 1).await;

    let report = app.reconcile.handle(Timestamp::now()).await.unwrap();

    assert_eq!(report.recovered, 1);
    assert_eq!(
        app.store.registration(&registration_id).await.unwrap().status,
        RegistrationStatus::Confirmed
    );
    assert_eq!(app.store.tickets().await.len(), 1);

    // Nothing left for a redelivery to do.
    let late = app
        .webhook
        .handle(signed_webhook("charge.success", &reference))
        .await;
    assert!(late.is_err());
    assert_eq!(app.store.tickets().await.len(), 1);
}

#[tokio::test]
async fn refused_checkout_does_not_leave_registration_pending_forever() {
    let app = TestApp::new().await;
    let vip = app.add_ticket_type("VIP", "50.00", 10).await;
    app.gateway.fail_initialize(PaymentError::Unauthorized);

    let err = app
        .register
        .handle(register_cmd(app.event.id, &vip, 1, Some(PaymentMethod::Card)))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Payment(PaymentError::Unauthorized)));
    let registration = app.store.registrations().await.remove(0);
    assert_eq!(registration.status, RegistrationStatus::Pending);

    // Inside the retry window nothing changes.
    let report = app.reconcile.handle(Timestamp::now()).await.unwrap();
    assert_eq!(report.abandoned, 0);

    let report = app
        .reconcile
        .handle(Timestamp::now().plus_secs(2 * 3600))
        .await
        .unwrap();

    assert_eq!(report.abandoned, 1);
    assert_eq!(
        app.store.registration(&registration.id).await.unwrap().status,
        RegistrationStatus::Failed
    );
    assert_eq!(app.sold_count(&vip).await, 0);

    // An abandoned registration takes no further payment.
    let retry = app
        .initiate_payment
        .handle(InitiatePaymentCommand {
            registration_id: registration.id,
            buyer: registration.buyer.clone(),
            instrument: PaymentInstrument::new(PaymentMethod::Card),
        })
        .await;
    assert!(matches!(retry, Err(PaymentError::InvalidState(_))));
}

// =============================================================================
// Check-in
// =============================================================================

#[tokio::test]
async fn issued_ticket_is_admitted_once() {
    let app = TestApp::new().await;
    let general = app.add_ticket_type("General", "0", 10).await;
    let RegisterForEventResult::Confirmed { tickets, .. } = app
        .register
        .handle(register_cmd(app.event.id, &general, 1, None))
        .await
        .unwrap()
    else {
        panic!("free registration should confirm immediately");
    };
    let code = tickets[0].code.as_str().to_string();

    let first = app
        .verify_ticket
        .handle(VerifyTicketCommand { code: code.clone() })
        .await
        .unwrap();
    let second = app
        .verify_ticket
        .handle(VerifyTicketCommand { code })
        .await
        .unwrap();

    assert!(first.admitted_now);
    assert_eq!(first.ticket.status, TicketStatus::Used);
    assert!(!second.admitted_now);
    assert_eq!(second.ticket.status, TicketStatus::Used);
}
