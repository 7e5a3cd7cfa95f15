//! Shared wiring for integration tests.
//!
//! Builds the full application on the in-memory store and the mock gateway,
//! with the production code generator and token renderer.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;

use boxoffice::adapters::http::ticketing::AppState;
use boxoffice::adapters::{
    InMemoryTicketingStore, MockPaymentGateway, RandomTicketCodeGenerator,
    SignedUrlTokenRenderer,
};
use boxoffice::application::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, InitiatePaymentHandler,
    InventoryLedger, PaymentSettlement, ReconcilePendingPaymentsHandler, ReconciliationConfig,
    RegisterForEventCommand, RegisterForEventHandler, TicketIssuer, TicketIssuerConfig,
    VerifyTicketHandler, DEFAULT_MAX_QUANTITY,
};
use boxoffice::domain::catalog::EventDetails;
use boxoffice::domain::foundation::{EventId, Money, Timestamp};
use boxoffice::domain::inventory::TicketType;
use boxoffice::domain::payment::{
    sign_payload, PaymentInstrument, PaymentMethod, PaymentOutcome, WebhookVerifier,
};
use boxoffice::ports::{UnitOfWork, UnitOfWorkFactory};

pub const WEBHOOK_SECRET: &str = "whsec_integration";
pub const TOKEN_SECRET: &str = "token-secret-for-integration-tests";
pub const VERIFY_BASE_URL: &str = "https://tickets.example.com/verify";

pub struct TestApp {
    pub store: InMemoryTicketingStore,
    pub gateway: MockPaymentGateway,
    pub event: EventDetails,
    pub register: Arc<RegisterForEventHandler>,
    pub initiate_payment: Arc<InitiatePaymentHandler>,
    pub webhook: Arc<HandlePaymentWebhookHandler>,
    pub verify_ticket: Arc<VerifyTicketHandler>,
    pub reconcile: Arc<ReconcilePendingPaymentsHandler>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_event(upcoming_event(false)).await
    }

    pub async fn with_event(event: EventDetails) -> Self {
        let store = InMemoryTicketingStore::new();
        store.add_event(event.clone()).await;
        let gateway = MockPaymentGateway::new();

        let shared = Arc::new(store.clone());
        let gateway_port = Arc::new(gateway.clone());
        let gateway_timeout = Duration::from_secs(5);

        let ledger = Arc::new(InventoryLedger::new(shared.clone(), shared.clone()));
        let issuer = Arc::new(TicketIssuer::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            ledger.clone(),
            Arc::new(RandomTicketCodeGenerator::new()),
            Arc::new(SignedUrlTokenRenderer::new(SecretString::new(
                TOKEN_SECRET.to_string(),
            ))),
            TicketIssuerConfig {
                verification_base_url: VERIFY_BASE_URL.to_string(),
            },
        ));
        let settlement = Arc::new(PaymentSettlement::new(shared.clone(), issuer.clone()));

        let initiate_payment = Arc::new(InitiatePaymentHandler::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared.clone(),
            gateway_port.clone(),
            shared.clone(),
            gateway_timeout,
        ));
        let register = Arc::new(RegisterForEventHandler::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared.clone(),
            ledger,
            issuer,
            initiate_payment.clone(),
            DEFAULT_MAX_QUANTITY,
        ));
        let webhook = Arc::new(HandlePaymentWebhookHandler::new(
            WebhookVerifier::new(SecretString::new(WEBHOOK_SECRET.to_string())),
            settlement.clone(),
        ));
        let verify_ticket = Arc::new(VerifyTicketHandler::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
        ));
        let reconcile = Arc::new(ReconcilePendingPaymentsHandler::new(
            shared.clone(),
            shared,
            gateway_port,
            settlement,
            ReconciliationConfig {
                stale_after: Duration::from_secs(60),
                expire_after: Duration::from_secs(3600),
                batch_size: 50,
                gateway_timeout,
            },
        ));

        Self {
            store,
            gateway,
            event,
            register,
            initiate_payment,
            webhook,
            verify_ticket,
            reconcile,
        }
    }

    /// Adds a ticket type to the test event. A price of "0" makes it free.
    pub async fn add_ticket_type(&self, name: &str, price: &str, capacity: u32) -> TicketType {
        let price: Money = price.parse().unwrap();
        let ticket_type = TicketType::new(self.event.id, name, price, capacity).unwrap();
        self.store.add_ticket_type(ticket_type.clone()).await;
        ticket_type
    }

    pub fn state(&self) -> AppState {
        AppState {
            register: self.register.clone(),
            initiate_payment: self.initiate_payment.clone(),
            webhook: self.webhook.clone(),
            verify_ticket: self.verify_ticket.clone(),
        }
    }

    pub async fn sold_count(&self, ticket_type: &TicketType) -> u32 {
        self.store
            .ticket_type(&ticket_type.id)
            .await
            .map(|tt| tt.sold_count)
            .unwrap_or_default()
    }

    /// Commits a successful capture without running issuance, as if the
    /// process stopped right after settling.
    pub async fn capture_without_issuing(&self, reference: &str) {
        let mut uow = self.store.begin().await.unwrap();
        let mut transaction = uow.lock_transaction(reference).await.unwrap().unwrap();
        transaction
            .settle(PaymentOutcome::Success, Some("card".to_string()))
            .unwrap();
        uow.update_transaction(&transaction).await.unwrap();
        uow.commit().await.unwrap();
    }
}

pub fn upcoming_event(is_virtual: bool) -> EventDetails {
    let now = Timestamp::now();
    EventDetails {
        id: EventId::new(),
        name: "RustConf Lagos".to_string(),
        venue: "Landmark Centre".to_string(),
        starts_at: now.plus_secs(86_400),
        ends_at: now.plus_secs(90_000),
        is_virtual,
    }
}

pub fn register_cmd(
    event_id: EventId,
    ticket_type: &TicketType,
    quantity: u32,
    instrument: Option<PaymentMethod>,
) -> RegisterForEventCommand {
    RegisterForEventCommand {
        event_id,
        ticket_type_id: ticket_type.id,
        quantity,
        full_name: "Ada Obi".to_string(),
        email: "ada@example.com".to_string(),
        payment_instrument: instrument.map(PaymentInstrument::new),
        registered_by: None,
    }
}

pub fn webhook_body(event: &str, reference: &str) -> Vec<u8> {
    json!({ "event": event, "data": { "reference": reference, "channel": "card" } })
        .to_string()
        .into_bytes()
}

pub fn signed_webhook(event: &str, reference: &str) -> HandlePaymentWebhookCommand {
    let payload = webhook_body(event, reference);
    HandlePaymentWebhookCommand {
        signature: Some(sign_payload(WEBHOOK_SECRET, &payload)),
        payload,
    }
}
