//! Boxoffice server binary.
//!
//! Wires configuration, storage, the payment gateway and the HTTP API, then
//! runs the outbox relay and the payment reconciler next to the server until
//! Ctrl+C.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use boxoffice::adapters::http::app_router;
use boxoffice::adapters::http::ticketing::AppState;
use boxoffice::adapters::postgres::{
    PostgresEventCatalog, PostgresOutboxStore, PostgresRegistrationRepository,
    PostgresTicketRepository, PostgresTicketTypeRepository, PostgresTransactionRepository,
    PostgresUnitOfWorkFactory, MIGRATOR,
};
use boxoffice::adapters::{
    InMemoryEventBus, OutboxPublisher, PaystackGateway, RandomTicketCodeGenerator,
    RedisEventPublisher, SignedUrlTokenRenderer, DEFAULT_RETENTION,
};
use boxoffice::application::{
    HandlePaymentWebhookHandler, InitiatePaymentHandler, InventoryLedger, PaymentReconciler,
    PaymentSettlement, ReconcilePendingPaymentsHandler, RegisterForEventHandler, TicketIssuer,
    TicketIssuerConfig, VerifyTicketHandler,
};
use boxoffice::config::AppConfig;
use boxoffice::domain::payment::WebhookVerifier;
use boxoffice::ports::EventPublisher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    tracing::info!(
        environment = ?config.server.environment,
        live_payments = config.payment.is_live_mode(),
        "Starting boxoffice"
    );

    // Storage
    let pool = config.database.connect().await?;
    if config.database.run_migrations {
        MIGRATOR.run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let uow_factory = Arc::new(PostgresUnitOfWorkFactory::new(pool.clone()));
    let ticket_types = Arc::new(PostgresTicketTypeRepository::new(pool.clone()));
    let registrations = Arc::new(PostgresRegistrationRepository::new(pool.clone()));
    let transactions = Arc::new(PostgresTransactionRepository::new(pool.clone()));
    let tickets = Arc::new(PostgresTicketRepository::new(pool.clone()));
    let catalog = Arc::new(PostgresEventCatalog::new(pool.clone()));
    let outbox = Arc::new(PostgresOutboxStore::new(pool));

    // External services
    let gateway = Arc::new(PaystackGateway::new(config.payment.paystack())?);
    let gateway_timeout = config.payment.timeout();

    // Application services
    let ledger = Arc::new(InventoryLedger::new(ticket_types.clone(), uow_factory.clone()));
    let issuer = Arc::new(TicketIssuer::new(
        uow_factory.clone(),
        tickets.clone(),
        catalog.clone(),
        ledger.clone(),
        Arc::new(RandomTicketCodeGenerator::new()),
        Arc::new(SignedUrlTokenRenderer::new(
            config.ticketing.token_secret.clone(),
        )),
        TicketIssuerConfig {
            verification_base_url: config.ticketing.verification_base_url.clone(),
        },
    ));
    let settlement = Arc::new(PaymentSettlement::new(uow_factory.clone(), issuer.clone()));

    let initiate_payment = Arc::new(InitiatePaymentHandler::new(
        registrations.clone(),
        ticket_types.clone(),
        transactions.clone(),
        catalog.clone(),
        gateway.clone(),
        uow_factory.clone(),
        gateway_timeout,
    ));
    let register = Arc::new(RegisterForEventHandler::new(
        catalog.clone(),
        ticket_types,
        registrations.clone(),
        uow_factory.clone(),
        ledger,
        issuer,
        initiate_payment.clone(),
        config.ticketing.max_quantity,
    ));
    let webhook = Arc::new(HandlePaymentWebhookHandler::new(
        WebhookVerifier::new(config.payment.webhook_secret()),
        settlement.clone(),
    ));
    let verify_ticket = Arc::new(VerifyTicketHandler::new(uow_factory, tickets, catalog));
    let reconcile = Arc::new(ReconcilePendingPaymentsHandler::new(
        transactions,
        registrations,
        gateway,
        settlement,
        config.ticketing.reconciliation(gateway_timeout),
    ));

    // Background workers
    let publisher: Arc<dyn EventPublisher> = match &config.redis.url {
        Some(url) => {
            let redis = RedisEventPublisher::connect(url).await?;
            let redis = match &config.redis.channel_prefix {
                Some(prefix) => redis.with_channel_prefix(prefix.clone()),
                None => redis,
            };
            tracing::info!("Publishing events to Redis");
            Arc::new(redis)
        }
        None => {
            tracing::warn!(
                retention = DEFAULT_RETENTION,
                "Redis not configured, events are routed in process only"
            );
            Arc::new(InMemoryEventBus::new())
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let relay = OutboxPublisher::with_config(outbox, publisher, config.outbox.publisher_config());
    let relay_shutdown = shutdown_rx.clone();
    let relay_task = tokio::spawn(async move {
        if let Err(e) = relay.run(relay_shutdown).await {
            tracing::error!(error = %e, "Outbox relay stopped");
        }
    });

    let reconciler = PaymentReconciler::new(reconcile, config.ticketing.reconcile_interval());
    let reconciler_task = tokio::spawn(async move {
        reconciler.run(shutdown_rx).await;
    });

    // HTTP
    let state = AppState {
        register,
        initiate_payment,
        webhook,
        verify_ticket,
    };
    let app = app_router(
        state,
        config.server.request_timeout(),
        &config.server.cors_origins_list(),
    );

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, draining background workers");
    let _ = shutdown_tx.send(true);
    let _ = tokio::join!(relay_task, reconciler_task);

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let (json, pretty) = if config.server.json_logs() {
        (Some(fmt::layer().json()), None)
    } else {
        (None, Some(fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
