//! HTTP handlers for the ticketing endpoints.
//!
//! Handlers are thin: extract, build a command, call the application handler,
//! map the result.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, InitiatePaymentCommand,
    InitiatePaymentHandler, RegisterForEventCommand, RegisterForEventHandler,
    VerifyTicketCommand, VerifyTicketHandler,
};
use crate::domain::foundation::{ErrorCode, EventId, UserId};
use crate::domain::payment::{PaymentError, WebhookError};
use crate::domain::registration::{Buyer, RegistrationError};
use crate::domain::ticket::TicketError;

use super::dto::{
    ErrorResponse, HealthResponse, InitiatePaymentRequest, PaymentResponse, RegisterRequest,
    RegistrationResponse, VerifyTicketResponse, WebhookAck,
};

/// Header carrying the hex HMAC-SHA512 of the webhook body.
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Header carrying the principal authenticated upstream.
pub const USER_ID_HEADER: &str = "X-User-Id";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state.
///
/// Cloned per request; every handler is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub register: Arc<RegisterForEventHandler>,
    pub initiate_payment: Arc<InitiatePaymentHandler>,
    pub webhook: Arc<HandlePaymentWebhookHandler>,
    pub verify_ticket: Arc<VerifyTicketHandler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Principal
// ════════════════════════════════════════════════════════════════════════════════

/// Caller identity forwarded by the upstream auth collaborator.
///
/// Anonymous purchases are allowed, so a missing header yields `Principal(None)`.
/// A header that is present but empty is rejected.
#[derive(Debug, Clone)]
pub struct Principal(pub Option<UserId>);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(Principal(None));
        };

        let user_id = value
            .to_str()
            .ok()
            .and_then(|s| UserId::new(s).ok())
            .ok_or_else(|| {
                ApiError::new(
                    StatusCode::UNAUTHORIZED,
                    ErrorCode::Unauthorized,
                    format!("Invalid {} header", USER_ID_HEADER),
                )
            })?;

        Ok(Principal(Some(user_id)))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /events/:event_id/registrations - Register for an event
pub async fn register_for_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    principal: Principal,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id: EventId = event_id.parse().map_err(|_| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::InvalidFormat,
            format!("Invalid event id: {}", event_id),
        )
    })?;

    let cmd = RegisterForEventCommand {
        event_id,
        ticket_type_id: request.ticket_type_id,
        quantity: request.quantity,
        full_name: request.full_name,
        email: request.email,
        payment_instrument: request.payment_instrument,
        registered_by: principal.0,
    };

    let result = state.register.handle(cmd).await?;

    Ok(Json(RegistrationResponse::from(result)))
}

/// POST /payment - Open or resume checkout for a PENDING paid registration
pub async fn initiate_payment(
    State(state): State<AppState>,
    Json(request): Json<InitiatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let buyer = Buyer::new(request.buyer_name, request.buyer_email).map_err(|e| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::ValidationFailed,
            e.to_string(),
        )
    })?;

    let cmd = InitiatePaymentCommand {
        registration_id: request.registration_id,
        buyer,
        instrument: request.payment_instrument,
    };

    let result = state.initiate_payment.handle(cmd).await?;

    Ok(Json(PaymentResponse::from(&result.transaction)))
}

/// POST /webhook - Payment gateway callback
///
/// The body is taken as raw bytes so the signature is checked over exactly
/// what was sent. Duplicates are acknowledged with 200.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    match state.webhook.handle(cmd).await {
        Ok(_) => (StatusCode::OK, Json(WebhookAck { received: true })).into_response(),
        Err(WebhookError::AlreadyProcessed(_)) => {
            (StatusCode::OK, Json(WebhookAck { received: true })).into_response()
        }
        Err(e) => {
            let body = ErrorResponse::new(webhook_error_code(&e), e.to_string());
            (e.status_code(), Json(body)).into_response()
        }
    }
}

/// GET /tickets/verify/:code - Check a ticket in
pub async fn verify_ticket(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.verify_ticket.handle(VerifyTicketCommand { code }).await?;

    Ok(Json(VerifyTicketResponse {
        code: result.ticket.code.as_str().to_string(),
        status: result.ticket.status.as_str().to_string(),
        admitted: result.admitted_now,
        event_id: result.ticket.event_id,
        ticket_type_id: result.ticket.ticket_type_id,
    }))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

fn webhook_error_code(err: &WebhookError) -> &'static str {
    match err {
        WebhookError::MissingSignature => "MISSING_SIGNATURE",
        WebhookError::InvalidSignature => "INVALID_SIGNATURE",
        WebhookError::ParseError(_) => "INVALID_PAYLOAD",
        WebhookError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
        WebhookError::AlreadyProcessed(_) => "ALREADY_PROCESSED",
        WebhookError::Database(_) => "INTERNAL_ERROR",
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error converted to `(StatusCode, Json<ErrorResponse>)`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: ErrorCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn from_code(code: ErrorCode, message: String) -> Self {
        let status = status_for(code);
        // Infrastructure details stay in the logs.
        let message = if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            tracing::error!(error_code = %code, error = %message, "Request failed");
            "Internal server error".to_string()
        } else {
            message
        };
        Self::new(status, code, message)
    }
}

/// HTTP status for each error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed
        | ErrorCode::EmptyField
        | ErrorCode::OutOfRange
        | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,
        ErrorCode::EventNotFound
        | ErrorCode::TicketTypeNotFound
        | ErrorCode::RegistrationNotFound
        | ErrorCode::TransactionNotFound
        | ErrorCode::TicketNotFound => StatusCode::NOT_FOUND,
        ErrorCode::OutOfStock | ErrorCode::InvalidStateTransition | ErrorCode::Conflict => {
            StatusCode::CONFLICT
        }
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::PaymentGatewayError => StatusCode::BAD_GATEWAY,
        ErrorCode::DatabaseError | ErrorCode::BrokerUnavailable | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        Self::from_code(err.code(), err.to_string())
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self::from_code(err.code(), err.to_string())
    }
}

impl From<TicketError> for ApiError {
    fn from(err: TicketError) -> Self {
        let code = match &err {
            TicketError::NotFound(_) => ErrorCode::TicketNotFound,
            TicketError::Infrastructure(_) => ErrorCode::DatabaseError,
        };
        Self::from_code(code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(self.code.to_string(), self.message);
        (self.status, Json(body)).into_response()
    }
}
