//! Coin top-up handlers and the Midtrans notification webhook.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use atelier_core::{OrderId, PaymentRecord, PaymentStatus, Settlement, DEFAULT_DISPLAY_NAME};
use atelier_store::{Store, StoreError};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::gateway::{SnapSession, TopupOrder};
use crate::state::AppState;

/// Top-up request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopupRequest {
    /// Client-generated order ID.
    #[serde(default)]
    pub order_id: Option<String>,
    /// Amount in rupiah.
    #[serde(default)]
    pub amount: Option<i64>,
    /// Coins credited on settlement.
    #[serde(default)]
    pub coins: Option<i64>,
}

/// Start a coin top-up: record a pending payment and open a Snap session.
pub async fn create_topup(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(body): ApiJson<TopupRequest>,
) -> Result<Json<SnapSession>, ApiError> {
    let (Some(order_id), Some(amount), Some(coins)) = (body.order_id, body.amount, body.coins)
    else {
        return Err(ApiError::InvalidArgument(
            "orderId, amount and coins are required".into(),
        ));
    };
    if amount == 0 || coins == 0 {
        return Err(ApiError::InvalidArgument(
            "amount and coins must be non-zero".into(),
        ));
    }
    let order_id = OrderId::new(order_id)
        .map_err(|e| ApiError::InvalidArgument(format!("invalid orderId: {e}")))?;
    let record = PaymentRecord::pending(order_id, auth.user_id.clone(), amount, coins)?;

    let gateway = state.gateway.as_ref().ok_or_else(|| ApiError::Internal {
        message: "Payment gateway not configured".into(),
        detail: None,
    })?;

    let account = state.store.get_account(&auth.user_id)?;
    let customer_name = auth
        .name
        .clone()
        .or_else(|| account.as_ref().map(|a| a.public_name().to_string()))
        .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());
    let customer_email = auth
        .email
        .clone()
        .or_else(|| account.as_ref().and_then(|a| a.email.clone()));

    state.store.create_payment(&record).map_err(|e| match e {
        StoreError::AlreadyExists { id, .. } => {
            ApiError::InvalidArgument(format!("orderId already used: {id}"))
        }
        other => other.into(),
    })?;

    let order = TopupOrder {
        order_id: record.order_id.to_string(),
        amount,
        coins,
        customer_name,
        customer_email,
    };

    // The pending record stays behind on failure; it is simply never settled.
    let session = gateway.create_session(&order).await.map_err(|e| {
        tracing::error!(order_id = %record.order_id, error = %e, "Midtrans transaction failed");
        ApiError::internal("Failed to create payment transaction", e)
    })?;

    tracing::info!(
        user_id = %auth.user_id,
        order_id = %record.order_id,
        amount,
        coins,
        "Top-up started"
    );

    Ok(Json(session))
}

/// Snap embed settings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopupConfigResponse {
    /// Whether top-ups are available.
    pub enabled: bool,
    /// Client key for `snap.js`.
    pub client_key: Option<String>,
    /// Production or sandbox.
    pub production: bool,
}

/// Settings the browser needs to load the Snap embed.
pub async fn topup_config(State(state): State<Arc<AppState>>) -> Json<TopupConfigResponse> {
    let response = match &state.gateway {
        Some(gateway) => TopupConfigResponse {
            enabled: true,
            client_key: gateway.client_key().map(String::from),
            production: gateway.is_production(),
        },
        None => TopupConfigResponse {
            enabled: false,
            client_key: None,
            production: false,
        },
    };
    Json(response)
}

/// Payment record response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    /// Order ID.
    pub order_id: String,
    /// Amount in rupiah.
    pub amount: i64,
    /// Coins credited on settlement.
    pub coins: i64,
    /// Current status.
    pub status: PaymentStatus,
    /// Created timestamp.
    pub created_at: String,
    /// Settled timestamp.
    pub updated_at: Option<String>,
}

impl From<&PaymentRecord> for PaymentResponse {
    fn from(record: &PaymentRecord) -> Self {
        Self {
            order_id: record.order_id.to_string(),
            amount: record.amount,
            coins: record.coins,
            status: record.status,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Get one of the caller's payments.
pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(order_id): Path<String>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let order_id = OrderId::new(order_id)
        .map_err(|e| ApiError::InvalidArgument(format!("invalid orderId: {e}")))?;

    let record = state
        .store
        .get_payment(&order_id)?
        .filter(|r| r.user_id == auth.user_id)
        .ok_or_else(|| ApiError::NotFound(format!("payment not found: {order_id}")))?;

    Ok(Json(PaymentResponse::from(&record)))
}

/// Webhook failure, reported to Midtrans as a 500 so it retries.
#[derive(Debug)]
pub struct WebhookFailure(String);

impl IntoResponse for WebhookFailure {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.0).into_response()
    }
}

/// Handle Midtrans payment notifications.
pub async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<&'static str, WebhookFailure> {
    let Some(gateway) = &state.gateway else {
        tracing::error!("Payment notification received but Midtrans is not configured");
        return Err(WebhookFailure("Payment gateway not configured".into()));
    };

    let notice = gateway.parse_notification(&body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected payment notification");
        WebhookFailure(e.to_string())
    })?;

    tracing::info!(
        order_id = %notice.order_id,
        transaction_status = %notice.transaction_status,
        fraud_status = ?notice.fraud_status,
        "Received payment notification"
    );

    let settlement = state.store.settle_payment(&notice).map_err(|e| {
        tracing::error!(order_id = %notice.order_id, error = %e, "Failed to process payment notification");
        WebhookFailure(e.to_string())
    })?;

    tracing::info!(
        order_id = %notice.order_id,
        changed = settlement.is_mutation(),
        outcome = ?settlement,
        "Payment notification processed"
    );

    match settlement {
        Settlement::AlreadyProcessed(PaymentStatus::Success) => {
            Ok("Transaction already processed.")
        }
        _ => Ok("Notification received."),
    }
}
