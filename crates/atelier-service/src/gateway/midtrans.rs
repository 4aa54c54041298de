//! Midtrans Snap client.

use reqwest::Client;
use std::time::Duration;

use atelier_core::{group_thousands, OrderId, PaymentNotice};

use super::types::{
    CustomerDetails, ItemDetails, MidtransErrorResponse, MidtransNotification, SnapSession,
    SnapTransactionRequest, TopupOrder, TransactionDetails,
};
use crate::crypto::{constant_time_eq, sha512_hex};

/// Error type for Midtrans operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Midtrans returned an error.
    #[error("Midtrans API error ({status}): {}", .messages.join("; "))]
    Api {
        /// HTTP status.
        status: u16,
        /// Error messages from the response body.
        messages: Vec<String>,
    },

    /// Malformed JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Notification signature does not match.
    #[error("Invalid notification signature")]
    InvalidSignature,

    /// Notification is well-formed but unusable.
    #[error("Invalid notification: {0}")]
    InvalidNotification(String),
}

/// Midtrans Snap client.
#[derive(Debug, Clone)]
pub struct MidtransClient {
    client: Client,
    server_key: String,
    client_key: Option<String>,
    production: bool,
    snap_url: String,
}

impl MidtransClient {
    /// Snap sandbox base URL.
    pub const SANDBOX_SNAP_URL: &'static str = "https://app.sandbox.midtrans.com";
    /// Snap production base URL.
    pub const PRODUCTION_SNAP_URL: &'static str = "https://app.midtrans.com";

    /// Create a new Midtrans client.
    ///
    /// # Arguments
    ///
    /// * `server_key` - Midtrans server key (`SB-Mid-server-...` in the sandbox)
    /// * `client_key` - Optional client key for the browser Snap embed
    /// * `production` - Use the production environment
    pub fn new(
        server_key: impl Into<String>,
        client_key: Option<String>,
        production: bool,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        let snap_url = if production {
            Self::PRODUCTION_SNAP_URL
        } else {
            Self::SANDBOX_SNAP_URL
        };

        Ok(Self {
            client,
            server_key: server_key.into(),
            client_key,
            production,
            snap_url: snap_url.to_string(),
        })
    }

    /// Point the client at a different Snap host.
    #[must_use]
    pub fn with_snap_url(mut self, url: impl Into<String>) -> Self {
        self.snap_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Client key for the browser embed, if configured.
    #[must_use]
    pub fn client_key(&self) -> Option<&str> {
        self.client_key.as_deref()
    }

    /// Whether this client talks to production.
    #[must_use]
    pub const fn is_production(&self) -> bool {
        self.production
    }

    /// Create a Snap checkout session for a coin top-up.
    pub async fn create_session(&self, order: &TopupOrder) -> Result<SnapSession, GatewayError> {
        let request = SnapTransactionRequest {
            transaction_details: TransactionDetails {
                order_id: order.order_id.clone(),
                gross_amount: order.amount,
            },
            customer_details: CustomerDetails {
                first_name: order.customer_name.clone(),
                email: order.customer_email.clone(),
            },
            item_details: vec![ItemDetails {
                id: format!("coins-{}", order.coins),
                price: order.amount,
                quantity: 1,
                name: format!("{} Koin", group_thousands(order.coins)),
            }],
        };

        tracing::debug!(
            order_id = %order.order_id,
            amount = %order.amount,
            coins = %order.coins,
            "Creating Midtrans Snap transaction"
        );

        let response = self
            .client
            .post(format!("{}/snap/v1/transactions", self.snap_url))
            .basic_auth(&self.server_key, Option::<&str>::None)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Verify a notification body and extract what settlement needs.
    pub fn parse_notification(&self, body: &str) -> Result<PaymentNotice, GatewayError> {
        let notification: MidtransNotification = serde_json::from_str(body)?;

        let expected = sha512_hex(&[
            &notification.order_id,
            &notification.status_code,
            &notification.gross_amount,
            &self.server_key,
        ]);
        if !constant_time_eq(&expected, &notification.signature_key.to_ascii_lowercase()) {
            return Err(GatewayError::InvalidSignature);
        }

        let order_id = OrderId::new(notification.order_id)
            .map_err(|e| GatewayError::InvalidNotification(e.to_string()))?;

        Ok(PaymentNotice {
            order_id,
            transaction_status: notification.transaction_status,
            fraud_status: notification.fraud_status,
        })
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let messages = match response.json::<MidtransErrorResponse>().await {
            Ok(body) if !body.error_messages.is_empty() => body.error_messages,
            _ => vec![format!("HTTP {status}")],
        };

        Err(GatewayError::Api {
            status: status.as_u16(),
            messages,
        })
    }
}
