//! Midtrans API types.

use serde::{Deserialize, Serialize};

/// Snap transaction request.
#[derive(Debug, Clone, Serialize)]
pub struct SnapTransactionRequest {
    /// Order and amount.
    pub transaction_details: TransactionDetails,
    /// Payer.
    pub customer_details: CustomerDetails,
    /// Line items; their prices must add up to the gross amount.
    pub item_details: Vec<ItemDetails>,
}

/// Order and amount.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionDetails {
    /// Our order ID.
    pub order_id: String,
    /// Amount in rupiah.
    pub gross_amount: i64,
}

/// Payer details.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetails {
    /// Shown on the payment page.
    pub first_name: String,
    /// Receipt address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// One purchased item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetails {
    /// Item ID.
    pub id: String,
    /// Unit price in rupiah.
    pub price: i64,
    /// Quantity.
    pub quantity: i64,
    /// Display name.
    pub name: String,
}

/// What a top-up buys.
#[derive(Debug, Clone)]
pub struct TopupOrder {
    /// Our order ID.
    pub order_id: String,
    /// Amount in rupiah.
    pub amount: i64,
    /// Coins credited on settlement.
    pub coins: i64,
    /// Payer name.
    pub customer_name: String,
    /// Payer email.
    pub customer_email: Option<String>,
}

/// Snap session returned to the browser as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapSession {
    /// Token for the Snap embed.
    pub token: String,
    /// Hosted payment page.
    pub redirect_url: String,
    /// Any other fields Midtrans includes.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// HTTP notification posted by Midtrans when a transaction changes state.
#[derive(Debug, Clone, Deserialize)]
pub struct MidtransNotification {
    /// Our order ID.
    pub order_id: String,
    /// Midtrans status code, e.g. `"200"`.
    pub status_code: String,
    /// Amount as a decimal string, e.g. `"50000.00"`.
    pub gross_amount: String,
    /// `sha512(order_id + status_code + gross_amount + server_key)`.
    pub signature_key: String,
    /// e.g. `capture`, `settlement`, `pending`, `expire`.
    pub transaction_status: String,
    /// e.g. `accept`, `challenge`, `deny`.
    #[serde(default)]
    pub fraud_status: Option<String>,
    /// Midtrans transaction ID.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// e.g. `credit_card`, `bank_transfer`.
    #[serde(default)]
    pub payment_type: Option<String>,
}

/// Midtrans error body.
#[derive(Debug, Clone, Deserialize)]
pub struct MidtransErrorResponse {
    /// Error messages.
    #[serde(default)]
    pub error_messages: Vec<String>,
}
