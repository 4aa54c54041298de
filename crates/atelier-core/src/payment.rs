//! Coin top-up payments and their settlement state machine.
//!
//! A record is created `pending` and moves exactly once to `success` or `failed`.
//! Both terminal states absorb every later notification.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::{OrderId, UserId};

/// Gateway statuses meaning the money was captured.
const SETTLED_STATUSES: &[&str] = &["capture", "settlement"];

/// Gateway statuses meaning the payment will never complete.
const FAILED_STATUSES: &[&str] = &["cancel", "expire", "deny"];

/// Fraud verdict required before coins are credited.
const FRAUD_ACCEPT: &str = "accept";

/// Payment record status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting the gateway.
    Pending,
    /// Settled and credited.
    Success,
    /// Cancelled, expired or denied.
    Failed,
}

impl PaymentStatus {
    /// Whether no further transition is allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One checkout attempt, keyed by the caller-supplied order id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Order identifier.
    pub order_id: OrderId,

    /// Account to credit.
    pub user_id: UserId,

    /// Charged amount in currency units.
    pub amount: i64,

    /// Coins to credit on settlement.
    pub coins: i64,

    /// Current status.
    pub status: PaymentStatus,

    /// When the checkout started.
    pub created_at: DateTime<Utc>,

    /// When the status last changed.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PaymentRecord {
    /// Start a pending payment.
    ///
    /// # Errors
    ///
    /// Returns an error if `amount` or `coins` is not positive.
    pub fn pending(order_id: OrderId, user_id: UserId, amount: i64, coins: i64) -> Result<Self> {
        if amount <= 0 {
            return Err(CoreError::InvalidAmount(format!(
                "amount must be positive, got {amount}"
            )));
        }
        if coins <= 0 {
            return Err(CoreError::InvalidAmount(format!(
                "coins must be positive, got {coins}"
            )));
        }

        Ok(Self {
            order_id,
            user_id,
            amount,
            coins,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// Decide what a gateway verdict does to this record, without changing it.
    #[must_use]
    pub fn settlement_for(&self, verdict: GatewayVerdict) -> Settlement {
        if self.status.is_terminal() {
            return Settlement::AlreadyProcessed(self.status);
        }
        match verdict {
            GatewayVerdict::Settle => Settlement::Credited {
                user_id: self.user_id.clone(),
                coins: self.coins,
            },
            GatewayVerdict::Fail => Settlement::Failed,
            GatewayVerdict::Ignore => Settlement::Ignored,
        }
    }

    /// Move to a terminal status.
    ///
    /// # Errors
    ///
    /// Returns an error unless the record is pending and `to` is terminal.
    pub fn transition(&mut self, to: PaymentStatus) -> Result<()> {
        if self.status.is_terminal() || !to.is_terminal() {
            return Err(CoreError::InvalidPaymentTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = Some(Utc::now());
        Ok(())
    }
}

/// The fields of a verified gateway notification the engine acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotice {
    /// Order the notification is about.
    pub order_id: OrderId,
    /// Gateway transaction status.
    pub transaction_status: String,
    /// Gateway fraud status, absent for some payment methods.
    pub fraud_status: Option<String>,
}

impl PaymentNotice {
    /// Classify the notification.
    #[must_use]
    pub fn verdict(&self) -> GatewayVerdict {
        let status = self.transaction_status.as_str();
        if SETTLED_STATUSES.contains(&status) {
            if self.fraud_status.as_deref() == Some(FRAUD_ACCEPT) {
                GatewayVerdict::Settle
            } else {
                GatewayVerdict::Ignore
            }
        } else if FAILED_STATUSES.contains(&status) {
            GatewayVerdict::Fail
        } else {
            GatewayVerdict::Ignore
        }
    }
}

/// What a notification asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayVerdict {
    /// Captured and accepted: credit the coins.
    Settle,
    /// Cancelled, expired or denied.
    Fail,
    /// Anything else: acknowledge without action.
    Ignore,
}

/// Outcome of applying a notification to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Record moved to `success` and coins were credited.
    Credited {
        /// Credited account.
        user_id: UserId,
        /// Credited coins.
        coins: i64,
    },
    /// Record moved to `failed`.
    Failed,
    /// Nothing changed.
    Ignored,
    /// Record was already terminal; nothing changed.
    AlreadyProcessed(PaymentStatus),
}

impl Settlement {
    /// Whether the notification changed stored state.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(self, Self::Credited { .. } | Self::Failed)
    }
}
