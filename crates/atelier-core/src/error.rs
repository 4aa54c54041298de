//! Error types for atelier domain rules.

use crate::ids::IdError;
use crate::payment::PaymentStatus;

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by domain rules, independent of storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// Vote kind other than `like` or `dislike`.
    #[error("invalid vote type: {0}")]
    InvalidVoteKind(String),

    /// A coin or currency amount that must be positive was not.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A required text field was missing or malformed.
    #[error("invalid field {field}: {reason}")]
    InvalidField {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Economy policy that would let balances go negative or mint coins.
    #[error("invalid economy policy: {0}")]
    InvalidPolicy(String),

    /// Payment status change outside pending -> success | failed.
    #[error("invalid payment transition from {from} to {to}")]
    InvalidPaymentTransition {
        /// Current status.
        from: PaymentStatus,
        /// Requested status.
        to: PaymentStatus,
    },
}
