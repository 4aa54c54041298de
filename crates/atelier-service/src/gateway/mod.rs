//! Midtrans payment gateway adapter.
//!
//! Midtrans handles:
//! - Snap checkout sessions for coin top-ups
//! - Signed HTTP notifications when a transaction settles, fails or expires

pub mod midtrans;
pub mod types;

pub use midtrans::{GatewayError, MidtransClient};
pub use types::*;
