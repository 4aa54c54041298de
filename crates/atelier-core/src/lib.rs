//! Core types for the atelier coin economy.
//!
//! This crate provides the domain types shared by the store and the HTTP service:
//!
//! - **Identifiers**: `UserId`, `GlobalCharacterId`, `OrderId`, `NotificationId`
//! - **Accounts**: `UserAccount`, `Profile`
//! - **Characters**: `OwnedCharacter`, `GlobalCharacter`
//! - **Votes**: `VoteKind`, `VoteState`, `VoteTransition`
//! - **Notifications**: `Notification`, `NotificationType`
//! - **Payments**: `PaymentRecord`, `PaymentStatus`, `PaymentNotice`, `Settlement`
//! - **Policy**: `EconomyPolicy`
//!
//! # Coins
//!
//! Coins are whole units stored as `i64`. A balance is never negative: every debit
//! happens inside a store transaction that checks sufficiency first.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod character;
pub mod error;
pub mod ids;
pub mod notification;
pub mod payment;
pub mod policy;
pub mod vote;

pub use account::{Profile, UserAccount, DEFAULT_DISPLAY_NAME};
pub use character::{
    catalog_id_for, validate_name, GlobalCharacter, OwnedCharacter, MAX_CHARACTER_NAME_LEN,
};
pub use error::{CoreError, Result};
pub use ids::{GlobalCharacterId, IdError, NotificationId, OrderId, UserId};
pub use notification::{group_thousands, Notification, NotificationType};
pub use payment::{GatewayVerdict, PaymentNotice, PaymentRecord, PaymentStatus, Settlement};
pub use policy::{
    EconomyPolicy, DEFAULT_MAX_TRANSACTION_ATTEMPTS, DEFAULT_OWNER_REWARD, DEFAULT_PURCHASE_COST,
    DEFAULT_STARTING_COINS,
};
pub use vote::{VoteKind, VoteRecord, VoteState, VoteTally, VoteTransition};
