//! `RocksDB` ledger store and transaction engine for atelier.
//!
//! This crate provides persistent storage for accounts, characters, the shared catalog,
//! votes, notifications, and payment records, plus the compound economy operations that
//! mutate them atomically.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `accounts`: user accounts, keyed by `user_id`
//! - `owned_characters`: per-user collections, keyed by `user_id || name`
//! - `catalog`: published characters, keyed by global character id
//! - `votes`: one standing vote per (character, voter)
//! - `notifications`: per-user notifications, keyed by `user_id || ULID`
//! - `payments`: top-up records, keyed by `order_id`
//!
//! Every multi-document operation runs in a `RocksDB` optimistic transaction that is
//! replayed on conflict. Shared counters are changed with a merge-operator increment
//! instead of writing back a value computed from an earlier read.
//!
//! # Example
//!
//! ```no_run
//! use atelier_core::{Profile, UserId};
//! use atelier_store::{RocksStore, Store};
//!
//! let store = RocksStore::open("/tmp/atelier-db").unwrap();
//!
//! let user_id = UserId::new("user-1").unwrap();
//! let account = store.sign_in(&user_id, Profile::default()).unwrap();
//! assert_eq!(account.coins, 5);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod codec;
pub mod engine;
pub mod error;
pub mod keys;
pub mod merge;
pub mod rocks;
pub mod schema;
mod txn;

pub use engine::PurchaseReceipt;
pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use atelier_core::{
    GlobalCharacter, GlobalCharacterId, Notification, NotificationId, OrderId, OwnedCharacter,
    PaymentNotice, PaymentRecord, Profile, Settlement, UserAccount, UserId, VoteKind, VoteState,
    VoteTally, VoteTransition,
};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing the service to be tested against
/// any implementation.
pub trait Store: Send + Sync {
    // =========================================================================
    // Account Operations
    // =========================================================================

    /// Create the account on first sign-in with the starting grant, or refresh the
    /// profile of an existing one without touching its balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn sign_in(&self, user_id: &UserId, profile: Profile) -> Result<UserAccount>;

    /// Get an account by user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_account(&self, user_id: &UserId) -> Result<Option<UserAccount>>;

    /// Change display name and/or photo URL.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn update_profile(
        &self,
        user_id: &UserId,
        display_name: Option<String>,
        photo_url: Option<String>,
    ) -> Result<UserAccount>;

    // =========================================================================
    // Owned Character Operations
    // =========================================================================

    /// Save a new character into the owner's collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the owner already has a character with
    /// that name.
    fn create_character(&self, owner: &UserId, character: &OwnedCharacter) -> Result<()>;

    /// Get one of a user's characters by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_character(&self, owner: &UserId, name: &str) -> Result<Option<OwnedCharacter>>;

    /// List a user's characters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_characters(&self, owner: &UserId) -> Result<Vec<OwnedCharacter>>;

    /// Attach an illustration URL to an owned character.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the character doesn't exist.
    fn set_illustration(&self, owner: &UserId, name: &str, url: String) -> Result<OwnedCharacter>;

    /// Delete an owned character.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the character doesn't exist.
    fn delete_character(&self, owner: &UserId, name: &str) -> Result<()>;

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Publish an owned character to the catalog. Re-publishing replaces the content
    /// and keeps counters and votes.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the character doesn't exist.
    fn publish(&self, owner: &UserId, name: &str) -> Result<GlobalCharacter>;

    /// Get a catalog entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_global(&self, id: &GlobalCharacterId) -> Result<Option<GlobalCharacter>>;

    /// List the catalog, most recently shared first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_catalog(&self) -> Result<Vec<GlobalCharacter>>;

    /// A voter's current standing vote on a character.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_vote(&self, id: &GlobalCharacterId, voter: &UserId) -> Result<VoteState>;

    /// Count standing votes on a character from the vote records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn vote_tally(&self, id: &GlobalCharacterId) -> Result<VoteTally>;

    // =========================================================================
    // Notification Operations
    // =========================================================================

    /// List a user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_notifications(&self, user_id: &UserId, unread_only: bool)
        -> Result<Vec<Notification>>;

    /// Mark a notification as read.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the notification doesn't exist.
    fn mark_notification_read(&self, user_id: &UserId, id: &NotificationId)
        -> Result<Notification>;

    // =========================================================================
    // Payment Operations
    // =========================================================================

    /// Record a new pending payment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the order ID is already used.
    fn create_payment(&self, record: &PaymentRecord) -> Result<()>;

    /// Get a payment record by order ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_payment(&self, order_id: &OrderId) -> Result<Option<PaymentRecord>>;

    // =========================================================================
    // Compound Operations
    // =========================================================================

    /// Buy a copy of a catalog character: debit the buyer, reward the owner, bump the
    /// copy counter, save the copy, and notify the owner, all atomically.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the character or the buyer's account doesn't exist.
    /// - `StoreError::SelfPurchase` if the buyer owns the character.
    /// - `StoreError::InsufficientCoins` if the buyer can't afford it.
    /// - `StoreError::AlreadyExists` if the buyer already has a character by that name.
    /// - `StoreError::Conflict` if concurrent writers exhausted the retries.
    fn purchase(&self, buyer: &UserId, id: &GlobalCharacterId) -> Result<PurchaseReceipt>;

    /// Toggle a like or dislike and notify the owner of new votes.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the character doesn't exist.
    /// - `StoreError::Conflict` if concurrent writers exhausted the retries.
    fn vote(&self, voter: &UserId, id: &GlobalCharacterId, kind: VoteKind)
        -> Result<VoteTransition>;

    /// Settle a payment from a verified gateway notification. Idempotent.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the order or its account doesn't exist.
    /// - `StoreError::Conflict` if concurrent writers exhausted the retries.
    fn settle_payment(&self, notice: &PaymentNotice) -> Result<Settlement>;
}
