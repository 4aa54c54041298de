//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{ColumnFamilyDescriptor, Direction, IteratorMode, Options};
use tracing::info;

use atelier_core::{
    EconomyPolicy, GlobalCharacter, GlobalCharacterId, Notification, NotificationId, OrderId,
    OwnedCharacter, PaymentNotice, PaymentRecord, Profile, Settlement, UserAccount, UserId,
    VoteKind, VoteRecord, VoteState, VoteTally, VoteTransition, DEFAULT_DISPLAY_NAME,
};

use crate::codec;
use crate::engine::{self, PurchaseReceipt};
use crate::error::{Result, StoreError};
use crate::keys;
use crate::merge::{self, MERGE_OPERATOR_NAME};
use crate::schema::{all_column_families, cf, has_counters};
use crate::txn::{self, cf_handle, Db};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<Db>,
    policy: EconomyPolicy,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path with the default policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_policy(path, EconomyPolicy::default())
    }

    /// Open or create a `RocksDB` database with an explicit economy policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy is invalid or the database cannot be opened or
    /// created.
    pub fn open_with_policy<P: AsRef<Path>>(path: P, policy: EconomyPolicy) -> Result<Self> {
        policy.validate()?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, column_family_options(name)))
            .collect();

        let db = Db::open_cf_descriptors(&opts, path.as_ref(), cf_descriptors)?;

        info!(
            path = %path.as_ref().display(),
            purchase_cost = policy.purchase_cost,
            owner_reward = policy.owner_reward,
            "Ledger store opened"
        );

        Ok(Self {
            db: Arc::new(db),
            policy,
        })
    }

    /// The economy policy this store applies.
    #[must_use]
    pub fn policy(&self) -> &EconomyPolicy {
        &self.policy
    }

    fn get<T: serde::de::DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = cf_handle(&self.db, cf_name)?;
        self.db
            .get_cf(&cf, key)?
            .map(|data| codec::deserialize(&data))
            .transpose()
    }

    /// Decode every document whose key starts with `prefix`, in key order.
    fn scan_prefix<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        prefix: &[u8],
    ) -> Result<Vec<T>> {
        let cf = cf_handle(&self.db, cf_name)?;
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix, Direction::Forward));

        let mut values = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            values.push(codec::deserialize(&value)?);
        }
        Ok(values)
    }

    fn run<T, F>(&self, operation: &'static str, body: F) -> Result<T>
    where
        F: FnMut(&txn::TxnContext<'_>) -> Result<T>,
    {
        txn::run(&self.db, self.policy.max_transaction_attempts, operation, body)
    }

    #[cfg(test)]
    pub(crate) fn increment_field(
        &self,
        cf_name: &str,
        key: &[u8],
        field: &str,
        delta: i64,
    ) -> Result<()> {
        self.run("increment_field", |ctx| ctx.increment(cf_name, key, field, delta))
    }
}

fn column_family_options(name: &str) -> Options {
    let mut opts = Options::default();
    if has_counters(name) {
        opts.set_merge_operator(MERGE_OPERATOR_NAME, merge::full_merge, merge::partial_merge);
    }
    opts
}

impl Store for RocksStore {
    // =========================================================================
    // Account Operations
    // =========================================================================

    fn sign_in(&self, user_id: &UserId, profile: Profile) -> Result<UserAccount> {
        let key = keys::account_key(user_id);

        self.run("sign_in", |ctx| {
            let account = match ctx.read_for_update::<UserAccount>(cf::ACCOUNTS, &key)? {
                Some(mut account) => {
                    account.refresh_profile(profile.clone());
                    account
                }
                None => {
                    info!(user_id = %user_id, "Account created");
                    UserAccount::new(user_id.clone(), profile.clone(), self.policy.starting_coins)
                }
            };
            ctx.put(cf::ACCOUNTS, &key, &account)?;
            Ok(account)
        })
    }

    fn get_account(&self, user_id: &UserId) -> Result<Option<UserAccount>> {
        self.get(cf::ACCOUNTS, &keys::account_key(user_id))
    }

    fn update_profile(
        &self,
        user_id: &UserId,
        display_name: Option<String>,
        photo_url: Option<String>,
    ) -> Result<UserAccount> {
        let key = keys::account_key(user_id);

        self.run("update_profile", |ctx| {
            let mut account: UserAccount = ctx
                .read_for_update(cf::ACCOUNTS, &key)?
                .ok_or_else(|| StoreError::not_found("account", user_id))?;

            if let Some(name) = &display_name {
                account.display_name = Some(name.clone());
            }
            if let Some(url) = &photo_url {
                account.photo_url = Some(url.clone());
            }

            ctx.put(cf::ACCOUNTS, &key, &account)?;
            Ok(account)
        })
    }

    // =========================================================================
    // Owned Character Operations
    // =========================================================================

    fn create_character(&self, owner: &UserId, character: &OwnedCharacter) -> Result<()> {
        let key = keys::owned_character_key(owner, &character.name);

        self.run("create_character", |ctx| {
            if ctx
                .read_for_update::<OwnedCharacter>(cf::OWNED_CHARACTERS, &key)?
                .is_some()
            {
                return Err(StoreError::already_exists("character", &character.name));
            }
            ctx.put(cf::OWNED_CHARACTERS, &key, character)
        })
    }

    fn get_character(&self, owner: &UserId, name: &str) -> Result<Option<OwnedCharacter>> {
        self.get(cf::OWNED_CHARACTERS, &keys::owned_character_key(owner, name))
    }

    fn list_characters(&self, owner: &UserId) -> Result<Vec<OwnedCharacter>> {
        let mut characters: Vec<OwnedCharacter> =
            self.scan_prefix(cf::OWNED_CHARACTERS, &keys::owned_characters_prefix(owner))?;
        characters.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(characters)
    }

    fn set_illustration(&self, owner: &UserId, name: &str, url: String) -> Result<OwnedCharacter> {
        let key = keys::owned_character_key(owner, name);

        self.run("set_illustration", |ctx| {
            let mut character: OwnedCharacter = ctx
                .read_for_update(cf::OWNED_CHARACTERS, &key)?
                .ok_or_else(|| StoreError::not_found("character", name))?;
            character.illustration_url = Some(url.clone());
            ctx.put(cf::OWNED_CHARACTERS, &key, &character)?;
            Ok(character)
        })
    }

    fn delete_character(&self, owner: &UserId, name: &str) -> Result<()> {
        let key = keys::owned_character_key(owner, name);

        self.run("delete_character", |ctx| {
            if ctx
                .read_for_update::<OwnedCharacter>(cf::OWNED_CHARACTERS, &key)?
                .is_none()
            {
                return Err(StoreError::not_found("character", name));
            }
            ctx.delete(cf::OWNED_CHARACTERS, &key)
        })
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    fn publish(&self, owner: &UserId, name: &str) -> Result<GlobalCharacter> {
        let owned_key = keys::owned_character_key(owner, name);

        self.run("publish", |ctx| {
            let character: OwnedCharacter = ctx
                .read(cf::OWNED_CHARACTERS, &owned_key)?
                .ok_or_else(|| StoreError::not_found("character", name))?;

            let owner_name = ctx
                .read::<UserAccount>(cf::ACCOUNTS, &keys::account_key(owner))?
                .map_or_else(
                    || DEFAULT_DISPLAY_NAME.to_string(),
                    |account| account.public_name().to_string(),
                );

            let mut global = GlobalCharacter::publish(owner, &owner_name, &character)?;
            let catalog_key = keys::catalog_key(&global.id);
            if let Some(existing) = ctx.read_for_update::<GlobalCharacter>(cf::CATALOG, &catalog_key)? {
                // Distinct (name, owner) pairs can derive the same id; never hand over an entry.
                if existing.owner_id != *owner {
                    return Err(StoreError::already_exists("character", &global.id));
                }
                global = global.republished_over(&existing);
            }

            ctx.put(cf::CATALOG, &catalog_key, &global)?;
            info!(owner_id = %owner, global_id = %global.id, "Character published");
            Ok(global)
        })
    }

    fn get_global(&self, id: &GlobalCharacterId) -> Result<Option<GlobalCharacter>> {
        self.get(cf::CATALOG, &keys::catalog_key(id))
    }

    fn list_catalog(&self) -> Result<Vec<GlobalCharacter>> {
        let mut catalog: Vec<GlobalCharacter> = self.scan_prefix(cf::CATALOG, &[])?;
        catalog.sort_by(|a, b| b.shared_at.cmp(&a.shared_at));
        Ok(catalog)
    }

    fn get_vote(&self, id: &GlobalCharacterId, voter: &UserId) -> Result<VoteState> {
        let record: Option<VoteRecord> = self.get(cf::VOTES, &keys::vote_key(id, voter))?;
        Ok(VoteState::from(record.map(|r| r.kind)))
    }

    fn vote_tally(&self, id: &GlobalCharacterId) -> Result<VoteTally> {
        let records: Vec<VoteRecord> = self.scan_prefix(cf::VOTES, &keys::votes_prefix(id))?;
        let mut tally = VoteTally::default();
        for record in records {
            tally.add(record.kind);
        }
        Ok(tally)
    }

    // =========================================================================
    // Notification Operations
    // =========================================================================

    fn list_notifications(&self, user_id: &UserId, unread_only: bool) -> Result<Vec<Notification>> {
        let mut notifications: Vec<Notification> =
            self.scan_prefix(cf::NOTIFICATIONS, &keys::notifications_prefix(user_id))?;

        notifications.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        if unread_only {
            notifications.retain(|n| !n.is_read);
        }
        Ok(notifications)
    }

    fn mark_notification_read(&self, user_id: &UserId, id: &NotificationId) -> Result<Notification> {
        let key = keys::notification_key(user_id, id);

        self.run("mark_notification_read", |ctx| {
            let mut notification: Notification = ctx
                .read_for_update(cf::NOTIFICATIONS, &key)?
                .ok_or_else(|| StoreError::not_found("notification", id))?;
            if !notification.is_read {
                notification.is_read = true;
                ctx.put(cf::NOTIFICATIONS, &key, &notification)?;
            }
            Ok(notification)
        })
    }

    // =========================================================================
    // Payment Operations
    // =========================================================================

    fn create_payment(&self, record: &PaymentRecord) -> Result<()> {
        let key = keys::payment_key(&record.order_id);

        self.run("create_payment", |ctx| {
            if ctx
                .read_for_update::<PaymentRecord>(cf::PAYMENTS, &key)?
                .is_some()
            {
                return Err(StoreError::already_exists("payment", &record.order_id));
            }
            ctx.put(cf::PAYMENTS, &key, record)
        })
    }

    fn get_payment(&self, order_id: &OrderId) -> Result<Option<PaymentRecord>> {
        self.get(cf::PAYMENTS, &keys::payment_key(order_id))
    }

    // =========================================================================
    // Compound Operations
    // =========================================================================

    fn purchase(&self, buyer: &UserId, id: &GlobalCharacterId) -> Result<PurchaseReceipt> {
        self.run("purchase", |ctx| engine::purchase(ctx, &self.policy, buyer, id))
    }

    fn vote(&self, voter: &UserId, id: &GlobalCharacterId, kind: VoteKind) -> Result<VoteTransition> {
        self.run("vote", |ctx| engine::vote(ctx, voter, id, kind))
    }

    fn settle_payment(&self, notice: &PaymentNotice) -> Result<Settlement> {
        self.run("settle_payment", |ctx| engine::settle(ctx, notice))
    }
}
