//! The transaction engine: compound economy operations.
//!
//! Each function here is one transaction body for [`crate::txn::run`]. Business rule
//! failures return early, which discards every write the attempt staged. Shared
//! counters (`coins`, `copy_count`, `like_count`, `dislike_count`) are only ever
//! changed through [`TxnContext::increment`].

use atelier_core::{
    EconomyPolicy, GlobalCharacter, GlobalCharacterId, Notification, OwnedCharacter,
    PaymentNotice, PaymentRecord, PaymentStatus, Settlement, UserAccount, UserId, VoteKind,
    VoteRecord, VoteState, VoteTransition, DEFAULT_DISPLAY_NAME,
};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::cf;
use crate::txn::TxnContext;

/// What a successful purchase produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    /// The buyer's new copy.
    pub character: OwnedCharacter,
    /// Buyer balance after the debit.
    pub coins_remaining: i64,
    /// Whether the owner's account existed and received the reward.
    pub owner_rewarded: bool,
}

/// Copy a catalog character into the buyer's collection for the purchase cost.
pub(crate) fn purchase(
    ctx: &TxnContext<'_>,
    policy: &EconomyPolicy,
    buyer_id: &UserId,
    global_id: &GlobalCharacterId,
) -> Result<PurchaseReceipt> {
    let catalog_key = keys::catalog_key(global_id);
    let global: GlobalCharacter = ctx
        .read_for_update(cf::CATALOG, &catalog_key)?
        .ok_or_else(|| StoreError::not_found("character", global_id))?;

    let buyer_key = keys::account_key(buyer_id);
    let buyer: UserAccount = ctx
        .read_for_update(cf::ACCOUNTS, &buyer_key)?
        .ok_or_else(|| StoreError::not_found("account", buyer_id))?;

    if global.owner_id == *buyer_id {
        return Err(StoreError::SelfPurchase);
    }
    if !buyer.has_sufficient_coins(policy.purchase_cost) {
        return Err(StoreError::InsufficientCoins {
            balance: buyer.coins,
            required: policy.purchase_cost,
        });
    }

    let owned_key = keys::owned_character_key(buyer_id, &global.name);
    if ctx
        .read_for_update::<OwnedCharacter>(cf::OWNED_CHARACTERS, &owned_key)?
        .is_some()
    {
        return Err(StoreError::already_exists("character", &global.name));
    }

    let owner_key = keys::account_key(&global.owner_id);
    let owner_exists = ctx
        .read::<UserAccount>(cf::ACCOUNTS, &owner_key)?
        .is_some();

    ctx.increment(
        cf::ACCOUNTS,
        &buyer_key,
        UserAccount::COINS_FIELD,
        -policy.purchase_cost,
    )?;
    if owner_exists {
        ctx.increment(
            cf::ACCOUNTS,
            &owner_key,
            UserAccount::COINS_FIELD,
            policy.owner_reward,
        )?;
    }
    ctx.increment(cf::CATALOG, &catalog_key, GlobalCharacter::COPY_COUNT_FIELD, 1)?;

    let character = OwnedCharacter::copied_from(&global);
    ctx.put(cf::OWNED_CHARACTERS, &owned_key, &character)?;

    let notification =
        Notification::character_copied(&global.name, buyer.public_name(), policy.owner_reward);
    ctx.put(
        cf::NOTIFICATIONS,
        &keys::notification_key(&global.owner_id, &notification.id),
        &notification,
    )?;

    debug!(
        buyer_id = %buyer_id,
        global_id = %global_id,
        owner_id = %global.owner_id,
        owner_rewarded = owner_exists,
        "Purchase staged"
    );

    Ok(PurchaseReceipt {
        character,
        coins_remaining: buyer.coins - policy.purchase_cost,
        owner_rewarded: owner_exists,
    })
}

/// Toggle a voter's like/dislike on a catalog character.
pub(crate) fn vote(
    ctx: &TxnContext<'_>,
    voter_id: &UserId,
    global_id: &GlobalCharacterId,
    cast: VoteKind,
) -> Result<VoteTransition> {
    let catalog_key = keys::catalog_key(global_id);
    let global: GlobalCharacter = ctx
        .read_for_update(cf::CATALOG, &catalog_key)?
        .ok_or_else(|| StoreError::not_found("character", global_id))?;

    let voter_name = ctx
        .read::<UserAccount>(cf::ACCOUNTS, &keys::account_key(voter_id))?
        .map_or_else(
            || DEFAULT_DISPLAY_NAME.to_string(),
            |account| account.public_name().to_string(),
        );

    let vote_key = keys::vote_key(global_id, voter_id);
    let current: Option<VoteRecord> = ctx.read_for_update(cf::VOTES, &vote_key)?;
    let transition = VoteState::from(current.map(|record| record.kind)).apply(cast);

    match transition.to.kind() {
        Some(kind) => ctx.put(cf::VOTES, &vote_key, &VoteRecord::now(kind))?,
        None => ctx.delete(cf::VOTES, &vote_key)?,
    }

    let like_delta = transition.like_delta();
    if like_delta != 0 {
        ctx.increment(
            cf::CATALOG,
            &catalog_key,
            GlobalCharacter::LIKE_COUNT_FIELD,
            like_delta,
        )?;
    }
    let dislike_delta = transition.dislike_delta();
    if dislike_delta != 0 {
        ctx.increment(
            cf::CATALOG,
            &catalog_key,
            GlobalCharacter::DISLIKE_COUNT_FIELD,
            dislike_delta,
        )?;
    }

    if global.owner_id != *voter_id {
        if let Some(notification_type) = transition.notification_type() {
            let notification = Notification::voted(notification_type, &global.name, &voter_name);
            ctx.put(
                cf::NOTIFICATIONS,
                &keys::notification_key(&global.owner_id, &notification.id),
                &notification,
            )?;
        }
    }

    Ok(transition)
}

/// Apply a verified gateway notification to its payment record.
///
/// The status guard, the record transition, the coin credit and the notification are
/// part of one transaction, so redelivered notifications cannot credit twice.
pub(crate) fn settle(ctx: &TxnContext<'_>, notice: &PaymentNotice) -> Result<Settlement> {
    let payment_key = keys::payment_key(&notice.order_id);
    let mut record: PaymentRecord = ctx
        .read_for_update(cf::PAYMENTS, &payment_key)?
        .ok_or_else(|| StoreError::not_found("payment", &notice.order_id))?;

    let settlement = record.settlement_for(notice.verdict());

    match &settlement {
        Settlement::Credited { user_id, coins } => {
            let account_key = keys::account_key(user_id);
            if ctx
                .read::<UserAccount>(cf::ACCOUNTS, &account_key)?
                .is_none()
            {
                return Err(StoreError::not_found("account", user_id));
            }

            record.transition(PaymentStatus::Success)?;
            ctx.put(cf::PAYMENTS, &payment_key, &record)?;
            ctx.increment(cf::ACCOUNTS, &account_key, UserAccount::COINS_FIELD, *coins)?;

            let notification = Notification::topup_settled(&record.order_id, record.amount, *coins);
            ctx.put(
                cf::NOTIFICATIONS,
                &keys::notification_key(user_id, &notification.id),
                &notification,
            )?;

            info!(order_id = %record.order_id, user_id = %user_id, coins, "Payment settled");
        }
        Settlement::Failed => {
            record.transition(PaymentStatus::Failed)?;
            ctx.put(cf::PAYMENTS, &payment_key, &record)?;
            info!(order_id = %record.order_id, status = %notice.transaction_status, "Payment failed");
        }
        Settlement::Ignored => {
            debug!(
                order_id = %record.order_id,
                status = %notice.transaction_status,
                fraud_status = ?notice.fraud_status,
                "Payment notification acknowledged without action"
            );
        }
        Settlement::AlreadyProcessed(status) => {
            debug!(order_id = %record.order_id, status = %status, "Payment already processed");
        }
    }

    Ok(settlement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RocksStore, Store};
    use atelier_core::{NotificationType, OrderId, Profile, VoteTally};
    use tempfile::TempDir;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn open(policy: EconomyPolicy) -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open_with_policy(dir.path(), policy).unwrap();
        (store, dir)
    }

    fn sign_in_with(store: &RocksStore, id: &UserId, name: &str, coins: i64) {
        let profile = Profile {
            display_name: Some(name.into()),
            ..Profile::default()
        };
        let account = store.sign_in(id, profile).unwrap();
        store
            .increment_field(
                cf::ACCOUNTS,
                &keys::account_key(id),
                UserAccount::COINS_FIELD,
                coins - account.coins,
            )
            .unwrap();
    }

    fn publish(store: &RocksStore, owner: &UserId, name: &str) -> GlobalCharacterId {
        store
            .create_character(owner, &OwnedCharacter::new(name, "sheet", None).unwrap())
            .unwrap();
        store.publish(owner, name).unwrap().id
    }

    fn coins(store: &RocksStore, id: &UserId) -> i64 {
        store.get_account(id).unwrap().unwrap().coins
    }

    fn global(store: &RocksStore, id: &GlobalCharacterId) -> GlobalCharacter {
        store.get_global(id).unwrap().unwrap()
    }

    // =========================================================================
    // Purchase
    // =========================================================================

    #[test]
    fn purchase_transfers_coins_and_copies() {
        let (store, _dir) = open(EconomyPolicy::default());
        let buyer = user("buyer");
        let seller = user("seller");
        sign_in_with(&store, &buyer, "Budi", 25);
        sign_in_with(&store, &seller, "Rina", 10);

        let id = publish(&store, &seller, "Aria");
        store
            .increment_field(
                cf::CATALOG,
                &keys::catalog_key(&id),
                GlobalCharacter::COPY_COUNT_FIELD,
                2,
            )
            .unwrap();

        let receipt = store.purchase(&buyer, &id).unwrap();

        assert_eq!(receipt.coins_remaining, 5);
        assert!(receipt.owner_rewarded);
        assert_eq!(coins(&store, &buyer), 5);
        assert_eq!(coins(&store, &seller), 25);
        assert_eq!(global(&store, &id).copy_count, 3);

        let copy = store.get_character(&buyer, "Aria").unwrap().unwrap();
        assert_eq!(copy.description, "sheet");

        let notifications = store.list_notifications(&seller, true).unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].notification_type, NotificationType::CharacterCopy);
        assert!(notifications[0].message.contains("Budi"));
    }

    #[test]
    fn purchase_with_insufficient_coins_changes_nothing() {
        let (store, _dir) = open(EconomyPolicy::default());
        let buyer = user("buyer");
        let seller = user("seller");
        sign_in_with(&store, &buyer, "Budi", 19);
        sign_in_with(&store, &seller, "Rina", 10);
        let id = publish(&store, &seller, "Aria");

        let result = store.purchase(&buyer, &id);
        assert!(matches!(
            result,
            Err(StoreError::InsufficientCoins {
                balance: 19,
                required: 20
            })
        ));

        assert_eq!(coins(&store, &buyer), 19);
        assert_eq!(coins(&store, &seller), 10);
        assert_eq!(global(&store, &id).copy_count, 0);
        assert!(store.list_characters(&buyer).unwrap().is_empty());
        assert!(store.list_notifications(&seller, false).unwrap().is_empty());
    }

    #[test]
    fn purchase_of_duplicate_name_changes_nothing() {
        let (store, _dir) = open(EconomyPolicy::default());
        let buyer = user("buyer");
        let seller = user("seller");
        sign_in_with(&store, &buyer, "Budi", 100);
        sign_in_with(&store, &seller, "Rina", 10);
        let id = publish(&store, &seller, "Aria");

        store
            .create_character(&buyer, &OwnedCharacter::new("Aria", "mine", None).unwrap())
            .unwrap();

        let result = store.purchase(&buyer, &id);
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
        assert_eq!(coins(&store, &buyer), 100);
        assert_eq!(coins(&store, &seller), 10);
        assert_eq!(global(&store, &id).copy_count, 0);
        assert_eq!(
            store.get_character(&buyer, "Aria").unwrap().unwrap().description,
            "mine"
        );
    }

    #[test]
    fn second_purchase_is_rejected() {
        let (store, _dir) = open(EconomyPolicy::default());
        let buyer = user("buyer");
        let seller = user("seller");
        sign_in_with(&store, &buyer, "Budi", 100);
        sign_in_with(&store, &seller, "Rina", 0);
        let id = publish(&store, &seller, "Aria");

        store.purchase(&buyer, &id).unwrap();
        let again = store.purchase(&buyer, &id);

        assert!(matches!(again, Err(StoreError::AlreadyExists { .. })));
        assert_eq!(coins(&store, &buyer), 80);
        assert_eq!(coins(&store, &seller), 15);
        assert_eq!(global(&store, &id).copy_count, 1);
    }

    #[test]
    fn cannot_buy_own_character() {
        let (store, _dir) = open(EconomyPolicy::default());
        let seller = user("seller");
        sign_in_with(&store, &seller, "Rina", 100);
        let id = publish(&store, &seller, "Aria");

        let result = store.purchase(&seller, &id);
        assert!(matches!(result, Err(StoreError::SelfPurchase)));
        assert_eq!(coins(&store, &seller), 100);
    }

    #[test]
    fn purchase_requires_character_and_buyer() {
        let (store, _dir) = open(EconomyPolicy::default());
        let seller = user("seller");
        sign_in_with(&store, &seller, "Rina", 0);
        let id = publish(&store, &seller, "Aria");

        let missing_character =
            store.purchase(&seller, &GlobalCharacterId::new("Nope_seller").unwrap());
        assert!(matches!(
            missing_character,
            Err(StoreError::NotFound {
                entity: "character",
                ..
            })
        ));

        let missing_buyer = store.purchase(&user("ghost"), &id);
        assert!(matches!(
            missing_buyer,
            Err(StoreError::NotFound {
                entity: "account",
                ..
            })
        ));
    }

    #[test]
    fn purchase_from_deleted_owner_skips_reward() {
        let (store, _dir) = open(EconomyPolicy::default());
        let buyer = user("buyer");
        sign_in_with(&store, &buyer, "Budi", 30);

        // Catalog entry whose owner never signed in
        let owner = user("gone");
        let id = publish(&store, &owner, "Aria");

        let receipt = store.purchase(&buyer, &id).unwrap();
        assert!(!receipt.owner_rewarded);
        assert_eq!(coins(&store, &buyer), 10);
        assert!(store.get_account(&owner).unwrap().is_none());
        assert_eq!(global(&store, &id).copy_count, 1);
    }

    #[test]
    fn purchase_uses_configured_policy() {
        let policy = EconomyPolicy {
            purchase_cost: 50,
            owner_reward: 40,
            ..EconomyPolicy::default()
        };
        let (store, _dir) = open(policy);
        let buyer = user("buyer");
        let seller = user("seller");
        sign_in_with(&store, &buyer, "Budi", 60);
        sign_in_with(&store, &seller, "Rina", 0);
        let id = publish(&store, &seller, "Aria");

        store.purchase(&buyer, &id).unwrap();
        assert_eq!(coins(&store, &buyer), 10);
        assert_eq!(coins(&store, &seller), 40);
    }

    #[test]
    fn concurrent_purchases_count_every_copy() {
        let policy = EconomyPolicy {
            max_transaction_attempts: 100,
            ..EconomyPolicy::default()
        };
        let (store, _dir) = open(policy);
        let seller = user("seller");
        sign_in_with(&store, &seller, "Rina", 0);
        let id = publish(&store, &seller, "Aria");

        let buyers: Vec<UserId> = (0..8).map(|i| user(&format!("buyer-{i}"))).collect();
        for buyer in &buyers {
            sign_in_with(&store, buyer, "Buyer", 20);
        }

        let successes: Vec<bool> = std::thread::scope(|s| {
            let (store, id) = (&store, &id);
            let handles: Vec<_> = buyers
                .iter()
                .map(|buyer| s.spawn(move || store.purchase(buyer, id).is_ok()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let succeeded = i64::try_from(successes.iter().filter(|ok| **ok).count()).unwrap();
        assert!(succeeded > 0);
        assert_eq!(global(&store, &id).copy_count, succeeded);
        assert_eq!(coins(&store, &seller), 15 * succeeded);

        for (buyer, ok) in buyers.iter().zip(&successes) {
            let expected = if *ok { 0 } else { 20 };
            assert_eq!(coins(&store, buyer), expected);
        }
    }

    // =========================================================================
    // Vote
    // =========================================================================

    fn counts(store: &RocksStore, id: &GlobalCharacterId) -> (i64, i64) {
        let g = global(store, id);
        (g.like_count, g.dislike_count)
    }

    #[test]
    fn vote_trajectory_retract_and_switch() {
        let (store, _dir) = open(EconomyPolicy::default());
        let owner = user("owner");
        let voter = user("voter");
        sign_in_with(&store, &owner, "Rina", 0);
        sign_in_with(&store, &voter, "Budi", 0);
        let id = publish(&store, &owner, "Aria");

        let mut trajectory = vec![counts(&store, &id)];
        for cast in [VoteKind::Like, VoteKind::Like, VoteKind::Dislike] {
            store.vote(&voter, &id, cast).unwrap();
            trajectory.push(counts(&store, &id));

            let tally = store.vote_tally(&id).unwrap();
            let (likes, dislikes) = counts(&store, &id);
            assert_eq!(tally, VoteTally { likes, dislikes });
        }

        assert_eq!(trajectory, vec![(0, 0), (1, 0), (0, 0), (0, 1)]);
        assert_eq!(store.get_vote(&id, &voter).unwrap(), VoteState::Disliked);

        // The retraction produced no notification
        let types: Vec<_> = store
            .list_notifications(&owner, false)
            .unwrap()
            .into_iter()
            .map(|n| n.notification_type)
            .collect();
        assert_eq!(types, vec![NotificationType::VoteDislike, NotificationType::VoteLike]);
    }

    #[test]
    fn own_votes_count_without_notification() {
        let (store, _dir) = open(EconomyPolicy::default());
        let owner = user("owner");
        sign_in_with(&store, &owner, "Rina", 0);
        let id = publish(&store, &owner, "Aria");

        let t = store.vote(&owner, &id, VoteKind::Like).unwrap();
        assert_eq!(t.to, VoteState::Liked);
        assert_eq!(counts(&store, &id), (1, 0));
        assert!(store.list_notifications(&owner, false).unwrap().is_empty());
    }

    #[test]
    fn vote_on_missing_character() {
        let (store, _dir) = open(EconomyPolicy::default());
        let result = store.vote(
            &user("voter"),
            &GlobalCharacterId::new("Nope_x").unwrap(),
            VoteKind::Like,
        );
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn concurrent_votes_keep_counts_consistent() {
        let policy = EconomyPolicy {
            max_transaction_attempts: 200,
            ..EconomyPolicy::default()
        };
        let (store, _dir) = open(policy);
        let owner = user("owner");
        sign_in_with(&store, &owner, "Rina", 0);
        let id = publish(&store, &owner, "Aria");

        let voters: Vec<UserId> = (0..6).map(|i| user(&format!("voter-{i}"))).collect();

        std::thread::scope(|s| {
            for voter in &voters {
                let store = &store;
                let id = &id;
                s.spawn(move || {
                    for cast in [VoteKind::Like, VoteKind::Dislike, VoteKind::Like] {
                        // A conflict error leaves state untouched; counts must still agree
                        let _ = store.vote(voter, id, cast);
                    }
                });
            }
        });

        let tally = store.vote_tally(&id).unwrap();
        let (likes, dislikes) = counts(&store, &id);
        assert_eq!(tally, VoteTally { likes, dislikes });
        assert!(likes + dislikes <= 6);
    }

    // =========================================================================
    // Settlement
    // =========================================================================

    fn pending(store: &RocksStore, order: &str, user_id: &UserId) -> OrderId {
        let order_id = OrderId::new(order).unwrap();
        let record = PaymentRecord::pending(order_id.clone(), user_id.clone(), 50_000, 500).unwrap();
        store.create_payment(&record).unwrap();
        order_id
    }

    fn notice(order_id: &OrderId, status: &str, fraud: Option<&str>) -> PaymentNotice {
        PaymentNotice {
            order_id: order_id.clone(),
            transaction_status: status.into(),
            fraud_status: fraud.map(Into::into),
        }
    }

    fn topup_notifications(store: &RocksStore, id: &UserId) -> usize {
        store
            .list_notifications(id, false)
            .unwrap()
            .iter()
            .filter(|n| n.notification_type == NotificationType::TransactionSuccess)
            .count()
    }

    #[test]
    fn settlement_credits_exactly_once() {
        let (store, _dir) = open(EconomyPolicy::default());
        let payer = user("payer");
        sign_in_with(&store, &payer, "Budi", 5);
        let order = pending(&store, "order-1", &payer);
        let settle = notice(&order, "settlement", Some("accept"));

        let first = store.settle_payment(&settle).unwrap();
        assert_eq!(
            first,
            Settlement::Credited {
                user_id: payer.clone(),
                coins: 500
            }
        );
        assert_eq!(coins(&store, &payer), 505);
        assert_eq!(
            store.get_payment(&order).unwrap().unwrap().status,
            PaymentStatus::Success
        );
        assert_eq!(topup_notifications(&store, &payer), 1);

        let notification = &store.list_notifications(&payer, false).unwrap()[0];
        assert_eq!(notification.order_id.as_ref(), Some(&order));

        let replay = store.settle_payment(&settle).unwrap();
        assert_eq!(replay, Settlement::AlreadyProcessed(PaymentStatus::Success));
        assert_eq!(coins(&store, &payer), 505);
        assert_eq!(topup_notifications(&store, &payer), 1);
    }

    #[test]
    fn concurrent_redelivery_credits_once() {
        let (store, _dir) = open(EconomyPolicy::default());
        let payer = user("payer");
        sign_in_with(&store, &payer, "Budi", 0);
        let order = pending(&store, "order-1", &payer);
        let settle = notice(&order, "capture", Some("accept"));

        let outcomes: Vec<_> = std::thread::scope(|s| {
            let (store, settle) = (&store, &settle);
            let handles: Vec<_> = (0..6)
                .map(|_| s.spawn(move || store.settle_payment(settle)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let credited = outcomes
            .iter()
            .filter(|o| matches!(o, Ok(Settlement::Credited { .. })))
            .count();
        assert_eq!(credited, 1);
        assert_eq!(coins(&store, &payer), 500);
        assert_eq!(topup_notifications(&store, &payer), 1);
    }

    #[test]
    fn failure_statuses_mark_failed_without_coins() {
        let (store, _dir) = open(EconomyPolicy::default());
        let payer = user("payer");
        sign_in_with(&store, &payer, "Budi", 5);
        let order = pending(&store, "order-1", &payer);

        let outcome = store.settle_payment(&notice(&order, "expire", None)).unwrap();
        assert_eq!(outcome, Settlement::Failed);
        assert_eq!(
            store.get_payment(&order).unwrap().unwrap().status,
            PaymentStatus::Failed
        );

        // A late settlement for a failed order is acknowledged, not credited
        let late = store
            .settle_payment(&notice(&order, "settlement", Some("accept")))
            .unwrap();
        assert_eq!(late, Settlement::AlreadyProcessed(PaymentStatus::Failed));
        assert_eq!(coins(&store, &payer), 5);
    }

    #[test]
    fn unaccepted_fraud_status_is_ignored() {
        let (store, _dir) = open(EconomyPolicy::default());
        let payer = user("payer");
        sign_in_with(&store, &payer, "Budi", 5);
        let order = pending(&store, "order-1", &payer);

        for (status, fraud) in [("capture", Some("challenge")), ("pending", None)] {
            let outcome = store.settle_payment(&notice(&order, status, fraud)).unwrap();
            assert_eq!(outcome, Settlement::Ignored);
        }

        let record = store.get_payment(&order).unwrap().unwrap();
        assert_eq!(record.status, PaymentStatus::Pending);
        assert_eq!(coins(&store, &payer), 5);
        assert_eq!(topup_notifications(&store, &payer), 0);
    }

    #[test]
    fn unknown_order_is_an_error() {
        let (store, _dir) = open(EconomyPolicy::default());
        let order = OrderId::new("missing").unwrap();
        let result = store.settle_payment(&notice(&order, "settlement", Some("accept")));
        assert!(matches!(
            result,
            Err(StoreError::NotFound {
                entity: "payment",
                ..
            })
        ));
    }

    #[test]
    fn settlement_for_missing_account_leaves_record_pending() {
        let (store, _dir) = open(EconomyPolicy::default());
        let order = pending(&store, "order-1", &user("ghost"));

        let result = store.settle_payment(&notice(&order, "settlement", Some("accept")));
        assert!(matches!(
            result,
            Err(StoreError::NotFound {
                entity: "account",
                ..
            })
        ));
        assert_eq!(
            store.get_payment(&order).unwrap().unwrap().status,
            PaymentStatus::Pending
        );
    }
}
