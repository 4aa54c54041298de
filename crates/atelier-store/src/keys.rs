//! Key encoding utilities for `RocksDB`.
//!
//! Composite keys join their parts with a NUL byte. Identifiers and character names
//! never contain control characters, so the separator is unambiguous and a
//! `parent || 0x00` prefix selects exactly one parent's children.

use atelier_core::{GlobalCharacterId, NotificationId, OrderId, UserId};

const SEP: u8 = 0;

fn composite(parent: &[u8], child: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(parent.len() + 1 + child.len());
    key.extend_from_slice(parent);
    key.push(SEP);
    key.extend_from_slice(child);
    key
}

fn prefix(parent: &[u8]) -> Vec<u8> {
    composite(parent, &[])
}

/// Create an account key from a user ID.
#[must_use]
pub fn account_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create an owned-character key. The name is the per-owner uniqueness key.
#[must_use]
pub fn owned_character_key(owner: &UserId, name: &str) -> Vec<u8> {
    composite(owner.as_bytes(), name.as_bytes())
}

/// Create a prefix for iterating all characters owned by a user.
#[must_use]
pub fn owned_characters_prefix(owner: &UserId) -> Vec<u8> {
    prefix(owner.as_bytes())
}

/// Create a catalog key from a global character ID.
#[must_use]
pub fn catalog_key(id: &GlobalCharacterId) -> Vec<u8> {
    id.as_bytes().to_vec()
}

/// Create a vote key for one voter on one character.
#[must_use]
pub fn vote_key(id: &GlobalCharacterId, voter: &UserId) -> Vec<u8> {
    composite(id.as_bytes(), voter.as_bytes())
}

/// Create a prefix for iterating all votes on a character.
#[must_use]
pub fn votes_prefix(id: &GlobalCharacterId) -> Vec<u8> {
    prefix(id.as_bytes())
}

/// Create a notification key.
///
/// Format: `user_id || 0x00 || notification_id (16 bytes)`
///
/// Since ULIDs are time-ordered, a user's notifications are sorted by time.
#[must_use]
pub fn notification_key(user_id: &UserId, id: &NotificationId) -> Vec<u8> {
    composite(user_id.as_bytes(), &id.to_bytes())
}

/// Create a prefix for iterating all notifications for a user.
#[must_use]
pub fn notifications_prefix(user_id: &UserId) -> Vec<u8> {
    prefix(user_id.as_bytes())
}

/// Create a payment key from an order ID.
#[must_use]
pub fn payment_key(order_id: &OrderId) -> Vec<u8> {
    order_id.as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[test]
    fn owned_keys_share_owner_prefix() {
        let key = owned_character_key(&user("u1"), "Aria");
        assert!(key.starts_with(&owned_characters_prefix(&user("u1"))));
        assert_eq!(key, b"u1\0Aria");
    }

    #[test]
    fn prefix_does_not_match_longer_owner() {
        let key = owned_character_key(&user("u10"), "Aria");
        assert!(!key.starts_with(&owned_characters_prefix(&user("u1"))));
    }

    #[test]
    fn notification_key_format() {
        let id = NotificationId::generate();
        let key = notification_key(&user("u1"), &id);

        assert_eq!(key.len(), 2 + 1 + 16);
        assert_eq!(&key[..3], b"u1\0");
        assert_eq!(&key[3..], id.to_bytes());
    }

    #[test]
    fn vote_keys_group_by_character() {
        let id = GlobalCharacterId::new("Aria_u1").unwrap();
        let key = vote_key(&id, &user("u2"));
        assert!(key.starts_with(&votes_prefix(&id)));
    }
}
