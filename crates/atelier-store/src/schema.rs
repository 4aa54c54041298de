//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// User accounts, keyed by `user_id`. Supports field increments.
    pub const ACCOUNTS: &str = "accounts";

    /// Owned characters, keyed by `user_id || 0x00 || name`.
    pub const OWNED_CHARACTERS: &str = "owned_characters";

    /// Published catalog entries, keyed by global character id. Supports field increments.
    pub const CATALOG: &str = "catalog";

    /// Standing votes, keyed by `global_id || 0x00 || voter_id`.
    pub const VOTES: &str = "votes";

    /// Notifications, keyed by `user_id || 0x00 || notification_id` (ULID bytes).
    pub const NOTIFICATIONS: &str = "notifications";

    /// Payment records, keyed by `order_id`.
    pub const PAYMENTS: &str = "payments";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ACCOUNTS,
        cf::OWNED_CHARACTERS,
        cf::CATALOG,
        cf::VOTES,
        cf::NOTIFICATIONS,
        cf::PAYMENTS,
    ]
}

/// Whether a column family holds documents with atomically incremented fields.
#[must_use]
pub fn has_counters(name: &str) -> bool {
    matches!(name, cf::ACCOUNTS | cf::CATALOG)
}
