//! User account types for atelier.
//!
//! An account holds the coin balance and the public profile used in notification text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Name shown in notifications when the acting user has no display name.
pub const DEFAULT_DISPLAY_NAME: &str = "Someone";

/// A coin account for an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// The identity key.
    pub id: UserId,

    /// Current coin balance. Never negative.
    pub coins: i64,

    /// Display name from the identity provider or profile edits.
    pub display_name: Option<String>,

    /// Avatar URL.
    pub photo_url: Option<String>,

    /// Email from the identity provider.
    pub email: Option<String>,

    /// When the account was created (first sign-in).
    pub created_at: DateTime<Utc>,

    /// Most recent sign-in.
    pub last_login: DateTime<Utc>,
}

impl UserAccount {
    /// Document field holding the balance, targeted by atomic increments.
    pub const COINS_FIELD: &'static str = "coins";

    /// Create an account on first sign-in with the starting grant.
    #[must_use]
    pub fn new(id: UserId, profile: Profile, starting_coins: i64) -> Self {
        let now = Utc::now();
        Self {
            id,
            coins: starting_coins,
            display_name: profile.display_name,
            photo_url: profile.photo_url,
            email: profile.email,
            created_at: now,
            last_login: now,
        }
    }

    /// Check if the account can afford a debit.
    #[must_use]
    pub fn has_sufficient_coins(&self, cost: i64) -> bool {
        self.coins >= cost
    }

    /// Name used when describing this user to others.
    #[must_use]
    pub fn public_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
    }

    /// Refresh profile fields on a later sign-in, leaving the balance alone.
    ///
    /// Missing profile values do not erase stored ones.
    pub fn refresh_profile(&mut self, profile: Profile) {
        if profile.display_name.is_some() {
            self.display_name = profile.display_name;
        }
        if profile.photo_url.is_some() {
            self.photo_url = profile.photo_url;
        }
        if profile.email.is_some() {
            self.email = profile.email;
        }
        self.last_login = Utc::now();
    }
}

/// Profile attributes supplied by the identity provider or by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name.
    pub display_name: Option<String>,
    /// Avatar URL.
    pub photo_url: Option<String>,
    /// Email address.
    pub email: Option<String>,
}
