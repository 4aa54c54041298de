//! Per-user notifications written as side effects of economy operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{NotificationId, OrderId};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    /// Someone purchased a copy of the user's published character.
    CharacterCopy,
    /// Someone liked the user's published character.
    VoteLike,
    /// Someone disliked the user's published character.
    VoteDislike,
    /// A coin top-up settled.
    TransactionSuccess,
}

/// An append-only notification entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Time-ordered identifier.
    pub id: NotificationId,

    /// Notification kind.
    #[serde(rename = "type")]
    pub notification_type: NotificationType,

    /// Rendered text.
    pub message: String,

    /// When it was written.
    pub timestamp: DateTime<Utc>,

    /// Whether the user has seen it.
    pub is_read: bool,

    /// Order that produced a top-up notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
}

impl Notification {
    fn new(notification_type: NotificationType, message: String) -> Self {
        Self {
            id: NotificationId::generate(),
            notification_type,
            message,
            timestamp: Utc::now(),
            is_read: false,
            order_id: None,
        }
    }

    /// A buyer copied the owner's character.
    #[must_use]
    pub fn character_copied(character_name: &str, buyer_name: &str, reward: i64) -> Self {
        Self::new(
            NotificationType::CharacterCopy,
            format!(
                "Your character \"{character_name}\" was copied by {buyer_name}. You earned +{reward} coins!"
            ),
        )
    }

    /// A voter liked or disliked the owner's character.
    ///
    /// `notification_type` must be one of the vote kinds.
    #[must_use]
    pub fn voted(
        notification_type: NotificationType,
        character_name: &str,
        voter_name: &str,
    ) -> Self {
        let verb = match notification_type {
            NotificationType::VoteDislike => "disliked",
            _ => "liked",
        };
        Self::new(
            notification_type,
            format!("{voter_name} {verb} your character \"{character_name}\"."),
        )
    }

    /// A top-up settled and coins were credited.
    #[must_use]
    pub fn topup_settled(order_id: &OrderId, amount: i64, coins: i64) -> Self {
        let mut notification = Self::new(
            NotificationType::TransactionSuccess,
            format!("Top-up of Rp {} succeeded. {coins} coins have been added.", group_thousands(amount)),
        );
        notification.order_id = Some(order_id.clone());
        notification
    }
}

/// Format an amount with `.` thousands separators, as rupiah amounts are written.
#[must_use]
pub fn group_thousands(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
