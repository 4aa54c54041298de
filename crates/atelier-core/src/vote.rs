//! Like/dislike voting on catalog characters.
//!
//! Each (character, voter) pair is in exactly one of three states. A voter's state is
//! stored as a single optional [`VoteRecord`], so "liked and disliked at once" cannot be
//! represented.
//!
//! | From     | Cast      | To       |
//! |----------|-----------|----------|
//! | None     | like      | Liked    |
//! | None     | dislike   | Disliked |
//! | Liked    | like      | None     |
//! | Liked    | dislike   | Disliked |
//! | Disliked | dislike   | None     |
//! | Disliked | like      | Liked    |

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::NotificationType;

/// The vote a user casts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    /// Thumbs up.
    Like,
    /// Thumbs down.
    Dislike,
}

impl FromStr for VoteKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            other => Err(CoreError::InvalidVoteKind(other.to_string())),
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Like => f.write_str("like"),
            Self::Dislike => f.write_str("dislike"),
        }
    }
}

/// A voter's standing vote on one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// The standing vote.
    pub kind: VoteKind,
    /// When it was cast.
    pub voted_at: DateTime<Utc>,
}

impl VoteRecord {
    /// Record a vote cast now.
    #[must_use]
    pub fn now(kind: VoteKind) -> Self {
        Self {
            kind,
            voted_at: Utc::now(),
        }
    }
}

/// Per-voter vote state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteState {
    /// No standing vote.
    #[default]
    None,
    /// Standing like.
    Liked,
    /// Standing dislike.
    Disliked,
}

impl From<Option<VoteKind>> for VoteState {
    fn from(kind: Option<VoteKind>) -> Self {
        match kind {
            None => Self::None,
            Some(VoteKind::Like) => Self::Liked,
            Some(VoteKind::Dislike) => Self::Disliked,
        }
    }
}

impl VoteState {
    /// Apply a cast vote, toggling off a repeat and switching an opposite vote.
    #[must_use]
    pub fn apply(self, cast: VoteKind) -> VoteTransition {
        let to = match (self, cast) {
            (Self::Liked, VoteKind::Like) | (Self::Disliked, VoteKind::Dislike) => Self::None,
            (_, VoteKind::Like) => Self::Liked,
            (_, VoteKind::Dislike) => Self::Disliked,
        };
        VoteTransition {
            from: self,
            to,
            cast,
        }
    }

    /// The stored vote for this state, if any.
    #[must_use]
    pub const fn kind(self) -> Option<VoteKind> {
        match self {
            Self::None => None,
            Self::Liked => Some(VoteKind::Like),
            Self::Disliked => Some(VoteKind::Dislike),
        }
    }

    const fn likes(self) -> i64 {
        if matches!(self, Self::Liked) {
            1
        } else {
            0
        }
    }

    const fn dislikes(self) -> i64 {
        if matches!(self, Self::Disliked) {
            1
        } else {
            0
        }
    }
}

/// The result of applying one cast vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    /// State before the vote.
    pub from: VoteState,
    /// State after the vote.
    pub to: VoteState,
    /// The vote that was cast.
    pub cast: VoteKind,
}

impl VoteTransition {
    /// Change to the like counter.
    #[must_use]
    pub const fn like_delta(&self) -> i64 {
        self.to.likes() - self.from.likes()
    }

    /// Change to the dislike counter.
    #[must_use]
    pub const fn dislike_delta(&self) -> i64 {
        self.to.dislikes() - self.from.dislikes()
    }

    /// Whether the vote withdrew a standing vote.
    #[must_use]
    pub fn is_retraction(&self) -> bool {
        self.to == VoteState::None
    }

    /// Notification the character owner should receive, if any. Retractions are silent.
    #[must_use]
    pub fn notification_type(&self) -> Option<NotificationType> {
        match self.to {
            VoteState::None => None,
            VoteState::Liked => Some(NotificationType::VoteLike),
            VoteState::Disliked => Some(NotificationType::VoteDislike),
        }
    }
}

/// Counts of standing votes, recomputed from vote records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Standing likes.
    pub likes: i64,
    /// Standing dislikes.
    pub dislikes: i64,
}

impl VoteTally {
    /// Add one standing vote to the tally.
    pub fn add(&mut self, kind: VoteKind) {
        match kind {
            VoteKind::Like => self.likes += 1,
            VoteKind::Dislike => self.dislikes += 1,
        }
    }
}
