//! Character types: a user's private collection and the shared catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::{GlobalCharacterId, IdError, UserId};

/// Maximum length of a character name in bytes.
pub const MAX_CHARACTER_NAME_LEN: usize = 120;

/// A character in a user's own collection.
///
/// The name doubles as the per-owner key, so an owner never holds two characters
/// with the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedCharacter {
    /// Character name (unique per owner).
    pub name: String,

    /// Free-form character sheet text.
    pub description: String,

    /// Illustration image URL, if one was attached.
    pub illustration_url: Option<String>,

    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
}

impl OwnedCharacter {
    /// Create a new character, validating name and description.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or description is empty, or the name is not
    /// usable as a key.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        illustration_url: Option<String>,
    ) -> Result<Self> {
        let name = name.into().trim().to_string();
        validate_name(&name)?;

        let description = description.into();
        if description.trim().is_empty() {
            return Err(CoreError::InvalidField {
                field: "description",
                reason: "must not be empty".into(),
            });
        }

        Ok(Self {
            name,
            description,
            illustration_url,
            created_at: Utc::now(),
        })
    }

    /// The copy a buyer receives when purchasing a catalog entry.
    #[must_use]
    pub fn copied_from(global: &GlobalCharacter) -> Self {
        Self {
            name: global.name.clone(),
            description: global.description.clone(),
            illustration_url: global.illustration_url.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Validate a character name for use as a per-owner key.
///
/// # Errors
///
/// Returns an error if the name is empty, too long, or contains control characters.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        "must not be empty".to_string()
    } else if name.len() > MAX_CHARACTER_NAME_LEN {
        format!("longer than {MAX_CHARACTER_NAME_LEN} bytes")
    } else if name.chars().any(char::is_control) {
        "contains a control character".to_string()
    } else {
        return Ok(());
    };

    Err(CoreError::InvalidField {
        field: "name",
        reason,
    })
}

/// A published character in the shared catalog.
///
/// Counters are only ever changed through the store's atomic increment primitive.
/// Individual votes live in their own records keyed by voter, see [`crate::VoteRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCharacter {
    /// Catalog identifier.
    pub id: GlobalCharacterId,

    /// Character name; becomes the buyer's per-owner key on purchase.
    pub name: String,

    /// Character sheet text.
    pub description: String,

    /// Illustration image URL.
    pub illustration_url: Option<String>,

    /// Publishing user.
    pub owner_id: UserId,

    /// Publisher's display name at publish time.
    pub owner_name: String,

    /// Number of successful purchases.
    pub copy_count: i64,

    /// Number of voters currently liking this character.
    pub like_count: i64,

    /// Number of voters currently disliking this character.
    pub dislike_count: i64,

    /// When the character was (last) published.
    pub shared_at: DateTime<Utc>,
}

impl GlobalCharacter {
    /// Document field for the purchase counter.
    pub const COPY_COUNT_FIELD: &'static str = "copy_count";
    /// Document field for the like counter.
    pub const LIKE_COUNT_FIELD: &'static str = "like_count";
    /// Document field for the dislike counter.
    pub const DISLIKE_COUNT_FIELD: &'static str = "dislike_count";

    /// Publish an owned character with fresh counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the derived catalog id is invalid.
    pub fn publish(owner_id: &UserId, owner_name: &str, character: &OwnedCharacter) -> Result<Self> {
        Ok(Self {
            id: catalog_id_for(&character.name, owner_id)?,
            name: character.name.clone(),
            description: character.description.clone(),
            illustration_url: character.illustration_url.clone(),
            owner_id: owner_id.clone(),
            owner_name: owner_name.to_string(),
            copy_count: 0,
            like_count: 0,
            dislike_count: 0,
            shared_at: Utc::now(),
        })
    }

    /// Replace the published content, keeping counters from the existing entry.
    #[must_use]
    pub fn republished_over(mut self, existing: &Self) -> Self {
        self.copy_count = existing.copy_count;
        self.like_count = existing.like_count;
        self.dislike_count = existing.dislike_count;
        self
    }
}

/// Derive the catalog id for a character: whitespace runs become `_`, then `_<owner>`.
///
/// # Errors
///
/// Returns an error if the result is not a valid identifier.
pub fn catalog_id_for(name: &str, owner_id: &UserId) -> Result<GlobalCharacterId> {
    let slug = name.split_whitespace().collect::<Vec<_>>().join("_");
    if slug.is_empty() {
        return Err(IdError::Empty.into());
    }
    Ok(GlobalCharacterId::new(format!("{slug}_{owner_id}"))?)
}
