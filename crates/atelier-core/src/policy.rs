//! Economy policy constants.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Coins debited from a buyer per purchase.
pub const DEFAULT_PURCHASE_COST: i64 = 20;

/// Coins credited to the character owner per purchase.
pub const DEFAULT_OWNER_REWARD: i64 = 15;

/// Coins granted to a new account.
pub const DEFAULT_STARTING_COINS: i64 = 5;

/// Attempts before a conflicting transaction gives up.
pub const DEFAULT_MAX_TRANSACTION_ATTEMPTS: u32 = 5;

/// Tunable coin economy.
///
/// The reward is lower than the cost, so every purchase burns the difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyPolicy {
    /// Coins a purchase costs the buyer.
    pub purchase_cost: i64,
    /// Coins a purchase pays the owner.
    pub owner_reward: i64,
    /// Coins granted on first sign-in.
    pub starting_coins: i64,
    /// Optimistic transaction attempts before reporting a conflict.
    pub max_transaction_attempts: u32,
}

impl Default for EconomyPolicy {
    fn default() -> Self {
        Self {
            purchase_cost: DEFAULT_PURCHASE_COST,
            owner_reward: DEFAULT_OWNER_REWARD,
            starting_coins: DEFAULT_STARTING_COINS,
            max_transaction_attempts: DEFAULT_MAX_TRANSACTION_ATTEMPTS,
        }
    }
}

impl EconomyPolicy {
    /// Coins removed from circulation by one purchase.
    #[must_use]
    pub const fn burn_per_purchase(&self) -> i64 {
        self.purchase_cost - self.owner_reward
    }

    /// Check that purchases conserve or burn coins and never debit the owner.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPolicy`] naming the first violated bound.
    pub fn validate(&self) -> Result<()> {
        if self.purchase_cost <= 0 {
            return Err(CoreError::InvalidPolicy(format!(
                "purchase cost must be positive, got {}",
                self.purchase_cost
            )));
        }
        if self.owner_reward < 0 || self.burn_per_purchase() < 0 {
            return Err(CoreError::InvalidPolicy(format!(
                "owner reward must be between 0 and the purchase cost {}, got {}",
                self.purchase_cost, self.owner_reward
            )));
        }
        if self.starting_coins < 0 {
            return Err(CoreError::InvalidPolicy(format!(
                "starting coins must not be negative, got {}",
                self.starting_coins
            )));
        }
        if self.max_transaction_attempts == 0 {
            return Err(CoreError::InvalidPolicy(
                "at least one transaction attempt is required".into(),
            ));
        }
        Ok(())
    }
}
