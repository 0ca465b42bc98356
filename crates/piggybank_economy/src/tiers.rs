//! # Reward Tier Tables
//!
//! The six-tier ladder a draw selects from. Tables are loaded from TOML at
//! session start and validated once; the draw engine then treats them as
//! immutable. `chance` values are percent weights over `[0, 100)` and do not
//! have to sum to exactly 100 — the selection walk falls back to the last
//! tier, so any shortfall accrues to the rarest rank.

use piggybank_shared::Rank;
use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, EconomyResult};

/// One concrete reward a tier can pay out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Display text of the reward card.
    pub text: String,
    /// Points credited when the card is used (0 for non-point rewards).
    #[serde(default)]
    pub bonus_points: u32,
}

impl Reward {
    /// Creates a reward with no point payout.
    #[must_use]
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            bonus_points: 0,
        }
    }

    /// Creates a reward that pays points when used.
    #[must_use]
    pub fn points(text: &str, bonus_points: u32) -> Self {
        Self {
            text: text.to_owned(),
            bonus_points,
        }
    }
}

/// A single rarity tier in the draw ladder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Stable identifier (used in config files and logs).
    pub id: String,
    /// Rarity rank, strictly increasing down the ladder.
    pub rank: Rank,
    /// Display name.
    pub name: String,
    /// Display color (CSS hex string).
    pub color: String,
    /// Percent weight in the selection walk.
    pub chance: f64,
    /// Rewards this tier can pay. May be empty; the draw engine then
    /// substitutes a consolation card.
    #[serde(default)]
    pub rewards: Vec<Reward>,
}

/// The full draw ladder: exactly six tiers, ranks `Common` through `Mythic`
/// in order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    /// Tiers in ascending rank order.
    pub tiers: Vec<Tier>,
}

impl TierTable {
    /// Parses a tier table from TOML and validates its shape.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] when the document is
    /// unreadable or the ladder shape is wrong.
    pub fn from_toml_str(input: &str) -> EconomyResult<Self> {
        let table: Self =
            toml::from_str(input).map_err(|e| EconomyError::InvalidConfig(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    /// Serializes the table to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> EconomyResult<String> {
        toml::to_string_pretty(self).map_err(|e| EconomyError::InvalidConfig(e.to_string()))
    }

    /// Checks the ladder invariants: six tiers, ranks 0..=5 in order,
    /// non-negative finite chances.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] describing the first
    /// violation found.
    pub fn validate(&self) -> EconomyResult<()> {
        if self.tiers.len() != 6 {
            return Err(EconomyError::InvalidConfig(format!(
                "expected 6 tiers, got {}",
                self.tiers.len()
            )));
        }
        for (i, tier) in self.tiers.iter().enumerate() {
            if tier.rank.index() != i {
                return Err(EconomyError::InvalidConfig(format!(
                    "tier '{}' at position {i} has rank {}",
                    tier.id,
                    tier.rank.index()
                )));
            }
            if !tier.chance.is_finite() || tier.chance < 0.0 {
                return Err(EconomyError::InvalidConfig(format!(
                    "tier '{}' has invalid chance {}",
                    tier.id, tier.chance
                )));
            }
        }
        Ok(())
    }

    /// Returns the tier at the given rank.
    ///
    /// Valid for any rank once [`TierTable::validate`] has passed.
    #[must_use]
    pub fn tier_at(&self, rank: Rank) -> &Tier {
        &self.tiers[rank.index().min(self.tiers.len() - 1)]
    }

    /// Sum of all percent weights.
    #[must_use]
    pub fn total_chance(&self) -> f64 {
        self.tiers.iter().map(|t| t.chance).sum()
    }
}

impl Default for TierTable {
    /// The stock 60/20/10/6/3/1 ladder.
    fn default() -> Self {
        Self {
            tiers: vec![
                Tier {
                    id: "common".to_owned(),
                    rank: Rank::Common,
                    name: "Common".to_owned(),
                    color: "#95a5a6".to_owned(),
                    chance: 60.0,
                    rewards: vec![
                        Reward::plain("One less journal line"),
                        Reward::plain("5 extra minutes of weekend games"),
                        Reward::plain("5 minutes of weekend games with dad"),
                        Reward::plain("5 fewer minutes of reading time"),
                    ],
                },
                Tier {
                    id: "uncommon".to_owned(),
                    rank: Rank::Uncommon,
                    name: "Uncommon".to_owned(),
                    color: "#00b894".to_owned(),
                    chance: 20.0,
                    rewards: vec![
                        Reward::plain("Two less journal lines"),
                        Reward::plain("10 extra minutes of weekend games"),
                        Reward::plain("10 minutes of weekend games with dad"),
                        Reward::plain("10 fewer minutes of reading time"),
                    ],
                },
                Tier {
                    id: "rare".to_owned(),
                    rank: Rank::Rare,
                    name: "Rare".to_owned(),
                    color: "#0984e3".to_owned(),
                    chance: 10.0,
                    rewards: vec![
                        Reward::plain("Three less journal lines"),
                        Reward::plain("15 extra minutes of weekend games"),
                        Reward::plain("15 minutes of weekend games with dad"),
                        Reward::plain("15 fewer minutes of reading time"),
                        Reward::plain("Mom reads you to sleep"),
                    ],
                },
                Tier {
                    id: "epic".to_owned(),
                    rank: Rank::Epic,
                    name: "Epic".to_owned(),
                    color: "#6c5ce7".to_owned(),
                    chance: 6.0,
                    rewards: vec![
                        Reward::plain("Four less journal lines"),
                        Reward::plain("10 minutes of weekday games"),
                        Reward::plain("30 minutes of weekend games with dad"),
                        Reward::points("Add 200 points", 200),
                    ],
                },
                Tier {
                    id: "legendary".to_owned(),
                    rank: Rank::Legendary,
                    name: "Legendary".to_owned(),
                    color: "#e17055".to_owned(),
                    chance: 3.0,
                    rewards: vec![
                        Reward::plain("15 minutes of weekday games"),
                        Reward::plain("100 dollars of pocket money"),
                        Reward::points("Add 300 points", 300),
                    ],
                },
                Tier {
                    id: "mythic".to_owned(),
                    rank: Rank::Mythic,
                    name: "Mythic".to_owned(),
                    color: "#d63031".to_owned(),
                    chance: 1.0,
                    rewards: vec![
                        Reward::plain("30 minutes of weekday games"),
                        Reward::plain("Pick any small gift under 500 dollars"),
                        Reward::plain("One punishment waived"),
                        Reward::points("Add 500 points", 500),
                    ],
                },
            ],
        }
    }
}
