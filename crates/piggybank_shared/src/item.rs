//! Item payloads shared between the engine and the market store.
//!
//! The market store is an external collaborator; listings carry the full
//! item so both sides speak the same type.

use serde::{Deserialize, Serialize};

/// Rarity rank of a reward tier.
///
/// Rank 0 is the most common outcome, rank 5 the rarest. The draw engine
/// walks tiers in ascending rank order and the pity system targets the top
/// ranks, so the ordering here is load-bearing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    /// Everyday rewards, the bulk of all draws.
    Common = 0,
    /// Slightly better than common.
    Uncommon = 1,
    /// The small-pity target.
    Rare = 2,
    /// High-value rewards.
    Epic = 3,
    /// Second-highest rank, part of the big-pity pool.
    Legendary = 4,
    /// The top rank; winning one resets both pity counters.
    Mythic = 5,
}

impl Rank {
    /// Converts from a raw u8, clamping unknown values to `Mythic`.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Common,
            1 => Self::Uncommon,
            2 => Self::Rare,
            3 => Self::Epic,
            4 => Self::Legendary,
            _ => Self::Mythic,
        }
    }

    /// Returns the rank as a tier index (0 = most common).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A won or bought reward card sitting in a player's bag.
///
/// Items are minted by the draw engine or by a market purchase and destroyed
/// by use or by listing them for sale. The tier fields are copied at mint
/// time so later tier-table edits never rewrite existing cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Display name of the tier this item was won from.
    pub tier_name: String,
    /// Rank of that tier at mint time.
    pub tier_rank: Rank,
    /// Display color of the tier (CSS hex string).
    pub color: String,
    /// The reward text on the card.
    pub reward_text: String,
    /// Points credited when the card is used (0 for non-point rewards).
    pub bonus_points: u32,
    /// Monotonic mint identifier (millisecond timestamp scale).
    pub mint_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_ordering_matches_rarity() {
        assert!(Rank::Common < Rank::Rare);
        assert!(Rank::Legendary < Rank::Mythic);
        assert_eq!(Rank::from_u8(2), Rank::Rare);
        assert_eq!(Rank::from_u8(99), Rank::Mythic);
    }

    #[test]
    fn test_rank_index_round_trip() {
        for raw in 0..6u8 {
            assert_eq!(Rank::from_u8(raw).index(), raw as usize);
        }
    }
}
