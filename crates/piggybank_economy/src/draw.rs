//! # Draw Engine
//!
//! One draw: debit the cost, pick a tier (pity overrides first, weighted
//! walk otherwise), update both pity counters, mint the item into the bag.
//! The whole thing is all-or-nothing — the only fallible step is the cost
//! debit, and it runs before any state changes.
//!
//! The percent roll is consumed before the pity checks even when a pity
//! fires, so a seeded random stream produces the same tier sequence as the
//! reference behaviour.

use chrono::NaiveDateTime;
use piggybank_shared::{Item, Rank, RandomSource};
use tracing::debug;

use crate::buffs::EffectiveParams;
use crate::error::EconomyResult;
use crate::ledger::{LedgerEntryKind, Overdraft};
use crate::profile::PlayerProfile;
use crate::tiers::{Reward, Tier, TierTable};

/// Reward text substituted when a tier has an empty reward list.
pub const CONSOLATION_TEXT: &str = "Thanks for playing";

fn select_tier<'a>(
    tiers: &'a TierTable,
    params: &EffectiveParams,
    profile: &PlayerProfile,
    rng: &mut dyn RandomSource,
) -> &'a Tier {
    let roll = rng.roll_percent();

    // Big pity first: it outranks the small pity when both are due.
    if i64::from(profile.pity.legendary) >= i64::from(params.pity_legendary_threshold) - 1 {
        if params.big_pity_splits {
            return if rng.coin_flip() {
                tiers.tier_at(Rank::Mythic)
            } else {
                tiers.tier_at(Rank::Legendary)
            };
        }
        return tiers.tier_at(Rank::Mythic);
    }
    if i64::from(profile.pity.rare) >= i64::from(params.pity_rare_threshold) - 1 {
        return tiers.tier_at(Rank::Rare);
    }

    let mut cumulative = 0.0;
    for tier in &tiers.tiers {
        cumulative += tier.chance;
        if roll <= cumulative {
            return tier;
        }
    }
    // Weights summing below 100 leave the shortfall to the rarest tier.
    tiers.tier_at(Rank::Mythic)
}

fn update_pity(profile: &mut PlayerProfile, won: Rank) {
    if won == Rank::Mythic {
        profile.pity.legendary = 0;
        profile.pity.rare = 0;
    } else if won >= Rank::Rare {
        profile.pity.rare = 0;
        profile.pity.legendary += 1;
    } else {
        profile.pity.rare += 1;
        profile.pity.legendary += 1;
    }
}

/// Executes one draw against the profile.
///
/// Debits `params.cost` (with a `Draw` ledger entry), selects a tier, picks
/// a reward uniformly (consolation card for an empty list), updates the
/// pity counters and unshifts the minted item into the bag. The win itself
/// never touches the ledger.
///
/// # Errors
///
/// Returns [`crate::error::EconomyError::InsufficientFunds`] when the score
/// cannot cover the cost; the profile is untouched in that case.
pub fn draw(
    tiers: &TierTable,
    params: &EffectiveParams,
    profile: &mut PlayerProfile,
    rng: &mut dyn RandomSource,
    mint_id: u64,
    now: NaiveDateTime,
) -> EconomyResult<Item> {
    profile.ledger.debit(
        params.cost,
        LedgerEntryKind::Draw,
        "Draw entry",
        now,
        Overdraft::Deny,
    )?;

    let tier = select_tier(tiers, params, profile, rng);
    update_pity(profile, tier.rank);

    let consolation = Reward::plain(CONSOLATION_TEXT);
    let reward = if tier.rewards.is_empty() {
        &consolation
    } else {
        &tier.rewards[rng.pick_index(tier.rewards.len())]
    };

    let item = Item {
        tier_name: tier.name.clone(),
        tier_rank: tier.rank,
        color: tier.color.clone(),
        reward_text: reward.text.clone(),
        bonus_points: reward.bonus_points,
        mint_id,
    };
    profile.bag.insert(0, item.clone());

    debug!(
        tier = %tier.name,
        rank = tier.rank.index(),
        pity_rare = profile.pity.rare,
        pity_legendary = profile.pity.legendary,
        "draw resolved"
    );
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use crate::settings::Settings;
    use chrono::NaiveDate;
    use piggybank_shared::ScriptedSource;
    use std::collections::BTreeSet;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    fn params() -> EffectiveParams {
        crate::buffs::resolve(&Settings::default(), &BTreeSet::new())
    }

    fn funded_profile(points: u64) -> PlayerProfile {
        let mut profile = PlayerProfile {
            ledger: Ledger::new(),
            ..PlayerProfile::default()
        };
        profile
            .ledger
            .credit(points, LedgerEntryKind::Adjustment, "seed", at())
            .unwrap();
        profile
    }

    #[test]
    fn test_insufficient_funds_leaves_profile_untouched() {
        let tiers = TierTable::default();
        let mut profile = funded_profile(50);
        let mut rng = ScriptedSource::new(vec![0.0]);
        assert!(draw(&tiers, &params(), &mut profile, &mut rng, 1, at()).is_err());
        assert_eq!(profile.ledger.score(), 50);
        assert!(profile.bag.is_empty());
        assert_eq!(profile.pity, crate::profile::PityCounters::default());
    }

    #[test]
    fn test_cost_is_debited_with_draw_entry() {
        let tiers = TierTable::default();
        let mut profile = funded_profile(500);
        let mut rng = ScriptedSource::new(vec![0.1]);
        draw(&tiers, &params(), &mut profile, &mut rng, 1, at()).unwrap();
        assert_eq!(profile.ledger.score(), 400);
        let cost_entry = &profile.ledger.entries()[1];
        assert_eq!(cost_entry.kind, LedgerEntryKind::Draw);
        assert_eq!(cost_entry.amount, -100);
        // The win itself leaves no ledger trace.
        assert_eq!(profile.ledger.entries().len(), 2);
        assert_eq!(profile.bag.len(), 1);
    }

    #[test]
    fn test_low_roll_lands_on_common() {
        let tiers = TierTable::default();
        let mut profile = funded_profile(500);
        // roll 10.0 <= 60 -> Common; second value picks the reward.
        let mut rng = ScriptedSource::new(vec![0.1, 0.0]);
        let item = draw(&tiers, &params(), &mut profile, &mut rng, 1, at()).unwrap();
        assert_eq!(item.tier_rank, Rank::Common);
        assert_eq!(profile.pity.rare, 1);
        assert_eq!(profile.pity.legendary, 1);
    }

    #[test]
    fn test_high_roll_lands_on_mythic() {
        let tiers = TierTable::default();
        let mut profile = funded_profile(500);
        // roll 99.5 passes every cumulative bound except the last.
        let mut rng = ScriptedSource::new(vec![0.995, 0.0]);
        let item = draw(&tiers, &params(), &mut profile, &mut rng, 1, at()).unwrap();
        assert_eq!(item.tier_rank, Rank::Mythic);
        assert_eq!(profile.pity.rare, 0);
        assert_eq!(profile.pity.legendary, 0);
    }

    #[test]
    fn test_rare_pity_forces_rank_two() {
        let tiers = TierTable::default();
        let mut profile = funded_profile(500);
        profile.pity.rare = 9; // threshold 10 fires at counter >= 9
        let mut rng = ScriptedSource::new(vec![0.0, 0.0]);
        let item = draw(&tiers, &params(), &mut profile, &mut rng, 1, at()).unwrap();
        assert_eq!(item.tier_rank, Rank::Rare);
        assert_eq!(profile.pity.rare, 0);
        assert_eq!(profile.pity.legendary, 1);
    }

    #[test]
    fn test_big_pity_guarantees_mythic() {
        let tiers = TierTable::default();
        let mut profile = funded_profile(500);
        profile.pity.legendary = 99;
        let mut rng = ScriptedSource::new(vec![0.0, 0.0]);
        let item = draw(&tiers, &params(), &mut profile, &mut rng, 1, at()).unwrap();
        assert_eq!(item.tier_rank, Rank::Mythic);
        assert_eq!(profile.pity.legendary, 0);
        assert_eq!(profile.pity.rare, 0);
    }

    #[test]
    fn test_big_pity_split_mode_covers_both_top_ranks() {
        let tiers = TierTable::default();
        let mut split = params();
        split.big_pity_splits = true;

        let mut profile = funded_profile(500);
        profile.pity.legendary = 99;
        // Stream: percent roll, then coin flip < 0.5 -> Mythic.
        let mut rng = ScriptedSource::new(vec![0.0, 0.2, 0.0]);
        let item = draw(&tiers, &split, &mut profile, &mut rng, 1, at()).unwrap();
        assert_eq!(item.tier_rank, Rank::Mythic);

        let mut profile = funded_profile(500);
        profile.pity.legendary = 99;
        let mut rng = ScriptedSource::new(vec![0.0, 0.8, 0.0]);
        let item = draw(&tiers, &split, &mut profile, &mut rng, 2, at()).unwrap();
        assert_eq!(item.tier_rank, Rank::Legendary);
        // Legendary is not the top rank: big counter keeps climbing.
        assert_eq!(profile.pity.legendary, 1);
        assert_eq!(profile.pity.rare, 0);
    }

    #[test]
    fn test_big_pity_outranks_rare_pity() {
        let tiers = TierTable::default();
        let mut profile = funded_profile(500);
        profile.pity.rare = 50;
        profile.pity.legendary = 99;
        let mut rng = ScriptedSource::new(vec![0.0, 0.0]);
        let item = draw(&tiers, &params(), &mut profile, &mut rng, 1, at()).unwrap();
        assert_eq!(item.tier_rank, Rank::Mythic);
    }

    #[test]
    fn test_empty_reward_list_yields_consolation() {
        let mut tiers = TierTable::default();
        tiers.tiers[0].rewards.clear();
        let mut profile = funded_profile(500);
        let mut rng = ScriptedSource::new(vec![0.1]);
        let item = draw(&tiers, &params(), &mut profile, &mut rng, 1, at()).unwrap();
        assert_eq!(item.reward_text, CONSOLATION_TEXT);
        assert_eq!(item.bonus_points, 0);
    }

    #[test]
    fn test_items_unshift_to_front() {
        let tiers = TierTable::default();
        let mut profile = funded_profile(500);
        let mut rng = ScriptedSource::new(vec![0.1, 0.0]);
        draw(&tiers, &params(), &mut profile, &mut rng, 1, at()).unwrap();
        draw(&tiers, &params(), &mut profile, &mut rng, 2, at()).unwrap();
        assert_eq!(profile.bag[0].mint_id, 2);
        assert_eq!(profile.bag[1].mint_id, 1);
    }
}
