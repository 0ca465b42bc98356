//! # Achievement Engine
//!
//! A fixed catalog of 15 badges evaluated over the full profile after every
//! mutating operation. Unlocks are idempotent and monotonic: a badge is
//! granted at most once, and selling or using the items that satisfied a
//! bag-scanning predicate never takes the badge back. Some badges carry a
//! buff that the resolver folds into the effective draw and bank parameters.

use chrono::NaiveDateTime;
use piggybank_shared::Rank;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::buffs::{Modifier, ModifierKind, ModifierOp};
use crate::error::EconomyResult;
use crate::ledger::LedgerEntryKind;
use crate::profile::PlayerProfile;

/// Identifier of a badge in the fixed catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AchievementId {
    /// First session ever.
    FirstLogin,
    /// Total assets reach 1,000 points.
    Rich1000,
    /// Total assets reach 5,000 points.
    Rich5000,
    /// 20 cumulative deposit days at 100+ points principal.
    Saver20Days,
    /// 20 lifetime draws.
    DrawRegular,
    /// A Legendary or Mythic card in the bag.
    LuckyStreak,
    /// 3,000 points of lifetime non-deposit spending.
    BigSpender,
    /// 10 cards in the bag at once.
    Hoarder,
    /// 5 daily-interest payouts of 5+ points.
    InterestCollector,
    /// At least one matured deposit redeemed.
    DepositHarvest,
    /// 80+ draws with the big pity counter still at zero.
    PityMagnet,
    /// 10 cards used.
    RedeemMaster,
    /// A single non-deposit gain of 300+ points.
    BigWin,
    /// 3 Epic cards in the bag at once.
    EpicCollector,
    /// 4 distinct tiers represented in the bag.
    TierCollector,
}

/// A catalog entry: identity, display strings, predicate and optional buff.
pub struct AchievementDef {
    /// Stable identifier.
    pub id: AchievementId,
    /// Emoji icon.
    pub icon: &'static str,
    /// Display title.
    pub title: &'static str,
    /// One-line description of the unlock condition.
    pub description: &'static str,
    /// Unlock condition over the full profile.
    pub predicate: fn(&PlayerProfile) -> bool,
    /// Human-readable progress toward the condition.
    pub progress: fn(&PlayerProfile) -> String,
    /// Parameter modifier granted by this badge, if any.
    pub buff: Option<Modifier>,
}

fn draw_count(profile: &PlayerProfile) -> usize {
    profile.ledger.count_kind(LedgerEntryKind::Draw)
}

/// Term days of open deposits that count toward the saver badge.
fn active_saver_days(profile: &PlayerProfile) -> u32 {
    profile
        .deposits
        .iter()
        .filter(|d| d.principal >= 100)
        .map(crate::profile::Deposit::term_days)
        .sum()
}

fn saver_days(profile: &PlayerProfile) -> u32 {
    profile.stat_retired_deposit_days + active_saver_days(profile)
}

fn non_deposit_spending(profile: &PlayerProfile) -> u64 {
    profile
        .ledger
        .entries()
        .iter()
        .filter(|e| e.amount < 0 && e.kind != LedgerEntryKind::DepositOpen)
        .map(|e| e.amount.unsigned_abs())
        .sum()
}

fn big_interest_count(profile: &PlayerProfile) -> usize {
    profile
        .ledger
        .entries()
        .iter()
        .filter(|e| e.kind == LedgerEntryKind::DailyInterest && e.amount >= 5)
        .count()
}

fn has_big_win(profile: &PlayerProfile) -> bool {
    profile.ledger.entries().iter().any(|e| {
        e.amount >= 300
            && !matches!(
                e.kind,
                LedgerEntryKind::DepositOpen
                    | LedgerEntryKind::DepositMatured
                    | LedgerEntryKind::ItemUsed
            )
    })
}

fn epic_count(profile: &PlayerProfile) -> usize {
    profile
        .bag
        .iter()
        .filter(|i| i.tier_rank == Rank::Epic)
        .count()
}

fn distinct_tiers(profile: &PlayerProfile) -> usize {
    let mut names: Vec<&str> = profile.bag.iter().map(|i| i.tier_name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    names.len()
}

/// The fixed badge catalog, in evaluation order.
pub static CATALOG: [AchievementDef; 15] = [
    AchievementDef {
        id: AchievementId::FirstLogin,
        icon: "🐣",
        title: "Getting Started",
        description: "Log in for the first time",
        predicate: |_| true,
        progress: |_| "1 / 1".to_owned(),
        buff: None,
    },
    AchievementDef {
        id: AchievementId::Rich1000,
        icon: "💰",
        title: "First Pot of Gold",
        description: "Total assets (cash + deposits) reach 1,000 points",
        predicate: |p| p.wealth() >= 1000,
        progress: |p| format!("{} / 1000", p.wealth()),
        buff: None,
    },
    AchievementDef {
        id: AchievementId::Rich5000,
        icon: "💎",
        title: "Tycoon",
        description: "Total assets reach 5,000 points",
        predicate: |p| p.wealth() >= 5000,
        progress: |p| format!("{} / 5000", p.wealth()),
        buff: Some(Modifier {
            kind: ModifierKind::FixedRate,
            op: ModifierOp::MulRound4(1.08),
        }),
    },
    AchievementDef {
        id: AchievementId::Saver20Days,
        icon: "🏦",
        title: "Little Banker",
        description: "Accumulate 20 deposit days (100+ points per deposit)",
        predicate: |p| saver_days(p) >= 20,
        progress: |p| format!("{} / 20 days", saver_days(p)),
        buff: Some(Modifier {
            kind: ModifierKind::DailyRate,
            op: ModifierOp::MulRound4(1.10),
        }),
    },
    AchievementDef {
        id: AchievementId::DrawRegular,
        icon: "🎰",
        title: "Wheel Master",
        description: "Draw 20 times",
        predicate: |p| draw_count(p) >= 20,
        progress: |p| format!("{} / 20 draws", draw_count(p)),
        buff: Some(Modifier {
            kind: ModifierKind::Cost,
            op: ModifierOp::MulFloor(0.95),
        }),
    },
    AchievementDef {
        id: AchievementId::LuckyStreak,
        icon: "🌟",
        title: "Blessed by Luck",
        description: "Hold a Legendary or Mythic reward in the bag",
        predicate: |p| p.bag.iter().any(|i| i.tier_rank >= Rank::Legendary),
        progress: |p| {
            if p.bag.iter().any(|i| i.tier_rank >= Rank::Legendary) {
                "1 / 1".to_owned()
            } else {
                "0 / 1".to_owned()
            }
        },
        buff: Some(Modifier {
            kind: ModifierKind::GoldenTheme,
            op: ModifierOp::Set,
        }),
    },
    AchievementDef {
        id: AchievementId::BigSpender,
        icon: "💸",
        title: "Big Spender",
        description: "Spend 3,000 points in total",
        predicate: |p| non_deposit_spending(p) >= 3000,
        progress: |p| format!("{} / 3000", non_deposit_spending(p)),
        buff: None,
    },
    AchievementDef {
        id: AchievementId::Hoarder,
        icon: "🐹",
        title: "Hamster Syndrome",
        description: "Hold 10 rewards in the bag",
        predicate: |p| p.bag.len() >= 10,
        progress: |p| format!("{} / 10 items", p.bag.len()),
        buff: None,
    },
    AchievementDef {
        id: AchievementId::InterestCollector,
        icon: "📈",
        title: "Compound Witness",
        description: "Collect 5 daily interest payouts of 5+ points",
        predicate: |p| big_interest_count(p) >= 5,
        progress: |p| format!("{} / 5 payouts", big_interest_count(p)),
        buff: None,
    },
    AchievementDef {
        id: AchievementId::DepositHarvest,
        icon: "🌾",
        title: "Harvest Time",
        description: "Redeem at least one matured deposit",
        predicate: |p| p.ledger.count_kind(LedgerEntryKind::DepositMatured) > 0,
        progress: |p| {
            if p.ledger.count_kind(LedgerEntryKind::DepositMatured) > 0 {
                "1 / 1".to_owned()
            } else {
                "0 / 1".to_owned()
            }
        },
        buff: None,
    },
    AchievementDef {
        id: AchievementId::PityMagnet,
        icon: "🌚",
        title: "Luckless Chief",
        description: "Draw 80+ times without a big win",
        predicate: |p| p.pity.legendary == 0 && draw_count(p) > 80,
        progress: |p| {
            if p.pity.legendary == 0 {
                format!("{} / 80", draw_count(p))
            } else {
                "Too lucky (big pity reset)".to_owned()
            }
        },
        buff: Some(Modifier {
            kind: ModifierKind::PityLegendary,
            op: ModifierOp::MulFloor(0.90),
        }),
    },
    AchievementDef {
        id: AchievementId::RedeemMaster,
        icon: "🎫",
        title: "Redeem Expert",
        description: "Use 10 reward cards",
        predicate: |p| p.ledger.count_kind(LedgerEntryKind::ItemUsed) >= 10,
        progress: |p| {
            format!(
                "{} / 10 cards",
                p.ledger.count_kind(LedgerEntryKind::ItemUsed)
            )
        },
        buff: None,
    },
    AchievementDef {
        id: AchievementId::BigWin,
        icon: "🧧",
        title: "Windfall",
        description: "Gain 300+ points in one move (deposits excluded)",
        predicate: has_big_win,
        progress: |p| {
            if has_big_win(p) {
                "1 / 1".to_owned()
            } else {
                "0 / 1".to_owned()
            }
        },
        buff: None,
    },
    AchievementDef {
        id: AchievementId::EpicCollector,
        icon: "😈",
        title: "Epic Fiend",
        description: "Hold 3 Epic cards at once",
        predicate: |p| epic_count(p) >= 3,
        progress: |p| format!("{} / 3 cards", epic_count(p)),
        buff: None,
    },
    AchievementDef {
        id: AchievementId::TierCollector,
        icon: "🌈",
        title: "Completionist",
        description: "Hold cards from 4 different tiers",
        predicate: |p| distinct_tiers(p) >= 4,
        progress: |p| format!("{} / 4 tiers", distinct_tiers(p)),
        buff: None,
    },
];

/// Looks up a catalog entry by id.
#[must_use]
pub fn definition(id: AchievementId) -> &'static AchievementDef {
    // The catalog covers every id, so this always finds a match.
    CATALOG
        .iter()
        .find(|def| def.id == id)
        .unwrap_or(&CATALOG[0])
}

/// Evaluates the catalog against a profile and unlocks every badge whose
/// condition now holds.
///
/// Already-unlocked badges are skipped, so repeated evaluation is a no-op.
/// Each new unlock appends a zero-amount `Achievement` ledger entry and is
/// returned for notification.
///
/// # Errors
///
/// Propagates ledger failures, which leave earlier unlocks intact.
pub fn evaluate(
    profile: &mut PlayerProfile,
    now: NaiveDateTime,
) -> EconomyResult<Vec<AchievementId>> {
    let mut unlocked = Vec::new();
    for def in &CATALOG {
        if profile.achievements.contains(&def.id) {
            continue;
        }
        if (def.predicate)(profile) {
            profile.achievements.insert(def.id);
            profile
                .ledger
                .credit(0, LedgerEntryKind::Achievement, def.title, now)?;
            info!(achievement = ?def.id, title = def.title, "achievement unlocked");
            unlocked.push(def.id);
        }
    }
    Ok(unlocked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Overdraft;
    use crate::profile::Deposit;
    use chrono::NaiveDate;
    use piggybank_shared::Item;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    fn card(tier_name: &str, rank: Rank) -> Item {
        Item {
            tier_name: tier_name.to_owned(),
            tier_rank: rank,
            color: "#000000".to_owned(),
            reward_text: "reward".to_owned(),
            bonus_points: 0,
            mint_id: 0,
        }
    }

    #[test]
    fn test_first_login_unlocks_immediately() {
        let mut profile = PlayerProfile::new();
        let unlocked = evaluate(&mut profile, at()).unwrap();
        assert!(unlocked.contains(&AchievementId::FirstLogin));
        assert_eq!(
            profile.ledger.count_kind(LedgerEntryKind::Achievement),
            unlocked.len()
        );
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let mut profile = PlayerProfile::new();
        evaluate(&mut profile, at()).unwrap();
        let entries_before = profile.ledger.entries().len();
        let second = evaluate(&mut profile, at()).unwrap();
        assert!(second.is_empty());
        assert_eq!(profile.ledger.entries().len(), entries_before);
    }

    #[test]
    fn test_wealth_badge_counts_deposits() {
        let mut profile = PlayerProfile::new();
        profile
            .ledger
            .credit(400, LedgerEntryKind::Adjustment, "seed", at())
            .unwrap();
        profile.deposits.push(Deposit {
            id: 1,
            principal: 600,
            rate_snapshot: 0.06,
            start: at(),
            end: at() + chrono::Duration::days(30),
        });
        let unlocked = evaluate(&mut profile, at()).unwrap();
        assert!(unlocked.contains(&AchievementId::Rich1000));
        assert!(!unlocked.contains(&AchievementId::Rich5000));
    }

    #[test]
    fn test_unlock_survives_bag_drain() {
        let mut profile = PlayerProfile::new();
        profile.bag.push(card("Legendary", Rank::Legendary));
        let unlocked = evaluate(&mut profile, at()).unwrap();
        assert!(unlocked.contains(&AchievementId::LuckyStreak));

        profile.bag.clear();
        let again = evaluate(&mut profile, at()).unwrap();
        assert!(!again.contains(&AchievementId::LuckyStreak));
        assert!(profile.achievements.contains(&AchievementId::LuckyStreak));
    }

    #[test]
    fn test_big_spender_ignores_deposit_debits() {
        let mut profile = PlayerProfile::new();
        profile
            .ledger
            .credit(10_000, LedgerEntryKind::Adjustment, "seed", at())
            .unwrap();
        profile
            .ledger
            .debit(
                5000,
                LedgerEntryKind::DepositOpen,
                "deposit",
                at(),
                Overdraft::Deny,
            )
            .unwrap();
        let unlocked = evaluate(&mut profile, at()).unwrap();
        assert!(!unlocked.contains(&AchievementId::BigSpender));

        profile
            .ledger
            .debit(
                3000,
                LedgerEntryKind::MarketPurchase,
                "purchase",
                at(),
                Overdraft::Deny,
            )
            .unwrap();
        let unlocked = evaluate(&mut profile, at()).unwrap();
        assert!(unlocked.contains(&AchievementId::BigSpender));
    }

    #[test]
    fn test_big_win_excludes_deposit_and_item_use() {
        let mut profile = PlayerProfile::new();
        profile
            .ledger
            .credit(5000, LedgerEntryKind::DepositMatured, "deposit back", at())
            .unwrap();
        profile
            .ledger
            .credit(500, LedgerEntryKind::ItemUsed, "Add 500 points", at())
            .unwrap();
        let unlocked = evaluate(&mut profile, at()).unwrap();
        assert!(!unlocked.contains(&AchievementId::BigWin));

        profile
            .ledger
            .credit(300, LedgerEntryKind::MarketSale, "sale", at())
            .unwrap();
        let unlocked = evaluate(&mut profile, at()).unwrap();
        assert!(unlocked.contains(&AchievementId::BigWin));
    }

    #[test]
    fn test_pity_magnet_requires_zero_counter() {
        let mut profile = PlayerProfile::new();
        profile
            .ledger
            .credit(100_000, LedgerEntryKind::Adjustment, "seed", at())
            .unwrap();
        for _ in 0..81 {
            profile
                .ledger
                .debit(100, LedgerEntryKind::Draw, "draw cost", at(), Overdraft::Deny)
                .unwrap();
        }
        profile.pity.legendary = 81;
        let unlocked = evaluate(&mut profile, at()).unwrap();
        assert!(!unlocked.contains(&AchievementId::PityMagnet));

        profile.pity.legendary = 0;
        let unlocked = evaluate(&mut profile, at()).unwrap();
        assert!(unlocked.contains(&AchievementId::PityMagnet));
    }

    #[test]
    fn test_tier_collector_counts_distinct_names() {
        let mut profile = PlayerProfile::new();
        for name in ["Common", "Uncommon", "Rare", "Rare"] {
            profile.bag.push(card(name, Rank::Common));
        }
        let unlocked = evaluate(&mut profile, at()).unwrap();
        assert!(!unlocked.contains(&AchievementId::TierCollector));

        profile.bag.push(card("Epic", Rank::Epic));
        let unlocked = evaluate(&mut profile, at()).unwrap();
        assert!(unlocked.contains(&AchievementId::TierCollector));
    }

    #[test]
    fn test_progress_strings_render() {
        let profile = PlayerProfile::new();
        assert_eq!(
            (definition(AchievementId::Rich1000).progress)(&profile),
            "0 / 1000"
        );
        assert_eq!(
            (definition(AchievementId::FirstLogin).progress)(&profile),
            "1 / 1"
        );
    }
}
