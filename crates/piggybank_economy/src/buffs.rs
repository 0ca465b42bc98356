//! # Buff Resolver
//!
//! Folds the parameter modifiers of unlocked achievements over the base
//! settings to produce the effective parameters of a draw or bank
//! operation. Resolution is pure and recomputed per call; nothing here is
//! cached, so a badge unlocked mid-session takes effect on the very next
//! operation.

use std::collections::BTreeSet;

use piggybank_shared::Rank;

use crate::achievements::{AchievementId, CATALOG};
use crate::settings::{round4, Settings};

/// Which parameter a modifier targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModifierKind {
    /// The draw cost.
    Cost,
    /// The big pity threshold.
    PityLegendary,
    /// The daily interest rate.
    DailyRate,
    /// The fixed-deposit rate.
    FixedRate,
    /// The cosmetic golden draw theme.
    GoldenTheme,
}

/// How a modifier transforms its target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ModifierOp {
    /// Multiply and floor to an integer (costs, thresholds).
    MulFloor(f64),
    /// Multiply and round to 4 decimals (rates).
    MulRound4(f64),
    /// Switch a flag on.
    Set,
}

/// A single parameter modifier granted by a badge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Modifier {
    /// Target parameter.
    pub kind: ModifierKind,
    /// Transformation applied to it.
    pub op: ModifierOp,
}

/// The parameters an operation actually runs with, after buffs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectiveParams {
    /// Point cost of one draw.
    pub cost: u64,
    /// Small pity threshold.
    pub pity_rare_threshold: u32,
    /// Big pity threshold.
    pub pity_legendary_threshold: u32,
    /// Whether the big pity splits 50/50 between the two top ranks
    /// instead of guaranteeing the top one.
    pub big_pity_splits: bool,
    /// Daily interest rate.
    pub daily_rate: f64,
    /// Fixed-deposit rate for newly opened deposits.
    pub fixed_rate: f64,
    /// Whether the golden draw theme is active.
    pub golden_theme: bool,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn mul_floor_u64(value: u64, factor: f64) -> u64 {
    #[allow(clippy::cast_precision_loss)]
    let scaled = (value as f64 * factor).floor();
    if scaled <= 0.0 {
        0
    } else {
        scaled as u64
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn mul_floor_u32(value: u32, factor: f64) -> u32 {
    mul_floor_u64(u64::from(value), factor).min(u64::from(u32::MAX)) as u32
}

/// Computes the effective parameters for a profile's unlocked badges.
///
/// With buffs disabled in the settings the result is the settings verbatim.
/// With buffs enabled, every matching modifier in the catalog is applied in
/// catalog order, so several badges may compound on one parameter.
#[must_use]
pub fn resolve(settings: &Settings, unlocked: &BTreeSet<AchievementId>) -> EffectiveParams {
    let mut params = EffectiveParams {
        cost: settings.gacha_cost,
        pity_rare_threshold: settings.pity_rare_threshold,
        pity_legendary_threshold: settings.pity_legendary_threshold,
        big_pity_splits: settings.pity_big_target == Rank::Legendary,
        daily_rate: settings.daily_interest_rate,
        fixed_rate: settings.fixed_deposit_rate,
        golden_theme: false,
    };
    if !settings.enable_buffs {
        return params;
    }
    for def in &CATALOG {
        let Some(modifier) = def.buff else { continue };
        if !unlocked.contains(&def.id) {
            continue;
        }
        match (modifier.kind, modifier.op) {
            (ModifierKind::Cost, ModifierOp::MulFloor(f)) => {
                params.cost = mul_floor_u64(params.cost, f);
            }
            (ModifierKind::PityLegendary, ModifierOp::MulFloor(f)) => {
                params.pity_legendary_threshold = mul_floor_u32(params.pity_legendary_threshold, f);
            }
            (ModifierKind::DailyRate, ModifierOp::MulRound4(f)) => {
                params.daily_rate = round4(params.daily_rate * f);
            }
            (ModifierKind::FixedRate, ModifierOp::MulRound4(f)) => {
                params.fixed_rate = round4(params.fixed_rate * f);
            }
            (ModifierKind::GoldenTheme, ModifierOp::Set) => {
                params.golden_theme = true;
            }
            // A badge pairing a target with the wrong op shape is a catalog
            // bug; leave the parameter untouched.
            _ => {}
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badges(ids: &[AchievementId]) -> BTreeSet<AchievementId> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_disabled_buffs_pass_settings_through() {
        let settings = Settings::default();
        let params = resolve(
            &settings,
            &badges(&[AchievementId::DrawRegular, AchievementId::LuckyStreak]),
        );
        assert_eq!(params.cost, 100);
        assert!(!params.golden_theme);
    }

    fn buffed_settings() -> Settings {
        Settings {
            enable_buffs: true,
            ..Settings::default()
        }
    }

    #[test]
    fn test_draw_regular_discounts_cost() {
        let params = resolve(&buffed_settings(), &badges(&[AchievementId::DrawRegular]));
        assert_eq!(params.cost, 95);
    }

    #[test]
    fn test_pity_magnet_lowers_big_threshold() {
        let params = resolve(&buffed_settings(), &badges(&[AchievementId::PityMagnet]));
        assert_eq!(params.pity_legendary_threshold, 90);
    }

    #[test]
    fn test_rate_buffs_round_to_four_decimals() {
        let params = resolve(
            &buffed_settings(),
            &badges(&[AchievementId::Saver20Days, AchievementId::Rich5000]),
        );
        assert!((params.daily_rate - 0.022).abs() < f64::EPSILON);
        assert!((params.fixed_rate - 0.0648).abs() < f64::EPSILON);
    }

    #[test]
    fn test_golden_theme_flag() {
        let params = resolve(&buffed_settings(), &badges(&[AchievementId::LuckyStreak]));
        assert!(params.golden_theme);
    }

    #[test]
    fn test_unrelated_badges_do_nothing() {
        let params = resolve(&buffed_settings(), &badges(&[AchievementId::Hoarder]));
        assert_eq!(params.cost, 100);
        assert_eq!(params.pity_legendary_threshold, 100);
    }

    #[test]
    fn test_big_pity_split_follows_target_rank() {
        let settings = Settings {
            pity_big_target: Rank::Legendary,
            ..Settings::default()
        };
        assert!(resolve(&settings, &BTreeSet::new()).big_pity_splits);
        assert!(!resolve(&Settings::default(), &BTreeSet::new()).big_pity_splits);
    }
}
