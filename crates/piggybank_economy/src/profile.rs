//! # Player Profiles and Household State
//!
//! The per-child profile (ledger, bag, pity counters, deposits, badges) and
//! the household wrapper that owns the shared settings and tier ladder.
//! The whole household is one serializable value; the engine threads it
//! through every operation explicitly.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use piggybank_shared::Item;
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementId;
use crate::error::{EconomyError, EconomyResult};
use crate::ledger::{Ledger, LedgerEntryKind};
use crate::settings::Settings;
use crate::tiers::TierTable;

/// The two pity counters driving guaranteed draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PityCounters {
    /// Draws since the last Rare-or-better win.
    pub rare: u32,
    /// Draws since the last top-rank win.
    pub legendary: u32,
}

/// A fixed-term deposit. The rate is snapshotted at open and never changes,
/// even if the household setting moves afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    /// Unique identifier within the profile.
    pub id: u64,
    /// Points locked in, always positive.
    pub principal: u64,
    /// Per-day rate locked at open.
    pub rate_snapshot: f64,
    /// When the deposit was opened.
    pub start: NaiveDateTime,
    /// Maturity instant (`start` + term days).
    pub end: NaiveDateTime,
}

impl Deposit {
    /// Term length in whole days, rounded.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn term_days(&self) -> u32 {
        let days = (self.end - self.start).num_seconds() as f64 / 86_400.0;
        days.round().max(0.0) as u32
    }
}

/// Everything the economy tracks for one child.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Score and its append-only movement history.
    pub ledger: Ledger,
    /// Won reward cards, most recent first.
    pub bag: Vec<Item>,
    /// Unlocked achievement badges. Never shrinks.
    pub achievements: BTreeSet<AchievementId>,
    /// Pity counters for the draw engine.
    pub pity: PityCounters,
    /// Calendar date of the last interest stamp.
    pub last_login_date: Option<NaiveDate>,
    /// Open fixed-term deposits.
    pub deposits: Vec<Deposit>,
    /// Total term days of redeemed deposits with principal >= 100.
    pub stat_retired_deposit_days: u32,
    /// Private tier ladder, materialized when the household runs
    /// per-child prize scope.
    pub tier_override: Option<TierTable>,
}

impl PlayerProfile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Liquid score plus all locked deposit principals.
    ///
    /// This is the figure wealth badges measure, so parking points in a
    /// deposit does not hide them.
    #[must_use]
    pub fn wealth(&self) -> u64 {
        self.ledger.score() + self.deposits.iter().map(|d| d.principal).sum::<u64>()
    }

    /// Consumes the bag item at `index`, crediting its bonus points.
    ///
    /// Always appends one `ItemUsed` entry, zero-amount when the card
    /// carries no points. Returns the consumed item.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::ItemNotFound`] for an out-of-range index.
    pub fn use_item(&mut self, index: usize, now: NaiveDateTime) -> EconomyResult<Item> {
        if index >= self.bag.len() {
            return Err(EconomyError::ItemNotFound(index));
        }
        let item = self.bag.remove(index);
        self.ledger.credit(
            u64::from(item.bonus_points),
            LedgerEntryKind::ItemUsed,
            &item.reward_text,
            now,
        )?;
        Ok(item)
    }
}

/// One child in the household.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Child {
    /// Display name.
    pub name: String,
    /// The child's economy profile.
    pub profile: PlayerProfile,
}

/// The full household: settings, shared ladder, children, active child.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HouseholdState {
    /// Parent-adjustable tunables.
    pub settings: Settings,
    /// The household-wide tier ladder.
    pub tiers: TierTable,
    /// All children, in creation order.
    pub children: Vec<Child>,
    /// Index of the active child.
    pub current: usize,
}

impl HouseholdState {
    /// Creates a household with default settings, the stock ladder and one
    /// child.
    #[must_use]
    pub fn new(first_child: &str) -> Self {
        Self {
            settings: Settings::default(),
            tiers: TierTable::default(),
            children: vec![Child {
                name: first_child.to_owned(),
                profile: PlayerProfile::new(),
            }],
            current: 0,
        }
    }

    /// The active child's profile.
    #[must_use]
    pub fn current_profile(&self) -> &PlayerProfile {
        &self.children[self.current].profile
    }

    /// Mutable access to the active child's profile.
    pub fn current_profile_mut(&mut self) -> &mut PlayerProfile {
        &mut self.children[self.current].profile
    }

    /// Appends a child and returns its index.
    pub fn add_child(&mut self, name: &str) -> usize {
        self.children.push(Child {
            name: name.to_owned(),
            profile: PlayerProfile::new(),
        });
        self.children.len() - 1
    }

    /// Makes the child at `index` active.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::ChildNotFound`] for an out-of-range index.
    pub fn switch_child(&mut self, index: usize) -> EconomyResult<()> {
        if index >= self.children.len() {
            return Err(EconomyError::ChildNotFound(index));
        }
        self.current = index;
        Ok(())
    }
}
