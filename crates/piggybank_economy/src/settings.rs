//! # Household Settings
//!
//! Tunables a parent can adjust: draw cost, interest rates, pity thresholds
//! and feature switches. Loaded from TOML with every key optional — a
//! missing key takes its documented default rather than failing the load.

use piggybank_shared::Rank;
use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, EconomyResult};

/// Whether the tier ladder is shared by the household or owned per child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrizeScope {
    /// One household-wide ladder (the default).
    #[default]
    Global,
    /// Each child gets a private copy of the ladder on first use.
    Individual,
}

/// All parent-adjustable economy tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Daily interest rate applied to the liquid score.
    pub daily_interest_rate: f64,
    /// Hour of day (0-23) from which daily interest may be claimed.
    pub interest_hour: u32,
    /// Interest rate per day for fixed-term deposits.
    pub fixed_deposit_rate: f64,
    /// Term length of a fixed deposit in days.
    pub fixed_deposit_days: u32,
    /// Point cost of one draw.
    pub gacha_cost: u64,
    /// Draws without a Rare-or-better before the small pity fires.
    pub pity_rare_threshold: u32,
    /// Draws without a top-rank win before the big pity fires.
    pub pity_legendary_threshold: u32,
    /// Rank the big pity guarantees. `Legendary` means a 50/50 split
    /// between the two top ranks; `Mythic` guarantees the top rank.
    pub pity_big_target: Rank,
    /// Tier ladder ownership.
    pub prize_scope: PrizeScope,
    /// Whether achievement buffs modify the effective parameters.
    pub enable_buffs: bool,
    /// Whether listings from other households are purchasable.
    pub allow_friend_market: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_interest_rate: 0.02,
            interest_hour: 20,
            fixed_deposit_rate: 0.06,
            fixed_deposit_days: 30,
            gacha_cost: 100,
            pity_rare_threshold: 10,
            pity_legendary_threshold: 100,
            pity_big_target: Rank::Mythic,
            prize_scope: PrizeScope::Global,
            enable_buffs: false,
            allow_friend_market: false,
        }
    }
}

impl Settings {
    /// Parses settings from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] only for structurally
    /// unreadable input.
    pub fn from_toml_str(input: &str) -> EconomyResult<Self> {
        let mut settings: Self =
            toml::from_str(input).map_err(|e| EconomyError::InvalidConfig(e.to_string()))?;
        settings.normalize();
        Ok(settings)
    }

    /// Serializes the settings to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> EconomyResult<String> {
        let mut copy = self.clone();
        copy.normalize();
        toml::to_string_pretty(&copy).map_err(|e| EconomyError::InvalidConfig(e.to_string()))
    }

    /// Clamps out-of-range values and re-rounds rates to 4 decimals.
    ///
    /// Rates are stored at 4-decimal precision so repeated buff application
    /// and save cycles cannot accumulate drift.
    pub fn normalize(&mut self) {
        self.interest_hour = self.interest_hour.min(23);
        self.daily_interest_rate = round4(self.daily_interest_rate.max(0.0));
        self.fixed_deposit_rate = round4(self.fixed_deposit_rate.max(0.0));
    }
}

/// Rounds a rate to 4 decimal places.
#[must_use]
pub fn round4(rate: f64) -> f64 {
    if !rate.is_finite() {
        return 0.0;
    }
    (rate * 10_000.0).round() / 10_000.0
}
