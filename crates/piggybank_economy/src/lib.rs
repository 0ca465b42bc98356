//! # PIGGYBANK Economy Engine
//!
//! Pure Rust logic for the household reward economy: gacha-style draws
//! with dual pity counters, an append-only point ledger, compounding
//! fixed-term deposits, an idempotent achievement engine with parameter
//! buffs, and taxed market settlement.
//!
//! ## Design Principles
//!
//! 1. **No floating point in money math** - deposit compounding and
//!    interest floors run through fixed-point
//! 2. **Append-only ledger** - the score moves only via credit/debit, one
//!    entry per movement
//! 3. **All-or-nothing operations** - a failed operation leaves the
//!    profile untouched
//! 4. **External configuration** - settings and tier ladders in TOML
//! 5. **Injected time and randomness** - every run is replayable under a
//!    fixed clock and a seeded stream
//!
//! ## Example
//!
//! ```rust,ignore
//! use piggybank_economy::{Engine, HouseholdState};
//! use piggybank_shared::{MemoryPersistence, NullSink, SeededRng, SystemClock};
//!
//! let mut engine = Engine::load_or_create(
//!     "house-1",
//!     "Alex",
//!     Box::new(SystemClock),
//!     Box::new(SeededRng::from_seed(42)),
//!     Box::new(NullSink),
//!     MemoryPersistence::new(),
//! )?;
//! engine.grant_points(500, "Weekly chores")?;
//! let item = engine.draw()?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod achievements;
pub mod bank;
pub mod buffs;
pub mod draw;
pub mod engine;
pub mod error;
pub mod fixed_point;
pub mod ledger;
pub mod market;
pub mod profile;
pub mod settings;
pub mod tiers;

pub use achievements::{AchievementDef, AchievementId, CATALOG};
pub use bank::{accrue_daily_interest, open_deposit, redeem_deposit, Redemption};
pub use buffs::{resolve, EffectiveParams, Modifier, ModifierKind, ModifierOp};
pub use draw::{draw, CONSOLATION_TEXT};
pub use engine::Engine;
pub use error::{EconomyError, EconomyResult};
pub use fixed_point::{compound_profit, compound_total, FixedPoint};
pub use ledger::{Ledger, LedgerEntry, LedgerEntryKind, Overdraft};
pub use market::{buy, list_item, settle_cancellation, settle_sale, tax_for, ListingReceipt};
pub use profile::{Child, Deposit, HouseholdState, PityCounters, PlayerProfile};
pub use settings::{round4, PrizeScope, Settings};
pub use tiers::{Reward, Tier, TierTable};
