//! # Engine Facade
//!
//! The coordinator the outside world talks to. It owns the household state
//! and the injected collaborators (clock, randomness, notification sink,
//! persistence) and runs every mutating operation through the same spine:
//!
//! 1. perform the operation against the profile
//! 2. re-evaluate the achievement catalog
//! 3. push notifications for the outcome and any new badges
//! 4. save the full household snapshot
//!
//! A failed operation returns before step 2, leaving the state exactly as
//! it was.

use chrono::NaiveDateTime;
use piggybank_shared::{
    Clock, Item, ListingId, ListingStatus, MarketListing, MarketStore, Notice, NotificationSink,
    Persistence, RandomSource, SellerRef,
};
use tracing::{debug, warn};

use crate::achievements::{self, definition};
use crate::bank;
use crate::buffs::{self, EffectiveParams};
use crate::draw;
use crate::error::{EconomyError, EconomyResult};
use crate::ledger::{LedgerEntryKind, Overdraft};
use crate::market::{self, ListingReceipt};
use crate::profile::HouseholdState;
use crate::settings::{PrizeScope, Settings};
use crate::tiers::TierTable;

/// The reward economy engine for one household.
pub struct Engine<P: Persistence<HouseholdState>> {
    household_id: String,
    state: HouseholdState,
    clock: Box<dyn Clock>,
    rng: Box<dyn RandomSource>,
    sink: Box<dyn NotificationSink>,
    persistence: P,
    mint_seq: u64,
}

impl<P: Persistence<HouseholdState>> Engine<P> {
    /// Loads the household from persistence, creating a fresh one with a
    /// single child when nothing is stored yet.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn load_or_create(
        household_id: &str,
        first_child: &str,
        clock: Box<dyn Clock>,
        rng: Box<dyn RandomSource>,
        sink: Box<dyn NotificationSink>,
        mut persistence: P,
    ) -> EconomyResult<Self> {
        let state = match persistence.load(household_id)? {
            Some(state) => state,
            None => {
                let state = HouseholdState::new(first_child);
                persistence.save(household_id, &state)?;
                state
            }
        };
        // Mint ids keep the millisecond-timestamp scale of existing data
        // and stay monotonic even under a frozen test clock.
        let mint_seq = u64::try_from(clock.now().and_utc().timestamp_millis()).unwrap_or(0);
        Ok(Self {
            household_id: household_id.to_owned(),
            state,
            clock,
            rng,
            sink,
            persistence,
            mint_seq,
        })
    }

    /// Read-only view of the household.
    #[must_use]
    pub fn state(&self) -> &HouseholdState {
        &self.state
    }

    /// The effective parameters for the active child after buffs.
    #[must_use]
    pub fn effective_params(&self) -> EffectiveParams {
        buffs::resolve(
            &self.state.settings,
            &self.state.current_profile().achievements,
        )
    }

    fn next_mint(&mut self) -> u64 {
        self.mint_seq += 1;
        self.mint_seq
    }

    /// The ladder the active child draws from, honoring the prize scope.
    /// Under `Individual` scope the child's private copy is materialized
    /// from the household ladder on first use.
    fn effective_tiers(&mut self) -> TierTable {
        match self.state.settings.prize_scope {
            PrizeScope::Global => self.state.tiers.clone(),
            PrizeScope::Individual => {
                let household = self.state.tiers.clone();
                let profile = self.state.current_profile_mut();
                profile
                    .tier_override
                    .get_or_insert_with(|| household)
                    .clone()
            }
        }
    }

    /// Achievement sweep + save, shared by every mutating operation.
    fn finish(&mut self, child_index: usize, now: NaiveDateTime) -> EconomyResult<()> {
        let profile = &mut self.state.children[child_index].profile;
        let unlocked = achievements::evaluate(profile, now)?;
        for id in unlocked {
            let def = definition(id);
            self.sink.notify(Notice::AchievementUnlocked {
                icon: def.icon.to_owned(),
                title: def.title.to_owned(),
                description: def.description.to_owned(),
            });
        }
        self.persistence.save(&self.household_id, &self.state)?;
        Ok(())
    }

    /// Runs one draw for the active child.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InsufficientFunds`] when the score cannot
    /// cover the (possibly discounted) cost.
    pub fn draw(&mut self) -> EconomyResult<Item> {
        let now = self.clock.now();
        let params = self.effective_params();
        let tiers = self.effective_tiers();
        let mint_id = self.next_mint();
        let profile = self.state.current_profile_mut();
        let item = draw::draw(&tiers, &params, profile, &mut *self.rng, mint_id, now)?;
        self.sink.notify(Notice::DrawResult {
            tier_name: item.tier_name.clone(),
            color: item.color.clone(),
            reward_text: item.reward_text.clone(),
            golden: params.golden_theme,
        });
        self.finish(self.state.current, now)?;
        Ok(item)
    }

    /// Opens a fixed-term deposit for the active child at the current
    /// (buffed) rate and term length.
    ///
    /// # Errors
    ///
    /// See [`bank::open_deposit`].
    pub fn open_deposit(&mut self, principal: u64) -> EconomyResult<()> {
        let now = self.clock.now();
        let params = self.effective_params();
        let days = self.state.settings.fixed_deposit_days;
        let id = self.next_mint();
        let profile = self.state.current_profile_mut();
        bank::open_deposit(profile, id, principal, days, params.fixed_rate, now)?;
        self.finish(self.state.current, now)
    }

    /// Redeems a matured deposit for the active child.
    ///
    /// # Errors
    ///
    /// See [`bank::redeem_deposit`].
    pub fn redeem_deposit(&mut self, id: u64) -> EconomyResult<()> {
        let now = self.clock.now();
        let days = self.state.settings.fixed_deposit_days;
        let profile = self.state.current_profile_mut();
        let redemption = bank::redeem_deposit(profile, id, days, now)?;
        self.sink.notify(Notice::DepositRedeemed {
            principal: redemption.principal,
            profit: redemption.profit,
        });
        self.finish(self.state.current, now)
    }

    /// Claims today's interest for the active child, if due.
    ///
    /// Safe to call on every session start; it pays at most once per
    /// calendar day.
    ///
    /// # Errors
    ///
    /// Propagates ledger and store failures.
    pub fn accrue_daily_interest(&mut self) -> EconomyResult<Option<u64>> {
        let now = self.clock.now();
        let params = self.effective_params();
        let hour = self.state.settings.interest_hour;
        let profile = self.state.current_profile_mut();
        let paid = bank::accrue_daily_interest(profile, params.daily_rate, hour, now)?;
        if let Some(amount) = paid {
            self.sink.notify(Notice::InterestPaid {
                amount,
                rate: params.daily_rate,
            });
        }
        self.finish(self.state.current, now)?;
        Ok(paid)
    }

    /// Manual point adjustment by a parent. Positive credits, negative
    /// debits (clamped so the score never goes below zero).
    ///
    /// # Errors
    ///
    /// Propagates ledger and store failures.
    pub fn grant_points(&mut self, amount: i64, reason: &str) -> EconomyResult<i64> {
        let now = self.clock.now();
        let profile = self.state.current_profile_mut();
        let applied = if amount >= 0 {
            let value = amount.unsigned_abs();
            profile
                .ledger
                .credit(value, LedgerEntryKind::Adjustment, reason, now)?;
            amount
        } else {
            let taken = profile.ledger.debit(
                amount.unsigned_abs(),
                LedgerEntryKind::Adjustment,
                reason,
                now,
                Overdraft::Saturate,
            )?;
            -i64::try_from(taken).map_err(|_| EconomyError::ArithmeticOverflow)?
        };
        self.sink.notify(Notice::PointsAdjusted {
            amount: applied,
            reason: reason.to_owned(),
        });
        self.finish(self.state.current, now)?;
        Ok(applied)
    }

    /// Uses the bag item at `index`, crediting its bonus points.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::ItemNotFound`] for a bad index.
    pub fn use_item(&mut self, index: usize) -> EconomyResult<Item> {
        let now = self.clock.now();
        let profile = self.state.current_profile_mut();
        let item = profile.use_item(index, now)?;
        self.sink.notify(Notice::ItemUsed {
            reward_text: item.reward_text.clone(),
            bonus_points: item.bonus_points,
        });
        self.finish(self.state.current, now)?;
        Ok(item)
    }

    /// Lists a bag item of the active child on the market.
    ///
    /// # Errors
    ///
    /// See [`market::list_item`].
    pub fn list_item(
        &mut self,
        bag_index: usize,
        price: u64,
        store: &dyn MarketStore,
    ) -> EconomyResult<ListingReceipt> {
        let now = self.clock.now();
        let seller = SellerRef {
            household_id: self.household_id.clone(),
            child_index: self.state.current,
            display_name: self.state.children[self.state.current].name.clone(),
        };
        let id = self.next_mint();
        let profile = self.state.current_profile_mut();
        let receipt = market::list_item(profile, bag_index, price, seller, id, store)?;
        self.finish(self.state.current, now)?;
        Ok(receipt)
    }

    /// Buys an active listing for the active child.
    ///
    /// Listings from other households are only purchasable when the friend
    /// market is enabled.
    ///
    /// # Errors
    ///
    /// See [`market::buy`]; foreign listings behind a disabled friend
    /// market surface as [`EconomyError::ListingNotFound`].
    pub fn buy(&mut self, id: ListingId, store: &dyn MarketStore) -> EconomyResult<Item> {
        let now = self.clock.now();
        if !self.state.settings.allow_friend_market {
            let foreign = store
                .get(id)?
                .is_some_and(|l| l.seller.household_id != self.household_id);
            if foreign {
                return Err(EconomyError::ListingNotFound(id));
            }
        }
        let profile = self.state.current_profile_mut();
        let listing = market::buy(profile, id, store, now)?;
        self.sink.notify(Notice::PurchaseComplete {
            reward_text: listing.item.reward_text.clone(),
            price: listing.price,
        });
        self.finish(self.state.current, now)?;
        Ok(listing.item)
    }

    /// Settles every finished listing this household sold or withdrew:
    /// sold listings pay their seller child net of tax, cancelled ones
    /// return their item. Returns the number of listings settled.
    ///
    /// # Errors
    ///
    /// Propagates ledger and store failures.
    pub fn settle_own_listings(&mut self, store: &dyn MarketStore) -> EconomyResult<usize> {
        let now = self.clock.now();
        let mut settled = 0;
        // Settlement removes each listing from the store, so a listing
        // pays out exactly once even across repeated sweeps.
        for listing in self.finished_listings(store)? {
            let child_index = listing.seller.child_index;
            if child_index >= self.state.children.len() {
                warn!(listing = listing.id, child_index, "seller child missing");
                continue;
            }
            let profile = &mut self.state.children[child_index].profile;
            match listing.status {
                ListingStatus::Sold => {
                    let (settled_listing, net) =
                        market::settle_sale(profile, listing.id, store, now)?;
                    self.sink.notify(Notice::SaleSettled {
                        reward_text: settled_listing.item.reward_text.clone(),
                        net,
                    });
                }
                ListingStatus::Cancelled => {
                    let returned = market::settle_cancellation(profile, listing.id, store)?;
                    self.sink.notify(Notice::ListingReturned {
                        reward_text: returned.item.reward_text.clone(),
                    });
                }
                ListingStatus::Active => continue,
            }
            self.finish(child_index, now)?;
            settled += 1;
        }
        Ok(settled)
    }

    fn finished_listings(&self, store: &dyn MarketStore) -> EconomyResult<Vec<MarketListing>> {
        Ok(store
            .all_listings()?
            .into_iter()
            .filter(|l| l.seller.household_id == self.household_id && !l.is_active())
            .collect())
    }

    /// Active listings visible to this household: its own always, other
    /// households' only when the friend market is enabled.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn visible_listings(&self, store: &dyn MarketStore) -> EconomyResult<Vec<MarketListing>> {
        Ok(store
            .active_listings()?
            .into_iter()
            .filter(|l| {
                l.seller.household_id == self.household_id
                    || self.state.settings.allow_friend_market
            })
            .collect())
    }

    /// Replaces the household settings (normalized) and saves.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn update_settings(&mut self, mut settings: Settings) -> EconomyResult<()> {
        settings.normalize();
        debug!(?settings, "settings updated");
        self.state.settings = settings;
        self.persistence.save(&self.household_id, &self.state)?;
        Ok(())
    }

    /// Replaces the household tier ladder after validation and saves.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] for a malformed ladder.
    pub fn update_tiers(&mut self, tiers: TierTable) -> EconomyResult<()> {
        tiers.validate()?;
        self.state.tiers = tiers;
        self.persistence.save(&self.household_id, &self.state)?;
        Ok(())
    }

    /// Switches the active child.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::ChildNotFound`] for a bad index.
    pub fn switch_child(&mut self, index: usize) -> EconomyResult<()> {
        self.state.switch_child(index)?;
        self.persistence.save(&self.household_id, &self.state)?;
        Ok(())
    }

    /// Adds a child and returns its index.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn add_child(&mut self, name: &str) -> EconomyResult<usize> {
        let index = self.state.add_child(name);
        self.persistence.save(&self.household_id, &self.state)?;
        Ok(index)
    }
}
