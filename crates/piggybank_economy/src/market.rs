//! # Market Settlement
//!
//! Listing, buying and settling sales of reward cards. Listings live in the
//! external [`MarketStore`]; this module owns the point accounting around
//! them. A flat 10% tax comes off every sale. The one genuine race — two
//! buyers committing to the same listing — is resolved by the store's
//! atomic status transition: exactly one buyer wins, the loser gets
//! [`EconomyError::AlreadySold`] with no points moved.

use chrono::NaiveDateTime;
use piggybank_shared::{ListingId, ListingStatus, MarketListing, MarketStore, SellerRef};
use tracing::{debug, info};

use crate::error::{EconomyError, EconomyResult};
use crate::ledger::{LedgerEntryKind, Overdraft};
use crate::profile::PlayerProfile;

/// Tax withheld from a sale: `floor(price × 0.10)`.
#[inline]
#[must_use]
pub const fn tax_for(price: u64) -> u64 {
    price / 10
}

/// What the seller sees when a listing goes up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListingReceipt {
    /// Listing identifier.
    pub id: ListingId,
    /// Asking price.
    pub price: u64,
    /// Tax that will come off at settlement.
    pub tax: u64,
    /// Net proceeds the seller will receive.
    pub net: u64,
}

/// Moves a bag item onto the market as an `Active` listing.
///
/// No points move at listing time; the receipt's tax and net figures are
/// display-only until the sale settles.
///
/// # Errors
///
/// Returns [`EconomyError::InvalidAmount`] for a zero price,
/// [`EconomyError::ItemNotFound`] for a bad bag index, and store errors
/// verbatim (the item stays in the bag in every failure case).
pub fn list_item(
    profile: &mut PlayerProfile,
    bag_index: usize,
    price: u64,
    seller: SellerRef,
    id: ListingId,
    store: &dyn MarketStore,
) -> EconomyResult<ListingReceipt> {
    if price == 0 {
        return Err(EconomyError::InvalidAmount(0));
    }
    if bag_index >= profile.bag.len() {
        return Err(EconomyError::ItemNotFound(bag_index));
    }
    store.put(MarketListing {
        id,
        seller,
        price,
        item: profile.bag[bag_index].clone(),
        status: ListingStatus::Active,
    })?;
    profile.bag.remove(bag_index);
    debug!(id, price, "item listed");
    Ok(ListingReceipt {
        id,
        price,
        tax: tax_for(price),
        net: price - tax_for(price),
    })
}

/// Pays the seller for a sold listing and retires it from the store.
///
/// Credits `price − tax` with a `MarketSale` entry and returns the settled
/// listing alongside the net amount.
///
/// # Errors
///
/// Returns [`EconomyError::ListingNotFound`] when the listing is gone.
pub fn settle_sale(
    profile: &mut PlayerProfile,
    id: ListingId,
    store: &dyn MarketStore,
    now: NaiveDateTime,
) -> EconomyResult<(MarketListing, u64)> {
    let listing = store
        .get(id)?
        .ok_or(EconomyError::ListingNotFound(id))?;
    let net = listing.price - tax_for(listing.price);
    profile.ledger.credit(
        net,
        LedgerEntryKind::MarketSale,
        &format!("Sold: {}", listing.item.reward_text),
        now,
    )?;
    store.remove(id)?;
    info!(id, net, "sale settled");
    Ok((listing, net))
}

/// Returns a cancelled listing's item to the front of the seller's bag.
///
/// No ledger entry: nothing was ever paid.
///
/// # Errors
///
/// Returns [`EconomyError::ListingNotFound`] when the listing is gone.
pub fn settle_cancellation(
    profile: &mut PlayerProfile,
    id: ListingId,
    store: &dyn MarketStore,
) -> EconomyResult<MarketListing> {
    let listing = store
        .get(id)?
        .ok_or(EconomyError::ListingNotFound(id))?;
    profile.bag.insert(0, listing.item.clone());
    store.remove(id)?;
    debug!(id, "listing returned to bag");
    Ok(listing)
}

/// Buys an active listing.
///
/// The funds check runs before the atomic `Active → Sold` transition, so a
/// losing buyer never has points deducted. The winner pays the full price
/// (`MarketPurchase` entry) and receives the item at the front of the bag.
///
/// # Errors
///
/// Returns [`EconomyError::ListingNotFound`] for an unknown id,
/// [`EconomyError::InsufficientFunds`] when the price is not covered, and
/// [`EconomyError::AlreadySold`] when another buyer won the transition.
pub fn buy(
    profile: &mut PlayerProfile,
    id: ListingId,
    store: &dyn MarketStore,
    now: NaiveDateTime,
) -> EconomyResult<MarketListing> {
    let listing = store
        .get(id)?
        .ok_or(EconomyError::ListingNotFound(id))?;
    if listing.price > profile.ledger.score() {
        return Err(EconomyError::InsufficientFunds {
            required: listing.price,
            available: profile.ledger.score(),
        });
    }
    if !store.transition(id, ListingStatus::Active, ListingStatus::Sold)? {
        return Err(EconomyError::AlreadySold(id));
    }
    profile.ledger.debit(
        listing.price,
        LedgerEntryKind::MarketPurchase,
        &format!("Bought: {}", listing.item.reward_text),
        now,
        Overdraft::Deny,
    )?;
    profile.bag.insert(0, listing.item.clone());
    info!(id, price = listing.price, "purchase complete");
    Ok(listing)
}
