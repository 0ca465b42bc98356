//! Market listing records held by the shared store.

use serde::{Deserialize, Serialize};

use crate::item::Item;

/// Unique identifier of a market listing.
pub type ListingId = u64;

/// Lifecycle state of a listing.
///
/// `Active → Sold` is the one transition raced by multiple buyers; the store
/// must apply it with its compare-and-set primitive. `Active → Cancelled`
/// only ever comes from the seller's own session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    /// Visible and purchasable.
    Active,
    /// Bought; awaiting settlement on the seller's side.
    Sold,
    /// Withdrawn by the seller; awaiting return of the item.
    Cancelled,
}

/// Identifies the selling child across households.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRef {
    /// Household (account) identifier.
    pub household_id: String,
    /// Index of the child within that household.
    pub child_index: usize,
    /// Display name shown next to the listing.
    pub display_name: String,
}

/// One item offered for sale in the shared market.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketListing {
    /// Listing identifier, unique within the store.
    pub id: ListingId,
    /// Who listed it.
    pub seller: SellerRef,
    /// Asking price in points. Always positive.
    pub price: u64,
    /// The item being sold.
    pub item: Item,
    /// Current lifecycle state.
    pub status: ListingStatus,
}

impl MarketListing {
    /// Returns true while the listing can still be bought or cancelled.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }
}
