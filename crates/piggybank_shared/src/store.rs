//! Persistence and market-store boundaries.
//!
//! The household snapshot and the cross-household market live outside the
//! engine (the original deployment keeps them in a cloud document store).
//! The engine only ever talks to these traits. The in-memory versions here
//! are the reference implementations and serve the test suite.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::listing::{ListingId, ListingStatus, MarketListing};

/// Errors surfaced by external storage collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store rejected or lost the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The stored payload could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Household snapshot persistence.
///
/// The engine saves the full state after every mutating operation and loads
/// it once at session start. `S` is the household snapshot type; keeping the
/// trait generic lets this crate stay free of engine types.
pub trait Persistence<S> {
    /// Loads the snapshot for a household, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store fails.
    fn load(&mut self, household_id: &str) -> StoreResult<Option<S>>;

    /// Writes the snapshot for a household.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store fails.
    fn save(&mut self, household_id: &str, state: &S) -> StoreResult<()>;
}

/// In-memory persistence keyed by household id.
#[derive(Clone, Debug, Default)]
pub struct MemoryPersistence<S> {
    records: HashMap<String, S>,
}

impl<S: Clone> MemoryPersistence<S> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Number of saved households.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been saved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<S: Clone> Persistence<S> for MemoryPersistence<S> {
    fn load(&mut self, household_id: &str) -> StoreResult<Option<S>> {
        Ok(self.records.get(household_id).cloned())
    }

    fn save(&mut self, household_id: &str, state: &S) -> StoreResult<()> {
        self.records.insert(household_id.to_owned(), state.clone());
        Ok(())
    }
}

/// Persistence whose clones share one record map.
///
/// Lets a test keep a handle to the same storage it hands the engine, to
/// assert on saves or rebuild the engine from saved state.
#[derive(Clone, Debug, Default)]
pub struct SharedPersistence<S> {
    records: Arc<Mutex<HashMap<String, S>>>,
}

impl<S: Clone> SharedPersistence<S> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Copies out the stored snapshot for a household, if any.
    #[must_use]
    pub fn peek(&self, household_id: &str) -> Option<S> {
        self.records.lock().get(household_id).cloned()
    }
}

impl<S: Clone> Persistence<S> for SharedPersistence<S> {
    fn load(&mut self, household_id: &str) -> StoreResult<Option<S>> {
        Ok(self.records.lock().get(household_id).cloned())
    }

    fn save(&mut self, household_id: &str, state: &S) -> StoreResult<()> {
        self.records
            .lock()
            .insert(household_id.to_owned(), state.clone());
        Ok(())
    }
}

/// Shared key-value store of market listings.
///
/// The one genuine race in the economy is two buyers hitting the same
/// listing; [`MarketStore::transition`] is the atomic read-modify-write that
/// guarantees at most one of them wins. Every implementation must make that
/// transition atomic with respect to concurrent calls.
pub trait MarketStore {
    /// Inserts or replaces a listing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store fails.
    fn put(&self, listing: MarketListing) -> StoreResult<()>;

    /// Fetches a listing by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store fails.
    fn get(&self, id: ListingId) -> StoreResult<Option<MarketListing>>;

    /// Atomically moves a listing from `from` to `to`.
    ///
    /// Returns `Ok(true)` only for the caller that observed `from` and wrote
    /// `to` in one step; every concurrent competitor gets `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store fails.
    fn transition(&self, id: ListingId, from: ListingStatus, to: ListingStatus)
        -> StoreResult<bool>;

    /// Deletes a listing, returning it if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store fails.
    fn remove(&self, id: ListingId) -> StoreResult<Option<MarketListing>>;

    /// All listings currently in the `Active` state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store fails.
    fn active_listings(&self) -> StoreResult<Vec<MarketListing>>;

    /// Every listing regardless of state. Sellers sweep this for their
    /// sold and cancelled listings awaiting settlement.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store fails.
    fn all_listings(&self) -> StoreResult<Vec<MarketListing>>;
}

/// In-memory market store with a mutex-guarded compare-and-set.
#[derive(Debug, Default)]
pub struct MemoryMarketStore {
    listings: Mutex<HashMap<ListingId, MarketListing>>,
}

impl MemoryMarketStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listings: Mutex::new(HashMap::new()),
        }
    }
}

impl MarketStore for MemoryMarketStore {
    fn put(&self, listing: MarketListing) -> StoreResult<()> {
        self.listings.lock().insert(listing.id, listing);
        Ok(())
    }

    fn get(&self, id: ListingId) -> StoreResult<Option<MarketListing>> {
        Ok(self.listings.lock().get(&id).cloned())
    }

    fn transition(
        &self,
        id: ListingId,
        from: ListingStatus,
        to: ListingStatus,
    ) -> StoreResult<bool> {
        let mut listings = self.listings.lock();
        match listings.get_mut(&id) {
            Some(listing) if listing.status == from => {
                listing.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn remove(&self, id: ListingId) -> StoreResult<Option<MarketListing>> {
        Ok(self.listings.lock().remove(&id))
    }

    fn active_listings(&self) -> StoreResult<Vec<MarketListing>> {
        Ok(self
            .listings
            .lock()
            .values()
            .filter(|l| l.is_active())
            .cloned()
            .collect())
    }

    fn all_listings(&self) -> StoreResult<Vec<MarketListing>> {
        Ok(self.listings.lock().values().cloned().collect())
    }
}
