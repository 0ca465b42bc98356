//! # PIGGYBANK Shared Types
//!
//! Boundary contracts between the reward economy engine and its external
//! collaborators (persistence, market store, notification UI, clock, RNG).
//!
//! The engine itself performs no I/O and never blocks; everything the host
//! application must provide lives behind the traits in this crate. The
//! in-memory implementations here are the reference collaborators and the
//! test doubles.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod events;
pub mod item;
pub mod listing;
pub mod runtime;
pub mod store;

pub use events::{Notice, NotificationSink, NullSink, RecordingSink, SharedSink};
pub use item::{Item, Rank};
pub use listing::{ListingId, ListingStatus, MarketListing, SellerRef};
pub use runtime::{
    Clock, ManualClock, RandomSource, ScriptedSource, SeededRng, SharedClock, SystemClock,
};
pub use store::{
    MarketStore, MemoryMarketStore, MemoryPersistence, Persistence, SharedPersistence, StoreError,
};
