//! # Economy Error Types
//!
//! All errors that can occur in the reward economy engine.

use piggybank_shared::{ListingId, StoreError};
use thiserror::Error;

/// Errors that can occur in the economy engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    /// The operation costs more points than the profile holds.
    #[error("insufficient funds: need {required} points, have {available}")]
    InsufficientFunds {
        /// Points the operation requires.
        required: u64,
        /// Points currently available.
        available: u64,
    },

    /// A non-positive principal or price was supplied.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// A fixed-term deposit was redeemed before its end date.
    #[error("deposit {id} not mature: {days_left} day(s) remaining")]
    NotMature {
        /// Deposit identifier.
        id: u64,
        /// Whole days until maturity.
        days_left: i64,
    },

    /// No deposit with this id exists on the profile.
    #[error("deposit not found: {0}")]
    DepositNotFound(u64),

    /// The referenced bag slot does not exist.
    #[error("no item at bag index {0}")]
    ItemNotFound(usize),

    /// The listing was bought or withdrawn before this buyer committed.
    #[error("listing {0} already sold or withdrawn")]
    AlreadySold(ListingId),

    /// The listing does not exist in the shared store.
    #[error("listing not found: {0}")]
    ListingNotFound(ListingId),

    /// No child exists at the given household index.
    #[error("no child at index {0}")]
    ChildNotFound(usize),

    /// Arithmetic overflow in a point calculation.
    #[error("arithmetic overflow in economic calculation")]
    ArithmeticOverflow,

    /// Configuration input was structurally unreadable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An external store collaborator failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for economy operations.
pub type EconomyResult<T> = Result<T, EconomyError>;
