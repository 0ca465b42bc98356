//! Notification payloads pushed to the host UI.
//!
//! The engine never formats or displays anything; it hands these records to
//! the [`NotificationSink`] with enough data for a toast or modal. The host
//! decides presentation.

use serde::{Deserialize, Serialize};

/// A user-visible event produced by an engine operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Notice {
    /// A draw finished.
    DrawResult {
        /// Tier display name.
        tier_name: String,
        /// Tier display color.
        color: String,
        /// The reward text on the won card.
        reward_text: String,
        /// Whether the golden-theme buff was active for this draw.
        golden: bool,
    },
    /// An achievement was unlocked.
    AchievementUnlocked {
        /// Badge icon (emoji).
        icon: String,
        /// Badge title.
        title: String,
        /// Unlock condition description.
        description: String,
    },
    /// A matured fixed-term deposit was redeemed.
    DepositRedeemed {
        /// Original principal.
        principal: u64,
        /// Interest paid on top of the principal.
        profit: u64,
    },
    /// Daily interest was paid on the liquid balance.
    InterestPaid {
        /// Points credited.
        amount: u64,
        /// Effective daily rate used.
        rate: f64,
    },
    /// One of the seller's listings sold and the proceeds were credited.
    SaleSettled {
        /// Reward text of the sold item.
        reward_text: String,
        /// Proceeds after tax.
        net: u64,
    },
    /// A cancelled listing's item was returned to the bag.
    ListingReturned {
        /// Reward text of the returned item.
        reward_text: String,
    },
    /// A market purchase completed.
    PurchaseComplete {
        /// Reward text of the bought item.
        reward_text: String,
        /// Price paid.
        price: u64,
    },
    /// A reward card was used.
    ItemUsed {
        /// Reward text of the used card.
        reward_text: String,
        /// Points credited by the card (0 for non-point rewards).
        bonus_points: u32,
    },
    /// A parent granted or deducted points manually.
    PointsAdjusted {
        /// Signed amount actually applied.
        amount: i64,
        /// Reason supplied by the parent.
        reason: String,
    },
}

/// Callback surface for user-visible events.
///
/// Fire-and-forget: the engine does not care whether anything listens.
pub trait NotificationSink {
    /// Delivers one notice to the host.
    fn notify(&mut self, notice: Notice);
}

/// Sink that drops every notice. Default for headless use.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _notice: Notice) {}
}

/// Sink that records every notice, for assertions in tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    /// All notices received, in delivery order.
    pub notices: Vec<Notice>,
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// Recording sink whose clones share one notice list.
///
/// Hand one clone to the engine and keep another to assert on what was
/// delivered.
#[derive(Clone, Debug, Default)]
pub struct SharedSink {
    notices: std::sync::Arc<parking_lot::Mutex<Vec<Notice>>>,
}

impl SharedSink {
    /// Creates an empty shared sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out every notice delivered so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Removes and returns every notice delivered so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }
}

impl NotificationSink for SharedSink {
    fn notify(&mut self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
