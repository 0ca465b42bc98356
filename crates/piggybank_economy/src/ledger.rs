//! # Point Ledger
//!
//! Append-only history of every point movement on a profile. The score is
//! never assigned directly: all mutation goes through [`Ledger::credit`] and
//! [`Ledger::debit`], and each call appends exactly one entry. Entries carry
//! a typed [`LedgerEntryKind`] so downstream consumers (achievements, stats)
//! classify by tag instead of parsing reason strings.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, EconomyResult};

/// Classification tag for a ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerEntryKind {
    /// Cost of one draw.
    Draw,
    /// Daily interest on the liquid score.
    DailyInterest,
    /// Principal moved into a fixed-term deposit.
    DepositOpen,
    /// Principal plus profit returned at maturity.
    DepositMatured,
    /// Net proceeds from a market sale.
    MarketSale,
    /// Price paid for a market purchase.
    MarketPurchase,
    /// A reward card consumed from the bag.
    ItemUsed,
    /// Manual adjustment by a parent.
    Adjustment,
    /// Zero-amount marker for an achievement unlock.
    Achievement,
}

/// One point movement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// When the movement happened.
    pub at: NaiveDateTime,
    /// Classification tag.
    pub kind: LedgerEntryKind,
    /// Human-readable description.
    pub reason: String,
    /// Signed point delta actually applied (negative for debits).
    pub amount: i64,
}

/// Overdraft policy for [`Ledger::debit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overdraft {
    /// Reject the debit outright when the score cannot cover it. Used by
    /// draws, deposits and purchases.
    Deny,
    /// Clamp the debit to the available score (floor of zero). Used only
    /// by manual adjustments.
    Saturate,
}

/// The score plus its full movement history.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    score: u64,
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Creates an empty ledger with a zero score.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current liquid score.
    #[inline]
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Read-only view of the history, oldest first.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Adds points and appends one entry. A zero amount is legal and
    /// produces a zero-amount entry (achievement markers rely on this).
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::ArithmeticOverflow`] if the score would
    /// exceed `u64::MAX`.
    pub fn credit(
        &mut self,
        amount: u64,
        kind: LedgerEntryKind,
        reason: &str,
        at: NaiveDateTime,
    ) -> EconomyResult<()> {
        self.score = self
            .score
            .checked_add(amount)
            .ok_or(EconomyError::ArithmeticOverflow)?;
        self.entries.push(LedgerEntry {
            at,
            kind,
            reason: reason.to_owned(),
            amount: i64::try_from(amount).map_err(|_| EconomyError::ArithmeticOverflow)?,
        });
        Ok(())
    }

    /// Removes points and appends one entry recording the applied delta.
    ///
    /// Returns the amount actually deducted, which under
    /// [`Overdraft::Saturate`] may be less than requested.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InsufficientFunds`] under
    /// [`Overdraft::Deny`] when the score cannot cover the debit.
    pub fn debit(
        &mut self,
        amount: u64,
        kind: LedgerEntryKind,
        reason: &str,
        at: NaiveDateTime,
        overdraft: Overdraft,
    ) -> EconomyResult<u64> {
        let applied = match overdraft {
            Overdraft::Deny if amount > self.score => {
                return Err(EconomyError::InsufficientFunds {
                    required: amount,
                    available: self.score,
                });
            }
            Overdraft::Deny => amount,
            Overdraft::Saturate => amount.min(self.score),
        };
        self.score -= applied;
        self.entries.push(LedgerEntry {
            at,
            kind,
            reason: reason.to_owned(),
            amount: -i64::try_from(applied).map_err(|_| EconomyError::ArithmeticOverflow)?,
        });
        Ok(applied)
    }

    /// Number of entries with the given tag.
    #[must_use]
    pub fn count_kind(&self, kind: LedgerEntryKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_credit_appends_exactly_one_entry() {
        let mut ledger = Ledger::new();
        ledger
            .credit(100, LedgerEntryKind::Adjustment, "starting points", at())
            .unwrap();
        assert_eq!(ledger.score(), 100);
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.entries()[0].amount, 100);
    }

    #[test]
    fn test_debit_deny_rejects_overdraft() {
        let mut ledger = Ledger::new();
        ledger
            .credit(50, LedgerEntryKind::Adjustment, "seed", at())
            .unwrap();
        let err = ledger
            .debit(100, LedgerEntryKind::Draw, "draw cost", at(), Overdraft::Deny)
            .unwrap_err();
        assert_eq!(
            err,
            EconomyError::InsufficientFunds {
                required: 100,
                available: 50
            }
        );
        // Failed debit leaves no trace.
        assert_eq!(ledger.score(), 50);
        assert_eq!(ledger.entries().len(), 1);
    }

    #[test]
    fn test_debit_saturate_floors_at_zero() {
        let mut ledger = Ledger::new();
        ledger
            .credit(30, LedgerEntryKind::Adjustment, "seed", at())
            .unwrap();
        let applied = ledger
            .debit(
                100,
                LedgerEntryKind::Adjustment,
                "penalty",
                at(),
                Overdraft::Saturate,
            )
            .unwrap();
        assert_eq!(applied, 30);
        assert_eq!(ledger.score(), 0);
        assert_eq!(ledger.entries()[1].amount, -30);
    }

    #[test]
    fn test_zero_amount_entry_is_legal() {
        let mut ledger = Ledger::new();
        ledger
            .credit(0, LedgerEntryKind::Achievement, "First login", at())
            .unwrap();
        assert_eq!(ledger.score(), 0);
        assert_eq!(ledger.entries()[0].amount, 0);
    }

    #[test]
    fn test_count_kind() {
        let mut ledger = Ledger::new();
        ledger
            .credit(1000, LedgerEntryKind::Adjustment, "seed", at())
            .unwrap();
        for _ in 0..3 {
            ledger
                .debit(100, LedgerEntryKind::Draw, "draw cost", at(), Overdraft::Deny)
                .unwrap();
        }
        assert_eq!(ledger.count_kind(LedgerEntryKind::Draw), 3);
        assert_eq!(ledger.count_kind(LedgerEntryKind::DailyInterest), 0);
    }
}
