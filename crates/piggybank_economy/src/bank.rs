//! # Bank
//!
//! Fixed-term deposits and the daily interest payout. Deposit profit is
//! computed through the fixed-point compounding helper so redemption pays
//! the same amount on every platform. The per-day rate is snapshotted when
//! the deposit is opened; later settings or buff changes never touch an
//! open deposit.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::error::{EconomyError, EconomyResult};
use crate::fixed_point::{compound_profit, FixedPoint};
use crate::ledger::{LedgerEntryKind, Overdraft};
use crate::profile::{Deposit, PlayerProfile};

/// Result of redeeming a matured deposit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Redemption {
    /// Principal returned.
    pub principal: u64,
    /// Interest earned on top of the principal.
    pub profit: u64,
}

/// Opens a fixed-term deposit, moving `principal` out of the liquid score.
///
/// The rate is locked into the deposit at this moment.
///
/// # Errors
///
/// Returns [`EconomyError::InvalidAmount`] for a zero principal and
/// [`EconomyError::InsufficientFunds`] when the score cannot cover it.
pub fn open_deposit(
    profile: &mut PlayerProfile,
    id: u64,
    principal: u64,
    days: u32,
    rate: f64,
    now: NaiveDateTime,
) -> EconomyResult<()> {
    if principal == 0 {
        return Err(EconomyError::InvalidAmount(0));
    }
    profile.ledger.debit(
        principal,
        LedgerEntryKind::DepositOpen,
        "Deposit opened",
        now,
        Overdraft::Deny,
    )?;
    profile.deposits.push(Deposit {
        id,
        principal,
        rate_snapshot: rate,
        start: now,
        end: now + chrono::Duration::days(i64::from(days)),
    });
    debug!(id, principal, rate, days, "deposit opened");
    Ok(())
}

/// Redeems a matured deposit: credits principal plus compound profit and
/// retires the deposit.
///
/// `days` is the household's current term length, which is what the payout
/// compounds over; the rate always comes from the deposit's snapshot.
/// Deposits of 100+ points also add their real locked duration to the
/// saver-day statistic.
///
/// # Errors
///
/// Returns [`EconomyError::DepositNotFound`] for an unknown id,
/// [`EconomyError::NotMature`] before the end date, and
/// [`EconomyError::ArithmeticOverflow`] if compounding overflows.
pub fn redeem_deposit(
    profile: &mut PlayerProfile,
    id: u64,
    days: u32,
    now: NaiveDateTime,
) -> EconomyResult<Redemption> {
    let idx = profile
        .deposits
        .iter()
        .position(|d| d.id == id)
        .ok_or(EconomyError::DepositNotFound(id))?;
    let deposit = &profile.deposits[idx];

    if now < deposit.end {
        let secs_left = (deposit.end - now).num_seconds().max(0);
        return Err(EconomyError::NotMature {
            id,
            days_left: (secs_left + 86_399) / 86_400,
        });
    }

    let rate = FixedPoint::from_rate(deposit.rate_snapshot);
    let profit = compound_profit(deposit.principal, rate, days)?;
    let principal = deposit.principal;
    let term_days = deposit.term_days();

    profile.ledger.credit(
        principal
            .checked_add(profit)
            .ok_or(EconomyError::ArithmeticOverflow)?,
        LedgerEntryKind::DepositMatured,
        "Deposit matured",
        now,
    )?;
    if principal >= 100 {
        profile.stat_retired_deposit_days += term_days;
    }
    profile.deposits.remove(idx);
    info!(id, principal, profit, "deposit redeemed");
    Ok(Redemption { principal, profit })
}

/// Pays the daily interest on the liquid score, at most once per calendar
/// day and only from `interest_hour` onward.
///
/// The very first call ever only stamps the date (no retroactive payout).
/// Returns the credited amount, or `None` when nothing was paid.
///
/// # Errors
///
/// Propagates ledger overflow.
pub fn accrue_daily_interest(
    profile: &mut PlayerProfile,
    daily_rate: f64,
    interest_hour: u32,
    now: NaiveDateTime,
) -> EconomyResult<Option<u64>> {
    use chrono::Timelike;

    if now.hour() < interest_hour {
        return Ok(None);
    }
    let today = now.date();
    match profile.last_login_date {
        Some(date) if date == today => Ok(None),
        None => {
            // First session: establish the baseline date, pay nothing.
            profile.last_login_date = Some(today);
            Ok(None)
        }
        Some(_) if profile.ledger.score() > 0 => {
            let interest = FixedPoint::from_rate(daily_rate).mul_floor(profile.ledger.score());
            if interest > 0 {
                profile.ledger.credit(
                    interest,
                    LedgerEntryKind::DailyInterest,
                    "Daily interest",
                    now,
                )?;
                info!(interest, rate = daily_rate, "daily interest paid");
            }
            profile.last_login_date = Some(today);
            Ok(if interest > 0 { Some(interest) } else { None })
        }
        Some(_) => Ok(None),
    }
}
