//! Loan finance calculations and status derivation
//!
//! Pure functions over loan amounts and calendar dates. These implement the
//! shop's pricing rules: simple interest per month, a "half month" rounding
//! convention, and the lifecycle status decision order. No validation and no
//! rounding happens here; callers validate inputs and reports round for
//! display.

use chrono::{DateTime, Datelike, Duration, Months, Utc};

use crate::models::LoanStatus;

/// Total amount payable at redemption: principal plus simple interest.
///
/// A rate of 1.0 or below is read as a fraction (0.15 = 15%); anything above
/// is already a percentage. Interest = principal * percent * months / 100.
pub fn calculate_total_payable(principal: f64, interest_rate: f64, duration_months: f64) -> f64 {
    let interest_percent = if interest_rate > 1.0 {
        interest_rate
    } else {
        interest_rate * 100.0
    };
    let total_interest = principal * interest_percent * duration_months / 100.0;
    principal + total_interest
}

/// Due date for a loan: start plus whole calendar months, plus a fixed 15
/// days whenever the duration has any fractional part (0.3 and 0.9 months
/// both count as "half a month").
///
/// Month arithmetic clamps to the last day of the target month, so a loan
/// started on Jan 31 with a one-month term is due Feb 28 (or 29), not Mar 2.
pub fn calculate_due_date(start: DateTime<Utc>, duration_months: f64) -> DateTime<Utc> {
    let whole_months = duration_months.floor() as i64;
    let mut due = add_months(start, whole_months);
    if duration_months.fract() != 0.0 {
        due += Duration::days(15);
    }
    due
}

/// Duration between two dates in months, in half-month steps.
///
/// Whole months come from calendar year/month subtraction; the days left
/// over after anchoring the start forward by that many months add 0.5 when
/// they reach 10. Never returns less than 1: same-day and backward-dated
/// spans are floored to a one-month minimum.
pub fn calculate_duration_months(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let whole_months =
        (end.year() as i64 - start.year() as i64) * 12 + (end.month() as i64 - start.month() as i64);

    let anchored = add_months(start, whole_months);
    let remaining_days = ((end - anchored).num_seconds() as f64 / 86_400.0).ceil();

    let mut months = whole_months as f64;
    if remaining_days >= 10.0 {
        months += 0.5;
    }

    if months > 0.0 {
        months
    } else {
        1.0
    }
}

/// Signed day count from `now` to the due date; negative means overdue.
pub fn days_until_due(due_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ((due_date - now).num_seconds() as f64 / 86_400.0).ceil() as i64
}

/// Derive a loan's lifecycle status from its repayment position.
///
/// Decision order, first match wins:
/// 1. fully paid is always REDEEMED, even over a sticky DEFAULTED;
/// 2. DEFAULTED is sticky while any balance remains;
/// 3. past due becomes LATE;
/// 4. otherwise the loan keeps REDEEMED if it had it, else ACTIVE.
pub fn determine_status(
    persisted: LoanStatus,
    outstanding_balance: f64,
    days_until_due: i64,
) -> LoanStatus {
    if outstanding_balance <= 0.0 {
        return LoanStatus::Redeemed;
    }

    if persisted == LoanStatus::Defaulted {
        return LoanStatus::Defaulted;
    }

    if days_until_due < 0 {
        return LoanStatus::Late;
    }

    if persisted == LoanStatus::Redeemed {
        LoanStatus::Redeemed
    } else {
        LoanStatus::Active
    }
}

/// Round to two decimal places for report display
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn add_months(date: DateTime<Utc>, months: i64) -> DateTime<Utc> {
    let result = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new((-months) as u32))
    };
    // Out-of-range dates only occur near the representable limits
    result.unwrap_or(date)
}
