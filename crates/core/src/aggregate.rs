//! Timeframe-bounded monetary aggregation.
//!
//! Operates purely on the entity sets the store traits return, so totals
//! are identical whichever backend supplies the data. Sums are exact
//! [`Decimal`] arithmetic; no floating point is involved anywhere.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::scope::TenantScope;
use crate::store::traits::{SessionOps, TransactionOps};
use crate::types::Transaction;

/// Aggregation window, anchored at the current instant.
///
/// Parsed case-sensitively from `today | week | month | all-time`; any
/// other value falls back to [`Timeframe::AllTime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Timeframe {
    Today,
    Week,
    Month,
    #[default]
    AllTime,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::AllTime => "all-time",
        }
    }

    /// The inclusive lower bound on transaction timestamps, or `None` for
    /// no cutoff. Calendar boundaries (`today`, `month`) are UTC.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Today => Some(now.date_naive().and_time(NaiveTime::MIN).and_utc()),
            Self::Week => Some(now - Duration::days(7)),
            Self::Month => {
                let month_start = now
                    .date_naive()
                    .with_day(1)
                    .expect("day 1 exists in every month");
                Some(month_start.and_time(NaiveTime::MIN).and_utc())
            }
            Self::AllTime => None,
        }
    }
}

impl From<&str> for Timeframe {
    fn from(s: &str) -> Self {
        match s {
            "today" => Self::Today,
            "week" => Self::Week,
            "month" => Self::Month,
            _ => Self::AllTime,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals over every timeframe at once, for dashboard-style summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub today: Decimal,
    pub week: Decimal,
    pub month: Decimal,
    #[serde(rename = "allTime")]
    pub all_time: Decimal,
}

fn eligible(txn: &Transaction, test_sessions: &HashSet<&str>) -> bool {
    // Quick transactions (no session) always count; session-bound ones are
    // excluded only when their session is flagged as a test.
    match txn.session_id.as_deref() {
        None => true,
        Some(session_id) => !test_sessions.contains(session_id),
    }
}

/// Sum of eligible transaction amounts in scope within the timeframe.
///
/// Eligible means: not attached to a test session. The timeframe cutoff is
/// applied to the transaction timestamp; an empty surviving set sums to
/// zero.
pub async fn total<S>(store: &S, scope: &TenantScope, timeframe: Timeframe) -> StoreResult<Decimal>
where
    S: SessionOps + TransactionOps + ?Sized,
{
    let sessions = store.list_sessions(scope).await?;
    let test_sessions: HashSet<&str> = sessions
        .iter()
        .filter(|s| s.is_test)
        .map(|s| s.id.as_str())
        .collect();

    let transactions = store.list_transactions(scope).await?;
    let cutoff = timeframe.cutoff(Utc::now());

    let sum = transactions
        .iter()
        .filter(|txn| eligible(txn, &test_sessions))
        .filter(|txn| cutoff.is_none_or(|c| txn.timestamp >= c))
        .map(|txn| txn.amount)
        .sum();
    Ok(sum)
}

/// All four timeframe totals in a single pass over the data.
pub async fn totals<S>(store: &S, scope: &TenantScope) -> StoreResult<Totals>
where
    S: SessionOps + TransactionOps + ?Sized,
{
    let sessions = store.list_sessions(scope).await?;
    let test_sessions: HashSet<&str> = sessions
        .iter()
        .filter(|s| s.is_test)
        .map(|s| s.id.as_str())
        .collect();

    let transactions = store.list_transactions(scope).await?;
    let now = Utc::now();
    let today_cutoff = Timeframe::Today.cutoff(now);
    let week_cutoff = Timeframe::Week.cutoff(now);
    let month_cutoff = Timeframe::Month.cutoff(now);

    let mut totals = Totals {
        today: Decimal::ZERO,
        week: Decimal::ZERO,
        month: Decimal::ZERO,
        all_time: Decimal::ZERO,
    };

    for txn in transactions.iter().filter(|t| eligible(t, &test_sessions)) {
        totals.all_time += txn.amount;
        if today_cutoff.is_some_and(|c| txn.timestamp >= c) {
            totals.today += txn.amount;
        }
        if week_cutoff.is_some_and(|c| txn.timestamp >= c) {
            totals.week += txn.amount;
        }
        if month_cutoff.is_some_and(|c| txn.timestamp >= c) {
            totals.month += txn.amount;
        }
    }

    Ok(totals)
}
