//! Shared helpers for the integration suites.

use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique id for scoping test data, so the same suite can run against a
/// shared database without collisions.
#[allow(dead_code)]
pub fn unique(prefix: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{n}", std::process::id())
}

/// Dollar amount from cents: `dollars(500)` is $5.00.
#[allow(dead_code)]
pub fn dollars(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
