//! Pre-built data, key functions and reducers for common testing scenarios.

use crate::value::Value;
use anyhow::{Result, bail};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// `[1, 2, 3, 4, 5, 6]`, the canonical small input.
#[must_use]
pub fn numbers_1_to_6() -> Vec<i64> {
    (1..=6).collect()
}

/// Each element is its own key.
///
/// # Errors
///
/// Never fails.
#[allow(clippy::trivially_copy_pass_by_ref, clippy::unnecessary_wraps)]
pub fn identity_key(x: &i64) -> Result<i64> {
    Ok(*x)
}

/// Buckets integers into `0` (even) and `1` (odd).
///
/// # Errors
///
/// Never fails.
#[allow(clippy::trivially_copy_pass_by_ref, clippy::unnecessary_wraps)]
pub fn parity_key(x: &i64) -> Result<i64> {
    Ok(x.rem_euclid(2))
}

/// Reduces any sequence to its length.
///
/// # Errors
///
/// Fails only if the length does not fit in an `i64`.
pub fn count_reducer(xs: &[i64]) -> Result<Vec<i64>> {
    Ok(vec![i64::try_from(xs.len())?])
}

/// Reduces a sequence to its sum.
///
/// # Errors
///
/// Fails on overflow.
pub fn sum_reducer(xs: &[i64]) -> Result<Vec<i64>> {
    let mut total: i64 = 0;
    for x in xs {
        let Some(next) = total.checked_add(*x) else {
            bail!("sum overflowed at {x}");
        };
        total = next;
    }
    Ok(vec![total])
}

/// Sums a sequence of [`Value::Int`]s, failing on any other variant.
///
/// # Errors
///
/// Fails with a type-mismatch error on the first non-integer element, or when the
/// sum overflows `i64`.
pub fn value_sum_reducer(xs: &[Value]) -> Result<Vec<Value>> {
    let mut total = 0i64;
    for x in xs {
        let Some(next) = total.checked_add(x.try_int()?) else {
            bail!("sum overflowed at {x}");
        };
        total = next;
    }
    Ok(vec![Value::Int(total)])
}

/// Shared, thread-safe counter for observing how many times a user function runs.
///
/// Clones share the same count, so one handle can be moved into a closure while the
/// test keeps another.
///
/// ```
/// use ironspark::*;
/// use ironspark::testing::*;
///
/// # fn main() -> anyhow::Result<()> {
/// let calls = InvocationCounter::new();
/// let seen = calls.clone();
/// let ds = from_vec(vec![1i64, 2, 3], identity_key).map(move |x| {
///     seen.tick();
///     Ok(*x)
/// });
///
/// assert_eq!(calls.count(), 0); // lazy
/// ds.collect()?;
/// ds.collect()?;
/// assert_eq!(calls.count(), 6); // no memoization
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InvocationCounter(Arc<AtomicUsize>);

impl InvocationCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one invocation.
    pub fn tick(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_key_handles_negatives() -> Result<()> {
        assert_eq!(parity_key(&-3)?, 1);
        assert_eq!(parity_key(&-4)?, 0);
        Ok(())
    }

    #[test]
    fn sum_reducer_reports_overflow() {
        assert!(sum_reducer(&[i64::MAX, 1]).is_err());
    }

    #[test]
    fn value_sum_reducer_reports_overflow() {
        let err = value_sum_reducer(&[Value::Int(i64::MAX), Value::Int(1)]).unwrap_err();
        assert!(err.to_string().contains("overflowed"));
    }

    #[test]
    fn value_sum_reducer_rejects_non_integers() {
        assert!(value_sum_reducer(&[Value::Int(1), Value::from("x")]).is_err());
    }

    #[test]
    fn counter_clones_share_state() {
        let a = InvocationCounter::new();
        let b = a.clone();
        b.tick();
        b.tick();
        assert_eq!(a.count(), 2);
        a.reset();
        assert_eq!(b.count(), 0);
    }
}
