//! Assertions over evaluated output.
//!
//! The slice assertions work on anything already collected. The `assert_evaluates*`
//! family takes a dataset directly, evaluates it once, and panics with the
//! [`EvalError`] when evaluation itself fails.

use crate::dataset::KeyedDataset;
use crate::element::{Element, GroupKey};
use crate::error::EvalError;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

fn check_len<T: Debug>(what: &str, actual: &[T], expected: &[T]) {
    assert!(
        actual.len() == expected.len(),
        "{what}: length mismatch ({} produced, {} expected)\n  produced: {actual:?}\n  expected: {expected:?}",
        actual.len(),
        expected.len(),
    );
}

/// Same elements, same order.
///
/// # Panics
///
/// On a length difference, or at the first position where the elements differ.
///
/// ```
/// use ironspark::testing::assert_collections_equal;
///
/// assert_collections_equal(&[8, 10, 12], &[8, 10, 12]);
/// ```
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    check_len("ordered comparison", actual, expected);
    if let Some(pos) = actual.iter().zip(expected).position(|(a, e)| a != e) {
        panic!(
            "ordered comparison: position {pos} holds {:?}, expected {:?}\n  produced: {actual:?}\n  expected: {expected:?}",
            actual[pos], expected[pos],
        );
    }
}

fn multiplicities<T: Eq + Hash>(items: &[T]) -> HashMap<&T, usize> {
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
}

/// Same elements with the same multiplicities, in any order.
///
/// Use this for `reduce_by_key` output when the test should not depend on group order.
///
/// # Panics
///
/// If the two slices differ as multisets.
///
/// ```
/// use ironspark::testing::assert_collections_unordered_equal;
///
/// assert_collections_unordered_equal(&[3, 1, 3], &[3, 3, 1]);
/// ```
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    check_len("unordered comparison", actual, expected);

    let produced = multiplicities(actual);
    let wanted = multiplicities(expected);
    let mut diff: Vec<String> = wanted
        .iter()
        .filter_map(|(item, &n)| {
            let got = produced.get(item).copied().unwrap_or(0);
            (got != n).then(|| format!("{item:?}: {got} produced, {n} expected"))
        })
        .collect();
    diff.extend(
        produced
            .iter()
            .filter(|(item, _)| !wanted.contains_key(*item))
            .map(|(item, n)| format!("{item:?}: {n} produced, 0 expected")),
    );

    assert!(
        diff.is_empty(),
        "Collection content mismatch:\n  {}\n  produced: {actual:?}\n  expected: {expected:?}",
        diff.join("\n  "),
    );
}

/// Every element satisfies `pred`.
///
/// # Panics
///
/// Naming the first element that does not.
pub fn assert_all<T: Debug, F: Fn(&T) -> bool>(actual: &[T], pred: F) {
    if let Some(pos) = actual.iter().position(|t| !pred(t)) {
        panic!("element {pos} ({:?}) failed the predicate\n  produced: {actual:?}", actual[pos]);
    }
}

fn evaluated<T: Element, K: GroupKey>(ds: &KeyedDataset<T, K>) -> Vec<T> {
    match ds.collect() {
        Ok(out) => out,
        Err(e) => panic!("evaluation failed: {e}"),
    }
}

/// Evaluate `ds` and compare with `expected`, in order.
///
/// # Panics
///
/// If evaluation fails or the output differs.
pub fn assert_evaluates_to<T, K>(ds: &KeyedDataset<T, K>, expected: &[T])
where
    T: Element + Debug + PartialEq,
    K: GroupKey,
{
    assert_collections_equal(&evaluated(ds), expected);
}

/// Evaluate `ds` and compare with `expected` as a multiset.
///
/// # Panics
///
/// If evaluation fails or the output differs.
pub fn assert_evaluates_unordered<T, K>(ds: &KeyedDataset<T, K>, expected: &[T])
where
    T: Element + Debug + Eq + Hash,
    K: GroupKey,
{
    assert_collections_unordered_equal(&evaluated(ds), expected);
}

/// Evaluate `ds`, expecting it to fail at chain position `step`. Returns the error for
/// further inspection.
///
/// # Panics
///
/// If evaluation succeeds or fails at a different step.
pub fn assert_fails_at<T: Element + Debug, K: GroupKey>(
    ds: &KeyedDataset<T, K>,
    step: usize,
) -> EvalError {
    match ds.collect() {
        Ok(out) => panic!("expected a failure at step {step}, but evaluation produced {out:?}"),
        Err(e) => {
            assert_eq!(e.step(), step, "evaluation failed at the wrong step: {e}");
            e
        }
    }
}
