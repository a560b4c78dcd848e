//! Sequential chain evaluator.
//!
//! The evaluator is a linear state machine: it starts from the (borrowed) source,
//! applies each operation of the chain in order, and stops at the first failure.
//! Nothing runs in parallel and nothing is reordered; map and filter are single
//! in-order scans, and reduce / reduce-by-key always see a fully materialized input.
//!
//! Intermediate sequences are carried as `Cow<[T]>`: the source is only cloned when
//! an operation actually has to produce new elements, and an empty chain hands the
//! source back without copying it.

use crate::chain::OperationChain;
use crate::element::{Element, GroupKey, KeyFn, MapFn, PredicateFn, ReduceFn};
use crate::error::{EvalError, EvalResult};
use crate::operation::{Operation, OperationKind};
use std::borrow::Cow;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// What the evaluator reports after each completed step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepReport {
    /// Zero-based position in the chain.
    pub step: usize,
    pub kind: OperationKind,
    pub input_len: usize,
    pub output_len: usize,
    pub elapsed: Duration,
}

/// Runs an [`OperationChain`] over a source sequence.
#[derive(Clone, Copy, Debug, Default)]
pub struct Evaluator;

impl Evaluator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Evaluate `chain` over `source`.
    ///
    /// # Errors
    ///
    /// Returns the first failure raised by a map function, reducer or key function.
    pub fn run<'a, T, K>(
        &self,
        source: &'a [T],
        chain: &OperationChain<T, K>,
    ) -> EvalResult<Cow<'a, [T]>>
    where
        T: Element,
        K: GroupKey,
    {
        self.run_observed(source, chain, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_step` after every successful step.
    ///
    /// # Errors
    ///
    /// Returns the first failure raised by a map function, reducer or key function.
    pub fn run_observed<'a, T, K, F>(
        &self,
        source: &'a [T],
        chain: &OperationChain<T, K>,
        mut on_step: F,
    ) -> EvalResult<Cow<'a, [T]>>
    where
        T: Element,
        K: GroupKey,
        F: FnMut(StepReport),
    {
        let mut current: Cow<'a, [T]> = Cow::Borrowed(source);

        for (step, op) in chain.iter().enumerate() {
            let input_len = current.len();
            let started = Instant::now();

            current = apply(step, op, current).inspect_err(|e| {
                debug!(step, kind = %op.kind(), error = %e, "evaluation aborted");
            })?;

            let report = StepReport {
                step,
                kind: op.kind(),
                input_len,
                output_len: current.len(),
                elapsed: started.elapsed(),
            };
            debug!(
                step,
                kind = %report.kind,
                input = report.input_len,
                output = report.output_len,
                "applied operation"
            );
            on_step(report);
        }

        Ok(current)
    }
}

/// Dispatch one operation. Every variant is handled; there is no fallback arm.
fn apply<'a, T, K>(
    step: usize,
    op: &Operation<T, K>,
    input: Cow<'a, [T]>,
) -> EvalResult<Cow<'a, [T]>>
where
    T: Element,
    K: GroupKey,
{
    let out = match op {
        Operation::Map(f) => map_all(step, f, &input)?,
        Operation::Filter(pred) => filter_all(pred, input),
        Operation::Reduce(reducer) => {
            reducer(&*input).map_err(|source| EvalError::Reduce { step, source })?
        }
        Operation::ReduceByKey { key_fn, reducer } => reduce_groups(step, key_fn, reducer, input)?,
    };
    Ok(Cow::Owned(out))
}

fn map_all<T: Element>(step: usize, f: &MapFn<T>, input: &[T]) -> EvalResult<Vec<T>> {
    let mut out = Vec::with_capacity(input.len());
    for (index, item) in input.iter().enumerate() {
        let mapped = f(item).map_err(|source| EvalError::Element {
            step,
            kind: OperationKind::Map,
            index,
            source,
        })?;
        out.push(mapped);
    }
    Ok(out)
}

fn filter_all<T: Element>(pred: &PredicateFn<T>, input: Cow<'_, [T]>) -> Vec<T> {
    match input {
        Cow::Owned(mut v) => {
            v.retain(|t| pred(t));
            v
        }
        Cow::Borrowed(s) => s.iter().filter(|t| pred(*t)).cloned().collect(),
    }
}

/// Partition `input` by key, then run `reducer` once per group and concatenate.
///
/// All keys are computed before any reducer runs, so a failing key function never
/// leaves a half-reduced result behind. Groups are emitted in order of the first
/// appearance of their key, and elements keep their relative order within a group.
fn reduce_groups<T, K>(
    step: usize,
    key_fn: &KeyFn<T, K>,
    reducer: &ReduceFn<T>,
    input: Cow<'_, [T]>,
) -> EvalResult<Vec<T>>
where
    T: Element,
    K: GroupKey,
{
    let keys = input
        .iter()
        .enumerate()
        .map(|(index, item)| key_fn(item).map_err(|source| EvalError::Key { step, index, source }))
        .collect::<EvalResult<Vec<K>>>()?;

    let groups = group_by_keys(keys, input.into_owned());
    trace!(step, groups = groups.len(), "partitioned by key");

    let mut out = Vec::new();
    for (group, members) in groups.iter().enumerate() {
        let reduced = reducer(members.as_slice()).map_err(|source| EvalError::Group {
            step,
            group,
            source,
        })?;
        out.extend(reduced);
    }
    Ok(out)
}

fn group_by_keys<T, K: GroupKey>(keys: Vec<K>, items: Vec<T>) -> Vec<Vec<T>> {
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Vec<T>> = Vec::new();
    for (key, item) in keys.into_iter().zip(items) {
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(item);
    }
    groups
}
