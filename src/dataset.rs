//! The keyed dataset: a shared source, an operation chain, and a key function.
//!
//! Every transformation (`map`, `filter`, `reduce`, `reduce_by_key`) is **pure**: it
//! borrows the receiver and returns a new dataset whose chain is the receiver's chain
//! with one operation appended. The source is shared by `Arc`; nothing is copied until
//! evaluation needs to produce new elements.
//!
//! Nothing is memoized. Every terminal call (`evaluate`, `collect`, `count`,
//! `for_each`) replays the whole chain from the source, so impure functions run again
//! on each evaluation.
//!
//! ```
//! use ironspark::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let base = from_vec(vec![1i64, 2, 3, 4, 5, 6], |x: &i64| Ok(*x));
//! let doubled = base.map(|x| Ok(x * 2));
//! let big = doubled.filter(|x| *x > 4);
//!
//! assert_eq!(big.collect()?, vec![6, 8, 10, 12]);
//! // Earlier datasets are unaffected by later appends.
//! assert_eq!(doubled.collect()?, vec![2, 4, 6, 8, 10, 12]);
//! assert_eq!(base.collect()?, vec![1, 2, 3, 4, 5, 6]);
//! # Ok(())
//! # }
//! ```

use crate::chain::OperationChain;
use crate::element::{Element, GroupKey, KeyFn};
use crate::error::EvalResult;
use crate::evaluator::Evaluator;
use crate::explain::ChainExplanation;
use crate::operation::Operation;
use std::borrow::Cow;
use std::sync::Arc;

#[cfg(feature = "metrics")]
use crate::metrics::EvalMetrics;
#[cfg(feature = "metrics")]
use std::time::Instant;

/// A lazily evaluated sequence of `T`, grouped by keys of type `K` when reduced by key.
pub struct KeyedDataset<T, K> {
    source: Arc<[T]>,
    chain: OperationChain<T, K>,
    key_fn: KeyFn<T, K>,
}

/// Build a dataset over `data` that groups by `key_fn`.
pub fn from_vec<T, K, F>(data: Vec<T>, key_fn: F) -> KeyedDataset<T, K>
where
    T: Element,
    K: GroupKey,
    F: 'static + Send + Sync + Fn(&T) -> anyhow::Result<K>,
{
    KeyedDataset::new(data, key_fn)
}

impl<T: Element, K: GroupKey> KeyedDataset<T, K> {
    /// Build a dataset with an empty chain.
    pub fn new<F>(data: Vec<T>, key_fn: F) -> Self
    where
        F: 'static + Send + Sync + Fn(&T) -> anyhow::Result<K>,
    {
        Self::from_shared(data.into(), Arc::new(key_fn))
    }

    /// Build a dataset over an already shared source.
    #[must_use]
    pub fn from_shared(source: Arc<[T]>, key_fn: KeyFn<T, K>) -> Self {
        Self {
            source,
            chain: OperationChain::new(),
            key_fn,
        }
    }

    fn extended(&self, op: Operation<T, K>) -> Self {
        Self {
            source: Arc::clone(&self.source),
            chain: self.chain.with_appended(op),
            key_fn: Arc::clone(&self.key_fn),
        }
    }

    /// Transform every element. The first failure aborts evaluation.
    #[must_use]
    pub fn map<F>(&self, f: F) -> Self
    where
        F: 'static + Send + Sync + Fn(&T) -> anyhow::Result<T>,
    {
        self.extended(Operation::map(f))
    }

    /// Keep elements for which `pred` is true, preserving their order.
    #[must_use]
    pub fn filter<P>(&self, pred: P) -> Self
    where
        P: 'static + Send + Sync + Fn(&T) -> bool,
    {
        self.extended(Operation::filter(pred))
    }

    /// Replace the whole current sequence with `reducer`'s output.
    ///
    /// The reducer is called exactly once, even on an empty sequence.
    #[must_use]
    pub fn reduce<R>(&self, reducer: R) -> Self
    where
        R: 'static + Send + Sync + Fn(&[T]) -> anyhow::Result<Vec<T>>,
    {
        self.extended(Operation::reduce(reducer))
    }

    /// Group the current sequence by this dataset's key function, run `reducer` once
    /// per group, and concatenate the results.
    ///
    /// Callers needing a particular output order should sort downstream.
    #[must_use]
    pub fn reduce_by_key<R>(&self, reducer: R) -> Self
    where
        R: 'static + Send + Sync + Fn(&[T]) -> anyhow::Result<Vec<T>>,
    {
        self.extended(Operation::reduce_by_key(Arc::clone(&self.key_fn), reducer))
    }

    /// Run the chain over the source.
    ///
    /// With an empty chain the source itself is returned, borrowed and uncopied.
    ///
    /// # Errors
    ///
    /// The first failure of any map function, reducer or key function.
    pub fn evaluate(&self) -> EvalResult<Cow<'_, [T]>> {
        Evaluator::new().run(&self.source, &self.chain)
    }

    /// Run the chain and return an owned result.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    pub fn collect(&self) -> EvalResult<Vec<T>> {
        self.evaluate().map(Cow::into_owned)
    }

    /// Run the chain and return the number of resulting elements.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    pub fn count(&self) -> EvalResult<usize> {
        self.evaluate().map(|out| out.len())
    }

    /// Run the chain, then call `f` on each resulting element in order.
    ///
    /// Stops at the first element for which `f` fails.
    ///
    /// # Errors
    ///
    /// An evaluation failure, or the first error returned by `f`.
    pub fn for_each<F>(&self, mut f: F) -> anyhow::Result<()>
    where
        F: FnMut(&T) -> anyhow::Result<()>,
    {
        for item in self.evaluate()?.iter() {
            f(item)?;
        }
        Ok(())
    }

    /// Run the chain while recording per-step statistics.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    #[cfg(feature = "metrics")]
    pub fn evaluate_with_metrics(&self) -> EvalResult<(Vec<T>, EvalMetrics)> {
        let mut metrics = EvalMetrics::new(self.source.len());
        let started = Instant::now();
        let out = Evaluator::new().run_observed(&self.source, &self.chain, |report| {
            metrics.record(report);
        })?;
        metrics.elapsed = started.elapsed();
        Ok((out.into_owned(), metrics))
    }
}

impl<T, K> KeyedDataset<T, K> {
    /// The shared, never-mutated source sequence.
    #[must_use]
    pub fn source(&self) -> &[T] {
        &self.source
    }

    #[must_use]
    pub fn chain(&self) -> &OperationChain<T, K> {
        &self.chain
    }

    /// Whether both datasets were derived from the same constructor call.
    #[must_use]
    pub fn shares_source_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }

    /// Describe the chain without running it.
    #[must_use]
    pub fn explain(&self) -> ChainExplanation {
        ChainExplanation::from_kinds(self.source.len(), &self.chain.kinds())
    }
}

/// Cloning shares both the source and the chain; neither is ever mutated.
impl<T, K> Clone for KeyedDataset<T, K> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            chain: self.chain.clone(),
            key_fn: Arc::clone(&self.key_fn),
        }
    }
}

impl<T, K> std::fmt::Debug for KeyedDataset<T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedDataset")
            .field("source_len", &self.source.len())
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}
