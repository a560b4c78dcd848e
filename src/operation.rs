//! The closed set of operations a chain can hold.
//!
//! An [`Operation`] only *binds* a user function to a variant tag. Nothing runs at
//! construction time; the [`Evaluator`](crate::Evaluator) matches on the variant and
//! does the work.

use crate::element::{Element, GroupKey, KeyFn, MapFn, PredicateFn, ReduceFn};
use std::fmt::{Debug, Display, Formatter, Result as FormatResult};
use std::sync::Arc;

/// Variant tag of an [`Operation`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Map,
    Filter,
    Reduce,
    ReduceByKey,
}

impl OperationKind {
    /// Whether the operation needs the whole intermediate sequence before it can run.
    #[must_use]
    pub fn is_barrier(self) -> bool {
        matches!(self, OperationKind::Reduce | OperationKind::ReduceByKey)
    }

    /// Whether a bound function of this kind is allowed to fail.
    #[must_use]
    pub fn can_fail(self) -> bool {
        !matches!(self, OperationKind::Filter)
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        f.pad(match self {
            OperationKind::Map => "map",
            OperationKind::Filter => "filter",
            OperationKind::Reduce => "reduce",
            OperationKind::ReduceByKey => "reduce_by_key",
        })
    }
}

/// One unit of work over a sequence of elements.
pub enum Operation<T, K> {
    /// Applied once per element, in order.
    Map(MapFn<T>),
    /// Applied once per element; `false` drops it.
    Filter(PredicateFn<T>),
    /// Applied once to the entire current sequence.
    Reduce(ReduceFn<T>),
    /// Elements are bucketed by `key_fn`, then `reducer` runs once per bucket.
    ReduceByKey {
        key_fn: KeyFn<T, K>,
        reducer: ReduceFn<T>,
    },
}

impl<T: Element, K: GroupKey> Operation<T, K> {
    pub fn map<F>(f: F) -> Self
    where
        F: 'static + Send + Sync + Fn(&T) -> anyhow::Result<T>,
    {
        Operation::Map(Arc::new(f))
    }

    pub fn filter<P>(pred: P) -> Self
    where
        P: 'static + Send + Sync + Fn(&T) -> bool,
    {
        Operation::Filter(Arc::new(pred))
    }

    pub fn reduce<R>(reducer: R) -> Self
    where
        R: 'static + Send + Sync + Fn(&[T]) -> anyhow::Result<Vec<T>>,
    {
        Operation::Reduce(Arc::new(reducer))
    }

    /// Bind a group reducer together with the key function that partitions its input.
    pub fn reduce_by_key<R>(key_fn: KeyFn<T, K>, reducer: R) -> Self
    where
        R: 'static + Send + Sync + Fn(&[T]) -> anyhow::Result<Vec<T>>,
    {
        Operation::ReduceByKey {
            key_fn,
            reducer: Arc::new(reducer),
        }
    }
}

impl<T, K> Operation<T, K> {
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Map(_) => OperationKind::Map,
            Operation::Filter(_) => OperationKind::Filter,
            Operation::Reduce(_) => OperationKind::Reduce,
            Operation::ReduceByKey { .. } => OperationKind::ReduceByKey,
        }
    }
}

// Payloads are `Arc`s, so cloning never requires `T: Clone` or `K: Clone`.
impl<T, K> Clone for Operation<T, K> {
    fn clone(&self) -> Self {
        match self {
            Operation::Map(f) => Operation::Map(Arc::clone(f)),
            Operation::Filter(p) => Operation::Filter(Arc::clone(p)),
            Operation::Reduce(r) => Operation::Reduce(Arc::clone(r)),
            Operation::ReduceByKey { key_fn, reducer } => Operation::ReduceByKey {
                key_fn: Arc::clone(key_fn),
                reducer: Arc::clone(reducer),
            },
        }
    }
}

impl<T, K> Debug for Operation<T, K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f, "Operation::{:?}", self.kind())
    }
}
