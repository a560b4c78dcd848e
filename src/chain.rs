//! Copy-on-append operation log.
//!
//! An [`OperationChain`] is never edited in place. [`with_appended`](OperationChain::with_appended)
//! copies the existing operations into a fresh allocation and pushes the new one, so
//! every dataset built along the way keeps its own replayable chain. Operations are
//! `Arc`-backed, so the copy is a handful of refcount bumps; chains are short pipelines,
//! not logs.
//!
//! There is deliberately no removal, reordering or fusion: operations execute in
//! exactly the order they were appended.

use crate::operation::{Operation, OperationKind};
use std::fmt::{Debug, Formatter, Result as FormatResult};
use std::sync::Arc;

/// Ordered, immutable sequence of [`Operation`]s.
pub struct OperationChain<T, K> {
    ops: Arc<[Operation<T, K>]>,
}

impl<T, K> OperationChain<T, K> {
    /// An empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ops: Arc::from(Vec::new()),
        }
    }

    /// Return a new chain holding every operation of `self` followed by `op`.
    ///
    /// `self` is left untouched.
    #[must_use]
    pub fn with_appended(&self, op: Operation<T, K>) -> Self {
        let mut ops = Vec::with_capacity(self.ops.len() + 1);
        ops.extend(self.ops.iter().cloned());
        ops.push(op);
        Self { ops: ops.into() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Operations in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, Operation<T, K>> {
        self.ops.iter()
    }

    /// Variant tags in execution order.
    #[must_use]
    pub fn kinds(&self) -> Vec<OperationKind> {
        self.ops.iter().map(Operation::kind).collect()
    }

    /// Whether two handles point at the same underlying allocation.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ops, &other.ops)
    }
}

impl<T, K> Default for OperationChain<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K> Clone for OperationChain<T, K> {
    fn clone(&self) -> Self {
        Self {
            ops: Arc::clone(&self.ops),
        }
    }
}

impl<T, K> Debug for OperationChain<T, K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        f.debug_list().entries(self.kinds()).finish()
    }
}

impl<'a, T, K> IntoIterator for &'a OperationChain<T, K> {
    type Item = &'a Operation<T, K>;
    type IntoIter = std::slice::Iter<'a, Operation<T, K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
