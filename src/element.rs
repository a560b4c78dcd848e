//! Element and key bounds, plus the shapes of user-supplied functions.
//!
//! Every function a [`KeyedDataset`](crate::KeyedDataset) stores is kept behind an
//! `Arc<dyn Fn .. + Send + Sync>` so datasets are cheap to clone, safe to share across
//! threads, and never need to know the concrete closure type.

use std::hash::Hash;
use std::sync::Arc;

/// Bound for anything that can flow through a chain.
pub trait Element: 'static + Send + Sync + Clone {}
impl<T> Element for T where T: 'static + Send + Sync + Clone {}

/// Bound for grouping keys produced by a [`KeyFn`].
pub trait GroupKey: Element + Eq + Hash {}
impl<K> GroupKey for K where K: Element + Eq + Hash {}

/// One-to-one transform. May fail.
pub type MapFn<T> = Arc<dyn Fn(&T) -> anyhow::Result<T> + Send + Sync>;

/// Keep/drop predicate. Cannot fail.
pub type PredicateFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Whole-sequence (or whole-group) reducer. May return any number of elements.
pub type ReduceFn<T> = Arc<dyn Fn(&[T]) -> anyhow::Result<Vec<T>> + Send + Sync>;

/// Key extraction. Must be pure: equal elements yield equal keys on every call.
pub type KeyFn<T, K> = Arc<dyn Fn(&T) -> anyhow::Result<K> + Send + Sync>;
