//! # Ironspark
//!
//! **Lazy, keyed datasets** for Rust in the spirit of Spark RDDs. A dataset pairs a
//! source sequence with an ordered chain of operations and a key function; nothing runs
//! until you ask for the result.
//!
//! ## Key Features
//!
//! - **Four operations** - map, filter, reduce and reduce-by-key, as a closed enum
//! - **Immutable chains** - every transformation returns a new dataset; earlier datasets
//!   keep their own replayable chain
//! - **Deterministic evaluation** - sequential, in chain order, abort on first failure
//! - **Typed errors** - an [`EvalError`] names the failing step and element or group
//! - **Inspection** - [`explain`](KeyedDataset::explain) a chain, or collect per-step
//!   metrics while evaluating (feature `metrics`)
//! - **Fan-out** - broadcast results to connected workers as JSON lines (feature `driver`)
//!
//! ## Quick Start
//!
//! ```
//! use ironspark::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let data = from_vec(vec![1i64, 2, 3, 4, 5, 6], |x: &i64| Ok(*x));
//!
//! let result = data
//!     .map(|x| Ok(x * 2))                              // [2, 4, 6, 8, 10, 12]
//!     .filter(|x| *x > 4)                              // [6, 8, 10, 12]
//!     .reduce_by_key(|group| Ok(vec![group.len() as i64])) // [1, 1, 1, 1]
//!     .reduce(|xs| Ok(vec![xs.iter().sum()]));         // [4]
//!
//! assert_eq!(result.collect()?, vec![4]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Dataset
//!
//! A [`KeyedDataset<T, K>`] holds a shared, read-only source of `T`, an
//! [`OperationChain`], and a key function `&T -> Result<K>`. Datasets are:
//! - **Immutable** - `map`, `filter`, `reduce` and `reduce_by_key` borrow `self` and
//!   return a new dataset
//! - **Lazy** - work happens only in [`evaluate`](KeyedDataset::evaluate) and the other
//!   terminals
//! - **Not memoized** - every evaluation replays the chain from the source
//!
//! ### Operations
//!
//! | Operation | Runs | Can fail |
//! |---|---|---|
//! | `map` | once per element, in order | yes |
//! | `filter` | once per element, in order | no |
//! | `reduce` | once on the whole sequence | yes |
//! | `reduce_by_key` | once per key group | yes (reducer or key) |
//!
//! ### Heterogeneous data
//!
//! When a dataset must mix types, use [`Value`] as the element (and often key) type
//! and inspect variants inside your functions with [`Value::try_int`] and friends.
//!
//! ## Feature Flags
//!
//! - `metrics` - [`KeyedDataset::evaluate_with_metrics`] and the [`metrics`] module
//! - `driver` - the [`driver`] module (TCP fan-out of JSON values)
//!
//! ## Module Overview
//!
//! - [`dataset`] - `KeyedDataset` and its transformations and terminals
//! - [`operation`] - the `Operation` enum
//! - [`chain`] - copy-on-append `OperationChain`
//! - [`evaluator`] - the sequential execution engine
//! - [`error`] - evaluation failures
//! - [`explain`] - chain descriptions
//! - [`value`] - dynamically-typed element
//! - [`testing`] - assertions and fixtures for pipeline tests

pub mod chain;
pub mod dataset;
pub mod element;
pub mod error;
pub mod evaluator;
pub mod explain;
pub mod operation;
pub mod testing;
pub mod value;

#[cfg(feature = "driver")]
pub mod driver;
#[cfg(feature = "metrics")]
pub mod metrics;

// General re-exports
pub use chain::OperationChain;
pub use dataset::{KeyedDataset, from_vec};
pub use element::{Element, GroupKey, KeyFn, MapFn, PredicateFn, ReduceFn};
pub use error::{EvalError, EvalResult};
pub use evaluator::{Evaluator, StepReport};
pub use explain::{ChainExplanation, ExplainStep};
pub use operation::{Operation, OperationKind};
pub use value::Value;

// Gated re-exports
#[cfg(feature = "driver")]
pub use driver::{Driver, DriverConfig, DriverError};
#[cfg(feature = "metrics")]
pub use metrics::{EvalMetrics, StepMetric};
