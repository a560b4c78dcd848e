//! Testing utilities for Ironspark datasets.
//!
//! This module gives end-users (and this crate's own test suite) a small toolkit for
//! writing idiomatic tests against lazy datasets:
//!
//! - **Assertions**: compare evaluated output with expected results, in order or as a
//!   multiset (for `reduce_by_key`, whose group order is not part of the contract)
//! - **Fixtures**: common key functions, reducers and an [`InvocationCounter`] for
//!   observing how often user functions run
//! - **Debug utilities**: log elements as they flow through a chain
//!
//! # Quick Start
//!
//! ```
//! use ironspark::*;
//! use ironspark::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let grouped = from_vec(numbers_1_to_6(), parity_key)
//!     .reduce_by_key(count_reducer)
//!     .collect()?;
//!
//! assert_collections_unordered_equal(&grouped, &[3, 3]);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod debug;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
