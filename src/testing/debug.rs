//! Debug utilities for inspecting datasets during test execution.
//!
//! Inspection is just another operation in the chain, so it runs on every evaluation
//! and shows exactly what that evaluation saw. Output goes through `tracing` at
//! `DEBUG` level under the `ironspark::inspect` target.

use crate::dataset::KeyedDataset;
use crate::element::{Element, GroupKey};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

impl<T: Element + Debug, K: GroupKey> KeyedDataset<T, K> {
    /// Log every element at this point of the chain, passing it through unchanged.
    #[must_use]
    pub fn debug_inspect(&self, label: impl Into<String>) -> Self {
        let label: String = label.into();
        let label: Arc<str> = Arc::from(label);
        self.map(move |item| {
            debug!(target: "ironspark::inspect", label = %label, item = ?item);
            Ok(item.clone())
        })
    }

    /// Log the number of elements at this point of the chain.
    ///
    /// This is a whole-sequence step, so it appears as a `reduce` in
    /// [`explain`](KeyedDataset::explain) output.
    #[must_use]
    pub fn debug_count(&self, label: impl Into<String>) -> Self {
        let label: String = label.into();
        let label: Arc<str> = Arc::from(label);
        self.reduce(move |items| {
            debug!(target: "ironspark::inspect", label = %label, count = items.len());
            Ok(items.to_vec())
        })
    }
}
