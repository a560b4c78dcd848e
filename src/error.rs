//! Evaluation failures.
//!
//! Any failure from a map function, a reducer, or a key function aborts the whole
//! evaluation. The caller receives exactly one [`EvalError`] saying which step failed and
//! on which element or group; the user's own error is kept as the `source` so it can be
//! inspected with [`anyhow::Error::downcast_ref`].

use crate::operation::OperationKind;
use thiserror::Error;

/// Convenience alias for results produced by the evaluator.
pub type EvalResult<T> = Result<T, EvalError>;

/// Why an evaluation stopped.
///
/// `step` is the zero-based position of the failing operation in its chain.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A per-element function (currently only `map`) failed.
    #[error("step {step} ({kind}) failed on element #{index}: {source}")]
    Element {
        step: usize,
        kind: OperationKind,
        index: usize,
        #[source]
        source: anyhow::Error,
    },

    /// The key function of a `reduce_by_key` step failed. No group reducer has run.
    #[error("step {step} (reduce_by_key) failed computing the key of element #{index}: {source}")]
    Key {
        step: usize,
        index: usize,
        #[source]
        source: anyhow::Error,
    },

    /// A whole-sequence `reduce` failed.
    #[error("step {step} (reduce) failed: {source}")]
    Reduce {
        step: usize,
        #[source]
        source: anyhow::Error,
    },

    /// The reducer of a `reduce_by_key` step failed on one group.
    #[error("step {step} (reduce_by_key) failed on group #{group}: {source}")]
    Group {
        step: usize,
        group: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl EvalError {
    /// Zero-based index of the failing operation.
    #[must_use]
    pub fn step(&self) -> usize {
        match self {
            EvalError::Element { step, .. }
            | EvalError::Key { step, .. }
            | EvalError::Reduce { step, .. }
            | EvalError::Group { step, .. } => *step,
        }
    }

    /// Kind of the failing operation.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            EvalError::Element { kind, .. } => *kind,
            EvalError::Reduce { .. } => OperationKind::Reduce,
            EvalError::Key { .. } | EvalError::Group { .. } => OperationKind::ReduceByKey,
        }
    }

    /// The error returned by the user-supplied function.
    #[must_use]
    pub fn cause(&self) -> &anyhow::Error {
        match self {
            EvalError::Element { source, .. }
            | EvalError::Key { source, .. }
            | EvalError::Reduce { source, .. }
            | EvalError::Group { source, .. } => source,
        }
    }
}
