//! Per-evaluation statistics.
//!
//! [`KeyedDataset::evaluate_with_metrics`](crate::KeyedDataset::evaluate_with_metrics)
//! records one [`StepMetric`] per operation: how many elements went in, how many came
//! out, and how long the step took. Metrics belong to a single evaluation; evaluating
//! again produces a fresh set.
//!
//! # Example
//!
//! ```
//! use ironspark::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let ds = from_vec(vec![1i64, 2, 3, 4], |x: &i64| Ok(x % 2))
//!     .filter(|x| *x > 1)
//!     .reduce_by_key(|xs| Ok(vec![xs.iter().sum()]));
//!
//! let (out, metrics) = ds.evaluate_with_metrics()?;
//! assert_eq!(out.len(), 2);
//! assert_eq!(metrics.steps[0].input_len, 4);
//! assert_eq!(metrics.steps[0].output_len, 3);
//! println!("{}", metrics.to_json());
//! # Ok(())
//! # }
//! ```

use crate::evaluator::StepReport;
use crate::operation::OperationKind;
use serde_json::{Value, json};
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::time::Duration;

/// Statistics for one evaluated step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepMetric {
    /// Zero-based position in the chain.
    pub step: usize,
    pub kind: OperationKind,
    pub input_len: usize,
    pub output_len: usize,
    pub elapsed: Duration,
}

impl From<StepReport> for StepMetric {
    fn from(r: StepReport) -> Self {
        Self {
            step: r.step,
            kind: r.kind,
            input_len: r.input_len,
            output_len: r.output_len,
            elapsed: r.elapsed,
        }
    }
}

/// Everything recorded during one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvalMetrics {
    pub source_len: usize,
    pub steps: Vec<StepMetric>,
    pub elapsed: Duration,
}

impl EvalMetrics {
    pub(crate) fn new(source_len: usize) -> Self {
        Self {
            source_len,
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, report: StepReport) {
        self.steps.push(report.into());
    }

    /// Number of elements the last step produced (the source length for an empty chain).
    #[must_use]
    pub fn output_len(&self) -> usize {
        self.steps.last().map_or(self.source_len, |s| s.output_len)
    }

    /// Number of recorded steps of the given kind.
    #[must_use]
    pub fn steps_of(&self, kind: OperationKind) -> usize {
        self.steps.iter().filter(|s| s.kind == kind).count()
    }

    /// All metrics as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let steps: Vec<Value> = self
            .steps
            .iter()
            .map(|s| {
                json!({
                    "step": s.step,
                    "kind": s.kind.to_string(),
                    "input_len": s.input_len,
                    "output_len": s.output_len,
                    "elapsed_us": u64::try_from(s.elapsed.as_micros()).unwrap_or(u64::MAX),
                })
            })
            .collect();
        json!({
            "source_len": self.source_len,
            "output_len": self.output_len(),
            "elapsed_us": u64::try_from(self.elapsed.as_micros()).unwrap_or(u64::MAX),
            "steps": steps,
        })
    }
}

impl Display for EvalMetrics {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        writeln!(f, "========== Evaluation Metrics ==========")?;
        writeln!(
            f,
            "Execution Time: {:.3}s ({} ms)",
            self.elapsed.as_secs_f64(),
            self.elapsed.as_millis()
        )?;
        writeln!(f, "Source: {} elements", self.source_len)?;
        writeln!(f, "----------------------------------------")?;
        for s in &self.steps {
            writeln!(
                f,
                "#{} {}: {} -> {} ({} µs)",
                s.step,
                s.kind,
                s.input_len,
                s.output_len,
                s.elapsed.as_micros()
            )?;
        }
        write!(f, "========================================")
    }
}
