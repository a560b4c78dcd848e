//! Human-readable description of what a dataset will do when evaluated.
//!
//! Explaining a dataset never runs any user function; it only walks the chain.

use crate::operation::OperationKind;
use std::fmt::{Display, Formatter, Result as FormatResult};

/// A single step of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainStep {
    /// One-based position in the chain.
    pub step: usize,
    pub kind: OperationKind,
    pub description: String,
    /// Whether the step needs the whole intermediate sequence.
    pub is_barrier: bool,
    /// Whether the bound function may abort evaluation.
    pub can_fail: bool,
}

/// Step-by-step description of a dataset's chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainExplanation {
    pub source_len: usize,
    pub steps: Vec<ExplainStep>,
    pub barriers: usize,
}

impl ChainExplanation {
    pub(crate) fn from_kinds(source_len: usize, kinds: &[OperationKind]) -> Self {
        let steps: Vec<ExplainStep> = kinds
            .iter()
            .enumerate()
            .map(|(idx, &kind)| ExplainStep {
                step: idx + 1,
                kind,
                description: describe(kind),
                is_barrier: kind.is_barrier(),
                can_fail: kind.can_fail(),
            })
            .collect();
        let barriers = steps.iter().filter(|s| s.is_barrier).count();
        Self {
            source_len,
            steps,
            barriers,
        }
    }

    /// Number of steps whose function may abort evaluation.
    #[must_use]
    pub fn fallible_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.can_fail).count()
    }

    /// True when evaluation would hand back the source untouched.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }
}

fn describe(kind: OperationKind) -> String {
    match kind {
        OperationKind::Map => "Transform each element".to_string(),
        OperationKind::Filter => "Drop elements failing the predicate, keep order".to_string(),
        OperationKind::Reduce => "Reduce the whole sequence (BARRIER)".to_string(),
        OperationKind::ReduceByKey => {
            "Group by key, reduce each group, concatenate (BARRIER)".to_string()
        }
    }
}

impl Display for ChainExplanation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        writeln!(
            f,
            "╔═══════════════════════════════════════════════════════════════╗"
        )?;
        writeln!(
            f,
            "║                   CHAIN EXPLANATION                           ║"
        )?;
        writeln!(
            f,
            "╚═══════════════════════════════════════════════════════════════╝"
        )?;
        writeln!(f, "│ Source Size:   {:>10}", self.source_len)?;
        writeln!(f, "│ Operations:    {:>10}", self.steps.len())?;
        writeln!(f, "│ Barriers:      {:>10}", self.barriers)?;
        writeln!(f, "│ Fallible:      {:>10}", self.fallible_steps())?;
        writeln!(
            f,
            "├─ STEPS ──────────────────────────────────────────────────────┤"
        )?;
        if self.steps.is_empty() {
            writeln!(f, "│ (empty chain: source is returned unchanged)")?;
        }
        for s in &self.steps {
            let marker = if s.is_barrier { "⊗" } else { "→" };
            let fallible = if s.can_fail { " [may fail]" } else { "" };
            writeln!(
                f,
                "│ {marker} {:>2}. {:<14} {}{fallible}",
                s.step, s.kind, s.description
            )?;
        }
        write!(
            f,
            "└──────────────────────────────────────────────────────────────┘"
        )
    }
}
