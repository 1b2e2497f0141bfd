use std::time::{Duration, Instant};

use tracing::warn;
use typedc_diff::{check_trees, CheckSummary, IssueSink};
use typedc_types::DeclarationNode;

use crate::ignore::{IgnoreRule, IgnoreRuleSet};
use crate::verdict::Verdict;

// ---------------------------------------------------------------------------
// GateOutcome
// ---------------------------------------------------------------------------

/// The result of running two declaration trees through the gate.
#[derive(Clone, Debug)]
pub struct GateOutcome {
    pub summary: CheckSummary,
    pub verdict: Verdict,
    /// Ignore rules that matched no detected issue.
    pub unused_rules: Vec<IgnoreRule>,
    pub elapsed: Duration,
}

impl GateOutcome {
    pub fn is_pass(&self) -> bool {
        self.verdict.is_pass()
    }
}

// ---------------------------------------------------------------------------
// CompatibilityGate
// ---------------------------------------------------------------------------

/// Compares a previous and a next version of an API under a set of ignore
/// rules and decides whether the change set may ship.
#[derive(Clone, Debug, Default)]
pub struct CompatibilityGate {
    rules: IgnoreRuleSet,
    exclude_root_node: bool,
}

impl CompatibilityGate {
    pub fn new(rules: IgnoreRuleSet) -> Self {
        Self {
            rules,
            exclude_root_node: false,
        }
    }

    /// Leave the root's name out of every path, so packages renamed between
    /// versions still line up.
    pub fn exclude_root_node(mut self, exclude: bool) -> Self {
        self.exclude_root_node = exclude;
        self
    }

    pub fn rules(&self) -> &IgnoreRuleSet {
        &self.rules
    }

    /// Compare `old` against `new`, streaming issues to `sink`.
    ///
    /// Comparison itself cannot fail: a malformed input is rejected when it
    /// is loaded, before it reaches the gate.
    pub fn evaluate(
        &self,
        old: &DeclarationNode,
        new: &DeclarationNode,
        sink: &mut dyn IssueSink,
    ) -> GateOutcome {
        let start = Instant::now();
        let root_name = self.exclude_root_node.then_some("");

        let summary = check_trees(old, new, root_name, &self.rules, sink);

        let unused_rules: Vec<IgnoreRule> = self
            .rules
            .unused_rules(&summary.suppressed_issues)
            .into_iter()
            .cloned()
            .collect();
        for rule in &unused_rules {
            warn!(path = %rule.path, "ignore rule matched no issue");
            sink.trace(&format!("unused ignore rule: {}", rule.path));
        }

        GateOutcome {
            verdict: Verdict::from_summary(&summary),
            summary,
            unused_rules,
            elapsed: start.elapsed(),
        }
    }
}
