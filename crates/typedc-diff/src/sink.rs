//! Seams between the checker and its collaborators.

use typedc_types::Issue;

/// Receives what the checker finds, in traversal order.
pub trait IssueSink {
    /// Accept one reported (non-suppressed) issue.
    fn accept(&mut self, issue: &Issue);

    /// Accept one verbose trace line: a non-breaking observation, a
    /// suppressed issue, or a progress note.
    fn trace(&mut self, line: &str);
}

/// Decides whether a detected issue is allow-listed.
pub trait Suppressor {
    fn is_suppressed(&self, issue: &Issue) -> bool;
}

/// A suppressor that lets every issue through.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSuppression;

impl Suppressor for NoSuppression {
    fn is_suppressed(&self, _issue: &Issue) -> bool {
        false
    }
}

/// In-memory sink, mostly useful for tests and library callers.
#[derive(Clone, Debug, Default)]
pub struct CollectingSink {
    pub issues: Vec<Issue>,
    pub traces: Vec<String>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reported issues that break consumers.
    pub fn breaking(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_breaking())
    }
}

impl IssueSink for CollectingSink {
    fn accept(&mut self, issue: &Issue) {
        self.issues.push(issue.clone());
    }

    fn trace(&mut self, line: &str) {
        self.traces.push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typedc_types::IssueCategory;

    #[test]
    fn collecting_sink_separates_breaking() {
        let mut sink = CollectingSink::new();
        sink.accept(&Issue::new("a", IssueCategory::Removed, "removed"));
        sink.accept(&Issue::new("b", IssueCategory::Added, "added"));
        sink.trace("note");

        assert_eq!(sink.issues.len(), 2);
        assert_eq!(sink.breaking().count(), 1);
        assert_eq!(sink.traces, vec!["note"]);
    }

    #[test]
    fn no_suppression_never_suppresses() {
        let issue = Issue::new("a", IssueCategory::Removed, "removed");
        assert!(!NoSuppression.is_suppressed(&issue));
    }
}
