//! CI gate for typedc.
//!
//! Wraps the compatibility engine with the pieces a build pipeline needs:
//! an allow-list of known breaking changes, a run configuration, and a
//! single pass/fail verdict.
//!
//! # Quick Start
//!
//! ```rust
//! use typedc_diff::CollectingSink;
//! use typedc_gate::{CompatibilityGate, IgnoreRuleSet};
//! use typedc_types::{DeclarationKind, DeclarationNode};
//!
//! let old = DeclarationNode::new("lib", DeclarationKind::Project)
//!     .with_child(DeclarationNode::new("Widget", DeclarationKind::Class));
//! let new = DeclarationNode::new("lib", DeclarationKind::Project);
//!
//! let gate = CompatibilityGate::new(IgnoreRuleSet::default());
//! let mut sink = CollectingSink::new();
//! let outcome = gate.evaluate(&old, &new, &mut sink);
//! assert!(!outcome.is_pass());
//! assert_eq!(outcome.verdict.to_string(), "There are 1 compatibility issues");
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod ignore;
pub mod verdict;

pub use config::RunConfig;
pub use error::{GateError, GateResult};
pub use gate::{CompatibilityGate, GateOutcome};
pub use ignore::{IgnoreRule, IgnoreRuleSet, PathPattern};
pub use verdict::Verdict;

#[cfg(test)]
mod tests {
    use super::*;
    use typedc_diff::CollectingSink;
    use typedc_types::{
        DeclarationKind, DeclarationNode, Flags, IssueCategory, TypeDescriptor,
    };

    fn project(children: impl IntoIterator<Item = DeclarationNode>) -> DeclarationNode {
        DeclarationNode::new("my-lib", DeclarationKind::Project).with_children(children)
    }

    fn widget(members: impl IntoIterator<Item = DeclarationNode>) -> DeclarationNode {
        DeclarationNode::new("Widget", DeclarationKind::Class).with_children(members)
    }

    fn render() -> DeclarationNode {
        DeclarationNode::new("render", DeclarationKind::Method).with_child(
            DeclarationNode::new("render", DeclarationKind::CallSignature)
                .with_type(TypeDescriptor::intrinsic("void")),
        )
    }

    fn size(optional: bool) -> DeclarationNode {
        let flags = if optional { Flags::optional() } else { Flags::default() };
        DeclarationNode::new("size", DeclarationKind::Property)
            .with_flags(flags)
            .with_type(TypeDescriptor::intrinsic("number"))
    }

    fn evaluate(
        gate: &CompatibilityGate,
        old: &DeclarationNode,
        new: &DeclarationNode,
    ) -> (GateOutcome, CollectingSink) {
        let mut sink = CollectingSink::new();
        let outcome = gate.evaluate(old, new, &mut sink);
        (outcome, sink)
    }

    // -----------------------------------------------------------------------
    // End-to-end scenarios
    // -----------------------------------------------------------------------

    #[test]
    fn removed_method_fails_the_gate() {
        let gate = CompatibilityGate::new(IgnoreRuleSet::default()).exclude_root_node(true);
        let (outcome, sink) = evaluate(&gate, &project([widget([render()])]), &project([widget([])]));

        assert_eq!(sink.issues.len(), 1);
        assert_eq!(sink.issues[0].path, "Widget.render");
        assert_eq!(sink.issues[0].category, IssueCategory::Removed);
        assert_eq!(outcome.verdict, Verdict::Fail { breaking: 1 });
    }

    #[test]
    fn optional_to_required_fails_the_gate() {
        let gate = CompatibilityGate::new(IgnoreRuleSet::default()).exclude_root_node(true);
        let (outcome, sink) = evaluate(
            &gate,
            &project([widget([size(true)])]),
            &project([widget([size(false)])]),
        );

        assert_eq!(sink.issues.len(), 1);
        assert_eq!(sink.issues[0].path, "Widget.size");
        assert_eq!(sink.issues[0].category, IssueCategory::RequiredAdded);
        assert!(!outcome.is_pass());
    }

    #[test]
    fn ignore_rule_suppresses_known_break() {
        let rules = IgnoreRuleSet::new([IgnoreRule::for_path("Widget.size")]).unwrap();
        let gate = CompatibilityGate::new(rules).exclude_root_node(true);
        let (outcome, sink) = evaluate(
            &gate,
            &project([widget([size(true)])]),
            &project([widget([size(false)])]),
        );

        assert!(sink.issues.is_empty());
        assert!(outcome.is_pass());
        assert_eq!(outcome.summary.suppressed, 1);
        assert_eq!(
            sink.traces.iter().filter(|t| t.starts_with("suppressed:")).count(),
            1
        );
        assert!(outcome.unused_rules.is_empty());
    }

    #[test]
    fn added_property_is_informational() {
        let color = DeclarationNode::new("color", DeclarationKind::Property)
            .with_type(TypeDescriptor::intrinsic("string"));
        let gate = CompatibilityGate::new(IgnoreRuleSet::default()).exclude_root_node(true);
        let (outcome, sink) = evaluate(&gate, &project([widget([])]), &project([widget([color])]));

        assert!(outcome.is_pass());
        assert_eq!(outcome.summary.breaking, 0);
        assert_eq!(outcome.summary.added, 1);
        assert_eq!(sink.issues.len(), 1);
        assert_eq!(sink.issues[0].path, "Widget.color");
        assert_eq!(sink.issues[0].category, IssueCategory::Added);
    }

    // -----------------------------------------------------------------------
    // Gate behavior
    // -----------------------------------------------------------------------

    #[test]
    fn root_name_is_kept_by_default() {
        let gate = CompatibilityGate::new(IgnoreRuleSet::default());
        let (_, sink) = evaluate(&gate, &project([widget([render()])]), &project([widget([])]));
        assert_eq!(sink.issues[0].path, "my-lib.Widget.render");
    }

    #[test]
    fn renamed_root_matches_when_excluded() {
        let old = project([widget([render()])]);
        let mut new = project([widget([render()])]);
        new.name = "my-lib-next".into();

        let strict = CompatibilityGate::new(IgnoreRuleSet::default());
        let (_, sink) = evaluate(&strict, &old, &new);
        assert!(sink.breaking().count() > 0);

        let lenient = strict.exclude_root_node(true);
        let (outcome, sink) = evaluate(&lenient, &old, &new);
        assert!(outcome.is_pass());
        assert!(sink.issues.is_empty());
    }

    #[test]
    fn unused_rules_are_reported_and_traced() {
        let rules = IgnoreRuleSet::new([
            IgnoreRule::for_path("Widget.render"),
            IgnoreRule::for_path("Gadget.**"),
        ]).unwrap();
        let gate = CompatibilityGate::new(rules).exclude_root_node(true);
        let (outcome, sink) = evaluate(&gate, &project([widget([render()])]), &project([widget([])]));

        assert!(outcome.is_pass());
        assert_eq!(outcome.unused_rules, vec![IgnoreRule::for_path("Gadget.**")]);
        assert!(sink.traces.iter().any(|t| t == "unused ignore rule: Gadget.**"));
    }

    #[test]
    fn category_restricted_rule_does_not_cover_other_issues() {
        let rules = IgnoreRuleSet::new([
            IgnoreRule::for_path("Widget.**").with_category(IssueCategory::TypeNarrowed)
        ]).unwrap();
        let gate = CompatibilityGate::new(rules).exclude_root_node(true);
        let (outcome, _) = evaluate(&gate, &project([widget([render()])]), &project([widget([])]));
        assert_eq!(outcome.verdict, Verdict::Fail { breaking: 1 });
        assert_eq!(outcome.unused_rules.len(), 1);
    }
}
