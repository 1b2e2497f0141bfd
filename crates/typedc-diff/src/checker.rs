//! Compatibility checker: match flattened nodes across two versions and
//! classify every difference.
//!
//! The old tree drives the walk. Each old node is looked up among the
//! children of its parent's counterpart, by name and sibling ordinal; matched pairs are compared attribute by attribute and their
//! children are visited next, removed nodes are reported once (their
//! descendants are not), and whatever is left unvisited in the new tree under
//! a matched parent is reported as added.

use std::collections::HashMap;

use tracing::{debug, info};
use typedc_types::{DeclarationKind, DeclarationNode, Issue, IssueCategory, Visibility};

use crate::compat::{classify_change, variance_of, TypeChange, Variance};
use crate::flatten::{flatten, FlatNode, FlatTree};
use crate::sink::{IssueSink, Suppressor};

/// Outcome counts of one comparison run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckSummary {
    /// Declarations in the previous version, excluding the root.
    pub old_nodes: usize,
    /// Declarations in the next version, excluding the root.
    pub new_nodes: usize,
    /// Reported issues that break consumers.
    pub breaking: usize,
    /// Reported informational `Added` entries.
    pub added: usize,
    /// Compatible changes, traced but not reported.
    pub non_breaking: usize,
    /// Issues an ignore rule matched.
    pub suppressed: usize,
    /// The suppressed issues themselves, in detection order.
    pub suppressed_issues: Vec<Issue>,
}

impl CheckSummary {
    /// `true` when no unsuppressed breaking issue was found.
    pub fn is_compatible(&self) -> bool {
        self.breaking == 0
    }
}

/// Per-node visit state in the new tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Visit {
    Unvisited,
    /// Paired with an old node; children are compared.
    Matched,
    /// Paired with a node outside the public surface; children are ignored.
    Skipped,
}

/// Flatten both trees and compare them.
///
/// `root_name` is applied to both roots; `Some("")` keeps root names out of
/// every path so that a renamed package still matches.
pub fn check_trees(
    old: &DeclarationNode,
    new: &DeclarationNode,
    root_name: Option<&str>,
    suppressor: &dyn Suppressor,
    sink: &mut dyn IssueSink,
) -> CheckSummary {
    let old_flat = flatten(old, root_name);
    let new_flat = flatten(new, root_name);
    check_compatibility(&old_flat, &new_flat, suppressor, sink)
}

/// Compare two flattened trees, emitting issues to `sink`.
///
/// Issues are emitted in old-tree pre-order, followed by additions in
/// new-tree pre-order. The run never fails; the returned summary tells the
/// caller whether the change set is compatible.
pub fn check_compatibility(
    old: &FlatTree<'_>,
    new: &FlatTree<'_>,
    suppressor: &dyn Suppressor,
    sink: &mut dyn IssueSink,
) -> CheckSummary {
    let mut run = Run {
        suppressor,
        sink,
        summary: CheckSummary {
            old_nodes: old.len().saturating_sub(1),
            new_nodes: new.len().saturating_sub(1),
            ..Default::default()
        },
    };

    run.trace(format!(
        "loaded {} declarations from the previous version and {} from the next",
        run.summary.old_nodes, run.summary.new_nodes
    ));

    if old.is_empty() || new.is_empty() {
        return run.summary;
    }

    let new_by_parent = new.index_by_parent();
    let mut visits = vec![Visit::Unvisited; new.len()];
    visits[0] = Visit::Matched;

    walk_old(old, new, &new_by_parent, &mut visits, &mut run);
    report_additions(new, &visits, &mut run);

    info!(
        breaking = run.summary.breaking,
        added = run.summary.added,
        non_breaking = run.summary.non_breaking,
        suppressed = run.summary.suppressed,
        "compatibility check complete"
    );
    run.summary
}

struct Run<'r> {
    suppressor: &'r dyn Suppressor,
    sink: &'r mut dyn IssueSink,
    summary: CheckSummary,
}

impl Run<'_> {
    fn emit(&mut self, issue: Issue) {
        if self.suppressor.is_suppressed(&issue) {
            debug!(path = %issue.path, category = %issue.category, "issue suppressed");
            self.sink.trace(&format!("suppressed: {issue}"));
            self.summary.suppressed += 1;
            self.summary.suppressed_issues.push(issue);
            return;
        }

        debug!(path = %issue.path, category = %issue.category, "issue");
        if issue.is_breaking() {
            self.summary.breaking += 1;
        } else {
            self.summary.added += 1;
        }
        self.sink.accept(&issue);
    }

    /// Record a compatible change.
    fn compatible(&mut self, path: &str, what: String) {
        debug!(path, "{what}");
        self.summary.non_breaking += 1;
        self.sink.trace(&format!("compatible: {path}: {what}"));
    }

    fn trace(&mut self, line: String) {
        debug!("{line}");
        self.sink.trace(&line);
    }
}

fn walk_old(
    old: &FlatTree<'_>,
    new: &FlatTree<'_>,
    new_by_parent: &HashMap<(usize, &str, usize), usize>,
    visits: &mut [Visit],
    run: &mut Run<'_>,
) {
    // Work items are (old child index, matched new parent index).
    let mut stack: Vec<(usize, usize)> = old.children(0).iter().rev().map(|&c| (c, 0)).collect();

    while let Some((old_idx, new_parent)) = stack.pop() {
        let Some(old_node) = old.get(old_idx) else {
            continue;
        };

        let counterpart = new_by_parent
            .get(&(new_parent, old_node.node.name.as_str(), old_node.ordinal))
            .copied();

        if old_node.node.flags.visibility == Visibility::Private {
            match counterpart {
                Some(new_idx) if new.get(new_idx).is_some_and(|n| {
                    n.node.flags.visibility == Visibility::Private
                }) =>
                {
                    visits[new_idx] = Visit::Skipped;
                    run.trace(format!("skipped private declaration {}", old_node.path));
                }
                Some(_) => run.trace(format!("private declaration made visible: {}", old_node.path)),
                None => run.trace(format!("private declaration removed: {}", old_node.path)),
            }
            continue;
        }

        let Some(new_idx) = counterpart else {
            run.emit(removed(old_node));
            continue;
        };
        let Some(new_node) = new.get(new_idx) else {
            continue;
        };

        if old_node.node.kind != new_node.node.kind {
            run.emit(
                Issue::new(
                    &old_node.path,
                    IssueCategory::Removed,
                    format!(
                        "{} replaced by {}",
                        old_node.node.kind, new_node.node.kind
                    ),
                )
                .with_values(
                    Some(old_node.node.kind.to_string()),
                    Some(new_node.node.kind.to_string()),
                )
                .with_kind(old_node.node.kind.clone())
                .with_location(old_node.node.sources.first().cloned()),
            );
            continue;
        }

        visits[new_idx] = Visit::Matched;
        compare_pair(old_node, new_node, run);

        stack.extend(old.children(old_idx).iter().rev().map(|&c| (c, new_idx)));
    }
}

fn report_additions(new: &FlatTree<'_>, visits: &[Visit], run: &mut Run<'_>) {
    for (idx, flat) in new.iter().enumerate() {
        if visits[idx] != Visit::Unvisited {
            continue;
        }
        let Some(parent) = flat.parent else {
            continue;
        };
        if visits[parent] != Visit::Matched {
            continue;
        }

        let node = flat.node;
        if node.flags.visibility == Visibility::Private {
            run.trace(format!("private declaration added: {}", flat.path));
            continue;
        }

        let parent_is_signature = new
            .get(parent)
            .is_some_and(|p| p.node.kind.is_signature());
        let issue = if parent_is_signature && node.is_required_parameter() {
            Issue::new(
                &flat.path,
                IssueCategory::RequiredAdded,
                "required parameter added",
            )
            .with_values(None, Some(describe(node)))
        } else {
            Issue::new(&flat.path, IssueCategory::Added, format!("{} added", node.kind))
                .with_values(None, Some(describe(node)))
        };
        run.emit(
            issue
                .with_kind(node.kind.clone())
                .with_location(node.sources.first().cloned()),
        );
    }
}

fn removed(flat: &FlatNode<'_>) -> Issue {
    Issue::new(
        &flat.path,
        IssueCategory::Removed,
        format!("{} removed", flat.node.kind),
    )
    .with_values(Some(describe(flat.node)), None)
    .with_kind(flat.node.kind.clone())
    .with_location(flat.node.sources.first().cloned())
}

/// Short rendering of a node for issue values: its type when it has one,
/// its kind otherwise.
fn describe(node: &DeclarationNode) -> String {
    match &node.type_descriptor {
        Some(ty) => ty.to_string(),
        None => node.kind.to_string(),
    }
}

fn is_effectively_optional(node: &DeclarationNode) -> bool {
    node.flags.optional
        || (node.kind == DeclarationKind::Parameter && node.default_value.is_some())
}

fn compare_pair(old: &FlatNode<'_>, new: &FlatNode<'_>, run: &mut Run<'_>) {
    let (o, n) = (old.node, new.node);
    let path = old.path.as_str();
    let changed = |category, message: &str, old_value: String, new_value: String| {
        Issue::new(path, category, message)
            .with_values(Some(old_value), Some(new_value))
            .with_kind(o.kind.clone())
            .with_location(o.sources.first().cloned())
    };

    if o.kind.is_unknown() {
        if o.flags != n.flags
            || o.type_descriptor != n.type_descriptor
            || o.default_value != n.default_value
        {
            run.emit(changed(
                IssueCategory::SignatureChanged,
                &format!("declaration of unrecognised kind `{}` changed", o.kind),
                describe(o),
                describe(n),
            ));
        }
        return;
    }

    let (ov, nv) = (o.flags.visibility, n.flags.visibility);
    if ov.is_reduced_to(nv) {
        run.emit(changed(
            IssueCategory::VisibilityReduced,
            "visibility reduced",
            ov.to_string(),
            nv.to_string(),
        ));
    } else if nv.is_reduced_to(ov) {
        run.compatible(path, format!("visibility widened from {ov} to {nv}"));
    }

    match (is_effectively_optional(o), is_effectively_optional(n)) {
        (true, false) => run.emit(changed(
            IssueCategory::RequiredAdded,
            "optional declaration became required",
            "optional".into(),
            "required".into(),
        )),
        (false, true) => run.compatible(path, "required declaration became optional".into()),
        _ => {}
    }

    match (o.flags.readonly, n.flags.readonly) {
        (false, true) => run.emit(changed(
            IssueCategory::SignatureChanged,
            "declaration became readonly",
            "mutable".into(),
            "readonly".into(),
        )),
        (true, false) => run.compatible(path, "readonly modifier dropped".into()),
        _ => {}
    }

    if o.flags.is_static != n.flags.is_static {
        let label = |s: bool| if s { "static" } else { "instance" }.to_string();
        run.emit(changed(
            IssueCategory::SignatureChanged,
            "static modifier changed",
            label(o.flags.is_static),
            label(n.flags.is_static),
        ));
    }

    match (o.flags.is_abstract, n.flags.is_abstract) {
        (false, true) => run.emit(changed(
            IssueCategory::SignatureChanged,
            "declaration became abstract",
            "concrete".into(),
            "abstract".into(),
        )),
        (true, false) => run.compatible(path, "abstract modifier dropped".into()),
        _ => {}
    }

    if o.flags.rest != n.flags.rest {
        let label = |r: bool| if r { "rest" } else { "positional" }.to_string();
        run.emit(changed(
            IssueCategory::SignatureChanged,
            "rest parameter changed",
            label(o.flags.rest),
            label(n.flags.rest),
        ));
    }

    let value_is_api = o.kind == DeclarationKind::EnumMember
        || (o.kind == DeclarationKind::Variable && o.flags.is_const);
    if value_is_api && o.default_value != n.default_value {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "(none)".into());
        run.emit(changed(
            IssueCategory::SignatureChanged,
            "constant value changed",
            show(&o.default_value),
            show(&n.default_value),
        ));
    }

    compare_types(old, new, run, &changed);
}

fn compare_types(
    old: &FlatNode<'_>,
    new: &FlatNode<'_>,
    run: &mut Run<'_>,
    changed: &dyn Fn(IssueCategory, &str, String, String) -> Issue,
) {
    let path = old.path.as_str();
    let (old_ty, new_ty) = match (&old.node.type_descriptor, &new.node.type_descriptor) {
        (None, None) => return,
        (Some(a), Some(b)) if a == b => return,
        (Some(a), Some(b)) => (a, b),
        (a, b) => {
            let show = |t: Option<&typedc_types::TypeDescriptor>| {
                t.map(ToString::to_string).unwrap_or_else(|| "(none)".into())
            };
            run.emit(changed(
                IssueCategory::SignatureChanged,
                "type annotation changed",
                show(a.as_ref()),
                show(b.as_ref()),
            ));
            return;
        }
    };

    let change = classify_change(old_ty, new_ty);
    let (old_value, new_value) = (old_ty.to_string(), new_ty.to_string());
    match (variance_of(old.node), change) {
        (_, TypeChange::Unchanged) => {}
        (Some(Variance::Input), TypeChange::Widened) => {
            run.compatible(path, format!("type widened from {old_value} to {new_value}"));
        }
        (Some(Variance::Output), TypeChange::Narrowed) => {
            run.compatible(path, format!("type narrowed from {old_value} to {new_value}"));
        }
        (Some(Variance::Input), TypeChange::Narrowed) => {
            run.emit(changed(
                IssueCategory::TypeNarrowed,
                "type narrowed",
                old_value,
                new_value,
            ));
        }
        (Some(Variance::Output), TypeChange::Widened) => {
            run.emit(changed(
                IssueCategory::SignatureChanged,
                "type widened in an output position",
                old_value,
                new_value,
            ));
        }
        _ => {
            run.emit(changed(
                IssueCategory::SignatureChanged,
                "type changed",
                old_value,
                new_value,
            ));
        }
    }
}
