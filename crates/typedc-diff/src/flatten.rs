//! Flattening: turn a declaration tree into an ordered list of addressable
//! nodes.
//!
//! Every node is tagged with its qualified path (the dot-joined names from
//! the root) and a match key that disambiguates same-named siblings such as
//! overload signatures by their position.

use std::collections::HashMap;

use typedc_types::DeclarationNode;

/// Separator between qualified path segments.
pub const PATH_SEPARATOR: char = '.';

/// A declaration together with its position in the flattened tree.
#[derive(Clone, Debug)]
pub struct FlatNode<'a> {
    pub node: &'a DeclarationNode,
    /// Dot-joined names from the root. Empty names contribute no segment.
    pub path: String,
    /// `path` with `#<ordinal>` appended to every segment whose ordinal is
    /// non-zero. Unique within one tree.
    pub match_key: String,
    pub depth: usize,
    pub parent: Option<usize>,
    /// Number of earlier siblings sharing this node's name.
    pub ordinal: usize,
}

/// Pre-order list of flattened nodes for one version of the API.
///
/// Index 0 is always the root; a parent always precedes its children.
#[derive(Clone, Debug, Default)]
pub struct FlatTree<'a> {
    nodes: Vec<FlatNode<'a>>,
    children: Vec<Vec<usize>>,
}

impl<'a> FlatTree<'a> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FlatNode<'a>> {
        self.nodes.get(index)
    }

    /// Indices of the direct children of `index`, in declaration order.
    pub fn children(&self, index: usize) -> &[usize] {
        self.children.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlatNode<'a>> {
        self.nodes.iter()
    }

    /// Map from `(parent index, name, ordinal)` to node index.
    ///
    /// Lookups are scoped to one parent, so a name containing the path
    /// separator never collides with a nested path.
    pub fn index_by_parent(&self) -> HashMap<(usize, &str, usize), usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.parent.map(|p| ((p, n.node.name.as_str(), n.ordinal), i)))
            .collect()
    }
}

fn join(prefix: &str, segment: &str) -> String {
    match (prefix.is_empty(), segment.is_empty()) {
        (true, _) => segment.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}{PATH_SEPARATOR}{segment}"),
    }
}

struct Pending<'a> {
    node: &'a DeclarationNode,
    name: &'a str,
    parent: Option<usize>,
    ordinal: usize,
}

/// Flatten `tree` in pre-order.
///
/// `root_name` overrides the root's own name in every path; pass `Some("")`
/// to leave the root out of paths entirely.
pub fn flatten<'a>(tree: &'a DeclarationNode, root_name: Option<&'a str>) -> FlatTree<'a> {
    let mut flat = FlatTree::default();
    let mut stack = vec![Pending {
        node: tree,
        name: root_name.unwrap_or(&tree.name),
        parent: None,
        ordinal: 0,
    }];

    while let Some(pending) = stack.pop() {
        let index = flat.nodes.len();
        let (path, match_key, depth) = match pending.parent {
            Some(p) => {
                let parent = &flat.nodes[p];
                let segment_key = if pending.ordinal > 0 {
                    format!("{}#{}", pending.name, pending.ordinal)
                } else {
                    pending.name.to_string()
                };
                (
                    join(&parent.path, pending.name),
                    join(&parent.match_key, &segment_key),
                    parent.depth + 1,
                )
            }
            None => (pending.name.to_string(), pending.name.to_string(), 0),
        };

        flat.nodes.push(FlatNode {
            node: pending.node,
            path,
            match_key,
            depth,
            parent: pending.parent,
            ordinal: pending.ordinal,
        });
        flat.children.push(Vec::new());
        if let Some(p) = pending.parent {
            flat.children[p].push(index);
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut pushed = Vec::with_capacity(pending.node.children.len());
        for child in &pending.node.children {
            let count = seen.entry(child.name.as_str()).or_insert(0);
            pushed.push(Pending {
                node: child,
                name: &child.name,
                parent: Some(index),
                ordinal: *count,
            });
            *count += 1;
        }
        // Reverse so the first child is popped first.
        stack.extend(pushed.into_iter().rev());
    }

    flat
}
