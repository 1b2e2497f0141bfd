use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kind::DeclarationKind;
use crate::type_desc::TypeDescriptor;

/// Accessibility of a declaration, ordered from widest to narrowest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// Returns `true` if `other` is strictly less accessible than `self`.
    pub fn is_reduced_to(self, other: Visibility) -> bool {
        other > self
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Protected => f.write_str("protected"),
            Self::Private => f.write_str("private"),
        }
    }
}

/// Structural modifiers that take part in compatibility decisions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Flags {
    pub visibility: Visibility,
    pub optional: bool,
    pub readonly: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub rest: bool,
    pub is_const: bool,
}

impl Flags {
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Default::default()
        }
    }

    pub fn readonly() -> Self {
        Self {
            readonly: true,
            ..Default::default()
        }
    }

    pub fn with_visibility(visibility: Visibility) -> Self {
        Self {
            visibility,
            ..Default::default()
        }
    }
}

/// Where a declaration was defined, as reported by the generator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub file_name: String,
    pub line: u32,
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_name, self.line)
    }
}

/// One exported program element and its nested declarations.
///
/// Trees are built once by the loader and never mutated by the checker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclarationNode {
    pub name: String,
    pub kind: DeclarationKind,
    pub flags: Flags,
    pub type_descriptor: Option<TypeDescriptor>,
    /// Declared initializer text, e.g. an enum member's value.
    pub default_value: Option<String>,
    pub sources: Vec<SourceRef>,
    pub children: Vec<DeclarationNode>,
}

impl DeclarationNode {
    /// A bare node with default flags and no type or children.
    pub fn new(name: impl Into<String>, kind: DeclarationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            flags: Flags::default(),
            type_descriptor: None,
            default_value: None,
            sources: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_type(mut self, ty: TypeDescriptor) -> Self {
        self.type_descriptor = Some(ty);
        self
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_child(mut self, child: DeclarationNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DeclarationNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// A parameter is required unless it is optional, a rest parameter, or
    /// has a default value.
    pub fn is_required_parameter(&self) -> bool {
        self.kind == DeclarationKind::Parameter
            && !self.flags.optional
            && !self.flags.rest
            && self.default_value.is_none()
    }

    /// Total node count of this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_reduction_ordering() {
        assert!(Visibility::Public.is_reduced_to(Visibility::Protected));
        assert!(Visibility::Protected.is_reduced_to(Visibility::Private));
        assert!(!Visibility::Private.is_reduced_to(Visibility::Public));
        assert!(!Visibility::Public.is_reduced_to(Visibility::Public));
    }

    #[test]
    fn required_parameter_rules() {
        let param = DeclarationNode::new("x", DeclarationKind::Parameter);
        assert!(param.is_required_parameter());
        assert!(!param.clone().with_flags(Flags::optional()).is_required_parameter());
        assert!(!param.clone().with_default_value("1").is_required_parameter());

        let rest = Flags {
            rest: true,
            ..Default::default()
        };
        assert!(!param.with_flags(rest).is_required_parameter());

        let prop = DeclarationNode::new("x", DeclarationKind::Property);
        assert!(!prop.is_required_parameter());
    }

    #[test]
    fn subtree_len_counts_all_nodes() {
        let tree = DeclarationNode::new("root", DeclarationKind::Project).with_child(
            DeclarationNode::new("Widget", DeclarationKind::Class)
                .with_child(DeclarationNode::new("size", DeclarationKind::Property))
                .with_child(DeclarationNode::new("render", DeclarationKind::Method)),
        );
        assert_eq!(tree.subtree_len(), 4);
    }

    #[test]
    fn source_ref_display() {
        let src = SourceRef {
            file_name: "src/widget.ts".into(),
            line: 12,
        };
        assert_eq!(src.to_string(), "src/widget.ts:12");
    }
}
