use std::fmt;

use serde::{Deserialize, Serialize};

/// Reflection kind of a declaration, mirroring the documentation generator's
/// taxonomy.
///
/// The set is closed for the kinds the checker has rules for. Anything else
/// lands in [`DeclarationKind::Unknown`], which the checker treats fail-closed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DeclarationKind {
    Project,
    Module,
    Namespace,
    Enum,
    EnumMember,
    Variable,
    Function,
    Class,
    Interface,
    Constructor,
    Property,
    Method,
    CallSignature,
    IndexSignature,
    ConstructorSignature,
    Parameter,
    TypeLiteral,
    TypeParameter,
    Accessor,
    GetSignature,
    SetSignature,
    ObjectLiteral,
    TypeAlias,
    Reference,
    /// A kind label this version of the model does not recognise.
    Unknown(String),
}

impl DeclarationKind {
    /// Parse a `kindString` label such as `"Call signature"` or
    /// `"Enumeration member"`. Matching ignores case and whitespace.
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "project" | "global" => Self::Project,
            "module" | "externalmodule" => Self::Module,
            "namespace" => Self::Namespace,
            "enum" | "enumeration" => Self::Enum,
            "enummember" | "enumerationmember" => Self::EnumMember,
            "variable" => Self::Variable,
            "function" => Self::Function,
            "class" => Self::Class,
            "interface" => Self::Interface,
            "constructor" => Self::Constructor,
            "property" => Self::Property,
            "method" => Self::Method,
            "callsignature" => Self::CallSignature,
            "indexsignature" => Self::IndexSignature,
            "constructorsignature" => Self::ConstructorSignature,
            "parameter" => Self::Parameter,
            "typeliteral" => Self::TypeLiteral,
            "typeparameter" => Self::TypeParameter,
            "accessor" => Self::Accessor,
            "getsignature" => Self::GetSignature,
            "setsignature" => Self::SetSignature,
            "objectliteral" => Self::ObjectLiteral,
            "typealias" => Self::TypeAlias,
            "reference" => Self::Reference,
            _ => Self::Unknown(label.to_string()),
        }
    }

    /// Map the numeric `kind` bit used by generators that no longer emit
    /// `kindString`.
    pub fn from_bits(bits: u64) -> Self {
        match bits {
            0x1 => Self::Project,
            0x2 => Self::Module,
            0x4 => Self::Namespace,
            0x8 => Self::Enum,
            0x10 => Self::EnumMember,
            0x20 => Self::Variable,
            0x40 => Self::Function,
            0x80 => Self::Class,
            0x100 => Self::Interface,
            0x200 => Self::Constructor,
            0x400 => Self::Property,
            0x800 => Self::Method,
            0x1000 => Self::CallSignature,
            0x2000 => Self::IndexSignature,
            0x4000 => Self::ConstructorSignature,
            0x8000 => Self::Parameter,
            0x10000 => Self::TypeLiteral,
            0x20000 => Self::TypeParameter,
            0x40000 => Self::Accessor,
            0x80000 => Self::GetSignature,
            0x100000 => Self::SetSignature,
            0x200000 => Self::TypeAlias,
            0x400000 => Self::Reference,
            other => Self::Unknown(format!("kind#{other:#x}")),
        }
    }

    /// Human-readable label, the inverse of [`Self::from_label`].
    pub fn label(&self) -> &str {
        match self {
            Self::Project => "Project",
            Self::Module => "Module",
            Self::Namespace => "Namespace",
            Self::Enum => "Enumeration",
            Self::EnumMember => "Enumeration member",
            Self::Variable => "Variable",
            Self::Function => "Function",
            Self::Class => "Class",
            Self::Interface => "Interface",
            Self::Constructor => "Constructor",
            Self::Property => "Property",
            Self::Method => "Method",
            Self::CallSignature => "Call signature",
            Self::IndexSignature => "Index signature",
            Self::ConstructorSignature => "Constructor signature",
            Self::Parameter => "Parameter",
            Self::TypeLiteral => "Type literal",
            Self::TypeParameter => "Type parameter",
            Self::Accessor => "Accessor",
            Self::GetSignature => "Get signature",
            Self::SetSignature => "Set signature",
            Self::ObjectLiteral => "Object literal",
            Self::TypeAlias => "Type alias",
            Self::Reference => "Reference",
            Self::Unknown(label) => label,
        }
    }

    /// Returns `true` for kinds the checker has no rules for.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// Returns `true` for call, construct, index and accessor signatures.
    pub fn is_signature(&self) -> bool {
        matches!(
            self,
            Self::CallSignature
                | Self::IndexSignature
                | Self::ConstructorSignature
                | Self::GetSignature
                | Self::SetSignature
        )
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<DeclarationKind> for String {
    fn from(kind: DeclarationKind) -> Self {
        kind.label().to_string()
    }
}

impl From<String> for DeclarationKind {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_from_old_and_new_generators() {
        assert_eq!(DeclarationKind::from_label("Call signature"), DeclarationKind::CallSignature);
        assert_eq!(DeclarationKind::from_label("Enumeration Member"), DeclarationKind::EnumMember);
        assert_eq!(DeclarationKind::from_label("External module"), DeclarationKind::Module);
        assert_eq!(DeclarationKind::from_label("type alias"), DeclarationKind::TypeAlias);
    }

    #[test]
    fn unknown_label_is_preserved() {
        let kind = DeclarationKind::from_label("Event");
        assert_eq!(kind, DeclarationKind::Unknown("Event".into()));
        assert!(kind.is_unknown());
        assert_eq!(kind.to_string(), "Event");
    }

    #[test]
    fn label_round_trips_for_known_kinds() {
        for kind in [
            DeclarationKind::Class,
            DeclarationKind::EnumMember,
            DeclarationKind::ConstructorSignature,
            DeclarationKind::SetSignature,
        ] {
            assert_eq!(DeclarationKind::from_label(kind.label()), kind);
        }
    }

    #[test]
    fn numeric_bits() {
        assert_eq!(DeclarationKind::from_bits(0x80), DeclarationKind::Class);
        assert_eq!(DeclarationKind::from_bits(0x8000), DeclarationKind::Parameter);
        assert!(DeclarationKind::from_bits(0x3).is_unknown());
    }

    #[test]
    fn signature_kinds() {
        assert!(DeclarationKind::GetSignature.is_signature());
        assert!(!DeclarationKind::Method.is_signature());
    }

    #[test]
    fn serde_uses_labels() {
        let json = serde_json::to_string(&DeclarationKind::TypeAlias).unwrap();
        assert_eq!(json, "\"Type alias\"");
        let back: DeclarationKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DeclarationKind::TypeAlias);
    }
}
