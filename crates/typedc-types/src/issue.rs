use std::fmt;

use serde::{Deserialize, Serialize};

use crate::declaration::SourceRef;
use crate::kind::DeclarationKind;

/// Classification of a detected difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueCategory {
    /// A declaration present in the previous version is gone.
    Removed,
    /// An input position now accepts fewer values.
    TypeNarrowed,
    /// A declaration became less accessible.
    VisibilityReduced,
    /// Something optional became required, or a required parameter appeared.
    RequiredAdded,
    /// Any other incompatible change to a declaration's shape or type.
    SignatureChanged,
    /// A new declaration. Informational only.
    Added,
}

impl IssueCategory {
    /// Every category except [`IssueCategory::Added`] breaks consumers.
    pub fn is_breaking(self) -> bool {
        !matches!(self, Self::Added)
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Removed => "Removed",
            Self::TypeNarrowed => "TypeNarrowed",
            Self::VisibilityReduced => "VisibilityReduced",
            Self::RequiredAdded => "RequiredAdded",
            Self::SignatureChanged => "SignatureChanged",
            Self::Added => "Added",
        };
        f.write_str(label)
    }
}

/// One detected difference between the two declaration trees.
///
/// The serialized shape (`path`, `category`, `oldValue`, `newValue`,
/// `message`) is the flat issue record; an array of them doubles as an
/// ignore-rule file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub path: String,
    pub category: IssueCategory,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub message: String,
    /// Kind of the declaration the issue is about.
    #[serde(skip)]
    pub kind: Option<DeclarationKind>,
    /// First known source location of the declaration.
    #[serde(skip)]
    pub location: Option<SourceRef>,
}

impl Issue {
    pub fn new(
        path: impl Into<String>,
        category: IssueCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            category,
            old_value: None,
            new_value: None,
            message: message.into(),
            kind: None,
            location: None,
        }
    }

    pub fn with_values(mut self, old: Option<String>, new: Option<String>) -> Self {
        self.old_value = old;
        self.new_value = new;
        self
    }

    pub fn with_kind(mut self, kind: DeclarationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_location(mut self, location: Option<SourceRef>) -> Self {
        self.location = location;
        self
    }

    pub fn is_breaking(&self) -> bool {
        self.category.is_breaking()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.category, self.path, self.message)?;
        match (&self.old_value, &self.new_value) {
            (Some(old), Some(new)) => write!(f, " ({old} -> {new})"),
            (Some(old), None) => write!(f, " (was {old})"),
            (None, Some(new)) => write!(f, " (now {new})"),
            (None, None) => Ok(()),
        }
    }
}
