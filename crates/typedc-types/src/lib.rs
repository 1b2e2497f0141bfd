//! Declaration model for typedc.
//!
//! This crate holds the data the compatibility checker works on: declaration
//! trees loaded from the documentation generator's JSON, the structural type
//! descriptors attached to them, and the issue records the checker emits.
//!
//! # Key Types
//!
//! - [`DeclarationNode`] — One exported program element and its nested declarations
//! - [`DeclarationKind`] — Reflection kind, with an `Unknown` fallback
//! - [`Flags`] / [`Visibility`] — Modifiers relevant to compatibility
//! - [`TypeDescriptor`] — Order-normalised structural type
//! - [`Issue`] / [`IssueCategory`] — One detected difference
//! - [`load_declarations`] — TypeDoc JSON loader

pub mod declaration;
pub mod error;
pub mod issue;
pub mod kind;
pub mod type_desc;
pub mod typedoc;

pub use declaration::{DeclarationNode, Flags, SourceRef, Visibility};
pub use error::{TypeError, TypeResult};
pub use issue::{Issue, IssueCategory};
pub use kind::DeclarationKind;
pub use type_desc::{FunctionParam, LiteralFamily, ObjectMember, TypeDescriptor};
pub use typedoc::{declaration_from_value, load_declarations, type_from_value};
