//! Compatibility engine for typedc.
//!
//! Flattens two declaration trees, matches their nodes by qualified path,
//! and classifies every difference as breaking, compatible, or informational.
//!
//! # Key Types
//!
//! - [`FlatTree`] / [`FlatNode`] -- Pre-order flattened declarations with qualified paths
//! - [`check_compatibility`] / [`check_trees`] -- The comparison itself
//! - [`CheckSummary`] -- Counts returned by one comparison run
//! - [`IssueSink`] / [`Suppressor`] -- Seams for reporting and ignore rules
//! - [`is_assignable`] / [`classify_change`] -- Type widening relation

pub mod checker;
pub mod compat;
pub mod flatten;
pub mod sink;

pub use checker::{check_compatibility, check_trees, CheckSummary};
pub use compat::{classify_change, is_assignable, variance_of, TypeChange, Variance};
pub use flatten::{flatten, FlatNode, FlatTree, PATH_SEPARATOR};
pub use sink::{CollectingSink, IssueSink, NoSuppression, Suppressor};
