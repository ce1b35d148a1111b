//! Selection-driven partial copies and chained builders for schema-derived
//! types.
//!
//! This crate defines the pieces schema-derived classes are wired to:
//!
//! - [`SelectionTree`] and [`SelectionMode`]: an immutable description of
//!   which nested properties take part in an operation.
//! - [`decide`] and [`CopyScope`]: the per-property rule that turns a tree
//!   and a mode into "copy this, and continue with that node below it".
//! - [`DeepCopy`]: per-type copy dispatch (collections, partially copyable
//!   types, fully copyable types, plain values).
//! - [`Copyable`], [`PartialCopyable`], [`Buildable`]: the capability
//!   contracts generated classes implement.
//! - [`SelectorGraph`] and [`SelectorNode`]: the storage behind fluent,
//!   schema-shaped selectors that build trees.
//! - [`Draft`], [`Slot`], [`ListSlot`], [`ParentLink`]: builder composition,
//!   including nested child builders that return to their parent.
//!
//! # Example
//!
//! ```
//! use partial_copy_core::*;
//!
//! let tree = SelectionTree::from_paths(SelectionMode::Include, ["address.city"]);
//! let scope = CopyScope::new(&tree, SelectionMode::Include);
//!
//! assert!(scope.decide("address").is_included());
//! assert_eq!(scope.decide("destination"), Decision::Skip);
//! assert_eq!(tree.to_string(), "{address{city}}");
//! ```

mod builder;
mod capability;
mod copy;
mod decision;
mod error;
mod selector;
mod tree;

pub use builder::{Build, Draft, ListSlot, ParentLink, Pending, Populate, Slot};
pub use capability::{Buildable, Copyable, PartialCopyable};
pub use copy::DeepCopy;
pub use decision::{CopyScope, Decision, decide};
pub use error::{Result, SelectionError};
pub use selector::{RootSelector, SelectorGraph, SelectorId, SelectorNode};
pub use tree::{NodeName, Selection, SelectionMode, SelectionTree};
