//! Per-property copy decisions.
//!
//! [`decide`] is the rule applied once per property during a structural
//! copy. [`CopyScope`] carries the current tree node and the call-wide mode
//! through the recursion and is what copy implementations talk to.

use tracing::debug;

use crate::copy::DeepCopy;
use crate::error::Result;
use crate::tree::{Selection, SelectionMode, SelectionTree};

/// Outcome of [`decide`] for one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
    /// The property is left out of the copy.
    Skip,
    /// The property is copied. `Some` carries the node to continue partial
    /// copying with; `None` means everything below is copied in full.
    Copy(Option<&'a SelectionTree>),
}

impl Decision<'_> {
    /// Returns `true` unless the property is skipped.
    pub fn is_included(&self) -> bool {
        matches!(self, Self::Copy(_))
    }
}

/// Decides whether `property` takes part in a copy.
///
/// - Without a tree every property is copied in full.
/// - [`SelectionMode::Include`] keeps a property only when the tree has an
///   entry for it.
/// - [`SelectionMode::Exclude`] drops a property only when its entry is a
///   leaf; a refined entry keeps the property and continues below it, and no
///   entry keeps it in full.
///
/// # Examples
///
/// ```
/// use partial_copy_core::{decide, Decision, SelectionMode, SelectionTree};
///
/// let tree = SelectionTree::from_paths(SelectionMode::Exclude, ["address.street"]);
/// assert_eq!(decide(Some(&tree), SelectionMode::Exclude, "destination"), Decision::Copy(None));
/// assert!(decide(Some(&tree), SelectionMode::Exclude, "address").is_included());
///
/// let street = tree.get("address").node().unwrap();
/// assert_eq!(decide(Some(street), SelectionMode::Exclude, "street"), Decision::Skip);
/// ```
pub fn decide<'a>(
    current: Option<&'a SelectionTree>,
    mode: SelectionMode,
    property: &str,
) -> Decision<'a> {
    let Some(current) = current else {
        return Decision::Copy(None);
    };

    let selection = current.get(property);
    let decision = match (mode, selection) {
        (SelectionMode::Include, Selection::Node(child)) => Decision::Copy(Some(child)),
        (SelectionMode::Include, Selection::Wildcard(_)) => Decision::Skip,
        (SelectionMode::Exclude, Selection::Node(child)) if child.is_leaf() => Decision::Skip,
        (SelectionMode::Exclude, Selection::Node(child)) => Decision::Copy(Some(child)),
        (SelectionMode::Exclude, Selection::Wildcard(_)) => Decision::Copy(None),
    };

    debug!(property, %mode, included = decision.is_included(), "copy decision");
    decision
}

/// Position of a copy inside a selection: the node reached so far plus the
/// mode of the whole call.
///
/// # Examples
///
/// ```
/// use partial_copy_core::{CopyScope, SelectionMode, SelectionTree};
///
/// let tree = SelectionTree::from_paths(SelectionMode::Include, ["destination"]);
/// let scope = CopyScope::new(&tree, SelectionMode::Include);
///
/// let destination = String::from("Lisbon");
/// let street = String::from("Rua Augusta");
/// assert_eq!(scope.field("destination", &destination).unwrap(), Some(destination.clone()));
/// assert_eq!(scope.field("street", &street).unwrap(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyScope<'a> {
    selection: Option<&'a SelectionTree>,
    mode: SelectionMode,
}

impl<'a> CopyScope<'a> {
    /// Scope of an unfiltered copy.
    pub fn full() -> Self {
        Self {
            selection: None,
            mode: SelectionMode::Include,
        }
    }

    /// Scope of a partial copy starting at `tree`.
    pub fn new(tree: &'a SelectionTree, mode: SelectionMode) -> Self {
        Self {
            selection: Some(tree),
            mode,
        }
    }

    /// Current tree node, `None` for a full copy.
    pub fn selection(&self) -> Option<&'a SelectionTree> {
        self.selection
    }

    /// Mode of the call.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Returns `true` when nothing below this point is filtered.
    pub fn is_full(&self) -> bool {
        self.selection.is_none()
    }

    /// Applies [`decide`] to `property` at this position.
    pub fn decide(&self, property: &str) -> Decision<'a> {
        decide(self.selection, self.mode, property)
    }

    /// Scope below a property that [`decide`] included.
    pub fn descend(&self, selection: Option<&'a SelectionTree>) -> Self {
        Self {
            selection,
            mode: self.mode,
        }
    }

    /// Verifies that the current node only names `known` properties of
    /// `class`. Full scopes always pass.
    pub fn check(&self, class: &str, known: &[&str]) -> Result<()> {
        match self.selection {
            Some(tree) => tree.ensure_known(class, known),
            None => Ok(()),
        }
    }

    /// Copies one property value according to the selection.
    ///
    /// Returns `Ok(None)` when the property is skipped.
    pub fn field<T: DeepCopy>(&self, property: &str, value: &T) -> Result<Option<T>> {
        match self.decide(property) {
            Decision::Skip => Ok(None),
            Decision::Copy(below) => value.deep_copy_within(self.descend(below)).map(Some),
        }
    }

    /// Like [`field`](Self::field), for properties whose type has a natural
    /// empty value (collections, `Option`).
    pub fn field_or_default<T: DeepCopy + Default>(&self, property: &str, value: &T) -> Result<T> {
        Ok(self.field(property, value)?.unwrap_or_default())
    }
}

impl Default for CopyScope<'_> {
    fn default() -> Self {
        Self::full()
    }
}
