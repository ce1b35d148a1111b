//! Selection tree types.
//!
//! A [`SelectionTree`] describes which properties of an object graph take
//! part in an operation, recursively. Trees are immutable once built and
//! cheap to clone (children sit behind an [`Arc`]), so one tree can be shared
//! by any number of copy operations, including across threads.
//!
//! # Example
//!
//! ```
//! use partial_copy_core::{Selection, SelectionMode, SelectionTree};
//!
//! let tree = SelectionTree::from_paths(SelectionMode::Include, ["address.city"]);
//! let address = tree.get("address");
//! assert!(!address.is_leaf());
//!
//! // a missing name under a refined node is a wildcard, not a real entry
//! assert!(matches!(tree.get("destination"), Selection::Wildcard(_)));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectionError};

/// Whether a tree designates the properties to keep or the ones to drop.
///
/// A copy call threads one mode through the whole recursion; the mode stored
/// on each [`SelectionTree`] node only records how the node was created.
///
/// # Examples
///
/// ```
/// use partial_copy_core::SelectionMode;
///
/// assert_eq!(SelectionMode::default(), SelectionMode::Include);
/// assert_eq!(SelectionMode::Include.inverse(), SelectionMode::Exclude);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Selected properties are kept, everything else is dropped.
    #[default]
    Include,
    /// Selected leaf properties are dropped, everything else is kept.
    Exclude,
}

impl SelectionMode {
    /// Returns the opposite mode.
    pub fn inverse(self) -> Self {
        match self {
            Self::Include => Self::Exclude,
            Self::Exclude => Self::Include,
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => f.write_str("include"),
            Self::Exclude => f.write_str("exclude"),
        }
    }
}

/// Identity of a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeName {
    /// The node standing for the object a copy starts from.
    Root,
    /// A node standing for a named property.
    Property(String),
}

/// Result of looking a property up in a [`SelectionTree`].
///
/// The wildcard is a distinct variant rather than a node with a sentinel
/// name, so a real property called `"*"` can never be mistaken for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// An explicit entry, or the node itself when it has no children.
    Node(&'a SelectionTree),
    /// No entry exists for the name under a node that has children (or under
    /// an empty root). Carries the mode of the node that was queried.
    Wildcard(SelectionMode),
}

impl<'a> Selection<'a> {
    /// Returns the node for an explicit entry, `None` for a wildcard.
    pub fn node(self) -> Option<&'a SelectionTree> {
        match self {
            Self::Node(tree) => Some(tree),
            Self::Wildcard(_) => None,
        }
    }

    /// Wildcards are always leaves.
    pub fn is_leaf(self) -> bool {
        match self {
            Self::Node(tree) => tree.is_leaf(),
            Self::Wildcard(_) => true,
        }
    }

    /// Returns `true` for the wildcard variant.
    pub fn is_wildcard(self) -> bool {
        matches!(self, Self::Wildcard(_))
    }

    /// Mode of the node (or of the queried node, for a wildcard).
    pub fn mode(self) -> SelectionMode {
        match self {
            Self::Node(tree) => tree.mode(),
            Self::Wildcard(mode) => mode,
        }
    }
}

/// Immutable node describing which properties below it are selected.
///
/// Children are fixed at construction. Lookups through [`get`](Self::get)
/// follow two rules:
///
/// - a property node without children answers every lookup with itself, so
///   "everything below here shares this node's disposition";
/// - a node with children (or the root, even when empty) answers a missing
///   name with [`Selection::Wildcard`].
///
/// # Examples
///
/// ```
/// use partial_copy_core::{SelectionMode, SelectionTree};
///
/// let city = SelectionTree::leaf("city", SelectionMode::Include);
/// let address = SelectionTree::property("address", SelectionMode::Include, [city]);
/// let tree = SelectionTree::root(SelectionMode::Include, [address]);
///
/// let city = tree.get("address").node().unwrap().get("city").node().unwrap();
/// assert!(city.is_leaf());
/// // a leaf propagates itself downwards
/// assert_eq!(city.get("town").node(), Some(city));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTree {
    name: NodeName,
    mode: SelectionMode,
    children: Arc<BTreeMap<String, SelectionTree>>,
}

impl SelectionTree {
    /// Creates a root node with the given children.
    pub fn root(mode: SelectionMode, children: impl IntoIterator<Item = SelectionTree>) -> Self {
        Self::with_name(NodeName::Root, mode, children)
    }

    /// Creates a root node without children.
    ///
    /// Under [`SelectionMode::Include`] an empty tree selects nothing; under
    /// [`SelectionMode::Exclude`] it excludes nothing.
    pub fn empty(mode: SelectionMode) -> Self {
        Self::root(mode, [])
    }

    /// Creates a property node with the given children.
    pub fn property(
        name: impl Into<String>,
        mode: SelectionMode,
        children: impl IntoIterator<Item = SelectionTree>,
    ) -> Self {
        Self::with_name(NodeName::Property(name.into()), mode, children)
    }

    /// Creates a property node without children.
    pub fn leaf(name: impl Into<String>, mode: SelectionMode) -> Self {
        Self::property(name, mode, [])
    }

    fn with_name(
        name: NodeName,
        mode: SelectionMode,
        children: impl IntoIterator<Item = SelectionTree>,
    ) -> Self {
        let children = children
            .into_iter()
            // a nested root has no property to hang off
            .filter_map(|child| {
                let key = child.property_name()?.to_string();
                Some((key, child))
            })
            .collect();
        Self {
            name,
            mode,
            children: Arc::new(children),
        }
    }

    /// Builds a tree from dotted property paths.
    ///
    /// Paths sharing a prefix are merged; empty segments are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use partial_copy_core::{SelectionMode, SelectionTree};
    ///
    /// let tree = SelectionTree::from_paths(
    ///     SelectionMode::Exclude,
    ///     ["address.street", "address.city.postalCode"],
    /// );
    /// assert_eq!(tree.paths(), vec!["address.city.postalCode", "address.street"]);
    /// ```
    pub fn from_paths<I, S>(mode: SelectionMode, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        #[derive(Default)]
        struct Pending(BTreeMap<String, Pending>);

        fn freeze(name: String, pending: Pending, mode: SelectionMode) -> SelectionTree {
            let children = pending
                .0
                .into_iter()
                .map(|(child, sub)| freeze(child, sub, mode));
            SelectionTree::property(name, mode, children)
        }

        let mut top = Pending::default();
        for path in paths {
            let mut cursor = &mut top;
            for segment in path.as_ref().split('.').map(str::trim) {
                if segment.is_empty() {
                    continue;
                }
                cursor = cursor.0.entry(segment.to_string()).or_default();
            }
        }

        let children = top
            .0
            .into_iter()
            .map(|(name, pending)| freeze(name, pending, mode));
        Self::root(mode, children)
    }

    /// Looks up the selection for a child property.
    pub fn get(&self, name: &str) -> Selection<'_> {
        if self.children.is_empty() {
            return match self.name {
                NodeName::Property(_) => Selection::Node(self),
                NodeName::Root => Selection::Wildcard(self.mode),
            };
        }
        match self.children.get(name) {
            Some(child) => Selection::Node(child),
            None => Selection::Wildcard(self.mode),
        }
    }

    /// Returns the explicit child entry for `name`, without leaf propagation.
    pub fn child(&self, name: &str) -> Option<&SelectionTree> {
        self.children.get(name)
    }

    /// Iterates over the explicit children in name order.
    pub fn children(&self) -> impl Iterator<Item = &SelectionTree> {
        self.children.values()
    }

    /// A node is a leaf when it has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` for the root node.
    pub fn is_root(&self) -> bool {
        self.name == NodeName::Root
    }

    /// Mode the node was created with.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Node identity.
    pub fn node_name(&self) -> &NodeName {
        &self.name
    }

    /// Property name, `None` for the root.
    pub fn property_name(&self) -> Option<&str> {
        match &self.name {
            NodeName::Property(name) => Some(name),
            NodeName::Root => None,
        }
    }

    /// Lists the dotted path of every leaf below this node, sorted.
    pub fn paths(&self) -> Vec<String> {
        fn walk(tree: &SelectionTree, prefix: &str, out: &mut Vec<String>) {
            for (name, child) in tree.children.iter() {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                if child.is_leaf() {
                    out.push(path);
                } else {
                    walk(child, &path, out);
                }
            }
        }

        let mut out = Vec::new();
        walk(self, "", &mut out);
        out
    }

    /// Fails with [`SelectionError::InvalidSelection`] when this node names a
    /// child that is not among `known`.
    ///
    /// Only direct children are checked; each level of a copy checks its own
    /// node against its own class.
    ///
    /// # Examples
    ///
    /// ```
    /// use partial_copy_core::{SelectionError, SelectionMode, SelectionTree};
    ///
    /// let tree = SelectionTree::from_paths(SelectionMode::Include, ["adress"]);
    /// let err = tree.ensure_known("Tourist", &["address", "destination"]).unwrap_err();
    /// assert!(matches!(err, SelectionError::InvalidSelection { .. }));
    /// ```
    pub fn ensure_known(&self, class: &str, known: &[&str]) -> Result<()> {
        match self.unknown_names(known).next() {
            Some(property) => Err(SelectionError::InvalidSelection {
                class: class.to_string(),
                property: property.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Iterates over the child names that are not in `known`.
    pub fn unknown_names<'a>(&'a self, known: &'a [&str]) -> impl Iterator<Item = &'a str> + 'a {
        self.children
            .keys()
            .map(String::as_str)
            .filter(move |name| !known.contains(name))
    }
}

impl fmt::Display for SelectionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let NodeName::Property(name) = &self.name {
            f.write_str(name)?;
        }
        if self.is_leaf() && !self.is_root() {
            return Ok(());
        }
        f.write_str("{")?;
        for (index, child) in self.children.values().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{child}")?;
        }
        f.write_str("}")
    }
}
