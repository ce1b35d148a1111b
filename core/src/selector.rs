//! Fluent construction of selection trees.
//!
//! Schema-derived selector types are thin wrappers around [`SelectorNode`].
//! All nodes of one selector chain share a [`SelectorGraph`]; navigating the
//! same property twice from the same node lands on the same graph node, so a
//! path only ever exists once per graph.
//!
//! The root selector type is carried as a type parameter `R` and rebuilt on
//! demand from the graph ([`RootSelector::from_graph`]); the parent selector
//! `P` is held by value.
//!
//! # Example
//!
//! ```
//! use partial_copy_core::{RootSelector, SelectionMode, SelectorGraph, SelectorNode};
//!
//! #[derive(Clone)]
//! struct CitySelector<R, P>(SelectorNode<R, P>);
//!
//! #[derive(Clone)]
//! struct AddressSelector<R, P>(SelectorNode<R, P>);
//!
//! impl<R: RootSelector + Clone, P: Clone> AddressSelector<R, P> {
//!     fn city(&self) -> CitySelector<R, Self> {
//!         CitySelector(self.0.child("city", self.clone()))
//!     }
//! }
//!
//! #[derive(Clone)]
//! struct Select(AddressSelector<Select, ()>);
//!
//! impl RootSelector for Select {
//!     fn from_graph(graph: SelectorGraph) -> Self {
//!         Select(AddressSelector(SelectorNode::root(graph)))
//!     }
//! }
//!
//! let select = Select::root(SelectionMode::Include);
//! let city = select.0.city();
//! assert!(city.0.same_node(&select.0.city().0));
//! assert_eq!(city.0.build().paths(), vec!["city"]);
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::tree::{SelectionMode, SelectionTree};

/// Index of a node inside a [`SelectorGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorId(usize);

impl SelectorId {
    /// The root node of every graph.
    pub const ROOT: SelectorId = SelectorId(0);
}

#[derive(Debug)]
struct Slot {
    children: BTreeMap<String, SelectorId>,
}

#[derive(Debug)]
struct Arena {
    mode: SelectionMode,
    slots: Vec<Slot>,
}

/// Shared storage behind one selector chain.
///
/// Cloning the handle shares the graph. Graphs are single-threaded; the
/// trees they build are not.
#[derive(Clone)]
pub struct SelectorGraph {
    arena: Rc<RefCell<Arena>>,
}

impl SelectorGraph {
    /// Creates a graph holding only the root node. Trees built from it record
    /// `mode` on every node.
    pub fn new(mode: SelectionMode) -> Self {
        let root = Slot {
            children: BTreeMap::new(),
        };
        Self {
            arena: Rc::new(RefCell::new(Arena {
                mode,
                slots: vec![root],
            })),
        }
    }

    /// Mode recorded on built trees.
    pub fn mode(&self) -> SelectionMode {
        self.arena.borrow().mode
    }

    /// Number of nodes materialized so far, the root included.
    pub fn len(&self) -> usize {
        self.arena.borrow().slots.len()
    }

    /// A graph always holds its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the child of `parent` for `property`, creating it on first
    /// use. `parent` must come from this graph.
    pub(crate) fn child_of(&self, parent: SelectorId, property: &str) -> SelectorId {
        let mut arena = self.arena.borrow_mut();
        if let Some(id) = arena.slots[parent.0].children.get(property) {
            return *id;
        }
        let id = SelectorId(arena.slots.len());
        arena.slots.push(Slot {
            children: BTreeMap::new(),
        });
        arena.slots[parent.0]
            .children
            .insert(property.to_string(), id);
        id
    }

    /// Builds the tree rooted at the graph's root node.
    pub fn build(&self) -> SelectionTree {
        let arena = self.arena.borrow();
        let children = Self::init_children(&arena, SelectorId::ROOT);
        SelectionTree::root(arena.mode, children)
    }

    fn init_children(arena: &Arena, id: SelectorId) -> Vec<SelectionTree> {
        arena.slots[id.0]
            .children
            .iter()
            .map(|(name, child)| {
                SelectionTree::property(
                    name.clone(),
                    arena.mode,
                    Self::init_children(arena, *child),
                )
            })
            .collect()
    }

    /// Returns `true` when both handles share storage.
    pub fn ptr_eq(&self, other: &SelectorGraph) -> bool {
        Rc::ptr_eq(&self.arena, &other.arena)
    }
}

impl fmt::Debug for SelectorGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorGraph")
            .field("mode", &self.mode())
            .field("nodes", &self.len())
            .finish()
    }
}

/// Implemented by the outermost selector type of a schema class.
pub trait RootSelector: Sized {
    /// Wraps the root node of `graph`.
    fn from_graph(graph: SelectorGraph) -> Self;

    /// Starts a new selector chain.
    fn root(mode: SelectionMode) -> Self {
        Self::from_graph(SelectorGraph::new(mode))
    }
}

/// One position in a selector chain.
///
/// `R` is the root selector type, `P` the parent selector type (`()` for
/// the root).
pub struct SelectorNode<R, P> {
    graph: SelectorGraph,
    id: SelectorId,
    parent: P,
    root: PhantomData<fn() -> R>,
}

impl<R> SelectorNode<R, ()> {
    /// Node for the root of `graph`.
    pub fn root(graph: SelectorGraph) -> Self {
        Self {
            graph,
            id: SelectorId::ROOT,
            parent: (),
            root: PhantomData,
        }
    }
}

impl<R, P> SelectorNode<R, P> {
    /// Descends into `property`, reusing the node created by an earlier call.
    pub fn child<Q>(&self, property: &str, parent: Q) -> SelectorNode<R, Q> {
        SelectorNode {
            graph: self.graph.clone(),
            id: self.graph.child_of(self.id, property),
            parent,
            root: PhantomData,
        }
    }

    /// The enclosing selector.
    pub fn parent(&self) -> &P {
        &self.parent
    }

    /// Graph node this selector stands for.
    pub fn id(&self) -> SelectorId {
        self.id
    }

    /// Shared graph.
    pub fn graph(&self) -> &SelectorGraph {
        &self.graph
    }

    /// Returns `true` when both selectors stand for the same graph node.
    pub fn same_node<S, Q>(&self, other: &SelectorNode<S, Q>) -> bool {
        self.graph.ptr_eq(&other.graph) && self.id == other.id
    }

    /// Builds the whole tree, from the root, whatever node it is called on.
    pub fn build(&self) -> SelectionTree {
        self.graph.build()
    }
}

impl<R: RootSelector, P> SelectorNode<R, P> {
    /// The root selector of this chain.
    pub fn root_selector(&self) -> R {
        R::from_graph(self.graph.clone())
    }
}

impl<R, P: Clone> Clone for SelectorNode<R, P> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            id: self.id,
            parent: self.parent.clone(),
            root: PhantomData,
        }
    }
}

impl<R, P> fmt::Debug for SelectorNode<R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorNode")
            .field("id", &self.id)
            .field("graph", &self.graph)
            .finish()
    }
}
