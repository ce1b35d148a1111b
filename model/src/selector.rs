//! Selector chains driven by a schema at runtime.
//!
//! [`SchemaSelector`] is the dynamic counterpart of generated selector
//! types: every `child` call is checked against the registry, and the
//! selector remembers which classes it stands for so the next step can be
//! checked too.

use std::rc::Rc;

use partial_copy_core::{SelectionMode, SelectionTree, SelectorGraph, SelectorNode};

use crate::error::{ModelError, Result};
use crate::registry::SchemaRegistry;
use crate::schema::TypeRef;

/// One step of a schema-checked selector chain.
///
/// Selectors sharing a root share one graph, so selecting the same path
/// twice yields the same node and [`build`](Self::build) can be called on
/// any of them.
///
/// # Examples
///
/// ```
/// use partial_copy_core::SelectionMode;
/// use partial_copy_model::*;
///
/// let registry = SchemaRegistry::from_bundle(
///     SchemaBundle::new("1.0")
///         .with_class(ClassSchema::new("City").with_property(PropertySchema::text("town")))
///         .with_class(
///             ClassSchema::new("Address")
///                 .with_property(PropertySchema::text("street"))
///                 .with_property(PropertySchema::object("city", "City")),
///         ),
/// )
/// .unwrap();
///
/// let select = SchemaSelector::root(&registry, "Address").unwrap();
/// let tree = select.path("city.town").unwrap().build();
/// assert_eq!(tree.paths(), vec!["city.town"]);
/// assert!(select.child("country").is_err());
/// ```
#[derive(Clone)]
pub struct SchemaSelector<'r> {
    registry: &'r SchemaRegistry,
    node: SelectorNode<(), ()>,
    classes: Vec<String>,
    parent: Option<Rc<SchemaSelector<'r>>>,
}

impl<'r> SchemaSelector<'r> {
    /// Starts an include chain at `class`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownClass`] if the class is not registered.
    pub fn root(registry: &'r SchemaRegistry, class: &str) -> Result<Self> {
        Self::root_with_mode(registry, class, SelectionMode::Include)
    }

    /// Starts a chain whose built trees record `mode`.
    pub fn root_with_mode(
        registry: &'r SchemaRegistry,
        class: &str,
        mode: SelectionMode,
    ) -> Result<Self> {
        registry.require(class)?;
        Ok(Self {
            registry,
            node: SelectorNode::root(SelectorGraph::new(mode)),
            classes: vec![class.to_string()],
            parent: None,
        })
    }

    /// Selects `property` below this selector.
    ///
    /// Collections select through to their elements. Below a choice
    /// property, the properties of every alternative can be selected.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownProperty`] when none of the classes this
    /// selector stands for has the property. Properties of value types
    /// have nothing to select below them.
    pub fn child(&self, property: &str) -> Result<Self> {
        let declared = self.lookup(property)?;
        let classes = declared
            .class_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok(Self {
            registry: self.registry,
            node: self.node.child(property, ()),
            classes,
            parent: Some(Rc::new(self.clone())),
        })
    }

    /// Follows a dotted path such as `address.city`.
    pub fn path(&self, dotted: &str) -> Result<Self> {
        dotted
            .split('.')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .try_fold(self.clone(), |selector, segment| selector.child(segment))
    }

    /// The selector this one was reached from, `None` at the root.
    pub fn parent(&self) -> Option<&SchemaSelector<'r>> {
        self.parent.as_deref()
    }

    /// The root of this chain.
    pub fn root_selector(&self) -> &SchemaSelector<'r> {
        let mut cursor = self;
        while let Some(parent) = cursor.parent() {
            cursor = parent;
        }
        cursor
    }

    /// Classes a child of this selector is looked up in.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Mode recorded on built trees.
    pub fn mode(&self) -> SelectionMode {
        self.node.graph().mode()
    }

    /// Returns `true` when both selectors stand for the same graph node.
    pub fn same_node(&self, other: &SchemaSelector<'_>) -> bool {
        self.node.same_node(&other.node)
    }

    /// Builds the whole tree from the root, whatever node it is called on.
    pub fn build(&self) -> SelectionTree {
        self.node.build()
    }

    fn lookup(&self, property: &str) -> Result<&'r TypeRef> {
        let registry = self.registry;
        self.classes
            .iter()
            .find_map(|class| registry.property(class, property).ok())
            .map(|schema| &schema.element_type)
            .ok_or_else(|| ModelError::UnknownProperty {
                class: self.describe(),
                property: property.to_string(),
            })
    }

    fn describe(&self) -> String {
        match self.classes.as_slice() {
            [] => "<value>".to_string(),
            [single] => single.clone(),
            many => many.join("|"),
        }
    }
}

impl std::fmt::Debug for SchemaSelector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaSelector")
            .field("classes", &self.classes)
            .field("node", &self.node)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ClassSchema, PropertySchema, SchemaBundle};

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_bundle(
            SchemaBundle::new("1.0")
                .with_class(ClassSchema::new("Postcard").with_property(PropertySchema::text("text")))
                .with_class(ClassSchema::new("Magnet").with_property(PropertySchema::text("shape")))
                .with_class(
                    ClassSchema::new("Trip")
                        .with_property(PropertySchema::text("title"))
                        .with_property(PropertySchema::choice("souvenir", &["Postcard", "Magnet"]))
                        .with_property(PropertySchema::object("stops", "Trip").many()),
                ),
        )
        .unwrap()
    }

    #[test]
    fn test_choice_accepts_every_alternative() {
        let registry = registry();
        let select = SchemaSelector::root(&registry, "Trip").unwrap();
        let souvenir = select.child("souvenir").unwrap();
        souvenir.child("text").unwrap();
        souvenir.child("shape").unwrap();

        assert_eq!(
            select.build().paths(),
            vec!["souvenir.shape", "souvenir.text"]
        );
    }

    #[test]
    fn test_collection_selects_element_properties() {
        let registry = registry();
        let select = SchemaSelector::root(&registry, "Trip").unwrap();
        let tree = select.path("stops.stops.title").unwrap().build();
        assert_eq!(tree.paths(), vec!["stops.stops.title"]);
    }

    #[test]
    fn test_nothing_below_value_property() {
        let registry = registry();
        let title = SchemaSelector::root(&registry, "Trip")
            .unwrap()
            .child("title")
            .unwrap();
        assert!(title.classes().is_empty());
        assert!(matches!(
            title.child("length"),
            Err(ModelError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_unknown_root_class() {
        let registry = registry();
        assert!(matches!(
            SchemaSelector::root(&registry, "Train"),
            Err(ModelError::UnknownClass(_))
        ));
    }
}
