//! Schema-driven full and partial copies of [`Instance`] graphs.
//!
//! The engine walks an instance's properties in schema order (inherited
//! ones first), asks [`CopyScope::decide`] about each one and dispatches on
//! the value:
//!
//! - collections are copied element by element with the same scope, nulls
//!   included;
//! - objects of classes that allow partial copies continue the selection;
//! - objects of classes marked [`full_copy_only`](crate::ClassSchema::full_copy_only)
//!   are copied whole;
//! - everything else is cloned.
//!
//! Object graphs must be acyclic; a self-referencing graph does not
//! terminate.

use std::collections::BTreeMap;

use partial_copy_core::{CopyScope, Decision, SelectionMode, SelectionTree};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{ModelError, Result};
use crate::registry::SchemaRegistry;
use crate::schema::TypeRef;
use crate::value::{Instance, Value};

/// Copies instances according to a [`SchemaRegistry`].
///
/// # Examples
///
/// ```
/// use partial_copy_core::{SelectionMode, SelectionTree};
/// use partial_copy_model::*;
///
/// let registry = SchemaRegistry::from_bundle(
///     SchemaBundle::new("1.0").with_class(
///         ClassSchema::new("City")
///             .with_property(PropertySchema::text("town"))
///             .with_property(PropertySchema::text("postalCode")),
///     ),
/// )
/// .unwrap();
/// let engine = CopyEngine::new(&registry);
///
/// let city = Instance::new("City").with("town", "Porto").with("postalCode", "4000");
/// let tree = SelectionTree::from_paths(SelectionMode::Include, ["town"]);
///
/// let copy = engine.copy_only(&city, &tree).unwrap();
/// assert!(copy.is_set("town"));
/// assert!(!copy.is_set("postalCode"));
/// ```
#[derive(Debug, Clone)]
pub struct CopyEngine<'r> {
    registry: &'r SchemaRegistry,
    strict: bool,
    presets: BTreeMap<String, (SelectionTree, SelectionMode)>,
}

impl<'r> CopyEngine<'r> {
    /// Strict engine without presets.
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            strict: true,
            presets: BTreeMap::new(),
        }
    }

    /// Engine using the strictness and selection presets of `config`.
    pub fn from_config(registry: &'r SchemaRegistry, config: &EngineConfig) -> Self {
        Self {
            registry,
            strict: config.strict_selection,
            presets: config.selection_trees(),
        }
    }

    /// When `false`, selection entries naming unknown properties are skipped
    /// with a warning instead of failing the copy.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Registry the engine copies against.
    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    /// Unfiltered deep copy.
    ///
    /// # Errors
    ///
    /// Fails when the instance graph contains a class or field the registry
    /// does not know.
    pub fn create_copy(&self, instance: &Instance) -> Result<Instance> {
        self.copy_instance(instance, CopyScope::full(), None)
    }

    /// Copy filtered by `tree` under `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidSelection`] when a strict engine meets a
    /// tree node naming a property the object does not have.
    pub fn create_copy_with(
        &self,
        instance: &Instance,
        tree: &SelectionTree,
        mode: SelectionMode,
    ) -> Result<Instance> {
        self.copy_instance(instance, CopyScope::new(tree, mode), None)
    }

    /// Copies only what `tree` selects.
    pub fn copy_only(&self, instance: &Instance, tree: &SelectionTree) -> Result<Instance> {
        self.create_copy_with(instance, tree, SelectionMode::Include)
    }

    /// Copies everything except the leaves of `tree`.
    pub fn copy_except(&self, instance: &Instance, tree: &SelectionTree) -> Result<Instance> {
        self.create_copy_with(instance, tree, SelectionMode::Exclude)
    }

    /// Copies with a named selection from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownPreset`] when no preset has that name.
    pub fn copy_preset(&self, instance: &Instance, preset: &str) -> Result<Instance> {
        let (tree, mode) = self
            .presets
            .get(preset)
            .ok_or_else(|| ModelError::UnknownPreset(preset.to_string()))?;
        self.create_copy_with(instance, tree, *mode)
    }

    fn copy_instance(
        &self,
        instance: &Instance,
        scope: CopyScope<'_>,
        declared: Option<&TypeRef>,
    ) -> Result<Instance> {
        let class = instance.class();
        let properties = self.registry.all_properties(class)?;

        if let Some(unknown) = instance
            .field_names()
            .find(|name| !properties.iter().any(|p| p.name == *name))
        {
            return Err(ModelError::UnknownProperty {
                class: class.to_string(),
                property: unknown.to_string(),
            });
        }
        self.check_selection(scope, declared, class)?;

        let mut copy = Instance::new(class);
        for property in properties {
            let Some(value) = instance.get(&property.name) else {
                continue;
            };
            match scope.decide(&property.name) {
                Decision::Skip => {
                    debug!(class, property = %property.name, "property left out");
                }
                Decision::Copy(below) => {
                    let value =
                        self.copy_value(value, scope.descend(below), &property.element_type)?;
                    copy.set(&property.name, value);
                }
            }
        }
        Ok(copy)
    }

    fn copy_value(&self, value: &Value, scope: CopyScope<'_>, declared: &TypeRef) -> Result<Value> {
        match value {
            Value::List(items) => items
                .iter()
                .map(|item| self.copy_value(item, scope, declared))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            Value::Object(instance) => {
                let partial = self.registry.require(instance.class())?.partial_copy;
                let scope = if partial { scope } else { CopyScope::full() };
                self.copy_instance(instance, scope, Some(declared))
                    .map(Value::Object)
            }
            other => Ok(other.clone()),
        }
    }

    fn check_selection(
        &self,
        scope: CopyScope<'_>,
        declared: Option<&TypeRef>,
        class: &str,
    ) -> Result<()> {
        let Some(tree) = scope.selection() else {
            return Ok(());
        };
        if tree.is_leaf() {
            return Ok(());
        }

        let known = self.registry.selectable_names(declared, class)?;
        if self.strict {
            tree.ensure_known(class, &known)?;
        } else {
            for property in tree.unknown_names(&known) {
                warn!(class, property, "ignoring unknown property in selection");
            }
        }
        Ok(())
    }
}
