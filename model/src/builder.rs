//! Schema-checked builders for [`Instance`] graphs.
//!
//! [`InstanceBuilder`] composes the generic pieces of
//! `partial_copy_core::builder`: a [`Draft`] seeded with an instance of the
//! target class, per-property [`Slot`]s and [`ListSlot`]s, and a
//! [`ParentLink`] back to the builder that opened it. Every call is checked
//! against the [`SchemaRegistry`] before it is recorded.
//!
//! Assigned properties are written when the draft is built, inherited
//! properties before the ones declared by the class itself.

use std::collections::BTreeMap;

use partial_copy_core::{Build, Draft, ListSlot, ParentLink, Populate, Slot};
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::registry::SchemaRegistry;
use crate::schema::{PropertySchema, TypeRef};
use crate::value::{Instance, Value};

/// Recorded assignments of one builder.
#[derive(Debug, Clone, Default)]
pub struct InstanceState {
    class: String,
    levels: Vec<Vec<String>>,
    singles: BTreeMap<String, Slot<Value, ChildDraft>>,
    lists: BTreeMap<String, ListSlot<Value, ChildDraft>>,
}

impl InstanceState {
    fn for_class(registry: &SchemaRegistry, class: &str) -> Result<Self> {
        let levels = registry
            .hierarchy(class)?
            .into_iter()
            .map(|level| level.properties.iter().map(|p| p.name.clone()).collect())
            .collect();
        Ok(Self {
            class: class.to_string(),
            levels,
            ..Self::default()
        })
    }
}

impl Populate<Instance> for InstanceState {
    fn populate(mut self, product: &mut Instance) {
        for level in &self.levels {
            for name in level {
                if let Some(value) = self.singles.remove(name).and_then(Slot::resolve) {
                    product.set(name, value);
                }
                if let Some(items) = self.lists.remove(name).and_then(ListSlot::resolve) {
                    product.set(name, Value::List(items));
                }
            }
        }
    }
}

type InstanceDraft = Draft<InstanceState, Instance>;

/// A child builder's draft on its way back to the parent.
#[derive(Debug, Clone)]
pub struct ChildDraft {
    property: String,
    append: bool,
    draft: InstanceDraft,
}

impl ChildDraft {
    fn class(&self) -> &str {
        &self.draft.state().class
    }
}

impl Build for ChildDraft {
    type Product = Value;

    fn build(self) -> Value {
        Value::Object(self.draft.build())
    }
}

fn attach_child<P>(parent: &mut InstanceBuilder<'_, P>, child: ChildDraft) {
    let state = parent.draft.state_mut();
    if child.append {
        state
            .lists
            .entry(child.property.clone())
            .or_default()
            .add_builder(child);
    } else {
        state
            .singles
            .entry(child.property.clone())
            .or_default()
            .set_builder(child);
    }
}

#[derive(Debug, Clone, Default)]
struct Target {
    property: String,
    append: bool,
}

/// Builds an [`Instance`] of a registered class.
///
/// `P` is the builder that opened this one, `()` for a top-level builder.
/// [`end`](Self::end) hands the draft back and returns the parent;
/// [`build`](InstanceBuilder::build) finishes a top-level builder.
///
/// # Examples
///
/// ```
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
/// let address = InstanceBuilder::new(&registry, "Address")
///     .unwrap()
///     .with("street", "Rua Formosa")
///     .unwrap()
///     .with_child("city")
///     .unwrap()
///     .with("town", "Porto")
///     .unwrap()
///     .end()
///     .build();
///
/// assert_eq!(address.get_path("city.town").and_then(Value::as_text), Some("Porto"));
/// assert!(InstanceBuilder::new(&registry, "Address").unwrap().with("street", 7).is_err());
/// ```
#[derive(Debug)]
pub struct InstanceBuilder<'r, P = ()> {
    registry: &'r SchemaRegistry,
    target: Target,
    draft: InstanceDraft,
    link: ParentLink<P, ChildDraft>,
}

impl<'r> InstanceBuilder<'r, ()> {
    /// Starts an empty instance of `class`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownClass`] if the class is not registered.
    pub fn new(registry: &'r SchemaRegistry, class: &str) -> Result<Self> {
        Ok(Self::top_level(registry, fresh_draft(registry, class)?))
    }

    /// Starts from a copy of `instance`. Building without further calls
    /// yields an instance equal to it.
    pub fn copy_of(registry: &'r SchemaRegistry, instance: &Instance) -> Result<Self> {
        Ok(Self::top_level(
            registry,
            seeded_draft(registry, instance.clone())?,
        ))
    }

    fn top_level(registry: &'r SchemaRegistry, draft: InstanceDraft) -> Self {
        Self {
            registry,
            target: Target::default(),
            draft,
            link: ParentLink::detached(),
        }
    }

    /// Finishes the instance.
    pub fn build(self) -> Instance {
        self.draft.build()
    }
}

impl<'r, P> InstanceBuilder<'r, P> {
    /// Class being built.
    pub fn class(&self) -> &str {
        &self.draft.state().class
    }

    /// The builder this one returns to.
    pub fn parent(&self) -> &P {
        self.link.parent()
    }

    /// Assigns `property`. A [`Value::List`] replaces the contents of a
    /// collection property.
    ///
    /// # Errors
    ///
    /// Fails with [`ModelError::UnknownProperty`],
    /// [`ModelError::TypeMismatch`], or [`ModelError::NotSingular`] when a
    /// single value is given for a collection.
    pub fn with(mut self, property: &str, value: impl Into<Value>) -> Result<Self> {
        let schema = self.declared(property)?;
        let value = value.into();
        if schema.collection {
            let Value::List(items) = value else {
                return Err(self.not_singular(schema));
            };
            for item in &items {
                self.check_element(schema, item)?;
            }
            self.list_mut(property).replace(items);
        } else {
            self.check_element(schema, &value)?;
            self.draft
                .state_mut()
                .singles
                .entry(property.to_string())
                .or_default()
                .set(value);
        }
        Ok(self)
    }

    /// Appends to a collection property, keeping what a copied instance
    /// already holds.
    pub fn add(self, property: &str, value: impl Into<Value>) -> Result<Self> {
        self.add_all(property, [value])
    }

    /// Appends several values to a collection property.
    pub fn add_all<I, V>(mut self, property: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let schema = self.declared(property)?;
        if !schema.collection {
            return Err(self.not_collection(schema));
        }
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        for value in &values {
            self.check_element(schema, value)?;
        }
        self.list_mut(property).add_all(values);
        Ok(self)
    }

    /// Opens a builder for a single-valued object property.
    ///
    /// Calling it again on the same property continues the earlier child
    /// builder; on a copied instance it starts from the existing object.
    pub fn with_child(self, property: &str) -> Result<InstanceBuilder<'r, Self>> {
        self.open_child(property, None)
    }

    /// Like [`with_child`](Self::with_child), building a specific class,
    /// e.g. one alternative of a choice or a subclass.
    pub fn with_child_as(self, property: &str, class: &str) -> Result<InstanceBuilder<'r, Self>> {
        self.open_child(property, Some(class))
    }

    /// Opens a builder for a new element of a collection property.
    pub fn add_child(self, property: &str) -> Result<InstanceBuilder<'r, Self>> {
        self.open_element(property, None)
    }

    /// Like [`add_child`](Self::add_child), building a specific class.
    pub fn add_child_as(self, property: &str, class: &str) -> Result<InstanceBuilder<'r, Self>> {
        self.open_element(property, Some(class))
    }

    /// Hands this builder's draft to the parent and returns the parent.
    pub fn end(self) -> P {
        let Self {
            target,
            draft,
            link,
            ..
        } = self;
        link.finish(ChildDraft {
            property: target.property,
            append: target.append,
            draft,
        })
    }

    fn open_child(mut self, property: &str, requested: Option<&str>) -> Result<InstanceBuilder<'r, Self>> {
        let registry = self.registry;
        let schema = self.declared(property)?;
        if schema.collection {
            return Err(self.not_singular(schema));
        }
        self.check_buildable(schema, requested)?;

        let reopened = self
            .draft
            .state_mut()
            .singles
            .get_mut(property)
            .and_then(Slot::take_builder)
            .filter(|child| requested.is_none_or(|class| class == child.class()));

        let draft = match reopened {
            Some(child) => child.draft,
            None => match self
                .current_object(property)
                .filter(|current| requested.is_none_or(|class| class == current.class()))
            {
                Some(current) => seeded_draft(registry, current)?,
                None => fresh_draft(registry, self.child_class(schema, requested)?)?,
            },
        };
        Ok(self.child(property, false, draft))
    }

    fn open_element(mut self, property: &str, requested: Option<&str>) -> Result<InstanceBuilder<'r, Self>> {
        let registry = self.registry;
        let schema = self.declared(property)?;
        if !schema.collection {
            return Err(self.not_collection(schema));
        }
        self.check_buildable(schema, requested)?;

        let draft = fresh_draft(registry, self.child_class(schema, requested)?)?;
        self.list_mut(property);
        Ok(self.child(property, true, draft))
    }

    fn child(self, property: &str, append: bool, draft: InstanceDraft) -> InstanceBuilder<'r, Self> {
        debug!(
            parent = self.class(),
            property,
            class = %draft.state().class,
            "child builder opened"
        );
        InstanceBuilder {
            registry: self.registry,
            target: Target {
                property: property.to_string(),
                append,
            },
            draft,
            link: ParentLink::new(self, attach_child::<P>),
        }
    }

    fn declared(&self, property: &str) -> Result<&'r PropertySchema> {
        let registry = self.registry;
        registry.property(self.class(), property)
    }

    fn current_object(&self, property: &str) -> Option<Instance> {
        match self.draft.state().singles.get(property) {
            Some(Slot::Value(value)) => value.as_instance().cloned(),
            Some(Slot::Builder(_)) => None,
            Some(Slot::Unset) | None => self
                .draft
                .product()
                .and_then(|product| product.get(property))
                .and_then(Value::as_instance)
                .cloned(),
        }
    }

    fn list_mut(&mut self, property: &str) -> &mut ListSlot<Value, ChildDraft> {
        let existing = if self.draft.state().lists.contains_key(property) {
            None
        } else {
            self.draft
                .product()
                .and_then(|product| product.get(property))
                .and_then(Value::as_list)
                .map(<[Value]>::to_vec)
        };
        self.draft
            .state_mut()
            .lists
            .entry(property.to_string())
            .or_insert_with(|| {
                let mut slot = ListSlot::default();
                if let Some(items) = existing {
                    slot.replace(items);
                }
                slot
            })
    }

    fn child_class<'s>(&self, schema: &'s PropertySchema, requested: Option<&'s str>) -> Result<&'s str> {
        match (requested, &schema.element_type) {
            (Some(class), _) => Ok(class),
            (None, TypeRef::Class(class)) => Ok(class.as_str()),
            (None, declared) => Err(self.not_buildable(schema, &declared.to_string())),
        }
    }

    fn check_buildable(&self, schema: &PropertySchema, requested: Option<&str>) -> Result<()> {
        let declared = &schema.element_type;
        let buildable = declared.is_object()
            && requested.is_none_or(|class| self.registry.accepts(declared, class));
        if buildable {
            Ok(())
        } else {
            let requested = requested.map_or_else(|| declared.to_string(), str::to_string);
            Err(self.not_buildable(schema, &requested))
        }
    }

    fn check_element(&self, schema: &PropertySchema, value: &Value) -> Result<()> {
        let fits = match (&schema.element_type, value) {
            (_, Value::Null) => true,
            (TypeRef::Bool, Value::Bool(_))
            | (TypeRef::Int, Value::Int(_))
            | (TypeRef::Float, Value::Float(_) | Value::Int(_))
            | (TypeRef::Text, Value::Text(_)) => true,
            (TypeRef::Class(_) | TypeRef::Choice(_), Value::Object(instance)) => {
                self.registry.accepts(&schema.element_type, instance.class())
            }
            _ => false,
        };
        if fits {
            Ok(())
        } else {
            Err(ModelError::TypeMismatch {
                class: self.class().to_string(),
                property: schema.name.clone(),
                expected: schema.element_type.to_string(),
            })
        }
    }

    fn not_buildable(&self, schema: &PropertySchema, requested: &str) -> ModelError {
        ModelError::NotBuildable {
            class: self.class().to_string(),
            property: schema.name.clone(),
            requested: requested.to_string(),
        }
    }

    fn not_singular(&self, schema: &PropertySchema) -> ModelError {
        ModelError::NotSingular {
            class: self.class().to_string(),
            property: schema.name.clone(),
        }
    }

    fn not_collection(&self, schema: &PropertySchema) -> ModelError {
        ModelError::NotCollection {
            class: self.class().to_string(),
            property: schema.name.clone(),
        }
    }
}

fn fresh_draft(registry: &SchemaRegistry, class: &str) -> Result<InstanceDraft> {
    let state = InstanceState::for_class(registry, class)?;
    let mut draft = Draft::seeded(Instance::new(class));
    *draft.state_mut() = state;
    Ok(draft)
}

fn seeded_draft(registry: &SchemaRegistry, instance: Instance) -> Result<InstanceDraft> {
    let state = InstanceState::for_class(registry, instance.class())?;
    let mut draft = Draft::seeded(instance);
    *draft.state_mut() = state;
    Ok(draft)
}
