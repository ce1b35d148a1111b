//! Class schema types.
//!
//! A schema lists classes, each with an optional superclass and an ordered
//! list of properties. The types serialize with [`serde`] so bundles can be
//! kept as JSON or YAML files:
//!
//! ```yaml
//! version: "1.0"
//! classes:
//!   - name: City
//!     properties:
//!       - { name: town, type: text }
//!       - { name: postalCode, type: text }
//!   - name: Address
//!     properties:
//!       - { name: street, type: text }
//!       - { name: city, type: { class: City } }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Element type of a property.
///
/// # Examples
///
/// ```
/// use partial_copy_model::TypeRef;
///
/// assert_eq!(TypeRef::Text.to_string(), "text");
/// assert_eq!(TypeRef::class("City").to_string(), "City");
/// assert_eq!(TypeRef::choice(["Postcard", "Magnet"]).to_string(), "Postcard | Magnet");
/// assert!(TypeRef::class("City").is_object());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeRef {
    /// `true` / `false`.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    /// UTF-8 text.
    Text,
    /// Instance of a schema class (or one of its subclasses).
    Class(String),
    /// Instance of one of several alternative classes.
    Choice(Vec<String>),
}

impl TypeRef {
    /// Shorthand for [`TypeRef::Class`].
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    /// Shorthand for [`TypeRef::Choice`].
    pub fn choice<I, S>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Choice(alternatives.into_iter().map(Into::into).collect())
    }

    /// Returns `true` for class and choice types.
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Class(_) | Self::Choice(_))
    }

    /// Class names this type refers to.
    pub fn class_names(&self) -> Vec<&str> {
        match self {
            Self::Class(name) => vec![name.as_str()],
            Self::Choice(names) => names.iter().map(String::as_str).collect(),
            Self::Bool | Self::Int | Self::Float | Self::Text => Vec::new(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Text => f.write_str("text"),
            Self::Class(name) => f.write_str(name),
            Self::Choice(names) => f.write_str(&names.join(" | ")),
        }
    }
}

/// A declared property.
///
/// # Examples
///
/// ```
/// use partial_copy_model::{PropertySchema, TypeRef};
///
/// let visited = PropertySchema::object("visited", "City").many();
/// assert!(visited.collection);
/// assert_eq!(visited.element_type, TypeRef::class("City"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    /// Property name, unique within the class and its ancestors.
    pub name: String,
    /// Type of the property, or of each element for collections.
    #[serde(rename = "type")]
    pub element_type: TypeRef,
    /// Whether the property holds a list of elements.
    #[serde(default)]
    pub collection: bool,
}

impl PropertySchema {
    /// Creates a singular property.
    pub fn new(name: &str, element_type: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            element_type,
            collection: false,
        }
    }

    /// Creates a text property.
    pub fn text(name: &str) -> Self {
        Self::new(name, TypeRef::Text)
    }

    /// Creates an integer property.
    pub fn int(name: &str) -> Self {
        Self::new(name, TypeRef::Int)
    }

    /// Creates a property holding an instance of `class`.
    pub fn object(name: &str, class: &str) -> Self {
        Self::new(name, TypeRef::class(class))
    }

    /// Creates a choice property.
    pub fn choice(name: &str, alternatives: &[&str]) -> Self {
        Self::new(name, TypeRef::choice(alternatives.iter().copied()))
    }

    /// Marks the property as a collection.
    pub fn many(mut self) -> Self {
        self.collection = true;
        self
    }
}

/// A schema class.
///
/// # Examples
///
/// ```
/// use partial_copy_model::{ClassSchema, PropertySchema};
///
/// let tourist = ClassSchema::new("Tourist")
///     .extends("Person")
///     .with_property(PropertySchema::text("destination"));
/// assert_eq!(tourist.superclass.as_deref(), Some("Person"));
/// assert!(tourist.declares("destination"));
/// assert!(!tourist.declares("name"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSchema {
    /// Class name.
    pub name: String,
    /// Direct superclass, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    /// Properties declared by this class, in declaration order.
    #[serde(default)]
    pub properties: Vec<PropertySchema>,
    /// Whether a copy may continue a selection below instances of this class.
    /// When `false`, instances are always copied whole.
    #[serde(default = "default_partial_copy")]
    pub partial_copy: bool,
}

fn default_partial_copy() -> bool {
    true
}

impl ClassSchema {
    /// Creates a class without properties.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            superclass: None,
            properties: Vec::new(),
            partial_copy: true,
        }
    }

    /// Sets the superclass.
    pub fn extends(mut self, superclass: &str) -> Self {
        self.superclass = Some(superclass.to_string());
        self
    }

    /// Adds a property.
    pub fn with_property(mut self, property: PropertySchema) -> Self {
        self.properties.push(property);
        self
    }

    /// Marks the class as copyable only as a whole.
    pub fn full_copy_only(mut self) -> Self {
        self.partial_copy = false;
        self
    }

    /// Returns `true` when this class itself declares `name`.
    pub fn declares(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    /// Finds a property declared by this class itself.
    pub fn declared(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Versioned set of classes, the unit schemas are stored and loaded in.
///
/// # Examples
///
/// ```
/// use partial_copy_model::{ClassSchema, SchemaBundle};
///
/// let mut bundle = SchemaBundle::new("1.0");
/// bundle.classes.push(ClassSchema::new("City"));
/// assert_eq!(bundle.class_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaBundle {
    /// Bundle format version.
    pub version: String,
    /// Classes in declaration order.
    #[serde(default)]
    pub classes: Vec<ClassSchema>,
}

impl SchemaBundle {
    /// Creates an empty bundle.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            classes: Vec::new(),
        }
    }

    /// Adds a class.
    pub fn with_class(mut self, class: ClassSchema) -> Self {
        self.classes.push(class);
        self
    }

    /// Number of classes in the bundle.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}
