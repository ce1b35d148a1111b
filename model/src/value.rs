//! Runtime object model.
//!
//! An [`Instance`] is an object of a schema class; its fields map property
//! names to [`Value`]s. A property without an entry is unset. Instances are
//! plain data: the schema is consulted by the operations that take a
//! [`SchemaRegistry`](crate::SchemaRegistry), not by the instance itself.
//!
//! Both serialize with [`serde`]; an instance is written as its class name
//! and its set fields:
//!
//! ```json
//! { "class": "City", "fields": { "town": "Porto", "postalCode": "4000" } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A property value.
///
/// # Examples
///
/// ```
/// use partial_copy_model::{Instance, Value};
///
/// let city = Instance::new("City").with("town", "Porto");
/// let value = Value::from(city);
/// assert_eq!(value.as_instance().map(Instance::class), Some("City"));
/// assert_eq!(Value::from(3_i64), Value::Int(3));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit null, also used for missing collection elements.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// Text.
    Text(String),
    /// Nested object.
    Object(Instance),
    /// Collection.
    List(Vec<Value>),
}

impl Value {
    /// Returns the nested object, if any.
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Self::Object(instance) => Some(instance),
            _ => None,
        }
    }

    /// Returns the text, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the elements of a collection, if any.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Instance> for Value {
    fn from(value: Instance) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// An object of a schema class.
///
/// # Examples
///
/// ```
/// use partial_copy_model::Instance;
///
/// let mut address = Instance::new("Address").with("street", "Main");
/// assert!(address.is_set("street"));
/// assert!(!address.is_set("city"));
///
/// address.set("city", Instance::new("City"));
/// assert_eq!(address.field_names().collect::<Vec<_>>(), vec!["city", "street"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Instance {
    class: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<String, Value>,
}

impl Instance {
    /// Creates an instance with no field set.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Sets a field and returns the instance. No schema check is made; use
    /// an [`InstanceBuilder`](crate::InstanceBuilder) for checked assembly.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Class of the instance.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Value of a field, `None` when unset.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Follows a dotted path of singular object fields.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut value = self.get(segments.next()?)?;
        for segment in segments {
            value = value.as_instance()?.get(segment)?;
        }
        Some(value)
    }

    /// Returns `true` when the field holds a value.
    pub fn is_set(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Sets a field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Unsets a field, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Names of the fields that are set, sorted.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterates over the fields that are set, sorted by name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}
