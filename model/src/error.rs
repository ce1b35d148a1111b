//! Error types for schema-driven operations.
//!
//! Covers loading (I/O, JSON, YAML), schema validation, selections that do
//! not match the schema, and builder calls that contradict it.

use partial_copy_core::SelectionError;
use thiserror::Error;

use crate::validate::SchemaError;

/// Errors that can occur while loading schemas or working with instances.
#[derive(Debug, Error)]
pub enum ModelError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The schema bundle failed validation.
    #[error("invalid schema: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Validation(Vec<SchemaError>),

    /// A selection tree names a property the object does not have.
    #[error(transparent)]
    InvalidSelection(#[from] SelectionError),

    /// A class name is not in the registry.
    #[error("unknown class: {0}")]
    UnknownClass(String),

    /// A property name is not declared by a class or its ancestors.
    #[error("unknown property {property} on class {class}")]
    UnknownProperty {
        /// Class looked in.
        class: String,
        /// Missing property.
        property: String,
    },

    /// A value does not fit the declared property type.
    #[error("property {class}.{property} expects {expected}")]
    TypeMismatch {
        /// Declaring class.
        class: String,
        /// Property name.
        property: String,
        /// Declared type, rendered.
        expected: String,
    },

    /// A child builder was requested for a property that does not hold
    /// class instances, or for a class it cannot hold.
    #[error("property {class}.{property} cannot be built as {requested}")]
    NotBuildable {
        /// Declaring class.
        class: String,
        /// Property name.
        property: String,
        /// Requested class, or the declared type when none was requested.
        requested: String,
    },

    /// `add` was used on a singular property.
    #[error("property {class}.{property} is not a collection")]
    NotCollection {
        /// Declaring class.
        class: String,
        /// Property name.
        property: String,
    },

    /// A single value was assigned to a collection property.
    #[error("property {class}.{property} is a collection")]
    NotSingular {
        /// Declaring class.
        class: String,
        /// Property name.
        property: String,
    },

    /// A named selection is not defined in the configuration.
    #[error("unknown selection preset: {0}")]
    UnknownPreset(String),
}

/// Convenience alias for results with [`ModelError`].
pub type Result<T> = std::result::Result<T, ModelError>;
