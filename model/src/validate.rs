//! Schema bundle validation.
//!
//! Catches structural problems such as duplicate classes, unknown
//! superclasses or property types, inheritance cycles, and properties
//! redeclared along an inheritance chain, before a registry is built.
//!
//! # Examples
//!
//! ```
//! use partial_copy_model::*;
//!
//! let bundle = SchemaBundle::new("1.0")
//!     .with_class(ClassSchema::new("City").with_property(PropertySchema::text("town")));
//! assert!(validate_bundle(&bundle).is_empty());
//!
//! // Address refers to a class the bundle does not define
//! let bad = SchemaBundle::new("1.0")
//!     .with_class(ClassSchema::new("Address").with_property(PropertySchema::object("city", "City")));
//! assert!(!validate_bundle(&bad).is_empty());
//! ```

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::{ClassSchema, SchemaBundle, TypeRef};

/// Schema validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Bundle version string is empty.
    #[error("bundle version cannot be empty")]
    EmptyBundleVersion,
    /// A class name is empty or whitespace-only.
    #[error("class name cannot be empty")]
    EmptyClassName,
    /// Two classes share a name.
    #[error("duplicate class: {0}")]
    DuplicateClass(String),
    /// A property name is empty.
    #[error("empty property name in class {0}")]
    EmptyPropertyName(String),
    /// A class or property name starts or ends with whitespace.
    #[error("name has surrounding whitespace: {0:?}")]
    UntrimmedName(String),
    /// A class refers to a superclass the bundle does not define.
    #[error("class {class} extends unknown class {superclass}")]
    UnknownSuperclass {
        /// Offending class.
        class: String,
        /// Missing superclass.
        superclass: String,
    },
    /// A chain of superclasses loops back on itself.
    #[error("inheritance cycle: {0}")]
    InheritanceCycle(String),
    /// A property name appears twice in a class or along its ancestors.
    #[error("duplicate property {property} in class {class}")]
    DuplicateProperty {
        /// Class redeclaring the property.
        class: String,
        /// Property name.
        property: String,
    },
    /// A property refers to a class the bundle does not define.
    #[error("property {class}.{property} refers to unknown class {type_name}")]
    UnknownType {
        /// Declaring class.
        class: String,
        /// Property name.
        property: String,
        /// Missing class.
        type_name: String,
    },
    /// A choice property lists no alternatives.
    #[error("choice property {class}.{property} has no alternatives")]
    EmptyChoice {
        /// Declaring class.
        class: String,
        /// Property name.
        property: String,
    },
}

/// Validates a schema bundle.
///
/// Stops at the first class with a problem; an empty result means the
/// bundle is valid.
pub fn validate_bundle(bundle: &SchemaBundle) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    if bundle.version.trim().is_empty() {
        errors.push(SchemaError::EmptyBundleVersion);
        return errors;
    }

    let mut by_name: HashMap<&str, &ClassSchema> = HashMap::new();
    for class in &bundle.classes {
        let name = class.name.trim();
        if name.is_empty() {
            errors.push(SchemaError::EmptyClassName);
            return errors;
        }
        if name != class.name {
            errors.push(SchemaError::UntrimmedName(class.name.clone()));
            return errors;
        }
        if by_name.insert(name, class).is_some() {
            errors.push(SchemaError::DuplicateClass(name.to_string()));
            return errors;
        }
    }

    for class in &bundle.classes {
        errors.extend(validate_class(class, &by_name));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

fn validate_class<'a>(
    class: &'a ClassSchema,
    by_name: &HashMap<&'a str, &'a ClassSchema>,
) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    // walk the ancestors first: later checks rely on an acyclic chain
    let mut chain = vec![class.name.as_str()];
    let mut cursor = class;
    while let Some(superclass) = cursor.superclass.as_deref() {
        let Some(next) = by_name.get(superclass) else {
            errors.push(SchemaError::UnknownSuperclass {
                class: cursor.name.clone(),
                superclass: superclass.to_string(),
            });
            return errors;
        };
        if chain.contains(&superclass) {
            let path = chain
                .iter()
                .copied()
                .chain(std::iter::once(superclass))
                .collect::<Vec<_>>()
                .join(" -> ");
            errors.push(SchemaError::InheritanceCycle(path));
            return errors;
        }
        chain.push(superclass);
        cursor = *next;
    }

    let mut inherited: HashSet<&str> = HashSet::new();
    for ancestor in chain.iter().skip(1).filter_map(|name| by_name.get(name)) {
        inherited.extend(ancestor.properties.iter().map(|p| p.name.as_str()));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for property in &class.properties {
        let name = property.name.trim();
        if name.is_empty() {
            errors.push(SchemaError::EmptyPropertyName(class.name.clone()));
            return errors;
        }
        if name != property.name {
            errors.push(SchemaError::UntrimmedName(property.name.clone()));
            return errors;
        }
        if !seen.insert(name) || inherited.contains(name) {
            errors.push(SchemaError::DuplicateProperty {
                class: class.name.clone(),
                property: name.to_string(),
            });
            return errors;
        }

        if let TypeRef::Choice(alternatives) = &property.element_type {
            if alternatives.is_empty() {
                errors.push(SchemaError::EmptyChoice {
                    class: class.name.clone(),
                    property: name.to_string(),
                });
                return errors;
            }
        }
        if let Some(missing) = property
            .element_type
            .class_names()
            .into_iter()
            .find(|type_name| !by_name.contains_key(type_name))
        {
            errors.push(SchemaError::UnknownType {
                class: class.name.clone(),
                property: name.to_string(),
                type_name: missing.to_string(),
            });
            return errors;
        }
    }

    errors
}
