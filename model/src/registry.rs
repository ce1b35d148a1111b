//! Validated, indexed class schemas.
//!
//! [`SchemaRegistry`] is built from a [`SchemaBundle`] after validation and
//! answers the questions the copy engine, selectors and builders ask:
//! which properties a class has (inherited ones first), what a property's
//! type is, and whether one class may stand in for another.
//!
//! ```no_run
//! use partial_copy_model::SchemaRegistry;
//!
//! let registry = SchemaRegistry::load("schemas/travel.yaml").unwrap();
//! for property in registry.all_properties("Tourist").unwrap() {
//!     println!("{}: {}", property.name, property.element_type);
//! }
//! ```

use std::collections::{BTreeSet, HashMap};
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use crate::error::{ModelError, Result};
use crate::schema::{ClassSchema, PropertySchema, SchemaBundle, TypeRef};
use crate::validate::validate_bundle;

/// In-memory schema index with O(1) class lookup.
///
/// # Examples
///
/// ```
/// use partial_copy_model::*;
///
/// let bundle = SchemaBundle::new("1.0")
///     .with_class(ClassSchema::new("Person").with_property(PropertySchema::text("name")))
///     .with_class(
///         ClassSchema::new("Tourist")
///             .extends("Person")
///             .with_property(PropertySchema::text("destination")),
///     );
/// let registry = SchemaRegistry::from_bundle(bundle).unwrap();
///
/// assert_eq!(registry.property_names("Tourist").unwrap(), vec!["name", "destination"]);
/// assert!(registry.is_assignable("Tourist", "Person"));
/// assert!(!registry.is_assignable("Person", "Tourist"));
/// ```
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    version: String,
    classes: HashMap<String, ClassSchema>,
    order: Vec<String>,
}

impl SchemaRegistry {
    /// Validates `bundle` and indexes its classes.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validation`] with every problem found.
    pub fn from_bundle(bundle: SchemaBundle) -> Result<Self> {
        let errors = validate_bundle(&bundle);
        if !errors.is_empty() {
            return Err(ModelError::Validation(errors));
        }

        let order = bundle.classes.iter().map(|c| c.name.clone()).collect();
        let classes = bundle
            .classes
            .into_iter()
            .map(|c| (c.name.clone(), c))
            .collect();

        Ok(Self {
            version: bundle.version,
            classes,
            order,
        })
    }

    /// Loads a bundle from a `.json`, `.yaml` or `.yml` file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IoError`] if the file cannot be read,
    /// [`ModelError::JsonError`]/[`ModelError::YamlError`] if parsing fails,
    /// or [`ModelError::Validation`] for an invalid schema.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let bundle: SchemaBundle = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_reader(reader)?,
            _ => serde_json::from_reader(reader)?,
        };

        let registry = Self::from_bundle(bundle)?;
        info!(
            path = %path.display(),
            classes = registry.len(),
            version = %registry.version,
            "loaded schema bundle"
        );
        Ok(registry)
    }

    /// Parses and indexes a JSON bundle.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_bundle(serde_json::from_str(json)?)
    }

    /// Parses and indexes a YAML bundle.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::from_bundle(serde_yaml::from_str(yaml)?)
    }

    /// Bundle version the registry was built from.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` when the registry holds no class.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class names in bundle order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Looks a class up by name.
    pub fn class(&self, name: &str) -> Option<&ClassSchema> {
        self.classes.get(name)
    }

    /// Looks a class up by name, failing with [`ModelError::UnknownClass`].
    pub fn require(&self, name: &str) -> Result<&ClassSchema> {
        self.class(name)
            .ok_or_else(|| ModelError::UnknownClass(name.to_string()))
    }

    /// Returns `class` and its ancestors, root ancestor first.
    pub fn hierarchy(&self, class: &str) -> Result<Vec<&ClassSchema>> {
        let mut levels = vec![self.require(class)?];
        while let Some(superclass) = levels.last().copied().and_then(|c| c.superclass.as_deref()) {
            levels.push(self.require(superclass)?);
        }
        levels.reverse();
        Ok(levels)
    }

    /// Every property of `class`, inherited ones first.
    pub fn all_properties(&self, class: &str) -> Result<Vec<&PropertySchema>> {
        Ok(self
            .hierarchy(class)?
            .into_iter()
            .flat_map(|level| level.properties.iter())
            .collect())
    }

    /// Names of every property of `class`, inherited ones first.
    pub fn property_names(&self, class: &str) -> Result<Vec<&str>> {
        Ok(self
            .all_properties(class)?
            .into_iter()
            .map(|p| p.name.as_str())
            .collect())
    }

    /// Finds a property on `class` or one of its ancestors.
    pub fn property(&self, class: &str, name: &str) -> Result<&PropertySchema> {
        self.hierarchy(class)?
            .into_iter()
            .rev()
            .find_map(|level| level.declared(name))
            .ok_or_else(|| ModelError::UnknownProperty {
                class: class.to_string(),
                property: name.to_string(),
            })
    }

    /// Returns `true` when `class` is `target` or one of its subclasses.
    pub fn is_assignable(&self, class: &str, target: &str) -> bool {
        let mut cursor = self.class(class);
        while let Some(current) = cursor {
            if current.name == target {
                return true;
            }
            cursor = current
                .superclass
                .as_deref()
                .and_then(|name| self.class(name));
        }
        false
    }

    /// Returns `true` when an instance of `class` may be stored under a
    /// property of type `declared`.
    pub fn accepts(&self, declared: &TypeRef, class: &str) -> bool {
        declared
            .class_names()
            .into_iter()
            .any(|target| self.is_assignable(class, target))
    }

    /// Property names a selection may use below a property of type
    /// `declared` holding an instance of `runtime`: the runtime class's own
    /// properties plus, for choices, those of every alternative.
    pub fn selectable_names(&self, declared: Option<&TypeRef>, runtime: &str) -> Result<Vec<&str>> {
        let mut names: BTreeSet<&str> = self.property_names(runtime)?.into_iter().collect();
        if let Some(TypeRef::Choice(alternatives)) = declared {
            for alternative in alternatives {
                names.extend(self.property_names(alternative)?);
            }
        }
        Ok(names.into_iter().collect())
    }
}
