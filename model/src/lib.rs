//! Class schemas, runtime instances, and schema-driven partial copies.
//!
//! Where `partial_copy_core` serves types generated from a schema, this
//! crate works from the schema itself: a [`SchemaBundle`] (JSON or YAML) is
//! validated into a [`SchemaRegistry`], and [`Instance`] graphs of those
//! classes can be copied ([`CopyEngine`]), selected ([`SchemaSelector`]) and
//! built ([`InstanceBuilder`]) with every step checked against it.
//!
//! # Quick start
//!
//! ```no_run
//! use partial_copy_model::{CopyEngine, EngineConfig, Instance, SchemaRegistry, SchemaSelector};
//!
//! let registry = SchemaRegistry::load("schemas/travel.yml").unwrap();
//! let config = EngineConfig::load("partial-copy.yml").unwrap();
//! let engine = CopyEngine::from_config(&registry, &config);
//!
//! let tourist = Instance::new("Tourist").with("name", "Ana");
//! let tree = SchemaSelector::root(&registry, "Tourist")
//!     .unwrap()
//!     .path("address.city")
//!     .unwrap()
//!     .build();
//!
//! let postal = engine.copy_only(&tourist, &tree).unwrap();
//! let anonymous = engine.copy_preset(&tourist, "anonymous").unwrap();
//! ```

mod builder;
mod config;
mod copy;
mod error;
mod registry;
mod schema;
mod selector;
mod validate;
mod value;

pub use builder::InstanceBuilder;
pub use config::{EngineConfig, SelectionPreset};
pub use copy::CopyEngine;
pub use error::{ModelError, Result};
pub use registry::SchemaRegistry;
pub use schema::{ClassSchema, PropertySchema, SchemaBundle, TypeRef};
pub use selector::SchemaSelector;
pub use validate::{SchemaError, validate_bundle};
pub use value::{Instance, Value};
