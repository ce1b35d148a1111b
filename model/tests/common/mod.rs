#![allow(dead_code)]

use std::path::PathBuf;

use partial_copy_model::{Instance, SchemaRegistry, Value};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn registry() -> SchemaRegistry {
    SchemaRegistry::load(fixture("travel.yml")).unwrap()
}

pub fn city(town: &str, postal_code: &str) -> Instance {
    Instance::new("City")
        .with("town", town)
        .with("postalCode", postal_code)
}

pub fn sample_tourist() -> Instance {
    Instance::new("Tourist")
        .with("name", "Ana")
        .with("age", 34)
        .with(
            "passport",
            Instance::new("Passport")
                .with("number", "P-1234")
                .with("country", "PT"),
        )
        .with("destination", "Lisbon")
        .with(
            "address",
            Instance::new("Address")
                .with("street", "Rua das Flores")
                .with("city", city("Porto", "4000")),
        )
        .with(
            "visited",
            Value::List(vec![
                city("Coimbra", "3000").into(),
                Value::Null,
                city("Braga", "4700").into(),
            ]),
        )
        .with("tags", vec!["beach", "food"])
        .with(
            "souvenir",
            Instance::new("Postcard")
                .with("text", "Greetings")
                .with("city", city("Faro", "8000")),
        )
}

/// Dotted paths to every non-null leaf value, list elements flattened
/// into their property.
pub fn populated_paths(instance: &Instance) -> Vec<String> {
    fn walk(prefix: &str, value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(instance) => {
                for (name, value) in instance.fields() {
                    walk(&format!("{prefix}{name}."), value, out);
                }
            }
            Value::List(items) => {
                for item in items {
                    walk(prefix, item, out);
                }
            }
            Value::Null => {}
            _ => out.push(prefix.trim_end_matches('.').to_string()),
        }
    }

    let mut out = Vec::new();
    walk("", &Value::Object(instance.clone()), &mut out);
    out.sort();
    out.dedup();
    out
}
