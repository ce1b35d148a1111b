//! Engine configuration.
//!
//! Controls how strictly selections are checked against the schema and
//! stores named selections that can be applied by name.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! strict_selection: true
//! selections:
//!   postal:
//!     mode: include
//!     paths:
//!       - address.city
//!       - destination
//!   anonymous:
//!     mode: exclude
//!     paths:
//!       - name
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use partial_copy_core::{SelectionMode, SelectionTree};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// A named selection: dotted property paths and the mode they apply in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPreset {
    /// Whether the paths are copied or left out.
    #[serde(default)]
    pub mode: SelectionMode,
    /// Dotted property paths, e.g. `address.city`.
    #[serde(default)]
    pub paths: Vec<String>,
}

impl SelectionPreset {
    /// Builds the selection tree for these paths.
    ///
    /// # Examples
    ///
    /// ```
    /// # use partial_copy_core::SelectionMode;
    /// # use partial_copy_model::SelectionPreset;
    /// let preset = SelectionPreset {
    ///     mode: SelectionMode::Include,
    ///     paths: vec!["address.city".into(), "destination".into()],
    /// };
    /// assert_eq!(preset.tree().to_string(), "{address{city},destination}");
    /// ```
    pub fn tree(&self) -> SelectionTree {
        SelectionTree::from_paths(self.mode, &self.paths)
    }
}

/// Top-level engine configuration, usually kept in a YAML file next to the
/// schema bundle.
///
/// # Examples
///
/// ```no_run
/// use partial_copy_model::EngineConfig;
///
/// let config = EngineConfig::load("partial-copy.yml").unwrap();
/// if let Some(preset) = config.selection("postal") {
///     println!("{} {}", preset.mode, preset.tree());
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Reject selections naming unknown properties. When `false` they are
    /// skipped with a warning.
    #[serde(default = "default_strict")]
    pub strict_selection: bool,
    /// Named selections.
    #[serde(default)]
    pub selections: BTreeMap<String, SelectionPreset>,
}

fn default_strict() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            strict_selection: true,
            selections: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ModelError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::ModelError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let config: Self = serde_yaml::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            presets = config.selections.len(),
            "loaded engine configuration"
        );
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ModelError::IoError) if the file cannot be
    /// written, or [`YamlError`](crate::ModelError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_yaml::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Looks a named selection up.
    pub fn selection(&self, name: &str) -> Option<&SelectionPreset> {
        self.selections.get(name)
    }

    /// Adds or replaces a named selection.
    pub fn with_selection<I, S>(mut self, name: &str, mode: SelectionMode, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths = paths.into_iter().map(Into::into).collect();
        self.selections
            .insert(name.to_string(), SelectionPreset { mode, paths });
        self
    }

    pub(crate) fn selection_trees(&self) -> BTreeMap<String, (SelectionTree, SelectionMode)> {
        self.selections
            .iter()
            .map(|(name, preset)| (name.clone(), (preset.tree(), preset.mode)))
            .collect()
    }
}
