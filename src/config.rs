//! Project configuration.
//!
//! An optional `refmark.toml` names the input files, output directory and
//! style, and declares the figures and tables a manuscript may reference:
//!
//! ```toml
//! manuscript = "src/index.md"
//! bibliography = "src/references.md"
//!
//! [figures.overview]
//! caption = "System overview."
//!
//! [tables.results]
//! caption = "Main results."
//! content = "<table>...</table>"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::entries::{Entries, Figure, Table};

/// File looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "refmark.toml";
pub const DEFAULT_MANUSCRIPT: &str = "src/index.md";
pub const DEFAULT_BIBLIOGRAPHY: &str = "src/references.md";
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_STYLE: &str = "html";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Contents of a project file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub manuscript: Option<PathBuf>,
    pub bibliography: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    /// Builtin style name or path to a style TOML file.
    pub style: Option<String>,
    /// Stylesheet copied to the output directory instead of the bundled one.
    pub stylesheet: Option<PathBuf>,
    pub figures: BTreeMap<String, Figure>,
    pub tables: BTreeMap<String, Table>,
}

impl ProjectConfig {
    pub fn figure_entries(&self) -> Entries<Figure> {
        self.figures
            .iter()
            .map(|(tag, figure)| (tag.clone(), figure.clone()))
            .collect()
    }

    pub fn table_entries(&self) -> Entries<Table> {
        self.tables
            .iter()
            .map(|(tag, table)| (tag.clone(), table.clone()))
            .collect()
    }
}

/// Loads a project file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for a
/// project file.
pub fn load_config(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Loads `explicit` if given, otherwise `refmark.toml` from `dir` if it
/// exists, otherwise an empty config.
pub fn discover_config(explicit: Option<&Path>, dir: &Path) -> Result<ProjectConfig, ConfigError> {
    match explicit {
        Some(path) => load_config(path),
        None => {
            let candidate = dir.join(DEFAULT_CONFIG_FILE);
            if candidate.is_file() {
                load_config(&candidate)
            } else {
                Ok(ProjectConfig::default())
            }
        }
    }
}
