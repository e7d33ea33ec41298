//! # Configuration Module
//!
//! The canonical in-memory form of a process description and the two front ends that
//! produce it.
//!
//! A document can be written as nested TOML tables or as indented YAML mappings. Each
//! front end lowers its own syntax into a neutral ordered value tree, and a single schema
//! interpreter validates that tree into a [`ConfigurationDocument`]. The same logical
//! document therefore yields equal values whichever encoding it was written in.
//!
//! ```ignore
//! use oadkit::core::config::{parse_document, ConfigFormat};
//!
//! let doc = parse_document(r#"
//! model:
//!   geometry:
//!     id: fastoad.geometry.legacy
//! "#, ConfigFormat::Yaml)?;
//! ```

pub mod document;
pub mod path;
mod raw;
mod schema;
mod toml_format;
pub mod value;
mod yaml_format;

pub use document::{
    ComponentConfig, ConfigurationDocument, ConfigurationNode, GroupConfig, OptimizationSpec,
    VariableEntry,
};
pub use path::KeyPath;
pub use value::ScalarValue;

use crate::core::error::AssemblyError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// The two interchangeable encodings of a process description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Picks the encoding from a file extension (`.toml`, `.yaml`, `.yml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        ext.parse().ok()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Yaml => "yml",
        }
    }
}

impl FromStr for ConfigFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toml" => Ok(ConfigFormat::Toml),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            other => Err(format!(
                "Unknown configuration format '{other}'. Expected 'toml' or 'yaml'."
            )),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Toml => f.write_str("TOML"),
            ConfigFormat::Yaml => f.write_str("YAML"),
        }
    }
}

const BUNDLED_TOML: &str = include_str!("../../../data/sample_process.toml");
const BUNDLED_YAML: &str = include_str!("../../../data/sample_process.yml");

/// A complete, assemblable process description using only built-in components.
pub fn sample_document(format: ConfigFormat) -> &'static str {
    match format {
        ConfigFormat::Toml => BUNDLED_TOML,
        ConfigFormat::Yaml => BUNDLED_YAML,
    }
}

/// Parses a process description held in memory.
pub fn parse_document(text: &str, format: ConfigFormat) -> Result<ConfigurationDocument, AssemblyError> {
    let raw = match format {
        ConfigFormat::Toml => toml_format::lower(text)?,
        ConfigFormat::Yaml => yaml_format::lower(text)?,
    };
    schema::interpret(raw)
}

/// Reads and parses a process description file, choosing the encoding from its extension.
///
/// The returned document remembers the file's directory so that relative module folders
/// and input/output paths resolve against it.
pub fn load_document(path: &Path) -> Result<ConfigurationDocument, AssemblyError> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| AssemblyError::MalformedConfiguration {
        path: KeyPath::root(),
        expected: format!(
            "a '.toml', '.yaml' or '.yml' file extension (got '{}')",
            path.display()
        ),
    })?;
    load_document_as(path, format)
}

/// Like [`load_document`] with an explicit encoding.
pub fn load_document_as(path: &Path, format: ConfigFormat) -> Result<ConfigurationDocument, AssemblyError> {
    debug!("Loading {} configuration from {:?}", format, path);
    let content = std::fs::read_to_string(path).map_err(|e| AssemblyError::MalformedConfiguration {
        path: KeyPath::root(),
        expected: format!("a readable configuration file at '{}' ({e})", path.display()),
    })?;
    let mut document = parse_document(&content, format)?;
    document.base_dir = Some(
        path.parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    );
    Ok(document)
}
