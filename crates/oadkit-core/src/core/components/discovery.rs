//! Component manifests found in user-declared module folders.
//!
//! Every `*.toml`, `*.yaml` or `*.yml` file below a module folder is a manifest declaring
//! one or more components:
//!
//! ```toml
//! [[component]]
//! id = "acme.aerodynamics.polar"
//! description = "Drag polar from tabulated data"
//! inputs = ["data:geometry:wing:area"]
//! outputs = ["data:aerodynamics:cd0"]
//! requires = ["polar.csv"]
//!
//! [[component.option]]
//! name = "k_factor"
//! kind = "float"
//! default = 1.0
//! lower = 0.0
//! ```
//!
//! Manifests are data only. Nothing is executed while scanning.

use super::component::{ComponentSchema, OptionKind, OptionSchema, OptionValueError};
use crate::core::config::value::ScalarValue;
use crate::core::error::AssemblyError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

const MANIFEST_EXTENSIONS: [&str; 3] = ["toml", "yaml", "yml"];

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Folder '{path}' does not exist")]
    MissingFolder { path: String },
    #[error("'{path}' is not a directory")]
    NotADirectory { path: String },
    #[error("Directory traversal error: {source}")]
    Walk {
        #[from]
        source: walkdir::Error,
    },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("YAML parsing error for '{path}': {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("Invalid default for option '{option}' of component '{component}' in '{path}': {source}")]
    InvalidDefault {
        path: String,
        component: String,
        option: String,
        source: OptionValueError,
    },
    #[error("Invalid manifest '{path}': {reason}")]
    Invalid { path: String, reason: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    #[serde(default)]
    component: Vec<ManifestComponent>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestComponent {
    id: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    inputs: Vec<String>,
    #[serde(default)]
    outputs: Vec<String>,
    #[serde(default)]
    requires: Vec<PathBuf>,
    #[serde(default)]
    option: Vec<ManifestOption>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestOption {
    name: String,
    kind: OptionKind,
    default: Option<ManifestScalar>,
    lower: Option<f64>,
    upper: Option<f64>,
    #[serde(default)]
    allowed: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestScalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl From<ManifestScalar> for ScalarValue {
    fn from(value: ManifestScalar) -> Self {
        match value {
            ManifestScalar::Bool(b) => ScalarValue::Bool(b),
            ManifestScalar::Integer(i) => ScalarValue::Integer(i),
            ManifestScalar::Float(x) => ScalarValue::Float(x),
            ManifestScalar::String(s) => ScalarValue::String(s),
        }
    }
}

/// Reads every manifest below `resolved` and returns the declared components with the
/// manifest each came from, in a deterministic order.
///
/// `declared` is the folder as written in the configuration; errors name it.
pub(crate) fn scan_folder(
    declared: &Path,
    resolved: &Path,
) -> Result<Vec<(PathBuf, ComponentSchema)>, AssemblyError> {
    let fail = |source: ManifestError| AssemblyError::Discovery {
        folder: declared.to_path_buf(),
        source,
    };

    if !resolved.exists() {
        return Err(fail(ManifestError::MissingFolder {
            path: resolved.display().to_string(),
        }));
    }
    if !resolved.is_dir() {
        return Err(fail(ManifestError::NotADirectory {
            path: resolved.display().to_string(),
        }));
    }

    let mut manifests = Vec::new();
    for entry in WalkDir::new(resolved) {
        let entry = entry.map_err(|e| fail(ManifestError::from(e)))?;
        let is_manifest = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if is_manifest {
            manifests.push(entry.into_path());
        }
    }
    manifests.sort();

    let mut components = Vec::new();
    for manifest in manifests {
        debug!("Reading component manifest {:?}", manifest);
        for schema in load_manifest(&manifest).map_err(fail)? {
            components.push((manifest.clone(), schema));
        }
    }
    Ok(components)
}

fn load_manifest(path: &Path) -> Result<Vec<ComponentSchema>, ManifestError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: display.clone(),
        source,
    })?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let file: ManifestFile = if is_toml {
        toml::from_str(&content).map_err(|source| ManifestError::Toml {
            path: display.clone(),
            source,
        })?
    } else {
        serde_yaml::from_str(&content).map_err(|source| ManifestError::Yaml {
            path: display.clone(),
            source,
        })?
    };

    if file.component.is_empty() {
        return Err(ManifestError::Invalid {
            path: display,
            reason: "no components declared".to_string(),
        });
    }

    let manifest_dir = path.parent().unwrap_or(Path::new(""));
    file.component
        .into_iter()
        .map(|c| to_schema(c, manifest_dir, &display))
        .collect()
}

fn to_schema(
    component: ManifestComponent,
    manifest_dir: &Path,
    manifest: &str,
) -> Result<ComponentSchema, ManifestError> {
    let invalid = |reason: String| ManifestError::Invalid {
        path: manifest.to_string(),
        reason,
    };

    if component.id.trim().is_empty() || component.id.chars().any(char::is_whitespace) {
        return Err(invalid(format!("invalid component id '{}'", component.id)));
    }

    let inputs: Vec<&str> = component.inputs.iter().map(String::as_str).collect();
    let outputs: Vec<&str> = component.outputs.iter().map(String::as_str).collect();
    let mut schema = ComponentSchema::new(&component.id)
        .describe(&component.description)
        .inputs(&inputs)
        .outputs(&outputs);

    for resource in component.requires {
        let resolved = if resource.is_relative() {
            manifest_dir.join(resource)
        } else {
            resource
        };
        schema = schema.requires(resolved);
    }

    for option in component.option {
        if schema.options.iter().any(|o| o.name == option.name) {
            return Err(invalid(format!(
                "component '{}' declares option '{}' twice",
                component.id, option.name
            )));
        }
        if let Some(bound) = [option.lower, option.upper].into_iter().flatten().find(|b| !b.is_finite()) {
            return Err(invalid(format!(
                "option '{}' of component '{}' has a non-finite bound {bound}",
                option.name, component.id
            )));
        }
        if let (Some(lower), Some(upper)) = (option.lower, option.upper) {
            if lower > upper {
                return Err(invalid(format!(
                    "option '{}' of component '{}' has lower bound {lower} above upper bound {upper}",
                    option.name, component.id
                )));
            }
        }
        let mut option_schema = OptionSchema::new(&option.name, option.kind)
            .with_range(option.lower, option.upper);
        option_schema.allowed = option.allowed;
        if let Some(default) = option.default {
            let default = ScalarValue::from(default);
            let checked =
                option_schema
                    .check(&default)
                    .map_err(|source| ManifestError::InvalidDefault {
                        path: manifest.to_string(),
                        component: component.id.clone(),
                        option: option.name.clone(),
                        source,
                    })?;
            option_schema.default = Some(checked);
        }
        schema = schema.option(option_schema);
    }

    Ok(schema)
}
