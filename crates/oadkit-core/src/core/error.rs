use crate::core::components::component::{ConstructionError, OptionValueError};
use crate::core::components::discovery::ManifestError;
use crate::core::components::registry::Origin;
use crate::core::config::path::KeyPath;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The part an optimization entry plays in the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableRole {
    DesignVariable,
    Constraint,
    Objective,
}

impl fmt::Display for VariableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VariableRole::DesignVariable => "design variable",
            VariableRole::Constraint => "constraint",
            VariableRole::Objective => "objective",
        })
    }
}

/// Stable, printable names of the [`AssemblyError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedConfiguration,
    DuplicateIdentifier,
    DiscoveryError,
    UnknownComponent,
    UnsupportedOption,
    InvalidOptionValue,
    ComponentConstructionFailed,
    UnknownVariable,
    InvalidBounds,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Every failure of the assembly pipeline, from parsing to optimization binding.
///
/// All stages return this type so that an error reaches the caller exactly as the
/// originating stage produced it.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Malformed configuration at {path}: expected {expected}")]
    MalformedConfiguration { path: KeyPath, expected: String },

    #[error("Component identifier '{identifier}' is already registered ({existing}); refusing registration from {incoming}")]
    DuplicateIdentifier {
        identifier: String,
        existing: Origin,
        incoming: Origin,
    },

    #[error("Component discovery failed for module folder '{}': {source}", folder.display())]
    Discovery {
        folder: PathBuf,
        #[source]
        source: ManifestError,
    },

    #[error("Unknown component '{identifier}' at {path}{}", suggestion_hint(.suggestions))]
    UnknownComponent {
        identifier: String,
        path: KeyPath,
        suggestions: Vec<String>,
    },

    #[error("Component '{identifier}' at {path} does not support option '{option}'")]
    UnsupportedOption {
        identifier: String,
        option: String,
        path: KeyPath,
    },

    #[error("Invalid value for option '{option}' of component '{identifier}' at {path}: {reason}")]
    InvalidOptionValue {
        identifier: String,
        option: String,
        path: KeyPath,
        reason: OptionValueError,
    },

    #[error("Construction of component '{identifier}' at {path} failed: {source}")]
    ComponentConstructionFailed {
        identifier: String,
        path: KeyPath,
        #[source]
        source: ConstructionError,
    },

    #[error("Unknown variable '{name}' referenced as {role}: no component in the model declares it")]
    UnknownVariable { name: String, role: VariableRole },

    #[error("Invalid bounds for {role} '{name}': lower ({lower}) exceeds upper ({upper})")]
    InvalidBounds {
        name: String,
        role: VariableRole,
        lower: f64,
        upper: f64,
    },
}

fn suggestion_hint(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean one of: {}?)", suggestions.join(", "))
    }
}

impl AssemblyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AssemblyError::MalformedConfiguration { .. } => ErrorKind::MalformedConfiguration,
            AssemblyError::DuplicateIdentifier { .. } => ErrorKind::DuplicateIdentifier,
            AssemblyError::Discovery { .. } => ErrorKind::DiscoveryError,
            AssemblyError::UnknownComponent { .. } => ErrorKind::UnknownComponent,
            AssemblyError::UnsupportedOption { .. } => ErrorKind::UnsupportedOption,
            AssemblyError::InvalidOptionValue { .. } => ErrorKind::InvalidOptionValue,
            AssemblyError::ComponentConstructionFailed { .. } => {
                ErrorKind::ComponentConstructionFailed
            }
            AssemblyError::UnknownVariable { .. } => ErrorKind::UnknownVariable,
            AssemblyError::InvalidBounds { .. } => ErrorKind::InvalidBounds,
        }
    }

    /// Where the problem is: a key path, an identifier, a folder or a variable name.
    pub fn location(&self) -> String {
        match self {
            AssemblyError::MalformedConfiguration { path, .. }
            | AssemblyError::UnknownComponent { path, .. }
            | AssemblyError::UnsupportedOption { path, .. }
            | AssemblyError::InvalidOptionValue { path, .. }
            | AssemblyError::ComponentConstructionFailed { path, .. } => path.to_string(),
            AssemblyError::DuplicateIdentifier { identifier, .. } => identifier.clone(),
            AssemblyError::Discovery { folder, .. } => folder.display().to_string(),
            AssemblyError::UnknownVariable { name, .. }
            | AssemblyError::InvalidBounds { name, .. } => name.clone(),
        }
    }
}
