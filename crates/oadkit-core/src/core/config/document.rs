use super::value::ScalarValue;
use std::path::{Path, PathBuf};

/// The parsed form of a process description file.
///
/// Produced once per parse by [`super::parse_document`] or [`super::load_document`] and
/// never mutated afterwards. Both encodings of the same logical document compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationDocument {
    pub title: String,
    /// Folders scanned for component manifests, in document order, as written.
    pub module_folders: Vec<PathBuf>,
    pub input_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    /// Raw driver call specification, e.g. `om.ScipyOptimizeDriver(optimizer='SLSQP')`.
    pub driver: Option<String>,
    pub model: ConfigurationNode,
    pub optimization: Option<OptimizationSpec>,
    /// Directory of the file this document was loaded from. Relative paths are resolved
    /// against it; `None` for documents parsed from a string.
    pub base_dir: Option<PathBuf>,
}

impl ConfigurationDocument {
    /// Resolves a path declared in the document against [`Self::base_dir`].
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// One position of the configuration tree: a component leaf or a group.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationNode {
    Component(ComponentConfig),
    Group(GroupConfig),
}

impl ConfigurationNode {
    pub fn empty_group() -> Self {
        ConfigurationNode::Group(GroupConfig::default())
    }

    /// Children of a group; always empty for a component.
    pub fn children(&self) -> &[(String, ConfigurationNode)] {
        match self {
            ConfigurationNode::Group(group) => &group.children,
            ConfigurationNode::Component(_) => &[],
        }
    }
}

/// A leaf naming a registered component, with the options to apply to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentConfig {
    pub id: String,
    /// Options in declaration order.
    pub options: Vec<(String, ScalarValue)>,
}

/// A container of child nodes sharing solver settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupConfig {
    /// Raw call specification; `None` leaves the choice to the execution engine.
    pub nonlinear_solver: Option<String>,
    pub linear_solver: Option<String>,
    /// Children in declaration order, which is also build order.
    pub children: Vec<(String, ConfigurationNode)>,
}

/// The optimization section of a document. Objective cardinality is checked at bind time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizationSpec {
    pub design_variables: Vec<VariableEntry>,
    pub constraints: Vec<VariableEntry>,
    pub objectives: Vec<VariableEntry>,
}

/// A reference to a model variable by global name, with optional bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableEntry {
    pub name: String,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub units: Option<String>,
    pub scaler: Option<f64>,
}

impl VariableEntry {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}
