use super::model::{ComponentInstance, Group, ModelTreeNode, SolverBinding, SolverCategory, SolverKind, SolverSpec};
use super::progress::{Progress, ProgressReporter};
use crate::core::callspec::CallSpec;
use crate::core::components::{ComponentRegistry, OptionError};
use crate::core::config::{ComponentConfig, ConfigurationNode, GroupConfig, KeyPath};
use crate::core::error::AssemblyError;
use tracing::{debug, trace};

const MODEL_KEY: &str = "model";
const NONLINEAR_SOLVER_KEY: &str = "nonlinear_solver";
const LINEAR_SOLVER_KEY: &str = "linear_solver";

/// Turns a configuration tree into a model tree using the components of a registry.
///
/// The build is depth-first in declaration order and stops at the first error; no partial
/// tree is ever returned.
pub struct ModelBuilder<'a> {
    registry: &'a ComponentRegistry,
    reporter: &'a ProgressReporter<'a>,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(registry: &'a ComponentRegistry, reporter: &'a ProgressReporter<'a>) -> Self {
        Self { registry, reporter }
    }

    /// Builds the tree rooted at the document's `model` node.
    pub fn build(&self, root: &ConfigurationNode) -> Result<ModelTreeNode, AssemblyError> {
        self.reporter.report(Progress::TaskStart {
            total_steps: count_nodes(root),
        });
        let result = self.build_node(root, &KeyPath::root().key(MODEL_KEY));
        self.reporter.report(Progress::TaskFinish);
        result
    }

    fn build_node(&self, node: &ConfigurationNode, path: &KeyPath) -> Result<ModelTreeNode, AssemblyError> {
        let built = match node {
            ConfigurationNode::Component(config) => ModelTreeNode::Component(self.build_component(config, path)?),
            ConfigurationNode::Group(config) => ModelTreeNode::Group(self.build_group(config, path)?),
        };
        self.reporter.report(Progress::TaskIncrement);
        Ok(built)
    }

    fn build_component(&self, config: &ComponentConfig, path: &KeyPath) -> Result<ComponentInstance, AssemblyError> {
        trace!("Building component '{}' at {}", config.id, path);
        let factory = self.registry.resolve(&config.id, &path.key("id"))?;
        let mut component = factory
            .create()
            .map_err(|source| AssemblyError::ComponentConstructionFailed {
                identifier: config.id.clone(),
                path: path.clone(),
                source,
            })?;

        for (name, value) in &config.options {
            component.set_option(name, value).map_err(|e| match e {
                OptionError::Unsupported(option) => AssemblyError::UnsupportedOption {
                    identifier: config.id.clone(),
                    option,
                    path: path.key(name),
                },
                OptionError::Invalid { option, reason } => AssemblyError::InvalidOptionValue {
                    identifier: config.id.clone(),
                    option,
                    path: path.key(name),
                    reason,
                },
            })?;
        }

        Ok(ComponentInstance {
            identifier: config.id.clone(),
            component,
            options: config.options.clone(),
        })
    }

    fn build_group(&self, config: &GroupConfig, path: &KeyPath) -> Result<Group, AssemblyError> {
        let nonlinear_solver = parse_solver(
            config.nonlinear_solver.as_deref(),
            SolverCategory::Nonlinear,
            &path.key(NONLINEAR_SOLVER_KEY),
        )?;
        let linear_solver = parse_solver(
            config.linear_solver.as_deref(),
            SolverCategory::Linear,
            &path.key(LINEAR_SOLVER_KEY),
        )?;
        debug!(
            "Group at {} uses {} / {}",
            path, nonlinear_solver, linear_solver
        );

        let mut children = Vec::with_capacity(config.children.len());
        for (name, child) in &config.children {
            children.push((name.clone(), self.build_node(child, &path.key(name))?));
        }

        Ok(Group {
            nonlinear_solver,
            linear_solver,
            children,
        })
    }
}

/// Builds a model tree from `root` with a silent reporter.
pub fn build(root: &ConfigurationNode, registry: &ComponentRegistry) -> Result<ModelTreeNode, AssemblyError> {
    let reporter = ProgressReporter::new();
    ModelBuilder::new(registry, &reporter).build(root)
}

/// Parses a solver call specification and checks it against the catalog and its slot.
pub fn parse_solver(
    text: Option<&str>,
    slot: SolverCategory,
    path: &KeyPath,
) -> Result<SolverBinding, AssemblyError> {
    let Some(text) = text else {
        return Ok(SolverBinding::EngineDefault);
    };
    let spec = CallSpec::parse(text).map_err(|e| AssemblyError::MalformedConfiguration {
        path: path.clone(),
        expected: format!("a solver specification such as 'om.NonlinearBlockGS(maxiter=10)' ({e})"),
    })?;

    let kind = SolverKind::from_name(spec.kind()).ok_or_else(|| AssemblyError::MalformedConfiguration {
        path: path.clone(),
        expected: format!(
            "a known {slot} solver, one of {} (found '{}')",
            SolverKind::names_in(slot).join(", "),
            spec.kind()
        ),
    })?;
    if kind.category() != slot {
        return Err(AssemblyError::MalformedConfiguration {
            path: path.clone(),
            expected: format!("a {slot} solver, but '{kind}' is a {} solver", kind.category()),
        });
    }

    Ok(SolverBinding::Explicit(SolverSpec {
        kind,
        target: spec.target,
        arguments: spec.arguments,
    }))
}

fn count_nodes(node: &ConfigurationNode) -> u64 {
    1 + node.children().iter().map(|(_, child)| count_nodes(child)).sum::<u64>()
}
