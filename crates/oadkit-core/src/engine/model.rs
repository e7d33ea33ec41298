use crate::core::components::{Component, Direction};
use crate::core::config::value::ScalarValue;
use phf::{Map, phf_map};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Which solver slot of a group a solver kind may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverCategory {
    Nonlinear,
    Linear,
}

impl fmt::Display for SolverCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolverCategory::Nonlinear => "nonlinear",
            SolverCategory::Linear => "linear",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverKind {
    NonlinearBlockGS,
    NonlinearBlockJac,
    NewtonSolver,
    NonlinearRunOnce,
    BroydenSolver,
    DirectSolver,
    LinearBlockGS,
    LinearBlockJac,
    LinearRunOnce,
    ScipyKrylov,
    PETScKrylov,
    LinearUserDefined,
}

static SOLVER_KINDS: Map<&'static str, SolverKind> = phf_map! {
    "NonlinearBlockGS" => SolverKind::NonlinearBlockGS,
    "NonlinearBlockJac" => SolverKind::NonlinearBlockJac,
    "NewtonSolver" => SolverKind::NewtonSolver,
    "NonlinearRunOnce" => SolverKind::NonlinearRunOnce,
    "BroydenSolver" => SolverKind::BroydenSolver,
    "DirectSolver" => SolverKind::DirectSolver,
    "LinearBlockGS" => SolverKind::LinearBlockGS,
    "LinearBlockJac" => SolverKind::LinearBlockJac,
    "LinearRunOnce" => SolverKind::LinearRunOnce,
    "ScipyKrylov" => SolverKind::ScipyKrylov,
    "PETScKrylov" => SolverKind::PETScKrylov,
    "LinearUserDefined" => SolverKind::LinearUserDefined,
};

impl SolverKind {
    /// Looks up a solver by kind name, without any module prefix.
    pub fn from_name(name: &str) -> Option<Self> {
        SOLVER_KINDS.get(name).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            SolverKind::NonlinearBlockGS => "NonlinearBlockGS",
            SolverKind::NonlinearBlockJac => "NonlinearBlockJac",
            SolverKind::NewtonSolver => "NewtonSolver",
            SolverKind::NonlinearRunOnce => "NonlinearRunOnce",
            SolverKind::BroydenSolver => "BroydenSolver",
            SolverKind::DirectSolver => "DirectSolver",
            SolverKind::LinearBlockGS => "LinearBlockGS",
            SolverKind::LinearBlockJac => "LinearBlockJac",
            SolverKind::LinearRunOnce => "LinearRunOnce",
            SolverKind::ScipyKrylov => "ScipyKrylov",
            SolverKind::PETScKrylov => "PETScKrylov",
            SolverKind::LinearUserDefined => "LinearUserDefined",
        }
    }

    pub fn category(&self) -> SolverCategory {
        match self {
            SolverKind::NonlinearBlockGS
            | SolverKind::NonlinearBlockJac
            | SolverKind::NewtonSolver
            | SolverKind::NonlinearRunOnce
            | SolverKind::BroydenSolver => SolverCategory::Nonlinear,
            _ => SolverCategory::Linear,
        }
    }

    /// Catalog names accepted in the given slot, sorted.
    pub fn names_in(category: SolverCategory) -> Vec<&'static str> {
        let mut names: Vec<_> = SOLVER_KINDS
            .entries()
            .filter(|(_, kind)| kind.category() == category)
            .map(|(name, _)| *name)
            .collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated solver choice with its keyword arguments, passed through verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverSpec {
    pub kind: SolverKind,
    /// The callee as written, e.g. `om.NonlinearBlockGS`.
    pub target: String,
    pub arguments: Vec<(String, ScalarValue)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SolverBinding {
    /// No solver was configured; the execution engine picks its own default.
    #[default]
    EngineDefault,
    Explicit(SolverSpec),
}

impl fmt::Display for SolverBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBinding::EngineDefault => f.write_str("engine default"),
            SolverBinding::Explicit(spec) => {
                write!(f, "{}(", spec.kind)?;
                for (i, (name, value)) in spec.arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}={value}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A live component placed in the model tree.
#[derive(Debug)]
pub struct ComponentInstance {
    pub identifier: String,
    pub component: Box<dyn Component>,
    /// The options applied from the configuration, in declaration order.
    pub options: Vec<(String, ScalarValue)>,
}

#[derive(Debug, Default)]
pub struct Group {
    pub nonlinear_solver: SolverBinding,
    pub linear_solver: SolverBinding,
    pub children: Vec<(String, ModelTreeNode)>,
}

impl Group {
    pub fn child(&self, name: &str) -> Option<&ModelTreeNode> {
        self.children
            .iter()
            .find(|(child_name, _)| child_name == name)
            .map(|(_, node)| node)
    }
}

/// The executable-shape problem handed to the execution engine.
///
/// Each node exclusively owns its children, so the structure is a tree by construction.
#[derive(Debug)]
pub enum ModelTreeNode {
    Component(ComponentInstance),
    Group(Group),
}

impl ModelTreeNode {
    /// Every variable name declared anywhere below this node.
    ///
    /// Names declared by several components appear once; no collision checking is done.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut BTreeSet<String>) {
        match self {
            ModelTreeNode::Group(group) => {
                for (_, child) in &group.children {
                    child.collect_variables(names);
                }
            }
            ModelTreeNode::Component(instance) => {
                names.extend(instance.component.variables().into_iter().map(|v| v.name));
            }
        }
    }

    /// Variable names with every direction any component declares them in.
    pub fn declarations(&self) -> BTreeMap<String, BTreeSet<Direction>> {
        let mut declarations: BTreeMap<String, BTreeSet<Direction>> = BTreeMap::new();
        for (_, instance) in self.components() {
            for declaration in instance.component.variables() {
                declarations
                    .entry(declaration.name)
                    .or_default()
                    .insert(declaration.direction);
            }
        }
        declarations
    }

    /// Component instances in pre-order, each with its dot-separated path below this node.
    ///
    /// A component at the root has the empty path.
    pub fn components(&self) -> Vec<(String, &ComponentInstance)> {
        let mut found = Vec::new();
        self.collect_components(String::new(), &mut found);
        found
    }

    fn collect_components<'a>(&'a self, path: String, found: &mut Vec<(String, &'a ComponentInstance)>) {
        match self {
            ModelTreeNode::Component(instance) => found.push((path, instance)),
            ModelTreeNode::Group(group) => {
                for (name, child) in &group.children {
                    let child_path = if path.is_empty() {
                        name.clone()
                    } else {
                        format!("{path}.{name}")
                    };
                    child.collect_components(child_path, found);
                }
            }
        }
    }

    /// Number of nodes in the tree, this one included.
    pub fn node_count(&self) -> usize {
        match self {
            ModelTreeNode::Component(_) => 1,
            ModelTreeNode::Group(group) => {
                1 + group
                    .children
                    .iter()
                    .map(|(_, child)| child.node_count())
                    .sum::<usize>()
            }
        }
    }

    /// Follows a dot-separated child path; the empty path is this node.
    pub fn find(&self, path: &str) -> Option<&ModelTreeNode> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| match node {
                ModelTreeNode::Group(group) => group.child(segment),
                ModelTreeNode::Component(_) => None,
            })
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            ModelTreeNode::Group(group) => Some(group),
            ModelTreeNode::Component(_) => None,
        }
    }

    pub fn as_component(&self) -> Option<&ComponentInstance> {
        match self {
            ModelTreeNode::Component(instance) => Some(instance),
            ModelTreeNode::Group(_) => None,
        }
    }
}
