use super::model::ModelTreeNode;
use crate::core::callspec::CallSpec;
use crate::core::config::{KeyPath, OptimizationSpec, VariableEntry};
use crate::core::error::{AssemblyError, VariableRole};
use std::collections::BTreeSet;
use tracing::debug;

/// An optimization entry resolved against the model's variable namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableBinding {
    pub name: String,
    pub role: VariableRole,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub units: Option<String>,
    pub scaler: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundOptimization {
    pub design_variables: Vec<VariableBinding>,
    pub constraints: Vec<VariableBinding>,
    pub objective: VariableBinding,
}

/// Validates an optimization setup against a built model tree.
///
/// Exactly one objective is required. Entries are then checked in order (design variables,
/// constraints, objective): bounds first, then whether some component declares the name.
pub fn bind(spec: &OptimizationSpec, tree: &ModelTreeNode) -> Result<BoundOptimization, AssemblyError> {
    let [objective] = spec.objectives.as_slice() else {
        return Err(AssemblyError::MalformedConfiguration {
            path: KeyPath::root().key("optimization").key("objective"),
            expected: format!("exactly one objective, found {}", spec.objectives.len()),
        });
    };

    let namespace = tree.variables();
    let bind_all = |entries: &[VariableEntry], role| {
        entries
            .iter()
            .map(|entry| bind_entry(entry, role, &namespace))
            .collect::<Result<Vec<_>, _>>()
    };

    let design_variables = bind_all(&spec.design_variables, VariableRole::DesignVariable)?;
    let constraints = bind_all(&spec.constraints, VariableRole::Constraint)?;
    let objective = bind_entry(objective, VariableRole::Objective, &namespace)?;

    debug!(
        "Bound {} design variable(s), {} constraint(s) and objective '{}'",
        design_variables.len(),
        constraints.len(),
        objective.name
    );
    Ok(BoundOptimization {
        design_variables,
        constraints,
        objective,
    })
}

fn bind_entry(
    entry: &VariableEntry,
    role: VariableRole,
    namespace: &BTreeSet<String>,
) -> Result<VariableBinding, AssemblyError> {
    if let (Some(lower), Some(upper)) = (entry.lower, entry.upper) {
        if lower > upper {
            return Err(AssemblyError::InvalidBounds {
                name: entry.name.clone(),
                role,
                lower,
                upper,
            });
        }
    }
    if !namespace.contains(&entry.name) {
        return Err(AssemblyError::UnknownVariable {
            name: entry.name.clone(),
            role,
        });
    }
    Ok(VariableBinding {
        name: entry.name.clone(),
        role,
        lower: entry.lower,
        upper: entry.upper,
        units: entry.units.clone(),
        scaler: entry.scaler,
    })
}

/// Parses the document's driver specification. The driver kind itself is left to the
/// execution engine.
pub fn parse_driver(text: &str) -> Result<CallSpec, AssemblyError> {
    CallSpec::parse(text).map_err(|e| AssemblyError::MalformedConfiguration {
        path: KeyPath::root().key("driver"),
        expected: format!("a driver specification such as \"om.ScipyOptimizeDriver(optimizer='SLSQP')\" ({e})"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::components::ComponentSchema;
    use crate::engine::model::{ComponentInstance, Group};

    fn leaf(name: &str, identifier: &str, inputs: &[&str], outputs: &[&str]) -> (String, ModelTreeNode) {
        let schema = ComponentSchema::new(identifier).inputs(inputs).outputs(outputs);
        (
            name.to_string(),
            ModelTreeNode::Component(ComponentInstance {
                identifier: identifier.to_string(),
                component: Box::new(schema.instantiate().unwrap()),
                options: Vec::new(),
            }),
        )
    }

    fn two_disciplines() -> ModelTreeNode {
        ModelTreeNode::Group(Group {
            children: vec![
                leaf("disc1", "test.disc1", &["x"], &["y1"]),
                leaf("disc2", "test.disc2", &["y1"], &["y2"]),
            ],
            ..Group::default()
        })
    }

    fn spec_with_objective(name: &str) -> OptimizationSpec {
        OptimizationSpec {
            design_variables: vec![VariableEntry {
                lower: Some(0.0),
                upper: Some(10.0),
                ..VariableEntry::named("x")
            }],
            constraints: vec![VariableEntry {
                upper: Some(5.0),
                ..VariableEntry::named("y1")
            }],
            objectives: vec![VariableEntry::named(name)],
        }
    }

    #[test]
    fn binds_known_variables() {
        let bound = bind(&spec_with_objective("y2"), &two_disciplines()).unwrap();
        assert_eq!(bound.objective.name, "y2");
        assert_eq!(bound.objective.role, VariableRole::Objective);
        assert_eq!(bound.design_variables[0].upper, Some(10.0));
        assert_eq!(bound.constraints[0].role, VariableRole::Constraint);
    }

    #[test]
    fn unknown_objective_is_reported_with_role() {
        let err = bind(&spec_with_objective("y3"), &two_disciplines()).unwrap_err();
        match err {
            AssemblyError::UnknownVariable { name, role } => {
                assert_eq!(name, "y3");
                assert_eq!(role, VariableRole::Objective);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn inverted_bounds_win_over_unknown_name() {
        for name in ["x", "does_not_exist"] {
            let mut spec = spec_with_objective("y2");
            spec.design_variables = vec![VariableEntry {
                lower: Some(10.0),
                upper: Some(0.0),
                ..VariableEntry::named(name)
            }];
            let err = bind(&spec, &two_disciplines()).unwrap_err();
            assert!(matches!(
                err,
                AssemblyError::InvalidBounds { role: VariableRole::DesignVariable, lower, upper, .. }
                    if lower == 10.0 && upper == 0.0
            ));
        }
    }

    #[test]
    fn equal_bounds_are_accepted() {
        let mut spec = spec_with_objective("y2");
        spec.design_variables[0].lower = Some(3.0);
        spec.design_variables[0].upper = Some(3.0);
        assert!(bind(&spec, &two_disciplines()).is_ok());
    }

    #[test]
    fn objective_count_must_be_one() {
        let mut spec = spec_with_objective("y2");
        spec.objectives.clear();
        assert!(matches!(
            bind(&spec, &two_disciplines()),
            Err(AssemblyError::MalformedConfiguration { .. })
        ));

        spec.objectives = vec![VariableEntry::named("y1"), VariableEntry::named("y2")];
        let err = bind(&spec, &two_disciplines()).unwrap_err();
        assert_eq!(err.location(), "optimization.objective");
    }

    #[test]
    fn objective_count_is_checked_before_entries() {
        let mut spec = spec_with_objective("y2");
        spec.design_variables[0].name = "missing".to_string();
        spec.objectives.clear();
        assert!(matches!(
            bind(&spec, &two_disciplines()),
            Err(AssemblyError::MalformedConfiguration { .. })
        ));
    }

    #[test]
    fn removing_the_declaring_component_breaks_resolution() {
        let spec = spec_with_objective("y2");
        assert!(bind(&spec, &two_disciplines()).is_ok());

        let without_disc2 = ModelTreeNode::Group(Group {
            children: vec![leaf("disc1", "test.disc1", &["x"], &["y1"])],
            ..Group::default()
        });
        assert!(matches!(
            bind(&spec, &without_disc2),
            Err(AssemblyError::UnknownVariable { ref name, .. }) if name == "y2"
        ));
    }

    #[test]
    fn driver_is_parsed_not_evaluated() {
        let driver = parse_driver("om.ScipyOptimizeDriver(tol=1e-6, optimizer='COBYLA')").unwrap();
        assert_eq!(driver.kind(), "ScipyOptimizeDriver");
        assert_eq!(driver.arguments.len(), 2);

        let err = parse_driver("__import__('os').system('rm -rf /')").unwrap_err();
        assert_eq!(err.location(), "driver");
    }
}
