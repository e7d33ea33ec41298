//! Interprets a lowered [`RawValue`] tree as a [`ConfigurationDocument`].

use super::document::{
    ComponentConfig, ConfigurationDocument, ConfigurationNode, GroupConfig, OptimizationSpec,
    VariableEntry,
};
use super::path::KeyPath;
use super::raw::RawValue;
use super::value::ScalarValue;
use crate::core::error::AssemblyError;
use std::collections::HashSet;
use std::path::PathBuf;

const ID_KEY: &str = "id";
const NONLINEAR_SOLVER_KEY: &str = "nonlinear_solver";
const LINEAR_SOLVER_KEY: &str = "linear_solver";

fn malformed(path: &KeyPath, expected: impl Into<String>) -> AssemblyError {
    AssemblyError::MalformedConfiguration {
        path: path.clone(),
        expected: expected.into(),
    }
}

fn found(expected: &str, value: &RawValue) -> String {
    format!("{expected}, found {}", value.kind_name())
}

pub(crate) fn interpret(raw: RawValue) -> Result<ConfigurationDocument, AssemblyError> {
    let root = KeyPath::root();
    let entries = match raw {
        RawValue::Table(entries) => entries,
        other => return Err(malformed(&root, found("a table at the top level", &other))),
    };

    let mut title = None;
    let mut module_folders = None;
    let mut input_file = None;
    let mut output_file = None;
    let mut driver = None;
    let mut model = None;
    let mut optimization = None;

    for (key, value) in entries {
        let path = root.key(&key);
        match key.as_str() {
            "title" => title = expect_optional_string(value, &path)?,
            "module_folders" => module_folders = Some(expect_path_list(value, &path)?),
            "input_file" => input_file = expect_optional_string(value, &path)?.map(PathBuf::from),
            "output_file" => output_file = expect_optional_string(value, &path)?.map(PathBuf::from),
            "driver" => driver = expect_optional_string(value, &path)?,
            "model" => model = Some(interpret_node(value, &path)?),
            "optimization" => optimization = interpret_optimization(value, &path)?,
            other => {
                return Err(malformed(
                    &path,
                    format!("one of the top-level keys (title, module_folders, input_file, output_file, driver, model, optimization), not '{other}'"),
                ));
            }
        }
    }

    let model = model.ok_or_else(|| malformed(&root.key("model"), "a required 'model' table"))?;

    Ok(ConfigurationDocument {
        title: title.unwrap_or_default(),
        module_folders: module_folders.unwrap_or_default(),
        input_file,
        output_file,
        driver,
        model,
        optimization,
        base_dir: None,
    })
}

fn expect_optional_string(value: RawValue, path: &KeyPath) -> Result<Option<String>, AssemblyError> {
    match value {
        RawValue::Null => Ok(None),
        RawValue::Scalar(ScalarValue::String(s)) => Ok(Some(s)),
        other => Err(malformed(path, found("a string", &other))),
    }
}

fn expect_path_list(value: RawValue, path: &KeyPath) -> Result<Vec<PathBuf>, AssemblyError> {
    match value {
        RawValue::Null => Ok(Vec::new()),
        RawValue::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                RawValue::Scalar(ScalarValue::String(s)) => Ok(PathBuf::from(s)),
                other => Err(malformed(&path.index(i), found("a path string", &other))),
            })
            .collect(),
        other => Err(malformed(path, found("a list of paths", &other))),
    }
}

fn interpret_node(value: RawValue, path: &KeyPath) -> Result<ConfigurationNode, AssemblyError> {
    let entries = match value {
        RawValue::Table(entries) => entries,
        other => {
            return Err(malformed(path, found("a table describing a group or a component", &other)));
        }
    };

    if entries.iter().any(|(key, _)| key == ID_KEY) {
        interpret_component(entries, path)
    } else {
        interpret_group(entries, path)
    }
}

fn interpret_component(
    entries: Vec<(String, RawValue)>,
    path: &KeyPath,
) -> Result<ConfigurationNode, AssemblyError> {
    if let Some((child, _)) = entries
        .iter()
        .find(|(_, value)| matches!(value, RawValue::Table(_)))
    {
        return Err(malformed(
            path,
            format!("either an 'id' or child nodes, not both ('id' and child '{child}' both present)"),
        ));
    }

    let mut id = None;
    let mut options = Vec::with_capacity(entries.len().saturating_sub(1));
    for (key, value) in entries {
        let key_path = path.key(&key);
        if key == ID_KEY {
            match value {
                RawValue::Scalar(ScalarValue::String(s)) => id = Some(s),
                other => return Err(malformed(&key_path, found("a string identifier", &other))),
            }
            continue;
        }
        match value {
            RawValue::Scalar(scalar) => options.push((key, scalar)),
            other => return Err(malformed(&key_path, found("a scalar option value", &other))),
        }
    }

    Ok(ConfigurationNode::Component(ComponentConfig {
        id: id.unwrap_or_default(),
        options,
    }))
}

fn interpret_group(
    entries: Vec<(String, RawValue)>,
    path: &KeyPath,
) -> Result<ConfigurationNode, AssemblyError> {
    let mut group = GroupConfig::default();
    let mut seen = HashSet::new();

    for (key, value) in entries {
        let key_path = path.key(&key);
        match key.as_str() {
            NONLINEAR_SOLVER_KEY => group.nonlinear_solver = expect_optional_string(value, &key_path)?,
            LINEAR_SOLVER_KEY => group.linear_solver = expect_optional_string(value, &key_path)?,
            _ => {
                if !matches!(value, RawValue::Table(_)) {
                    return Err(malformed(
                        &key_path,
                        found(
                            "a child table (scalar options are only allowed on nodes with an 'id')",
                            &value,
                        ),
                    ));
                }
                if key.is_empty() || key.contains('.') {
                    return Err(malformed(&key_path, "a non-empty child name without '.'"));
                }
                if !seen.insert(key.clone()) {
                    return Err(malformed(&key_path, "a child name unique within its group"));
                }
                let child = interpret_node(value, &key_path)?;
                group.children.push((key, child));
            }
        }
    }

    Ok(ConfigurationNode::Group(group))
}

fn interpret_optimization(
    value: RawValue,
    path: &KeyPath,
) -> Result<Option<OptimizationSpec>, AssemblyError> {
    let entries = match value {
        RawValue::Null => return Ok(None),
        RawValue::Table(entries) => entries,
        other => return Err(malformed(path, found("an optimization table", &other))),
    };

    let mut design_variables = None;
    let mut constraints = None;
    let mut objectives = None;

    for (key, value) in entries {
        let key_path = path.key(&key);
        let slot = match key.as_str() {
            "design_var" | "design_variables" => &mut design_variables,
            "constraint" | "constraints" => &mut constraints,
            "objective" | "objectives" => &mut objectives,
            other => {
                return Err(malformed(
                    &key_path,
                    format!("one of design_var(iables), constraint(s), objective(s), not '{other}'"),
                ));
            }
        };
        if slot.is_some() {
            return Err(malformed(
                &key_path,
                "a single spelling of each optimization field (singular and plural forms both present)",
            ));
        }
        *slot = Some(interpret_entries(value, &key_path)?);
    }

    Ok(Some(OptimizationSpec {
        design_variables: design_variables.unwrap_or_default(),
        constraints: constraints.unwrap_or_default(),
        objectives: objectives.unwrap_or_default(),
    }))
}

fn interpret_entries(value: RawValue, path: &KeyPath) -> Result<Vec<VariableEntry>, AssemblyError> {
    match value {
        RawValue::Null => Ok(Vec::new()),
        RawValue::Table(_) => Ok(vec![interpret_entry(value, path)?]),
        RawValue::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| interpret_entry(item, &path.index(i)))
            .collect(),
        other => Err(malformed(path, found("a list of variable entries", &other))),
    }
}

fn interpret_entry(value: RawValue, path: &KeyPath) -> Result<VariableEntry, AssemblyError> {
    let fields = match value {
        RawValue::Table(fields) => fields,
        other => return Err(malformed(path, found("a variable entry table", &other))),
    };

    let mut name = None;
    let mut entry = VariableEntry::default();
    for (key, value) in fields {
        let key_path = path.key(&key);
        match key.as_str() {
            "name" => match value {
                RawValue::Scalar(ScalarValue::String(s)) => name = Some(s),
                other => return Err(malformed(&key_path, found("a variable name string", &other))),
            },
            "lower" => entry.lower = expect_optional_number(value, &key_path)?,
            "upper" => entry.upper = expect_optional_number(value, &key_path)?,
            "scaler" => entry.scaler = expect_optional_number(value, &key_path)?,
            "units" => entry.units = expect_optional_string(value, &key_path)?,
            other => {
                return Err(malformed(
                    &key_path,
                    format!("one of name, lower, upper, units, scaler, not '{other}'"),
                ));
            }
        }
    }

    entry.name = name.ok_or_else(|| malformed(&path.key("name"), "a required 'name'"))?;
    Ok(entry)
}

fn expect_optional_number(value: RawValue, path: &KeyPath) -> Result<Option<f64>, AssemblyError> {
    let number = match &value {
        RawValue::Null => return Ok(None),
        RawValue::Scalar(scalar) => scalar.as_f64(),
        _ => None,
    };
    match number {
        Some(x) if x.is_finite() => Ok(Some(x)),
        Some(_) => Err(malformed(path, "a finite number")),
        None => Err(malformed(path, found("a number", &value))),
    }
}
