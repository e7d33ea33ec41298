use crate::core::config::value::ScalarValue;
use serde::Deserialize;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Whether a component reads or writes a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Input => "in",
            Direction::Output => "out",
        })
    }
}

/// A variable a component publishes in its interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableDeclaration {
    pub name: String,
    pub direction: Direction,
}

impl VariableDeclaration {
    pub fn input(name: &str) -> Self {
        Self {
            name: name.to_string(),
            direction: Direction::Input,
        }
    }

    pub fn output(name: &str) -> Self {
        Self {
            name: name.to_string(),
            direction: Direction::Output,
        }
    }
}

/// Why a value does not fit an option's declaration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionValueError {
    #[error("expected {expected}, found {} {found}", .found.kind_name())]
    WrongKind {
        expected: OptionKind,
        found: ScalarValue,
    },
    #[error("{value} is not a finite number")]
    NotFinite { value: f64 },
    #[error("{value} is below the minimum {lower}")]
    BelowMinimum { value: f64, lower: f64 },
    #[error("{value} is above the maximum {upper}")]
    AboveMaximum { value: f64, upper: f64 },
    #[error("'{value}' is not one of: {}", .allowed.join(", "))]
    NotAllowed { value: String, allowed: Vec<String> },
}

/// Why a component refused an option.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionError {
    #[error("option '{0}' is not supported")]
    Unsupported(String),
    #[error("invalid value for option '{option}': {reason}")]
    Invalid {
        option: String,
        reason: OptionValueError,
    },
}

/// A component factory failure, optionally carrying the underlying cause.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConstructionError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl ConstructionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// A disciplinary analysis unit as seen by the assembly layer.
///
/// The numerical behaviour lives in the execution engine. Here a component only needs to
/// accept its configuration options and publish the variables it reads and writes.
pub trait Component: fmt::Debug + Send {
    fn identifier(&self) -> &str;

    /// Applies one configuration option, validating name and value.
    fn set_option(&mut self, name: &str, value: &ScalarValue) -> Result<(), OptionError>;

    /// The current value of every option, defaults included, in schema order.
    fn options(&self) -> Vec<(String, ScalarValue)>;

    /// The component's interface, valid once options have been applied.
    fn variables(&self) -> Vec<VariableDeclaration>;
}

/// Value kinds an option can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Bool,
    Integer,
    Float,
    String,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptionKind::Bool => "boolean",
            OptionKind::Integer => "integer",
            OptionKind::Float => "float",
            OptionKind::String => "string",
        })
    }
}

/// Declares one option a component accepts and how its values are checked.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSchema {
    pub name: String,
    pub kind: OptionKind,
    pub default: Option<ScalarValue>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    /// Accepted values for string options; empty means any string.
    pub allowed: Vec<String>,
}

impl OptionSchema {
    pub fn new(name: &str, kind: OptionKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default: None,
            lower: None,
            upper: None,
            allowed: Vec::new(),
        }
    }

    pub fn with_default(mut self, value: impl Into<ScalarValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_range(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    pub fn with_allowed(mut self, allowed: &[&str]) -> Self {
        self.allowed = allowed.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Checks a value against kind, range and allowed choices, returning the value as it
    /// should be stored (integers given for float options are widened).
    ///
    /// NaN and infinities are never accepted for numeric options.
    pub fn check(&self, value: &ScalarValue) -> Result<ScalarValue, OptionValueError> {
        let checked = match (self.kind, value) {
            (OptionKind::Bool, ScalarValue::Bool(_))
            | (OptionKind::Integer, ScalarValue::Integer(_))
            | (OptionKind::Float, ScalarValue::Float(_))
            | (OptionKind::String, ScalarValue::String(_)) => value.clone(),
            (OptionKind::Float, ScalarValue::Integer(i)) => ScalarValue::Float(*i as f64),
            (expected, found) => {
                return Err(OptionValueError::WrongKind {
                    expected,
                    found: found.clone(),
                });
            }
        };

        if let Some(x) = checked.as_f64() {
            if !x.is_finite() {
                return Err(OptionValueError::NotFinite { value: x });
            }
            if let Some(lower) = self.lower.filter(|lower| x < *lower) {
                return Err(OptionValueError::BelowMinimum { value: x, lower });
            }
            if let Some(upper) = self.upper.filter(|upper| x > *upper) {
                return Err(OptionValueError::AboveMaximum { value: x, upper });
            }
        }

        if let ScalarValue::String(s) = &checked {
            if !self.allowed.is_empty() && !self.allowed.iter().any(|a| a == s) {
                return Err(OptionValueError::NotAllowed {
                    value: s.clone(),
                    allowed: self.allowed.clone(),
                });
            }
        }

        Ok(checked)
    }
}

/// The static description of a component type: what it reads, writes and accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSchema {
    pub identifier: String,
    pub description: String,
    pub variables: Vec<VariableDeclaration>,
    pub options: Vec<OptionSchema>,
    /// External resources that must exist when the component is constructed.
    pub requires: Vec<PathBuf>,
}

impl ComponentSchema {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            description: String::new(),
            variables: Vec::new(),
            options: Vec::new(),
            requires: Vec::new(),
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn inputs(mut self, names: &[&str]) -> Self {
        self.variables
            .extend(names.iter().map(|n| VariableDeclaration::input(n)));
        self
    }

    pub fn outputs(mut self, names: &[&str]) -> Self {
        self.variables
            .extend(names.iter().map(|n| VariableDeclaration::output(n)));
        self
    }

    pub fn option(mut self, option: OptionSchema) -> Self {
        self.options.push(option);
        self
    }

    pub fn requires(mut self, resource: PathBuf) -> Self {
        self.requires.push(resource);
        self
    }

    /// Instantiates the schema, checking that required resources are present.
    pub fn instantiate(&self) -> Result<DeclaredComponent, ConstructionError> {
        for resource in &self.requires {
            if !resource.exists() {
                return Err(ConstructionError::with_source(
                    format!("required resource '{}' is missing", resource.display()),
                    std::io::Error::new(std::io::ErrorKind::NotFound, resource.display().to_string()),
                ));
            }
        }
        Ok(DeclaredComponent::new(self.clone()))
    }
}

/// A component whose behaviour is entirely described by a [`ComponentSchema`].
///
/// Used for the built-in disciplines and for components discovered from manifests.
#[derive(Debug, Clone)]
pub struct DeclaredComponent {
    schema: ComponentSchema,
    values: Vec<Option<ScalarValue>>,
}

impl DeclaredComponent {
    pub fn new(schema: ComponentSchema) -> Self {
        let values = schema.options.iter().map(|o| o.default.clone()).collect();
        Self { schema, values }
    }
}

impl Component for DeclaredComponent {
    fn identifier(&self) -> &str {
        &self.schema.identifier
    }

    fn set_option(&mut self, name: &str, value: &ScalarValue) -> Result<(), OptionError> {
        let index = self
            .schema
            .options
            .iter()
            .position(|o| o.name == name)
            .ok_or_else(|| OptionError::Unsupported(name.to_string()))?;
        let checked = self.schema.options[index]
            .check(value)
            .map_err(|reason| OptionError::Invalid {
                option: name.to_string(),
                reason,
            })?;
        self.values[index] = Some(checked);
        Ok(())
    }

    fn options(&self) -> Vec<(String, ScalarValue)> {
        self.schema
            .options
            .iter()
            .zip(&self.values)
            .filter_map(|(schema, value)| value.clone().map(|v| (schema.name.clone(), v)))
            .collect()
    }

    fn variables(&self) -> Vec<VariableDeclaration> {
        self.schema.variables.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ComponentSchema {
        ComponentSchema::new("test.component")
            .inputs(&["x"])
            .outputs(&["y"])
            .option(OptionSchema::new("gain", OptionKind::Float).with_default(1.0).with_range(Some(0.0), Some(10.0)))
            .option(OptionSchema::new("mode", OptionKind::String).with_allowed(&["fast", "exact"]))
            .option(OptionSchema::new("verbose", OptionKind::Bool))
    }

    #[test]
    fn defaults_are_reported_until_overridden() {
        let mut component = schema().instantiate().unwrap();
        assert_eq!(component.options(), vec![("gain".to_string(), ScalarValue::Float(1.0))]);

        component.set_option("gain", &ScalarValue::Integer(3)).unwrap();
        component.set_option("verbose", &ScalarValue::Bool(true)).unwrap();
        assert_eq!(
            component.options(),
            vec![
                ("gain".to_string(), ScalarValue::Float(3.0)),
                ("verbose".to_string(), ScalarValue::Bool(true)),
            ]
        );
    }

    #[test]
    fn unknown_option_is_unsupported() {
        let mut component = schema().instantiate().unwrap();
        assert_eq!(
            component.set_option("gian", &ScalarValue::Float(1.0)),
            Err(OptionError::Unsupported("gian".to_string()))
        );
    }

    #[test]
    fn kind_range_and_choice_are_checked() {
        let mut component = schema().instantiate().unwrap();
        assert!(matches!(
            component.set_option("gain", &ScalarValue::from("high")),
            Err(OptionError::Invalid { .. })
        ));
        assert!(matches!(
            component.set_option("gain", &ScalarValue::Float(11.0)),
            Err(OptionError::Invalid { .. })
        ));
        assert!(matches!(
            component.set_option("mode", &ScalarValue::from("slow")),
            Err(OptionError::Invalid { .. })
        ));
        assert!(component.set_option("mode", &ScalarValue::from("exact")).is_ok());
        assert!(matches!(
            component.set_option("verbose", &ScalarValue::Integer(1)),
            Err(OptionError::Invalid { .. })
        ));
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        let ranged = OptionSchema::new("gain", OptionKind::Float).with_range(Some(0.0), Some(1.0));
        assert!(matches!(
            ranged.check(&ScalarValue::Float(f64::NAN)),
            Err(OptionValueError::NotFinite { .. })
        ));

        let open = OptionSchema::new("scale", OptionKind::Float);
        assert!(matches!(
            open.check(&ScalarValue::Float(f64::INFINITY)),
            Err(OptionValueError::NotFinite { .. })
        ));
        assert_eq!(open.check(&ScalarValue::Float(-2.5)), Ok(ScalarValue::Float(-2.5)));
    }

    #[test]
    fn check_reports_typed_reasons() {
        let option = OptionSchema::new("gain", OptionKind::Float).with_range(Some(0.0), Some(10.0));
        assert_eq!(
            option.check(&ScalarValue::Integer(-1)),
            Err(OptionValueError::BelowMinimum { value: -1.0, lower: 0.0 })
        );
        let err = option.check(&ScalarValue::from("high")).unwrap_err();
        assert_eq!(err.to_string(), "expected float, found string 'high'");
    }

    #[test]
    fn missing_resource_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema().requires(dir.path().join("polar.csv"));
        let err = schema.instantiate().unwrap_err();
        assert!(err.message.contains("polar.csv"));
        assert!(err.source.is_some());
    }

    #[test]
    fn variables_follow_schema_order() {
        let component = schema().instantiate().unwrap();
        assert_eq!(
            component.variables(),
            vec![VariableDeclaration::input("x"), VariableDeclaration::output("y")]
        );
    }
}
