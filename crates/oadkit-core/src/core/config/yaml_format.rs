//! YAML front end: indented mappings, sequences of mappings for optimization entries.

use super::path::KeyPath;
use super::raw::RawValue;
use super::value::ScalarValue;
use crate::core::error::AssemblyError;
use serde_yaml::Value;

pub(crate) fn lower(text: &str) -> Result<RawValue, AssemblyError> {
    let value: Value =
        serde_yaml::from_str(text).map_err(|e| AssemblyError::MalformedConfiguration {
            path: KeyPath::root(),
            expected: format!("valid YAML ({e})"),
        })?;
    lower_value(value, &KeyPath::root())
}

fn lower_value(value: Value, path: &KeyPath) -> Result<RawValue, AssemblyError> {
    Ok(match value {
        Value::Null => RawValue::Null,
        Value::Bool(b) => RawValue::Scalar(ScalarValue::Bool(b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Scalar(ScalarValue::Integer(i))
            } else if n.is_u64() {
                return Err(AssemblyError::MalformedConfiguration {
                    path: path.clone(),
                    expected: "an integer that fits in 64 signed bits".to_string(),
                });
            } else {
                let x = n.as_f64().ok_or_else(|| AssemblyError::MalformedConfiguration {
                    path: path.clone(),
                    expected: "a representable number".to_string(),
                })?;
                RawValue::Scalar(ScalarValue::Float(x))
            }
        }
        Value::String(s) => RawValue::Scalar(ScalarValue::String(s)),
        Value::Sequence(items) => RawValue::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| lower_value(item, &path.index(i)))
                .collect::<Result<_, _>>()?,
        ),
        Value::Mapping(mapping) => {
            let mut entries = Vec::with_capacity(mapping.len());
            for (key, item) in mapping {
                let key = match key {
                    Value::String(key) => key,
                    other => {
                        return Err(AssemblyError::MalformedConfiguration {
                            path: path.clone(),
                            expected: format!("string keys only (found a {} key)", kind_of(&other)),
                        });
                    }
                };
                let child_path = path.key(&key);
                entries.push((key, lower_value(item, &child_path)?));
            }
            RawValue::Table(entries)
        }
        Value::Tagged(tagged) => {
            return Err(AssemblyError::MalformedConfiguration {
                path: path.clone(),
                expected: format!("an untagged value (found tag {})", tagged.tag),
            });
        }
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "numeric",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_mapping_order_and_number_kinds() {
        let raw = lower("b: 1\na: 1.5\nc: ~\n").unwrap();
        assert_eq!(
            raw,
            RawValue::Table(vec![
                ("b".to_string(), RawValue::Scalar(ScalarValue::Integer(1))),
                ("a".to_string(), RawValue::Scalar(ScalarValue::Float(1.5))),
                ("c".to_string(), RawValue::Null),
            ])
        );
    }

    #[test]
    fn non_string_keys_are_rejected() {
        let err = lower("model:\n  1: x\n").unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::MalformedConfiguration { ref path, .. } if path.to_string() == "model"
        ));
    }

    #[test]
    fn syntax_error_is_malformed_at_root() {
        let err = lower("model: [unclosed").unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::MalformedConfiguration { ref path, .. } if path.is_root()
        ));
    }
}
