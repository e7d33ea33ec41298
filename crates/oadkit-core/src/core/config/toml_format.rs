//! TOML front end: nested tables, arrays of tables for optimization entries.

use super::path::KeyPath;
use super::raw::RawValue;
use super::value::ScalarValue;
use crate::core::error::AssemblyError;
use toml::Value;

pub(crate) fn lower(text: &str) -> Result<RawValue, AssemblyError> {
    let table: toml::Table =
        toml::from_str(text).map_err(|e| AssemblyError::MalformedConfiguration {
            path: KeyPath::root(),
            expected: format!("valid TOML ({})", e.message()),
        })?;
    lower_table(table, &KeyPath::root())
}

fn lower_table(table: toml::Table, path: &KeyPath) -> Result<RawValue, AssemblyError> {
    let mut entries = Vec::with_capacity(table.len());
    for (key, value) in table {
        let child_path = path.key(&key);
        entries.push((key, lower_value(value, &child_path)?));
    }
    Ok(RawValue::Table(entries))
}

fn lower_value(value: Value, path: &KeyPath) -> Result<RawValue, AssemblyError> {
    Ok(match value {
        Value::String(s) => RawValue::Scalar(ScalarValue::String(s)),
        Value::Integer(i) => RawValue::Scalar(ScalarValue::Integer(i)),
        Value::Float(x) => RawValue::Scalar(ScalarValue::Float(x)),
        Value::Boolean(b) => RawValue::Scalar(ScalarValue::Bool(b)),
        Value::Array(items) => RawValue::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| lower_value(item, &path.index(i)))
                .collect::<Result<_, _>>()?,
        ),
        Value::Table(table) => lower_table(table, path)?,
        Value::Datetime(_) => {
            return Err(AssemblyError::MalformedConfiguration {
                path: path.clone(),
                expected: "a string, number, boolean, array or table (datetimes are not supported)"
                    .to_string(),
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_key_order() {
        let raw = lower("zeta = 1\nalpha = 2\n[middle]\nx = true\n").unwrap();
        let RawValue::Table(entries) = raw else {
            panic!("expected table");
        };
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["zeta", "alpha", "middle"]);
    }

    #[test]
    fn syntax_error_is_malformed_at_root() {
        let err = lower("this is = = not toml").unwrap_err();
        match err {
            AssemblyError::MalformedConfiguration { path, expected } => {
                assert!(path.is_root());
                assert!(expected.starts_with("valid TOML"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn datetime_values_are_rejected_with_their_path() {
        let err = lower("[model]\nwhen = 1979-05-27T07:32:00Z\n").unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::MalformedConfiguration { ref path, .. } if path.to_string() == "model.when"
        ));
    }
}
