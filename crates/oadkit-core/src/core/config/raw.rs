//! Format-neutral value tree shared by the TOML and YAML front ends.
//!
//! Each front end lowers its own syntax tree into [`RawValue`]; the schema interpreter only
//! ever sees this type. Tables are ordered `(key, value)` vectors so declaration order
//! survives lowering.

use super::value::ScalarValue;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawValue {
    Null,
    Scalar(ScalarValue),
    List(Vec<RawValue>),
    Table(Vec<(String, RawValue)>),
}

impl RawValue {
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Scalar(scalar) => scalar.kind_name(),
            RawValue::List(_) => "list",
            RawValue::Table(_) => "table",
        }
    }
}
