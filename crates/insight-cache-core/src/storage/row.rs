use crate::config::TableSpec;
use crate::model::{ParamValue, Params};
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::ToSql;

impl ToSql for ParamValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            ParamValue::Null => ToSqlOutput::Owned(Value::Null),
            ParamValue::Bool(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
            ParamValue::Int(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            ParamValue::Float(f) => ToSqlOutput::Owned(Value::Real(*f)),
            ParamValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl From<ValueRef<'_>> for ParamValue {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => ParamValue::Null,
            ValueRef::Integer(i) => ParamValue::Int(i),
            ValueRef::Real(f) => ParamValue::Float(f),
            ValueRef::Text(t) | ValueRef::Blob(t) => {
                ParamValue::Text(String::from_utf8_lossy(t).into_owned())
            }
        }
    }
}

/// One identity or metadata column destined for a bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundColumn<'a> {
    pub field: &'a str,
    pub column: String,
    pub value: &'a ParamValue,
}

/// Maps a table's field descriptors onto the supplied params.
///
/// Only configured fields are kept; absent and null values are left out so
/// the column stays NULL. Unrecognised params are dropped silently.
pub fn bind_columns<'a>(table: &'a TableSpec, params: &'a Params) -> Vec<BoundColumn<'a>> {
    table
        .fields
        .iter()
        .filter_map(|f| {
            params
                .get(&f.name)
                .filter(|v| !v.is_null())
                .map(|value| BoundColumn {
                    field: f.name.as_str(),
                    column: f.column_name(),
                    value,
                })
        })
        .collect()
}
