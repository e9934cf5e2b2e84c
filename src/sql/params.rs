//! Convert serde_json::Value to types that sqlx can bind.

use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::sqlite::{Sqlite, SqliteTypeInfo};
use sqlx::{Database, Type};

/// A value that can be bound to a SQLite statement.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
}

impl SqlValue {
    /// Scalars map onto their SQLite storage class; arrays and objects are stored as JSON text.
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::I64(i),
                None => SqlValue::F64(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => SqlValue::Text(v.to_string()),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl<'q> Encode<'q, Sqlite> for SqlValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        match self {
            SqlValue::Null => <Option<i64> as Encode<'q, Sqlite>>::encode_by_ref(&None, buf),
            SqlValue::Bool(b) => <bool as Encode<'q, Sqlite>>::encode_by_ref(b, buf),
            SqlValue::I64(n) => <i64 as Encode<'q, Sqlite>>::encode_by_ref(n, buf),
            SqlValue::F64(n) => <f64 as Encode<'q, Sqlite>>::encode_by_ref(n, buf),
            SqlValue::Text(s) => <String as Encode<'q, Sqlite>>::encode_by_ref(s, buf),
        }
    }
}

impl Type<Sqlite> for SqlValue {
    fn type_info() -> SqliteTypeInfo {
        <String as Type<Sqlite>>::type_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_scalars_map_to_storage_classes() {
        assert_eq!(SqlValue::from_json(&json!(null)), SqlValue::Null);
        assert_eq!(SqlValue::from_json(&json!(true)), SqlValue::Bool(true));
        assert_eq!(SqlValue::from_json(&json!(5)), SqlValue::I64(5));
        assert_eq!(SqlValue::from_json(&json!(2.5)), SqlValue::F64(2.5));
        assert_eq!(SqlValue::from_json(&json!("a")), SqlValue::Text("a".into()));
        assert_eq!(SqlValue::from_json(&json!(["a,b"])), SqlValue::Text(r#"["a,b"]"#.into()));
    }
}
