//! Field values to bind parameters, and SQLite rows back to instances.

use crate::error::AppError;
use crate::schema::{Entity, Field, FieldKind, PrimitiveType};
use crate::sql::SqlValue;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// An entity instance keyed by field name.
pub type Instance = Map<String, Value>;

/// Encode a field value for storage. List fields are stored as one JSON array column.
pub fn encode_field(field: &Field, value: &Value) -> Result<SqlValue, AppError> {
    match &field.kind {
        FieldKind::Scalar { .. } => Ok(SqlValue::from_json(value)),
        FieldKind::List { .. } => match value {
            Value::Null => Ok(SqlValue::Null),
            Value::Array(_) => Ok(SqlValue::Text(value.to_string())),
            other => Err(AppError::InvalidFieldValue {
                field: field.name.clone(),
                reason: format!("expected a list, got {}", json_type_name(other)),
            }),
        },
        FieldKind::Derived { .. } => Err(AppError::InvalidFieldValue {
            field: field.name.clone(),
            reason: "derived fields are not stored".into(),
        }),
    }
}

/// Read every column of a row into a JSON object, using the storage class of each value.
pub fn row_to_raw(row: &SqliteRow) -> Result<Instance, AppError> {
    let mut map = Map::new();
    for (i, col) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(i)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => Value::from(row.try_get_unchecked::<i64, _>(i)?),
                "REAL" => serde_json::Number::from_f64(row.try_get_unchecked::<f64, _>(i)?)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                "BLOB" => Value::from(row.try_get_unchecked::<Vec<u8>, _>(i)?),
                _ => Value::String(row.try_get_unchecked::<String, _>(i)?),
            }
        };
        map.insert(col.name().to_string(), value);
    }
    Ok(map)
}

/// Turn a raw row into a typed instance. Columns without a matching field pass through.
pub fn deserialize(entity: &Entity, raw: Instance) -> Result<Instance, AppError> {
    let mut out = Map::with_capacity(raw.len());
    for (name, value) in raw {
        let value = match entity.field_by_name(&name) {
            Some(field) => decode_field(field, value)?,
            None => value,
        };
        out.insert(name, value);
    }
    Ok(out)
}

fn decode_field(field: &Field, value: Value) -> Result<Value, AppError> {
    match (&field.kind, value) {
        (_, Value::Null) => Ok(Value::Null),
        (FieldKind::Scalar { ty, .. }, v) => Ok(decode_primitive(*ty, v)),
        (FieldKind::List { item, .. }, Value::String(s)) => {
            let items: Vec<Value> =
                serde_json::from_str(&s).map_err(|e| AppError::InvalidFieldValue {
                    field: field.name.clone(),
                    reason: format!("stored list is not a JSON array: {}", e),
                })?;
            Ok(Value::Array(
                items.into_iter().map(|v| decode_primitive(*item, v)).collect(),
            ))
        }
        (FieldKind::List { .. }, v) => Ok(v),
        (FieldKind::Derived { .. }, v) => Ok(v),
    }
}

/// SQLite has no boolean storage class; booleans come back as 0/1.
fn decode_primitive(ty: PrimitiveType, value: Value) -> Value {
    match (ty, value) {
        (PrimitiveType::Boolean, Value::Number(n)) => Value::Bool(n.as_i64().unwrap_or(0) != 0),
        (PrimitiveType::Float, Value::Number(n)) if !n.is_f64() => n
            .as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Number(n)),
        (
            PrimitiveType::String
            | PrimitiveType::Int
            | PrimitiveType::BigInt
            | PrimitiveType::Float
            | PrimitiveType::Boolean,
            v,
        ) => v,
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
