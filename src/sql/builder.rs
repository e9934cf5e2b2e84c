//! Builds parameterized INSERT, SELECT, UPDATE, DELETE statements from a schema entity.

use crate::codec::{encode_field, Instance};
use crate::error::AppError;
use crate::schema::{Entity, FieldKind, PrimitiveType, ID_FIELD};
use crate::sql::filter::{resolve_filter_key, resolve_order_field, EntityFilter};
use crate::sql::params::SqlValue;
use serde_json::Value;

/// Quote identifier for SQLite (safe: names come from the schema only).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl QueryBuf {
    fn new() -> Self {
        Self::default()
    }

    fn push_param(&mut self, v: SqlValue) -> &'static str {
        self.params.push(v);
        "?"
    }
}

/// Bind value for an id argument: integer-typed ids bind as integers when the text parses.
fn id_param(entity: &Entity, id: &str) -> SqlValue {
    let integer_id = matches!(
        entity.field_by_name(ID_FIELD).map(|f| &f.kind),
        Some(FieldKind::Scalar {
            ty: PrimitiveType::Int | PrimitiveType::BigInt,
            ..
        })
    );
    match id.parse::<i64>() {
        Ok(n) if integer_id => SqlValue::I64(n),
        _ => SqlValue::from(id),
    }
}

/// SELECT by primary key.
pub fn select_by_id(entity: &Entity, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_param(id_param(entity, id));
    q.sql = format!(
        "SELECT * FROM {} WHERE {} = {}",
        quoted(&entity.name),
        quoted(ID_FIELD),
        ph
    );
    q
}

/// Render one `where` entry into a predicate, pushing its parameters.
fn predicate(entity: &Entity, q: &mut QueryBuf, key: &str, value: &Value) -> Result<String, AppError> {
    let (field, op) = resolve_filter_key(entity, key)?;
    let col = quoted(&field.name);
    let invalid = |reason: &str| AppError::InvalidFilterValue {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if op.is_list {
        let Value::Array(items) = value else {
            return Err(invalid("expected a list"));
        };
        if items.is_empty() {
            // `x IN ()` matches nothing; `x NOT IN ()` matches everything.
            let constant = if op.sql == "IN" { "1 = 0" } else { "1 = 1" };
            return Ok(constant.to_string());
        }
        let placeholders: Vec<&str> = items
            .iter()
            .map(|v| q.push_param(SqlValue::from_json(v)))
            .collect();
        return Ok(format!("{} {} ({})", col, op.sql, placeholders.join(", ")));
    }

    if op.is_pattern() {
        let Value::String(s) = value else {
            return Err(invalid("expected a string"));
        };
        let ph = q.push_param(SqlValue::Text(op.wrap_pattern(s)));
        return Ok(format!("{} {} {} ESCAPE '\\'", col, op.sql, ph));
    }

    if value.is_null() {
        return match op.suffix {
            "" => Ok(format!("{} IS NULL", col)),
            "not" => Ok(format!("{} IS NOT NULL", col)),
            _ => Err(invalid("null only compares with equality")),
        };
    }

    let bound = match &field.kind {
        FieldKind::List { .. } => encode_field(field, value).map_err(|_| invalid("expected a list"))?,
        FieldKind::Scalar { .. } | FieldKind::Derived { .. } => SqlValue::from_json(value),
    };
    let ph = q.push_param(bound);
    Ok(format!("{} {} {}", col, op.sql, ph))
}

/// SELECT list: WHERE (conjunction), ORDER BY, LIMIT, OFFSET, each only when requested.
/// SQLite requires a LIMIT before OFFSET, so `skip` alone emits `LIMIT -1`.
pub fn select_list(entity: &Entity, filter: &EntityFilter) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();

    let mut where_parts = Vec::with_capacity(filter.where_.len());
    for (key, value) in &filter.where_ {
        where_parts.push(predicate(entity, &mut q, key, value)?);
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };

    let order_clause = match &filter.order_by {
        Some(name) => {
            let field = resolve_order_field(entity, name)?;
            match filter.order_direction {
                Some(dir) => format!(" ORDER BY {} {}", quoted(&field.name), dir.as_sql()),
                None => format!(" ORDER BY {}", quoted(&field.name)),
            }
        }
        None => String::new(),
    };

    let limit_clause = match (filter.first, filter.skip) {
        (Some(n), _) => format!(" LIMIT {}", n),
        (None, Some(_)) => " LIMIT -1".to_string(),
        (None, None) => String::new(),
    };
    let offset_clause = filter.skip.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();

    q.sql = format!(
        "SELECT * FROM {}{}{}{}{}",
        quoted(&entity.name),
        where_clause,
        order_clause,
        limit_clause,
        offset_clause
    );
    Ok(q)
}

/// Reject a payload whose `id` disagrees with the id argument.
pub fn check_id(id: &str, instance: &Instance) -> Result<(), AppError> {
    match instance.get(ID_FIELD) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(s)) if s == id => Ok(()),
        Some(Value::Number(n)) if n.to_string() == id => Ok(()),
        Some(other) => Err(AppError::IdMismatch {
            expected: id.to_string(),
            found: match other {
                Value::String(s) => s.clone(),
                v => v.to_string(),
            },
        }),
    }
}

/// Columns and bound values for a write: `id` from the argument, then every other column
/// field present in the instance, in declaration order. Keys that are not columns are ignored.
fn write_columns(entity: &Entity, id: &str, instance: &Instance) -> Result<Vec<(String, SqlValue)>, AppError> {
    let mut cols = vec![(ID_FIELD.to_string(), id_param(entity, id))];
    for field in entity.column_fields().filter(|f| f.name != ID_FIELD) {
        if let Some(v) = instance.get(&field.name) {
            cols.push((field.name.clone(), encode_field(field, v)?));
        }
    }
    Ok(cols)
}

fn insert_sql(entity: &Entity, cols: Vec<(String, SqlValue)>) -> (QueryBuf, Vec<String>) {
    let mut q = QueryBuf::new();
    let mut names = Vec::with_capacity(cols.len());
    let mut placeholders = Vec::with_capacity(cols.len());
    for (name, v) in cols {
        placeholders.push(q.push_param(v));
        names.push(name);
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quoted(&entity.name),
        names.iter().map(|n| quoted(n)).collect::<Vec<_>>().join(", "),
        placeholders.join(", ")
    );
    (q, names)
}

/// INSERT ... RETURNING *.
pub fn insert(entity: &Entity, id: &str, instance: &Instance) -> Result<QueryBuf, AppError> {
    check_id(id, instance)?;
    let (mut q, _) = insert_sql(entity, write_columns(entity, id, instance)?);
    q.sql.push_str(" RETURNING *");
    Ok(q)
}

/// INSERT ... ON CONFLICT(id) DO UPDATE SET every provided non-id column ... RETURNING *.
/// With no other columns the conflict arm rewrites `id` to itself so the row is still returned.
pub fn upsert(entity: &Entity, id: &str, instance: &Instance) -> Result<QueryBuf, AppError> {
    check_id(id, instance)?;
    let (mut q, names) = insert_sql(entity, write_columns(entity, id, instance)?);
    let mut sets: Vec<String> = names
        .iter()
        .filter(|n| n.as_str() != ID_FIELD)
        .map(|n| format!("{0} = excluded.{0}", quoted(n)))
        .collect();
    if sets.is_empty() {
        sets.push(format!("{0} = excluded.{0}", quoted(ID_FIELD)));
    }
    q.sql.push_str(&format!(
        " ON CONFLICT({}) DO UPDATE SET {} RETURNING *",
        quoted(ID_FIELD),
        sets.join(", ")
    ));
    Ok(q)
}

/// UPDATE by id: SET only the column fields present in the patch; `id` is never updated.
/// An empty patch degrades to a SELECT by id.
pub fn update(entity: &Entity, id: &str, patch: &Instance) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for field in entity.column_fields().filter(|f| f.name != ID_FIELD) {
        if let Some(v) = patch.get(&field.name) {
            let ph = q.push_param(encode_field(field, v)?);
            sets.push(format!("{} = {}", quoted(&field.name), ph));
        }
    }
    if sets.is_empty() {
        return Ok(select_by_id(entity, id));
    }
    let ph = q.push_param(id_param(entity, id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING *",
        quoted(&entity.name),
        sets.join(", "),
        quoted(ID_FIELD),
        ph
    );
    Ok(q)
}

/// DELETE by id.
pub fn delete(entity: &Entity, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_param(id_param(entity, id));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        quoted(&entity.name),
        quoted(ID_FIELD),
        ph
    );
    q
}
