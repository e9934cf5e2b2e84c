//! Declarative list filter: `where` predicates, ordering, and pagination.

use crate::error::AppError;
use crate::schema::{Entity, Field};
use crate::sql::operators::FilterOperator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// Filter for `get_entities`. Keys of `where` are `field` or `field_suffix`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFilter {
    #[serde(default, rename = "where", skip_serializing_if = "BTreeMap::is_empty")]
    pub where_: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_direction: Option<OrderDirection>,
}

impl EntityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_.insert(key.into(), value.into());
        self
    }

    pub fn first(mut self, n: u32) -> Self {
        self.first = Some(n);
        self
    }

    pub fn skip(mut self, n: u32) -> Self {
        self.skip = Some(n);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Option<OrderDirection>) -> Self {
        self.order_by = Some(field.into());
        self.order_direction = direction;
        self
    }
}

fn column_field<'e>(entity: &'e Entity, name: &str) -> Result<&'e Field, AppError> {
    entity
        .field_by_name(name)
        .filter(|f| f.is_column())
        .ok_or_else(|| AppError::UnknownField {
            entity: entity.name.clone(),
            field: name.to_string(),
        })
}

/// Resolve a filter key to its column field and operator.
///
/// A key naming a field exactly is equality. Otherwise the first underscore whose
/// remainder is a registered suffix splits the key, so `created_at_gt` resolves to
/// `created_at` + `gt` and `name_not_in` to `name` + `not_in`.
pub fn resolve_filter_key<'e>(
    entity: &'e Entity,
    key: &str,
) -> Result<(&'e Field, &'static FilterOperator), AppError> {
    if entity.field_by_name(key).is_some() {
        return Ok((column_field(entity, key)?, FilterOperator::EQUALS));
    }

    let mut first_registered = None;
    for (pos, _) in key.match_indices('_') {
        let (name, suffix) = (&key[..pos], &key[pos + 1..]);
        if let Some(op) = FilterOperator::lookup(suffix) {
            if entity.field_by_name(name).is_some() {
                return Ok((column_field(entity, name)?, op));
            }
            first_registered.get_or_insert(name);
        }
    }

    match (first_registered, key.split_once('_')) {
        (Some(name), _) => Err(AppError::UnknownField {
            entity: entity.name.clone(),
            field: name.to_string(),
        }),
        (None, Some((_, suffix))) => Err(AppError::UnknownFilterOperator(suffix.to_string())),
        (None, None) => Err(AppError::UnknownField {
            entity: entity.name.clone(),
            field: key.to_string(),
        }),
    }
}

/// The `order_by` field must be a column of the entity.
pub fn resolve_order_field<'e>(entity: &'e Entity, name: &str) -> Result<&'e Field, AppError> {
    column_field(entity, name)
}
