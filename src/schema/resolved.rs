//! Resolved schema: entities and fields indexed by name for runtime lookup.

use crate::error::SchemaError;
use crate::schema::types::{FieldKind, PrimitiveType};
use crate::schema::validator::validate;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn scalar(name: impl Into<String>, ty: PrimitiveType, column: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            kind: FieldKind::Scalar {
                ty,
                column: column.into(),
            },
        }
    }

    pub fn list(name: impl Into<String>, item: PrimitiveType, column: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            kind: FieldKind::List {
                item,
                column: column.into(),
            },
        }
    }

    pub fn derived(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
    ) -> Self {
        Field {
            name: name.into(),
            kind: FieldKind::Derived {
                from_entity: from_entity.into(),
                from_field: from_field.into(),
            },
        }
    }

    /// Column-definition fragment, or None for derived fields.
    pub fn column_definition(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Scalar { column, .. } | FieldKind::List { column, .. } => Some(column),
            FieldKind::Derived { .. } => None,
        }
    }

    pub fn is_column(&self) -> bool {
        self.column_definition().is_some()
    }
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub name: String,
    fields: Vec<Field>,
    field_index: HashMap<String, usize>,
}

impl Entity {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        let field_index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        Entity {
            name: name.into(),
            fields,
            field_index,
        }
    }

    /// All fields, in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.field_index.get(name).map(|&i| &self.fields[i])
    }

    /// Scalar and list fields, in declaration order.
    pub fn column_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_column())
    }
}

/// Immutable directory of entities. Built once, shared read-only (usually behind an `Arc`).
#[derive(Clone, Debug)]
pub struct Schema {
    entities: Vec<Entity>,
    entity_index: HashMap<String, usize>,
}

impl Schema {
    /// Build and validate: unique entity and field names, plain identifiers, scalar `id` on every entity.
    /// Derived-field targets are not checked here; they are resolved when read.
    pub fn new(entities: Vec<Entity>) -> Result<Self, SchemaError> {
        validate(&entities)?;
        let entity_index = entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();
        Ok(Schema {
            entities,
            entity_index,
        })
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.entity_index.get(name).map(|&i| &self.entities[i])
    }
}
