//! Load a compiled schema document from JSON.

use crate::error::SchemaError;
use crate::schema::resolved::{Entity, Field, Schema};
use crate::schema::types::SchemaDocument;
use std::path::Path;

/// Build the resolved schema from a raw document.
pub fn resolve(doc: SchemaDocument) -> Result<Schema, SchemaError> {
    let entities = doc
        .entities
        .into_iter()
        .map(|e| {
            let fields = e
                .fields
                .into_iter()
                .map(|f| Field {
                    name: f.name,
                    kind: f.kind,
                })
                .collect();
            Entity::new(e.name, fields)
        })
        .collect();
    Schema::new(entities)
}

pub fn from_json_str(json: &str) -> Result<Schema, SchemaError> {
    let doc: SchemaDocument =
        serde_json::from_str(json).map_err(|e| SchemaError::Load(e.to_string()))?;
    resolve(doc)
}

pub async fn load_from_path(path: impl AsRef<Path>) -> Result<Schema, SchemaError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SchemaError::Load(format!("{}: {}", path.display(), e)))?;
    let schema = from_json_str(&text)?;
    tracing::info!(path = %path.display(), entities = schema.entities().len(), "schema loaded");
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldKind, PrimitiveType};

    const DOC: &str = r#"{
        "entities": [
            {
                "name": "Person",
                "fields": [
                    { "name": "id", "kind": "scalar", "type": "string", "column": "\"id\" TEXT PRIMARY KEY" },
                    { "name": "tags", "kind": "list", "item": "string", "column": "\"tags\" TEXT" },
                    { "name": "pets", "kind": "derived", "from_entity": "Pet", "from_field": "owner" }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_all_field_kinds() {
        let schema = from_json_str(DOC).unwrap();
        let person = schema.entity_by_name("Person").unwrap();
        assert_eq!(
            person.field_by_name("tags").unwrap().kind,
            FieldKind::List {
                item: PrimitiveType::String,
                column: "\"tags\" TEXT".into()
            }
        );
        assert!(matches!(
            &person.field_by_name("pets").unwrap().kind,
            FieldKind::Derived { from_entity, from_field } if from_entity == "Pet" && from_field == "owner"
        ));
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        assert!(matches!(from_json_str("{ nope"), Err(SchemaError::Load(_))));
    }
}
