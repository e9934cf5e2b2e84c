//! Schema validation: identifiers, uniqueness, and the primary-key invariant.

use crate::error::SchemaError;
use crate::schema::resolved::Entity;
use crate::schema::types::FieldKind;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Name of the primary-key field every entity must declare.
pub const ID_FIELD: &str = "id";

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"))
}

pub fn is_identifier(name: &str) -> bool {
    identifier_re().is_match(name)
}

fn check_identifier(name: &str) -> Result<(), SchemaError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier(name.to_string()))
    }
}

pub fn validate(entities: &[Entity]) -> Result<(), SchemaError> {
    let mut entity_names = HashSet::new();
    for entity in entities {
        check_identifier(&entity.name)?;
        if !entity_names.insert(entity.name.as_str()) {
            return Err(SchemaError::DuplicateEntity(entity.name.clone()));
        }

        let mut field_names = HashSet::new();
        for field in entity.fields() {
            check_identifier(&field.name)?;
            if !field_names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    entity: entity.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        match entity.field_by_name(ID_FIELD).map(|f| &f.kind) {
            None => return Err(SchemaError::MissingId(entity.name.clone())),
            Some(FieldKind::Scalar { .. }) => {}
            Some(FieldKind::List { .. } | FieldKind::Derived { .. }) => {
                return Err(SchemaError::InvalidId(entity.name.clone()))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, PrimitiveType, Schema};

    fn id() -> Field {
        Field::scalar("id", PrimitiveType::String, r#""id" TEXT PRIMARY KEY"#)
    }

    #[test]
    fn rejects_entity_without_id() {
        let e = Entity::new("Thing", vec![Field::scalar("name", PrimitiveType::String, r#""name" TEXT"#)]);
        assert!(matches!(Schema::new(vec![e]), Err(SchemaError::MissingId(n)) if n == "Thing"));
    }

    #[test]
    fn rejects_list_id() {
        let e = Entity::new("Thing", vec![Field::list("id", PrimitiveType::String, r#""id" TEXT"#)]);
        assert!(matches!(Schema::new(vec![e]), Err(SchemaError::InvalidId(_))));
    }

    #[test]
    fn rejects_duplicates() {
        let a = Entity::new("Thing", vec![id()]);
        let b = Entity::new("Thing", vec![id()]);
        assert!(matches!(Schema::new(vec![a, b]), Err(SchemaError::DuplicateEntity(_))));

        let c = Entity::new("Other", vec![id(), id()]);
        assert!(matches!(Schema::new(vec![c]), Err(SchemaError::DuplicateField { .. })));
    }

    #[test]
    fn rejects_names_that_need_escaping() {
        let e = Entity::new("Bad\"Name", vec![id()]);
        assert!(matches!(Schema::new(vec![e]), Err(SchemaError::InvalidIdentifier(_))));
        assert!(is_identifier("created_at"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier(""));
    }
}
