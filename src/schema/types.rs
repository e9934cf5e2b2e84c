//! Raw schema document types, as emitted by the schema compiler.

use serde::{Deserialize, Serialize};

/// Primitive value type of a scalar field or of a list field's items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    String,
    Int,
    BigInt,
    Float,
    Boolean,
}

/// How a field is stored. `Scalar` and `List` carry the column-definition fragment used
/// verbatim in `CREATE TABLE`; `Derived` has no column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Scalar {
        #[serde(rename = "type")]
        ty: PrimitiveType,
        column: String,
    },
    List {
        item: PrimitiveType,
        column: String,
    },
    Derived {
        from_entity: String,
        from_field: String,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    pub fields: Vec<FieldConfig>,
}

/// Whole schema document: `{ "entities": [ ... ] }`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub entities: Vec<EntityConfig>,
}
