//! Materialize the schema as tables: one destructive drop-and-create per entity.

use crate::error::AppError;
use crate::schema::{Entity, Schema};
use crate::sql::quoted;
use sqlx::SqlitePool;

/// `CREATE TABLE` from the column fragments of scalar and list fields. Derived fields add no column.
pub fn create_table_sql(entity: &Entity) -> String {
    let col_defs: Vec<&str> = entity
        .column_fields()
        .filter_map(|f| f.column_definition())
        .collect();
    format!(
        "CREATE TABLE {} (\n  {}\n)",
        quoted(&entity.name),
        col_defs.join(",\n  ")
    )
}

pub fn drop_table_sql(entity: &Entity) -> String {
    format!("DROP TABLE IF EXISTS {}", quoted(&entity.name))
}

/// Drop and recreate every entity table, in schema order. Existing rows are discarded.
/// Not transactional: a failure leaves earlier tables recreated and later ones untouched.
pub async fn apply_migrations(pool: &SqlitePool, schema: &Schema) -> Result<(), AppError> {
    for entity in schema.entities() {
        let drop = drop_table_sql(entity);
        tracing::debug!(sql = %drop, "migrate");
        sqlx::query(&drop).execute(pool).await?;

        let create = create_table_sql(entity);
        tracing::debug!(sql = %create, "migrate");
        sqlx::query(&create).execute(pool).await?;
        tracing::info!(
            entity = %entity.name,
            columns = entity.column_fields().count(),
            "table created"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, PrimitiveType};

    #[test]
    fn create_table_uses_column_fragments_verbatim() {
        let e = Entity::new(
            "Person",
            vec![
                Field::scalar("id", PrimitiveType::String, r#""id" TEXT PRIMARY KEY"#),
                Field::derived("pets", "Pet", "owner"),
                Field::scalar("age", PrimitiveType::Int, r#""age" INTEGER NOT NULL"#),
            ],
        );
        assert_eq!(
            create_table_sql(&e),
            "CREATE TABLE \"Person\" (\n  \"id\" TEXT PRIMARY KEY,\n  \"age\" INTEGER NOT NULL\n)"
        );
        assert_eq!(drop_table_sql(&e), r#"DROP TABLE IF EXISTS "Person""#);
    }
}
