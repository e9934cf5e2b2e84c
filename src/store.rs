//! EntityStore: schema-bound CRUD, filtered listing, and derived-field resolution over SQLite.

use crate::codec::{deserialize, row_to_raw, Instance};
use crate::error::AppError;
use crate::migration::apply_migrations;
use crate::schema::{Entity, FieldKind, Schema};
use crate::sql::{self, EntityFilter, QueryBuf};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

/// Open the single shared connection. Statements issued through it never overlap.
/// The connection is never recycled, so `sqlite::memory:` databases live as long as the pool.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await?;
    Ok(pool)
}

#[derive(Clone)]
pub struct EntityStore {
    pool: SqlitePool,
    schema: Arc<Schema>,
}

impl EntityStore {
    /// Bind a schema to a database whose tables already exist.
    pub fn new(pool: SqlitePool, schema: Arc<Schema>) -> Self {
        EntityStore { pool, schema }
    }

    /// Drop and recreate every entity table, then bind the schema. Destructive.
    pub async fn migrate(pool: SqlitePool, schema: Arc<Schema>) -> Result<Self, AppError> {
        apply_migrations(&pool, &schema).await?;
        Ok(Self::new(pool, schema))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn entity(&self, name: &str) -> Result<&Entity, AppError> {
        self.schema
            .entity_by_name(name)
            .ok_or_else(|| AppError::EntityNotFound(name.to_string()))
    }

    /// Point lookup by id. `None` when no row matches.
    pub async fn get_entity(&self, entity_name: &str, id: &str) -> Result<Option<Instance>, AppError> {
        let entity = self.entity(entity_name)?;
        let q = sql::select_by_id(entity, id);
        let row = self.fetch_optional(&q).await?;
        row.map(|r| decode_row(entity, &r)).transpose()
    }

    /// Insert a new row. A payload `id` must equal `id`; a duplicate id surfaces as a database error.
    pub async fn insert_entity(
        &self,
        entity_name: &str,
        id: &str,
        instance: &Instance,
    ) -> Result<Instance, AppError> {
        let entity = self.entity(entity_name)?;
        let q = sql::insert(entity, id, instance)?;
        self.fetch_written(entity, id, &q).await
    }

    /// Sparse update of the provided fields. `id` in the patch is ignored.
    /// Fails with `RowNotFound` when no row has this id.
    pub async fn update_entity(
        &self,
        entity_name: &str,
        id: &str,
        patch: &Instance,
    ) -> Result<Instance, AppError> {
        let entity = self.entity(entity_name)?;
        let q = sql::update(entity, id, patch)?;
        self.fetch_written(entity, id, &q).await
    }

    /// Insert, or on id conflict update every provided non-id column, in one statement.
    pub async fn upsert_entity(
        &self,
        entity_name: &str,
        id: &str,
        instance: &Instance,
    ) -> Result<Instance, AppError> {
        let entity = self.entity(entity_name)?;
        let q = sql::upsert(entity, id, instance)?;
        self.fetch_written(entity, id, &q).await
    }

    /// True only when exactly one row was removed.
    pub async fn delete_entity(&self, entity_name: &str, id: &str) -> Result<bool, AppError> {
        let entity = self.entity(entity_name)?;
        let q = sql::delete(entity, id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected() == 1)
    }

    /// Filtered, ordered, paginated listing. Without `order_by` the row order is unspecified.
    pub async fn get_entities(
        &self,
        entity_name: &str,
        filter: &EntityFilter,
    ) -> Result<Vec<Instance>, AppError> {
        let entity = self.entity(entity_name)?;
        let q = sql::select_list(entity, filter)?;
        let rows = self.fetch_all(&q).await?;
        rows.iter().map(|r| decode_row(entity, r)).collect()
    }

    /// Resolve a derived field: rows of the related entity whose foreign-key field equals `id`.
    pub async fn get_entity_derived_field(
        &self,
        entity_name: &str,
        id: &str,
        field_name: &str,
    ) -> Result<Vec<Instance>, AppError> {
        let entity = self.entity(entity_name)?;
        let not_found = || AppError::DerivedFieldNotFound {
            entity: entity_name.to_string(),
            field: field_name.to_string(),
        };
        let field = entity.field_by_name(field_name).ok_or_else(not_found)?;
        let (from_entity, from_field) = match &field.kind {
            FieldKind::Derived {
                from_entity,
                from_field,
            } => (from_entity, from_field),
            FieldKind::Scalar { .. } | FieldKind::List { .. } => return Err(not_found()),
        };
        let filter = EntityFilter::new().filter(from_field.clone(), Value::String(id.to_string()));
        self.get_entities(from_entity, &filter).await
    }

    /// Decode a raw row (column name to stored value) into an instance of `entity_name`.
    pub fn deserialize(&self, entity_name: &str, raw: Instance) -> Result<Instance, AppError> {
        deserialize(self.entity(entity_name)?, raw)
    }

    async fn fetch_written(&self, entity: &Entity, id: &str, q: &QueryBuf) -> Result<Instance, AppError> {
        let row = self.fetch_optional(q).await?.ok_or_else(|| AppError::RowNotFound {
            entity: entity.name.clone(),
            id: id.to_string(),
        })?;
        decode_row(entity, &row)
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<SqliteRow>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<SqliteRow>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_all(&self.pool).await?)
    }
}

fn decode_row(entity: &Entity, row: &SqliteRow) -> Result<Instance, AppError> {
    deserialize(entity, row_to_raw(row)?)
}
