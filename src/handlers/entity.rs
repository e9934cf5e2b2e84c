//! Entity handlers: insert, read, upsert, update, delete, query, derived fields.

use crate::codec::Instance;
use crate::error::AppError;
use crate::response::{self, RowReply, RowsReply};
use crate::schema::ID_FIELD;
use crate::sql::EntityFilter;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

/// Path segment of the query endpoint. A row whose id is this segment is still reachable
/// through the `*_query_row` handlers, which the router mounts on the same path.
pub const QUERY_SEGMENT: &str = "query";

fn body_to_instance(value: Value) -> Result<Instance, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// POST /:entity: id from the body (string or integer), or a generated UUID when absent.
pub async fn create(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Json(body): Json<Value>,
) -> Result<RowReply, AppError> {
    let body = body_to_instance(body)?;
    let id = match body.get(ID_FIELD) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
        None | Some(Value::Null) => uuid::Uuid::new_v4().to_string(),
        Some(_) => return Err(AppError::BadRequest("id must be a string or an integer".into())),
    };
    let row = state.store.insert_entity(&entity, &id, &body).await?;
    Ok(response::created(row))
}

/// POST /:entity/query: body is an `EntityFilter`.
pub async fn query(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Json(filter): Json<EntityFilter>,
) -> Result<RowsReply, AppError> {
    let rows = state.store.get_entities(&entity, &filter).await?;
    Ok(response::page(rows, &filter))
}

pub async fn read(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<RowReply, AppError> {
    let row = state
        .store
        .get_entity(&entity, &id)
        .await?
        .ok_or(AppError::RowNotFound { entity, id })?;
    Ok(response::row(row))
}

/// PUT /:entity/:id: upsert.
pub async fn upsert(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<RowReply, AppError> {
    let body = body_to_instance(body)?;
    let row = state.store.upsert_entity(&entity, &id, &body).await?;
    Ok(response::row(row))
}

/// PATCH /:entity/:id: sparse update.
pub async fn update(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<RowReply, AppError> {
    let body = body_to_instance(body)?;
    let row = state.store.update_entity(&entity, &id, &body).await?;
    Ok(response::row(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    if state.store.delete_entity(&entity, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::RowNotFound { entity, id })
    }
}

/// GET /:entity/:id/:field: resolve a derived field.
pub async fn derived(
    State(state): State<AppState>,
    Path((entity, id, field)): Path<(String, String, String)>,
) -> Result<RowsReply, AppError> {
    let rows = state.store.get_entity_derived_field(&entity, &id, &field).await?;
    Ok(response::rows(rows))
}

fn query_row_path(entity: String) -> Path<(String, String)> {
    Path((entity, QUERY_SEGMENT.to_string()))
}

pub async fn read_query_row(state: State<AppState>, Path(entity): Path<String>) -> Result<RowReply, AppError> {
    read(state, query_row_path(entity)).await
}

pub async fn upsert_query_row(
    state: State<AppState>,
    Path(entity): Path<String>,
    body: Json<Value>,
) -> Result<RowReply, AppError> {
    upsert(state, query_row_path(entity), body).await
}

pub async fn update_query_row(
    state: State<AppState>,
    Path(entity): Path<String>,
    body: Json<Value>,
) -> Result<RowReply, AppError> {
    update(state, query_row_path(entity), body).await
}

pub async fn delete_query_row(state: State<AppState>, Path(entity): Path<String>) -> Result<StatusCode, AppError> {
    delete(state, query_row_path(entity)).await
}
