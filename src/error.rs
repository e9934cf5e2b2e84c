//! Typed errors and HTTP mapping.

use crate::sql::FilterOperator;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("duplicate entity: {0}")]
    DuplicateEntity(String),
    #[error("duplicate field: {entity}.{field}")]
    DuplicateField { entity: String, field: String },
    #[error("entity {0} has no id field")]
    MissingId(String),
    #[error("entity {0}: id must be a scalar field")]
    InvalidId(String),
    #[error("invalid identifier: '{0}'")]
    InvalidIdentifier(String),
    #[error("schema load: {0}")]
    Load(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("entity not found: {0}")]
    EntityNotFound(String),
    #[error("derived field not found: {entity}.{field}")]
    DerivedFieldNotFound { entity: String, field: String },
    #[error("unknown field: {entity}.{field}")]
    UnknownField { entity: String, field: String },
    #[error("unknown filter operator: {0}")]
    UnknownFilterOperator(String),
    #[error("invalid value for filter {key}: {reason}")]
    InvalidFilterValue { key: String, reason: String },
    #[error("invalid value for field {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },
    #[error("id mismatch: expected '{expected}', payload has '{found}'")]
    IdMismatch { expected: String, found: String },
    #[error("no {entity} row with id '{id}'")]
    RowNotFound { entity: String, id: String },
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// HTTP status and stable error code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Schema(_) => (StatusCode::INTERNAL_SERVER_ERROR, "schema_error"),
            AppError::EntityNotFound(_)
            | AppError::DerivedFieldNotFound { .. }
            | AppError::RowNotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::UnknownField { .. } => (StatusCode::BAD_REQUEST, "unknown_field"),
            AppError::UnknownFilterOperator(_) => (StatusCode::BAD_REQUEST, "unknown_filter_operator"),
            AppError::InvalidFilterValue { .. } | AppError::InvalidFieldValue { .. } => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            AppError::IdMismatch { .. } => (StatusCode::BAD_REQUEST, "id_mismatch"),
            AppError::Db(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                (StatusCode::CONFLICT, "conflict")
            }
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }

    /// Structured fields of the error, for clients that branch on more than the code.
    pub fn details(&self) -> Option<serde_json::Value> {
        use serde_json::json;
        match self {
            AppError::EntityNotFound(entity) => Some(json!({ "entity": entity })),
            AppError::DerivedFieldNotFound { entity, field } | AppError::UnknownField { entity, field } => {
                Some(json!({ "entity": entity, "field": field }))
            }
            AppError::UnknownFilterOperator(suffix) => Some(json!({
                "operator": suffix,
                "supported": FilterOperator::all()
                    .iter()
                    .map(|o| o.suffix)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>(),
            })),
            AppError::InvalidFilterValue { key, .. } => Some(json!({ "key": key })),
            AppError::InvalidFieldValue { field, .. } => Some(json!({ "field": field })),
            AppError::IdMismatch { expected, found } => Some(json!({ "expected": expected, "found": found })),
            AppError::RowNotFound { entity, id } => Some(json!({ "entity": entity, "id": id })),
            AppError::Schema(_) | AppError::Db(_) | AppError::BadRequest(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_operator_lists_supported_suffixes() {
        let details = AppError::UnknownFilterOperator("between".into()).details().unwrap();
        assert_eq!(details["operator"], json!("between"));
        let supported = details["supported"].as_array().unwrap();
        assert!(supported.contains(&json!("not_in")));
        assert!(!supported.contains(&json!("")));
    }

    #[test]
    fn database_errors_carry_no_details() {
        assert_eq!(AppError::Db(sqlx::Error::RowNotFound).details(), None);
        assert_eq!(
            AppError::RowNotFound { entity: "Pet".into(), id: "p1".into() }.details(),
            Some(json!({ "entity": "Pet", "id": "p1" }))
        );
    }
}
