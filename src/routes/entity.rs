//! Entity routes. Handlers resolve the entity by name from the bound schema.

use crate::handlers::entity::{
    create, delete as delete_handler, delete_query_row, derived, query, read, read_query_row, update,
    update_query_row, upsert, upsert_query_row,
};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};
use tower_http::limit::RequestBodyLimitLayer;

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub fn entity_routes(state: AppState) -> Router {
    // The static `/query` segment wins over `/:id`, so it also serves the row whose id is "query".
    Router::new()
        .route("/:entity", post(create))
        .route(
            "/:entity/query",
            post(query)
                .get(read_query_row)
                .put(upsert_query_row)
                .patch(update_query_row)
                .delete(delete_query_row),
        )
        .route(
            "/:entity/:id",
            get(read).put(upsert).patch(update).delete(delete_handler),
        )
        .route("/:entity/:id/:field", get(derived))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .with_state(state)
}
