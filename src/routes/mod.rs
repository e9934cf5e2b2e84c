//! Route tables.

pub mod common;
pub mod entity;

pub use common::service_routes;
pub use entity::entity_routes;

use crate::state::AppState;
use axum::Router;

/// Prefix under which entity routes are mounted.
pub const API_PREFIX: &str = "/api/v1";

/// Full application router: common routes at the root, entity routes under [`API_PREFIX`].
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(service_routes(state.clone()))
        .nest(API_PREFIX, entity_routes(state))
}
