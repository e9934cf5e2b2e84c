//! Shared application state for all routes.

use crate::store::EntityStore;

#[derive(Clone)]
pub struct AppState {
    pub store: EntityStore,
}
