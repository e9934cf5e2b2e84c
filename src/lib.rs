//! Entity store: schema-driven persistence of entities in SQLite, with a declarative
//! filter language and derived (one-to-many) field resolution.

pub mod codec;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod response;
pub mod routes;
pub mod schema;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use codec::Instance;
pub use error::{AppError, SchemaError};
pub use migration::apply_migrations;
pub use routes::{app_router, service_routes, entity_routes};
pub use schema::{Entity, Field, FieldKind, PrimitiveType, Schema};
pub use settings::Settings;
pub use sql::{EntityFilter, FilterOperator, OrderDirection};
pub use state::AppState;
pub use store::{connect, EntityStore};
