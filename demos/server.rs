//! Example server: loads the compiled schema from `SCHEMA_PATH`, migrates it into `DATABASE_URL`
//! (destructive), and serves the entity routes.

use entity_store::{app_router, connect, schema, AppState, EntityStore, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("entity_store=info".parse()?))
        .init();

    let settings = Settings::from_env();
    let schema_path = settings
        .schema_path
        .clone()
        .ok_or("SCHEMA_PATH must point to a compiled schema document")?;
    let schema = schema::load_from_path(&schema_path).await?;

    let pool = connect(&settings.database_url).await?;
    let store = EntityStore::migrate(pool, Arc::new(schema)).await?;
    let app = app_router(AppState { store });

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
