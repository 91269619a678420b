mod auth;
mod config;
mod middleware;

mod db;
mod directory;
mod error;
mod models;
mod routes;
mod sessions;
mod view;

use std::sync::Arc;

use crate::{
    config::Config, directory::PgDirectory, models::AppState, sessions::ViewSessionStore,
};

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use axum::http::header;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cfg = Config::from_env()?;
    let pool = db::connect_pg(&cfg.database_url).await?;

    let state = AppState {
        directory: Arc::new(PgDirectory::new(pool)),
        views: ViewSessionStore::new(),
        view_ttl_minutes: cfg.view_ttl_minutes,
    };

    // The patient page is served from a different origin; without this the
    // OPTIONS preflight returns 405 and blocks every POST.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
