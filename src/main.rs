mod db;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use services::upload::{CloudUploader, ImageUpload, UploadConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    // Initialize the media uploader (non-fatal: uploads disabled if config missing).
    let uploader: Option<Arc<dyn ImageUpload>> = match UploadConfig::from_env() {
        Some(config) => {
            tracing::info!(cloud = %config.cloud_name, "media uploader initialized");
            Some(Arc::new(CloudUploader::new(config)))
        }
        None => {
            tracing::warn!("media upload not configured; picture uploads disabled");
            None
        }
    };

    let state = state::AppState::new(pool, uploader);

    // Background subscriber: every domain event leaves a trace line.
    let _event_logger = services::events::spawn_event_logger(&state.events);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "masterkids listening");
    axum::serve(listener, app).await.expect("server failed");
}
