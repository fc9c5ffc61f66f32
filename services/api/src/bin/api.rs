//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{probe, BucketStore, RestStore},
    config::Config,
    error::ApiError,
    web::{
        dashboard_page, form_page, ingest_reading_handler, insert_handler,
        list_readings_handler, playback_page, recorder_page, rest::ApiDoc, save_handler,
        sensors_page, state::AppState, submit_handler,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Build the Backend Adapters ---
    let http = reqwest::Client::new();
    let rest_store = Arc::new(RestStore::new(
        http.clone(),
        config.backend_url.clone(),
        config.backend_key.clone(),
        config.feedback_table.clone(),
        config.sensors_table.clone(),
        config.voice_table.clone(),
    ));
    let bucket_store = Arc::new(BucketStore::new(
        http,
        config.backend_url.clone(),
        config.backend_key.clone(),
        config.bucket.clone(),
    ));

    // --- 3. Connectivity Probe (diagnostic only, never fatal) ---
    let report = probe::run(&config.backend_url, rest_store.as_ref()).await;
    if report.ok() {
        info!("{}", report.caption());
    } else {
        warn!("{}", report.caption());
    }

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(
        config.clone(),
        rest_store.clone(),
        rest_store.clone(),
        rest_store,
        bucket_store,
        report.caption(),
    ));

    // The ingest API is posted to by devices on other origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // --- 5. Create the Web Router ---
    let pages = Router::new()
        .route("/", get(form_page))
        .route("/feedback", post(submit_handler))
        .route("/dashboard", get(dashboard_page))
        .route("/sensors", get(sensors_page))
        .route("/sensors/insert", post(insert_handler))
        .route("/voice", get(recorder_page).post(save_handler))
        .route("/playback", get(playback_page));

    let api_router = Router::new()
        .route(
            "/api/readings",
            post(ingest_reading_handler).get(list_readings_handler),
        )
        .layer(cors);

    let app = Router::new()
        .merge(pages)
        .merge(api_router)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
