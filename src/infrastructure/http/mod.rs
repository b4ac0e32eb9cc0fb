use axum::{middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;
use crate::{
    controllers::{health, keys::KeysController, tts::TtsController},
    infrastructure::auth::{admin_auth_middleware, request_id_middleware},
};

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    tts_controller: Arc<TtsController>,
    keys_controller: Arc<KeysController>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Status polling is public; anyone holding a job id may poll it.
    let status_routes = Router::new()
        .route("/api/tts/status", get(TtsController::get_status))
        .with_state(tts_controller.clone());

    // Job submission comes from the admin console.
    let job_routes = Router::new()
        .route("/api/tts/jobs", post(TtsController::create_job))
        .with_state(tts_controller.clone())
        .layer(middleware::from_fn_with_state(
            config.clone(),
            admin_auth_middleware,
        ));

    // Key administration (admin only)
    let key_routes = Router::new()
        .route(
            "/api/admin/keys",
            get(KeysController::list_keys).post(KeysController::create_key),
        )
        .with_state(keys_controller.clone())
        .layer(middleware::from_fn_with_state(
            config.clone(),
            admin_auth_middleware,
        ));

    // Build application routes
    let app = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pool.clone())
        .merge(status_routes)
        .merge(job_routes)
        .merge(key_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http());

    // Start server
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
