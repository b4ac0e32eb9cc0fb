use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use site_backend::domain::tts::{TtsJobService, VoiceSettings};
use site_backend::infrastructure::config::{Config, LogFormat};
use site_backend::infrastructure::db::{check_connection, create_pool};
use site_backend::infrastructure::http::start_http_server;
use site_backend::infrastructure::repositories::{
    ElevenLabsProvider, JobRepository, KeyRepository, S3AssetStore,
};
use site_backend::infrastructure::runtime::JobRuntime;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting site backend on {}:{}", config.host, config.port);

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Verify database connection
    check_connection(&pool).await?;
    tracing::info!("Database connection verified");

    // Create S3 client for audio publishing
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;
    let s3_client = Arc::new(aws_sdk_s3::Client::new(&aws_config));
    tracing::info!(
        region = %config.aws_region,
        bucket = %config.audio_bucket,
        "S3 client initialized"
    );

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories and outbound adapters
    let key_repo = Arc::new(KeyRepository::new(pool.clone()));
    let job_repo = Arc::new(JobRepository::new(pool.clone()));
    let provider = Arc::new(ElevenLabsProvider::new(
        config.provider_base_url.clone(),
        config.provider_model_id.clone(),
        config.provider_language.clone(),
        Duration::from_secs(config.provider_timeout_secs),
    )?);
    let asset_store = Arc::new(S3AssetStore::new(
        s3_client,
        config.audio_bucket.clone(),
        config.aws_region.clone(),
        config.audio_public_base_url.clone(),
    ));

    // 2. Instantiate the orchestrator service
    let tts_service = Arc::new(TtsJobService::new(
        key_repo.clone(),
        provider,
        asset_store,
        job_repo.clone(),
        config.default_voice_id.clone(),
        config.audio_folder.clone(),
        VoiceSettings::default(),
    ));

    // 3. Spawn the job runtime worker
    let runtime = Arc::new(JobRuntime::spawn(
        tts_service,
        config.job_max_attempts,
        config.job_queue_size,
    ));
    tracing::info!(
        max_attempts = config.job_max_attempts,
        queue_size = config.job_queue_size,
        "Job runtime started"
    );

    // 4. Instantiate controllers
    let tts_controller = Arc::new(site_backend::controllers::tts::TtsController::new(
        runtime,
        job_repo,
        config.status_cache_enabled,
    ));
    let keys_controller = Arc::new(site_backend::controllers::keys::KeysController::new(
        key_repo,
    ));

    // Start HTTP server with all routes
    start_http_server(pool, config, tts_controller, keys_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "site_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "site_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
