use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub admin_token: String,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Synthesis provider
    pub provider_base_url: String,
    pub provider_model_id: String,
    pub provider_language: Option<String>,
    pub default_voice_id: String,
    pub provider_timeout_secs: u64,
    // Asset storage
    pub aws_region: String,
    pub audio_bucket: String,
    pub audio_folder: String,
    pub audio_public_base_url: Option<String>,
    // Job runtime
    pub job_max_attempts: u32,
    pub job_queue_size: usize,
    // Status cache
    pub status_cache_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            admin_token: env::var("ADMIN_TOKEN")?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            provider_base_url: env::var("TTS_PROVIDER_BASE_URL")
                .unwrap_or_else(|_| "https://api.elevenlabs.io".to_string()),
            provider_model_id: env::var("TTS_PROVIDER_MODEL_ID")
                .unwrap_or_else(|_| "eleven_multilingual_v2".to_string()),
            provider_language: env::var("TTS_LANGUAGE_CODE").ok(),
            default_voice_id: env::var("TTS_DEFAULT_VOICE_ID")?,
            provider_timeout_secs: env::var("TTS_PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            audio_bucket: env::var("AUDIO_BUCKET")?,
            audio_folder: env::var("AUDIO_FOLDER").unwrap_or_else(|_| "tts".to_string()),
            audio_public_base_url: env::var("AUDIO_PUBLIC_BASE_URL").ok(),
            job_max_attempts: env::var("JOB_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            job_queue_size: env::var("JOB_QUEUE_SIZE")
                .unwrap_or_else(|_| "64".to_string())
                .parse()?,
            status_cache_enabled: env::var("STATUS_CACHE_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<String>()
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(true),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
