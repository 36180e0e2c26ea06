//! Configuration module
//!
//! Console settings come from the environment (optionally seeded by a `.env`
//! file). Everything has a default so the console runs against a local backend
//! with no setup at all.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const API_BASE_URL: &str = "http://localhost:5000/api";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const UPLOAD_TIMEOUT_SECS: u64 = 60;
const MAX_UPLOAD_MB: u64 = 10;
const IMAGE_MAX_WIDTH: u32 = 1200;
const IMAGE_QUALITY: f32 = 0.8;
const SUCCESS_DELAY_MS: u64 = 500;
const DECODE_TIMEOUT_SECS: u64 = 30;
const TOKEN_FILE: &str = ".gram-admin/token";

/// Admin console configuration
#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    pub api_base_url: String,
    /// Timeout for reads and text-only writes
    pub request_timeout_secs: u64,
    /// Timeout for requests that may carry an image payload
    pub upload_timeout_secs: u64,
    pub max_upload_bytes: u64,
    pub image_max_width: u32,
    pub image_quality: f32,
    pub success_delay_ms: u64,
    pub decode_timeout_secs: u64,
    pub token_path: PathBuf,
    pub environment: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: API_BASE_URL.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            upload_timeout_secs: UPLOAD_TIMEOUT_SECS,
            max_upload_bytes: MAX_UPLOAD_MB * 1024 * 1024,
            image_max_width: IMAGE_MAX_WIDTH,
            image_quality: IMAGE_QUALITY,
            success_delay_ms: SUCCESS_DELAY_MS,
            decode_timeout_secs: DECODE_TIMEOUT_SECS,
            token_path: default_token_path(),
            environment: "development".to_string(),
        }
    }
}

fn default_token_path() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir())
        .join(TOKEN_FILE)
}

impl ConsoleConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("GRAM_API_URL")
            .or_else(|_| env::var("API_BASE_URL"))
            .unwrap_or_else(|_| API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let max_upload_mb = env::var("GRAM_MAX_UPLOAD_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_UPLOAD_MB);

        let config = ConsoleConfig {
            api_base_url,
            request_timeout_secs: env::var("GRAM_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("GRAM_REQUEST_TIMEOUT_SECS must be a valid number"))?,
            upload_timeout_secs: env::var("GRAM_UPLOAD_TIMEOUT_SECS")
                .unwrap_or_else(|_| UPLOAD_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("GRAM_UPLOAD_TIMEOUT_SECS must be a valid number"))?,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            image_max_width: env::var("GRAM_IMAGE_MAX_WIDTH")
                .unwrap_or_else(|_| IMAGE_MAX_WIDTH.to_string())
                .parse()
                .unwrap_or(IMAGE_MAX_WIDTH),
            image_quality: env::var("GRAM_IMAGE_QUALITY")
                .unwrap_or_else(|_| IMAGE_QUALITY.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("GRAM_IMAGE_QUALITY must be a number in (0, 1]"))?,
            success_delay_ms: env::var("GRAM_SUCCESS_DELAY_MS")
                .unwrap_or_else(|_| SUCCESS_DELAY_MS.to_string())
                .parse()
                .unwrap_or(SUCCESS_DELAY_MS),
            decode_timeout_secs: env::var("GRAM_DECODE_TIMEOUT_SECS")
                .unwrap_or_else(|_| DECODE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DECODE_TIMEOUT_SECS),
            token_path: env::var("GRAM_TOKEN_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_token_path),
            environment: env::var("ENVIRONMENT")
                .or_else(|_| env::var("APP_ENV"))
                .unwrap_or_else(|_| "development".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "GRAM_API_URL must be an http:// or https:// URL"
            ));
        }

        if self.request_timeout_secs == 0 || self.upload_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Request timeouts must be greater than zero"));
        }

        if self.upload_timeout_secs < self.request_timeout_secs {
            return Err(anyhow::anyhow!(
                "GRAM_UPLOAD_TIMEOUT_SECS must not be shorter than GRAM_REQUEST_TIMEOUT_SECS"
            ));
        }

        if !(self.image_quality > 0.0 && self.image_quality <= 1.0) {
            return Err(anyhow::anyhow!("GRAM_IMAGE_QUALITY must be in (0, 1]"));
        }

        if self.image_max_width == 0 {
            return Err(anyhow::anyhow!("GRAM_IMAGE_MAX_WIDTH must be greater than zero"));
        }

        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("GRAM_MAX_UPLOAD_MB must be greater than zero"));
        }

        if self.decode_timeout_secs == 0 {
            return Err(anyhow::anyhow!("GRAM_DECODE_TIMEOUT_SECS must be greater than zero"));
        }

        Ok(())
    }

    /// Check if the console is pointed at a production backend
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn success_delay(&self) -> Duration {
        Duration::from_millis(self.success_delay_ms)
    }

    pub fn decode_timeout(&self) -> Duration {
        Duration::from_secs(self.decode_timeout_secs)
    }
}
