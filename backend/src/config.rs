use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};

pub const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const DEFAULT_STATICMAP_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";
pub const DEFAULT_MODEL_PATH: &str = "model/zone_model_v1.onnx";

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub maps_key: String,
    pub model_path: PathBuf,
    pub geocode_url: String,
    pub staticmap_url: String,
    pub http_timeout: Duration,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let maps_key = lookup("GOOGLE_MAPS_KEY")
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow!("GOOGLE_MAPS_KEY must be set"))?;

        let port = or("PORT", "8080")
            .parse()
            .context("PORT must be a valid port number")?;

        let workers = match lookup("WORKERS") {
            Some(w) => w.parse().context("WORKERS must be a positive integer")?,
            None => num_cpus::get(),
        };

        let timeout_secs: u64 = or("HTTP_TIMEOUT_SECS", "10")
            .parse()
            .context("HTTP_TIMEOUT_SECS must be an integer")?;

        Ok(AppConfig {
            host: or("HOST", "127.0.0.1"),
            port,
            workers,
            maps_key,
            model_path: PathBuf::from(or("ZONE_MODEL_PATH", DEFAULT_MODEL_PATH)),
            geocode_url: or("GEOCODE_URL", DEFAULT_GEOCODE_URL),
            staticmap_url: or("STATICMAP_URL", DEFAULT_STATICMAP_URL),
            http_timeout: Duration::from_secs(timeout_secs),
            cors_origin: or("CORS_ORIGIN", "http://localhost:8080"),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
