use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::wizard::machine::WizardLayout;

const DEFAULT_GENERATION_SERVICE_URL: &str = "http://localhost:5000/api/resume/generate";

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub generation_service_url: String,
    pub download_dir: PathBuf,
    pub default_layout: WizardLayout,
    pub min_artifact_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            generation_service_url: env_or("GENERATION_SERVICE_URL", DEFAULT_GENERATION_SERVICE_URL),
            download_dir: PathBuf::from(env_or("DOWNLOAD_DIR", "downloads")),
            default_layout: env_or("WIZARD_LAYOUT", "multi_step")
                .parse::<WizardLayout>()
                .map_err(|e| anyhow!("WIZARD_LAYOUT must be 'multi_step' or 'single_page': {e}"))?,
            min_artifact_bytes: env_or("MIN_ARTIFACT_BYTES", "8")
                .parse::<usize>()
                .context("MIN_ARTIFACT_BYTES must be a non-negative integer")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
