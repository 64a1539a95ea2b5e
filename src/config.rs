use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Everything the completion call needs.
#[derive(Clone, Debug)]
pub struct LlmSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl LlmSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        LlmSettings {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub llm: LlmSettings,
    pub request_timeout: Duration,
    /// Directory that receives the per-request temporary PDF files.
    pub export_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source; `load` uses the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // The only credential the service needs
        let api_key = lookup("OPENAI_API_KEY")
            .ok_or_else(|| AppError::Config("OPENAI_API_KEY is not set".to_string()))?;
        if api_key.trim().is_empty() {
            return Err(AppError::Config("OPENAI_API_KEY is empty".to_string()));
        }

        let mut llm = LlmSettings::new(api_key);
        if let Some(model) = lookup("OPENAI_MODEL") {
            llm.model = model;
        }
        if let Some(base_url) = lookup("OPENAI_BASE_URL") {
            llm.base_url = base_url;
        }

        // Load server configuration with defaults
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        let timeout_secs = lookup("REQUEST_TIMEOUT_SECS").unwrap_or_else(|| "90".to_string());
        let timeout_secs = timeout_secs
            .parse::<u64>()
            .map_err(|e| AppError::Config(format!("Invalid REQUEST_TIMEOUT_SECS: {}", e)))?;

        let export_dir = lookup("EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            llm,
            request_timeout: Duration::from_secs(timeout_secs),
            export_dir,
        })
    }
}
