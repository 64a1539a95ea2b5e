pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod llm;
pub mod markdown;
pub mod prompt;
pub mod recipe;
pub mod sections;
pub mod share;

use std::sync::Arc;
use config::Config;
use error::Result;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(AppState {
            config: Arc::new(config),
            http,
        })
    }
}
