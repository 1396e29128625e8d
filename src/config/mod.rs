use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

pub struct Config {
    pub text_service_url: String,
    pub text_service_api_key: String,
    pub text_service_model: String,
    pub catalog_url: String,
    pub catalog_api_key: String,
    pub default_city: String,
    /// Extra phrases that disqualify a captured string from being a movie
    /// title, on top of the built-in list. Comma-separated in the env var.
    pub extra_exclusion_phrases: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Config {
            text_service_url: env::var("TEXT_SERVICE_URL")
                .context("TEXT_SERVICE_URL must be set")?,
            text_service_api_key: env::var("TEXT_SERVICE_API_KEY")
                .context("TEXT_SERVICE_API_KEY must be set")?,
            text_service_model: env::var("TEXT_SERVICE_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            catalog_url: env::var("MOVIE_CATALOG_URL")
                .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string()),
            catalog_api_key: env::var("MOVIE_CATALOG_API_KEY")
                .context("MOVIE_CATALOG_API_KEY must be set")?,
            default_city: env::var("DEFAULT_CITY").unwrap_or_else(|_| "New York".to_string()),
            extra_exclusion_phrases: env::var("TITLE_EXCLUSION_PHRASES")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}
