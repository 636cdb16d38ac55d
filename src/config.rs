use anyhow::{anyhow, Result};
use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/notifier.db";

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` means no token was configured; the service starts with
    /// notifications disabled instead of crashing.
    pub telegram_bot_token: Option<String>,
    pub database_url: String,
    pub http_port: u16,
    pub poll_interval_minutes: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let database_url = if database_url.trim().is_empty() {
            DEFAULT_DATABASE_URL.to_string()
        } else {
            database_url
        };

        let port_str = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str.trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let interval_str = env::var("NOTIFY_INTERVAL_MINUTES")
            .unwrap_or_else(|_| "5".to_string());
        let poll_interval_minutes: u32 = interval_str.trim()
            .parse()
            .map_err(|_| anyhow!("Invalid NOTIFY_INTERVAL_MINUTES"))?;
        if !(1..=59).contains(&poll_interval_minutes) {
            return Err(anyhow!("NOTIFY_INTERVAL_MINUTES must be between 1 and 59"));
        }

        Ok(Config {
            telegram_bot_token,
            database_url,
            http_port,
            poll_interval_minutes,
        })
    }
}
