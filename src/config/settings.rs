//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from defaults, an optional TOML file and environment
//! variables.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::utils::errors::{VipGateError, Result};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub invite: InviteConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    /// Inline token; takes precedence over `token_file`
    pub token: String,
    pub token_file: String,
    /// Public base URL, the webhook path is appended to it
    pub webhook_url: Option<String>,
    pub webhook_path: String,
    pub port: u16,
    /// Seed for the admin set when the config document has none
    pub admin_ids: Vec<i64>,
}

/// JSON document locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub users_path: PathBuf,
    pub config_path: PathBuf,
}

/// One-time invite issuance tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InviteConfig {
    pub expire_hours: i64,
    pub member_limit: u32,
    pub cache_ttl_seconds: i64,
    pub max_concurrent: usize,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

/// Admin console configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    pub list_chunk_chars: usize,
    pub pending_edit_ttl_seconds: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    /// Write the log file as JSON lines
    #[serde(default)]
    pub json: bool,
}

impl Settings {
    /// Load settings from defaults, `config.toml` and `VIPGATE__*` environment variables
    pub fn new() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("VIPGATE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("bot.admin_ids"),
            )
            .build()?;

        let mut settings: Settings = settings.try_deserialize()?;
        settings.apply_platform_env(|key| std::env::var(key).ok());
        settings.resolve_token()?;
        Ok(settings)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        super::validation::validate_settings(self)
    }

    /// Full webhook URL Telegram should deliver updates to
    pub fn webhook_endpoint(&self) -> Result<url::Url> {
        let base = self.bot.webhook_url.as_deref()
            .ok_or_else(|| VipGateError::Config("Webhook base URL is required".to_string()))?;
        let base = base.trim_end_matches('/');
        Ok(url::Url::parse(&format!("{}{}", base, self.bot.webhook_path))?)
    }

    /// Pick up the conventional hosting variables when the prefixed ones are absent.
    /// A bare `RENDER_EXTERNAL_HOSTNAME` is served over https.
    fn apply_platform_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if self.bot.webhook_url.as_deref().map_or(true, str::is_empty) {
            self.bot.webhook_url = present("WEBHOOK_URL")
                .or_else(|| present("RENDER_EXTERNAL_URL"))
                .or_else(|| present("RENDER_EXTERNAL_HOSTNAME").map(|host| format!("https://{}", host.trim())));
        }

        if let Some(port) = present("PORT").and_then(|p| p.trim().parse().ok()) {
            self.bot.port = port;
        }
    }

    /// Fill `bot.token` from `bot.token_file` when it was not given inline
    fn resolve_token(&mut self) -> Result<()> {
        if !self.bot.token.trim().is_empty() {
            self.bot.token = self.bot.token.trim().to_string();
            return Ok(());
        }

        debug!(path = %self.bot.token_file, "Reading bot token from file");
        match std::fs::read_to_string(&self.bot.token_file) {
            Ok(contents) => {
                self.bot.token = contents.trim().to_string();
                Ok(())
            }
            Err(e) => Err(VipGateError::Config(format!(
                "Bot token is not set and token file {} is unreadable: {}",
                self.bot.token_file, e
            ))),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                token_file: "/etc/secrets/bot_token.txt".to_string(),
                webhook_url: None,
                webhook_path: "/bot".to_string(),
                port: 3000,
                admin_ids: vec![],
            },
            storage: StorageConfig {
                users_path: PathBuf::from("users.json"),
                config_path: PathBuf::from("config.json"),
            },
            invite: InviteConfig {
                expire_hours: 24,
                member_limit: 1,
                cache_ttl_seconds: 30,
                max_concurrent: 3,
                max_retries: 2,
                retry_backoff_ms: 500,
            },
            admin: AdminConfig {
                list_chunk_chars: 3500,
                pending_edit_ttl_seconds: 600,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                json: false,
            },
        }
    }
}
