//! Configuration validation module
//!
//! Startup configuration problems are the only fatal errors the bot has, so
//! everything required to serve updates is checked here before the
//! dispatcher starts.

use crate::utils::errors::{VipGateError, Result};
use super::Settings;

/// Telegram's hard cap on a single message
const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(settings)?;
    validate_storage_config(&settings.storage)?;
    validate_invite_config(&settings.invite)?;
    validate_admin_config(&settings.admin)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(settings: &Settings) -> Result<()> {
    let config = &settings.bot;
    if config.token.is_empty() {
        return Err(VipGateError::Config(
            "Bot token is required".to_string()
        ));
    }

    if config.webhook_url.as_deref().map_or(true, |url| url.trim().is_empty()) {
        return Err(VipGateError::Config(
            "Webhook URL is required (set WEBHOOK_URL or bot.webhook_url)".to_string()
        ));
    }

    if !config.webhook_path.starts_with('/') {
        return Err(VipGateError::Config(
            "Webhook path must start with '/'".to_string()
        ));
    }

    if config.webhook_path.trim_end_matches('/') == crate::server::HEALTH_PATH {
        return Err(VipGateError::Config(
            format!("Webhook path cannot be {}, it serves the health check", crate::server::HEALTH_PATH)
        ));
    }

    let endpoint = settings.webhook_endpoint()?;
    if endpoint.scheme() != "https" && endpoint.scheme() != "http" {
        return Err(VipGateError::Config(
            format!("Webhook URL must be http(s), got {}", endpoint.scheme())
        ));
    }

    Ok(())
}

/// Validate storage configuration
fn validate_storage_config(config: &super::StorageConfig) -> Result<()> {
    if config.users_path.as_os_str().is_empty() {
        return Err(VipGateError::Config(
            "Users file path is required".to_string()
        ));
    }

    if config.config_path.as_os_str().is_empty() {
        return Err(VipGateError::Config(
            "Config file path is required".to_string()
        ));
    }

    if config.users_path == config.config_path {
        return Err(VipGateError::Config(
            "Users and config documents must live in different files".to_string()
        ));
    }

    Ok(())
}

/// Validate invite issuance configuration
fn validate_invite_config(config: &super::InviteConfig) -> Result<()> {
    if config.expire_hours <= 0 {
        return Err(VipGateError::Config(
            "Invite expiry must be greater than 0 hours".to_string()
        ));
    }

    if config.member_limit == 0 || config.member_limit > 99_999 {
        return Err(VipGateError::Config(
            "Invite member limit must be between 1 and 99999".to_string()
        ));
    }

    if config.max_concurrent == 0 {
        return Err(VipGateError::Config(
            "Invite worker count must be greater than 0".to_string()
        ));
    }

    if config.cache_ttl_seconds < 0 {
        return Err(VipGateError::Config(
            "Invite cache TTL cannot be negative".to_string()
        ));
    }

    Ok(())
}

/// Validate admin console configuration
fn validate_admin_config(config: &super::AdminConfig) -> Result<()> {
    if config.list_chunk_chars == 0 || config.list_chunk_chars > TELEGRAM_MESSAGE_LIMIT {
        return Err(VipGateError::Config(format!(
            "User list chunk size must be between 1 and {}", TELEGRAM_MESSAGE_LIMIT
        )));
    }

    if config.pending_edit_ttl_seconds <= 0 {
        return Err(VipGateError::Config(
            "Pending edit TTL must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(VipGateError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(VipGateError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
