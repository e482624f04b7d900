//! VipGate Telegram Bot
//!
//! A Telegram bot that onboards users (name, phone, agreement) and hands out
//! a VIP channel invite exactly once per user, with an admin console for the
//! bot texts, the admin set and the invite mode.

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod server;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{VipGateError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
