//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod bot_config;
pub mod invite;
pub mod user;

// Re-export commonly used services
pub use auth::AuthService;
pub use bot_config::BotConfigService;
pub use invite::{InviteService, IssuedInvite};
pub use user::{UserService, ContactOutcome, NameOutcome, VipClaim};

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use teloxide::Bot;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub config_service: BotConfigService,
    pub invite_service: InviteService,
    pub list_chunk_chars: usize,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(bot: Bot, settings: &Settings, database: DatabaseService) -> Self {
        let user_service = UserService::new(database.users.clone());
        let auth_service = AuthService::new(bot.clone(), database.config.clone(), database.users);
        let config_service = BotConfigService::new(database.config, settings.admin.pending_edit_ttl_seconds);
        let invite_service = InviteService::new(bot, settings.invite.clone());

        Self {
            user_service,
            auth_service,
            config_service,
            invite_service,
            list_chunk_chars: settings.admin.list_chunk_chars,
        }
    }
}
