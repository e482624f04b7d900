//! Command handlers module
//!
//! This module contains handlers for all bot commands like /start, /admin, etc.

pub mod start;
pub mod admin;

use teloxide::{Bot, types::Message, utils::command::BotCommands};
use tracing::debug;
use crate::utils::errors::{VipGateError, Result};
use crate::services::ServiceFactory;
use crate::models::{EditableField, UserProfile};

/// All available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "VipGate commands:")]
pub enum Command {
    #[command(description = "Start onboarding")]
    Start,
    #[command(description = "Admin panel (admin only)")]
    Admin,
    #[command(description = "Set the welcome message (admin only)")]
    SetWelcome(String),
    #[command(description = "Set the agreement text (admin only)")]
    SetAgreement(String),
    #[command(description = "Set the agreement button label (admin only)")]
    SetButton(String),
    #[command(description = "Set the static VIP link (admin only)")]
    SetVipLink(String),
    #[command(description = "Set the VIP channel id or @username (admin only)")]
    SetVipChannel(String),
    #[command(description = "Add an admin by id or @username (admin only)")]
    AddAdmin(String),
    #[command(description = "Remove an admin by id or @username (admin only)")]
    RemoveAdmin(String),
    #[command(description = "List admins (admin only)")]
    Admins,
    #[command(description = "List registered users (admin only)")]
    ListUsers,
    #[command(description = "Toggle or set the VIP mode: auto or manual (admin only)")]
    VipMode(String),
    #[command(description = "Cancel a pending edit (admin only)")]
    Cancel,
}

/// Main command dispatcher
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    services: ServiceFactory,
) -> Result<()> {
    let profile = msg
        .from
        .as_ref()
        .map(UserProfile::from)
        .ok_or_else(|| VipGateError::InvalidInput("No user in message".to_string()))?;
    let chat_id = msg.chat.id;

    debug!(user_id = profile.id, command = ?cmd, "Processing command");

    match cmd {
        Command::Start => start::handle_start(bot, chat_id, profile, services).await,
        Command::Admin => admin::handle_admin_panel(bot, chat_id, profile.id, services).await,
        Command::SetWelcome(text) => {
            admin::handle_set_field(bot, chat_id, profile.id, EditableField::WelcomeMessage, text, services).await
        }
        Command::SetAgreement(text) => {
            admin::handle_set_field(bot, chat_id, profile.id, EditableField::AgreementText, text, services).await
        }
        Command::SetButton(text) => {
            admin::handle_set_field(bot, chat_id, profile.id, EditableField::AgreementButtonLabel, text, services).await
        }
        Command::SetVipLink(text) => {
            admin::handle_set_field(bot, chat_id, profile.id, EditableField::VipChannelLink, text, services).await
        }
        Command::SetVipChannel(text) => {
            admin::handle_set_field(bot, chat_id, profile.id, EditableField::VipChannelId, text, services).await
        }
        Command::AddAdmin(text) => {
            admin::handle_set_field(bot, chat_id, profile.id, EditableField::AddAdmin, text, services).await
        }
        Command::RemoveAdmin(text) => {
            admin::handle_set_field(bot, chat_id, profile.id, EditableField::RemoveAdmin, text, services).await
        }
        Command::Admins => admin::handle_list_admins(bot, chat_id, profile.id, services).await,
        Command::ListUsers => admin::handle_list_users(bot, chat_id, profile.id, services).await,
        Command::VipMode(arg) => admin::handle_vip_mode(bot, chat_id, profile.id, arg, services).await,
        Command::Cancel => admin::handle_cancel(bot, chat_id, profile.id, services).await,
    }
}
