//! Admin command handlers
//!
//! Every entry point checks the caller against the admin set first; anyone
//! else gets the fixed denial and nothing changes.

use std::str::FromStr;
use teloxide::{Bot, types::{ChatId, InlineKeyboardMarkup, InlineKeyboardButton}, prelude::*};
use tracing::{info, debug};
use crate::handlers::replies;
use crate::models::{AdminRef, ConfigDocument, EditableField, VipSendMode};
use crate::services::ServiceFactory;
use crate::utils::errors::{VipGateError, Result};
use crate::utils::helpers::{chunk_text, format_user_line};
use crate::utils::logging::log_admin_action;

const PREVIEW_CHARS: usize = 200;

/// Admin panel button actions, carried as `admin:<action>` callback data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Edit(EditableField),
    ToggleMode,
    ListUsers,
    ListAdmins,
    Cancel,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::Edit(EditableField::WelcomeMessage) => "edit_welcome",
            AdminAction::Edit(EditableField::AgreementText) => "edit_agreement",
            AdminAction::Edit(EditableField::AgreementButtonLabel) => "edit_button",
            AdminAction::Edit(EditableField::VipChannelLink) => "edit_link",
            AdminAction::Edit(EditableField::VipChannelId) => "edit_channel",
            AdminAction::Edit(EditableField::AddAdmin) => "add_admin",
            AdminAction::Edit(EditableField::RemoveAdmin) => "remove_admin",
            AdminAction::ToggleMode => "toggle_mode",
            AdminAction::ListUsers => "list_users",
            AdminAction::ListAdmins => "list_admins",
            AdminAction::Cancel => "cancel",
        }
    }

    pub fn callback_data(&self) -> String {
        format!("{}{}", replies::ADMIN_CALLBACK_PREFIX, self.as_str())
    }
}

impl FromStr for AdminAction {
    type Err = VipGateError;

    fn from_str(s: &str) -> Result<Self> {
        let action = match s {
            "edit_welcome" => AdminAction::Edit(EditableField::WelcomeMessage),
            "edit_agreement" => AdminAction::Edit(EditableField::AgreementText),
            "edit_button" => AdminAction::Edit(EditableField::AgreementButtonLabel),
            "edit_link" => AdminAction::Edit(EditableField::VipChannelLink),
            "edit_channel" => AdminAction::Edit(EditableField::VipChannelId),
            "add_admin" => AdminAction::Edit(EditableField::AddAdmin),
            "remove_admin" => AdminAction::Edit(EditableField::RemoveAdmin),
            "toggle_mode" => AdminAction::ToggleMode,
            "list_users" => AdminAction::ListUsers,
            "list_admins" => AdminAction::ListAdmins,
            "cancel" => AdminAction::Cancel,
            other => return Err(VipGateError::InvalidInput(format!("Unknown admin action: {}", other))),
        };
        Ok(action)
    }
}

/// Send the denial to non-admins. Returns whether the caller may proceed.
pub async fn ensure_admin(bot: &Bot, chat_id: ChatId, user_id: i64, services: &ServiceFactory) -> Result<bool> {
    match services.auth_service.require_admin(user_id).await {
        Ok(()) => Ok(true),
        Err(VipGateError::PermissionDenied(_)) => {
            bot.send_message(chat_id, replies::NOT_ADMIN).await?;
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Handle /admin command - show admin panel
pub async fn handle_admin_panel(bot: Bot, chat_id: ChatId, admin_id: i64, services: ServiceFactory) -> Result<()> {
    debug!(user_id = admin_id, chat_id = ?chat_id, "Processing /admin command");

    if !ensure_admin(&bot, chat_id, admin_id, &services).await? {
        return Ok(());
    }

    let config = services.config_service.snapshot().await;
    let user_count = services.user_service.list_users().await.len();
    let mut text = panel_text(&config, user_count);
    if let Some(field) = services.config_service.pending_for(admin_id).await {
        text.push_str(&format!("\n\n✏️ Waiting for the new {}. Send it, or /cancel.", field.label()));
    }

    bot.send_message(chat_id, text)
        .reply_markup(panel_keyboard())
        .await?;

    info!(admin_id = admin_id, "Admin opened the panel");
    Ok(())
}

fn panel_text(config: &ConfigDocument, user_count: usize) -> String {
    format!(
        "🛠 Admin panel\n\n\
         Welcome message: {}\n\
         Agreement text: {}\n\
         Button label: {}\n\
         VIP link: {}\n\
         VIP channel: {}\n\
         VIP mode: {}\n\
         Admins: {}\n\
         Users: {}",
        preview(&config.welcome_message),
        preview(&config.agreement_text),
        config.agreement_button_label,
        config.fallback_link().unwrap_or("(not set)"),
        config.vip_channel_id.as_deref().unwrap_or("(not set)"),
        config.vip_send_mode,
        config.admins.len(),
        user_count,
    )
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}…", cut)
    }
}

fn panel_keyboard() -> InlineKeyboardMarkup {
    let button = |label: &str, action: AdminAction| InlineKeyboardButton::callback(label.to_string(), action.callback_data());

    InlineKeyboardMarkup::new(vec![
        vec![
            button("✏️ Welcome", AdminAction::Edit(EditableField::WelcomeMessage)),
            button("✏️ Agreement", AdminAction::Edit(EditableField::AgreementText)),
        ],
        vec![
            button("✏️ Button", AdminAction::Edit(EditableField::AgreementButtonLabel)),
            button("🔗 VIP link", AdminAction::Edit(EditableField::VipChannelLink)),
        ],
        vec![
            button("📢 VIP channel", AdminAction::Edit(EditableField::VipChannelId)),
            button("🔁 Toggle mode", AdminAction::ToggleMode),
        ],
        vec![
            button("➕ Add admin", AdminAction::Edit(EditableField::AddAdmin)),
            button("➖ Remove admin", AdminAction::Edit(EditableField::RemoveAdmin)),
        ],
        vec![
            button("👥 Users", AdminAction::ListUsers),
            button("🛡 Admins", AdminAction::ListAdmins),
        ],
        vec![button("✖️ Cancel edit", AdminAction::Cancel)],
    ])
}

/// Handle the one-shot edit commands (/setwelcome, /addadmin, ...)
pub async fn handle_set_field(
    bot: Bot,
    chat_id: ChatId,
    admin_id: i64,
    field: EditableField,
    value: String,
    services: ServiceFactory,
) -> Result<()> {
    if !ensure_admin(&bot, chat_id, admin_id, &services).await? {
        return Ok(());
    }

    if value.trim().is_empty() {
        let (command, argument) = usage_for(field);
        bot.send_message(chat_id, replies::usage(command, argument)).await?;
        return Ok(());
    }

    submit_value(&bot, chat_id, admin_id, field, &value, &services).await?;
    Ok(())
}

/// Apply a value typed by an admin and reply with the outcome. Returns
/// whether the value was accepted.
pub async fn submit_value(
    bot: &Bot,
    chat_id: ChatId,
    admin_id: i64,
    field: EditableField,
    value: &str,
    services: &ServiceFactory,
) -> Result<bool> {
    match apply_value(admin_id, field, value, services).await {
        Ok(reply) => {
            log_admin_action(admin_id, "edit", Some(field.label()), Some(value.trim()));
            bot.send_message(chat_id, reply).await?;
            Ok(true)
        }
        Err(e) => match replies::correction(&e) {
            Some(correction) => {
                debug!(admin_id = admin_id, field = ?field, error = %e, "Admin input rejected");
                bot.send_message(chat_id, correction).await?;
                Ok(false)
            }
            None => Err(e),
        },
    }
}

async fn apply_value(admin_id: i64, field: EditableField, value: &str, services: &ServiceFactory) -> Result<String> {
    match field {
        EditableField::AddAdmin => {
            let target = services.auth_service.resolve(&value.parse::<AdminRef>()?).await?;
            if services.auth_service.add_admin(admin_id, target).await? {
                Ok(format!("✅ {} is now an admin.", target))
            } else {
                Ok(format!("{} is already an admin.", target))
            }
        }
        EditableField::RemoveAdmin => {
            let target = services.auth_service.resolve(&value.parse::<AdminRef>()?).await?;
            if services.auth_service.remove_admin(admin_id, target).await? {
                Ok(format!("✅ {} is no longer an admin.", target))
            } else {
                Ok(format!("{} is not an admin.", target))
            }
        }
        _ => {
            let stored = services.config_service.set_field(admin_id, field, value).await?;
            Ok(replies::field_updated(field.label(), &stored))
        }
    }
}

fn usage_for(field: EditableField) -> (&'static str, &'static str) {
    match field {
        EditableField::WelcomeMessage => ("setwelcome", "TEXT"),
        EditableField::AgreementText => ("setagreement", "TEXT"),
        EditableField::AgreementButtonLabel => ("setbutton", "LABEL"),
        EditableField::VipChannelLink => ("setviplink", "https://t.me/..."),
        EditableField::VipChannelId => ("setvipchannel", "-100123456789 | @channel | https://t.me/channel"),
        EditableField::AddAdmin => ("addadmin", "USER_ID | @username"),
        EditableField::RemoveAdmin => ("removeadmin", "USER_ID | @username"),
    }
}

/// Handle /admins
pub async fn handle_list_admins(bot: Bot, chat_id: ChatId, admin_id: i64, services: ServiceFactory) -> Result<()> {
    if !ensure_admin(&bot, chat_id, admin_id, &services).await? {
        return Ok(());
    }
    send_admin_list(&bot, chat_id, &services).await
}

async fn send_admin_list(bot: &Bot, chat_id: ChatId, services: &ServiceFactory) -> Result<()> {
    let admins = services.auth_service.list_admins().await;
    let text = format!("🛡 Admins ({}):\n{}", admins.len(), admins.join("\n"));
    bot.send_message(chat_id, text).await?;
    Ok(())
}

/// Handle /listusers
pub async fn handle_list_users(bot: Bot, chat_id: ChatId, admin_id: i64, services: ServiceFactory) -> Result<()> {
    if !ensure_admin(&bot, chat_id, admin_id, &services).await? {
        return Ok(());
    }
    send_user_list(&bot, chat_id, &services).await
}

async fn send_user_list(bot: &Bot, chat_id: ChatId, services: &ServiceFactory) -> Result<()> {
    let users = services.user_service.list_users().await;
    if users.is_empty() {
        bot.send_message(chat_id, replies::NO_USERS).await?;
        return Ok(());
    }

    let lines: Vec<String> = users.iter().map(format_user_line).collect();
    let chunks = chunk_text(&lines.join("\n"), services.list_chunk_chars);
    debug!(users = users.len(), chunks = chunks.len(), "Sending user list");

    for chunk in chunks {
        bot.send_message(chat_id, chunk).await?;
    }
    Ok(())
}

/// Handle /vipmode [auto|manual]
pub async fn handle_vip_mode(
    bot: Bot,
    chat_id: ChatId,
    admin_id: i64,
    arg: String,
    services: ServiceFactory,
) -> Result<()> {
    if !ensure_admin(&bot, chat_id, admin_id, &services).await? {
        return Ok(());
    }

    let requested = match arg.trim() {
        "" => None,
        other => match other.parse::<VipSendMode>() {
            Ok(mode) => Some(mode),
            Err(_) => {
                bot.send_message(chat_id, replies::usage("vipmode", "[auto|manual]")).await?;
                return Ok(());
            }
        },
    };

    let mode = services.config_service.set_mode(admin_id, requested).await?;
    log_admin_action(admin_id, "vip_mode", None, Some(mode.to_string().as_str()));
    bot.send_message(chat_id, replies::mode_changed(mode)).await?;
    Ok(())
}

/// Handle /cancel
pub async fn handle_cancel(bot: Bot, chat_id: ChatId, admin_id: i64, services: ServiceFactory) -> Result<()> {
    if !ensure_admin(&bot, chat_id, admin_id, &services).await? {
        return Ok(());
    }
    cancel_edit(&bot, chat_id, admin_id, &services).await
}

async fn cancel_edit(bot: &Bot, chat_id: ChatId, admin_id: i64, services: &ServiceFactory) -> Result<()> {
    let text = if services.config_service.cancel_edit(admin_id).await? {
        replies::EDIT_CANCELLED
    } else {
        replies::NOTHING_TO_CANCEL
    };
    bot.send_message(chat_id, text).await?;
    Ok(())
}

/// Handle an `admin:<action>` panel button
pub async fn handle_admin_action(
    bot: Bot,
    chat_id: ChatId,
    admin_id: i64,
    action: AdminAction,
    services: ServiceFactory,
) -> Result<()> {
    if !ensure_admin(&bot, chat_id, admin_id, &services).await? {
        return Ok(());
    }

    debug!(admin_id = admin_id, action = action.as_str(), "Processing admin panel action");

    match action {
        AdminAction::Edit(field) => {
            services.config_service.arm_edit(admin_id, field).await?;
            bot.send_message(chat_id, replies::field_prompt(field.label())).await?;
        }
        AdminAction::ToggleMode => {
            let mode = services.config_service.set_mode(admin_id, None).await?;
            log_admin_action(admin_id, "vip_mode", None, Some(mode.to_string().as_str()));
            bot.send_message(chat_id, replies::mode_changed(mode)).await?;
        }
        AdminAction::ListUsers => send_user_list(&bot, chat_id, &services).await?,
        AdminAction::ListAdmins => send_admin_list(&bot, chat_id, &services).await?,
        AdminAction::Cancel => cancel_edit(&bot, chat_id, admin_id, &services).await?,
    }

    Ok(())
}
