//! Fixed reply texts and keyboards

use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};
use crate::models::{ConfigDocument, VipSendMode};
use crate::utils::errors::VipGateError;

pub const AGREE_CALLBACK: &str = "agree_vip";
pub const ADMIN_CALLBACK_PREFIX: &str = "admin:";

pub const NOT_ADMIN: &str = "⛔ You are not an admin.";
pub const ALREADY_RECEIVED: &str = "You have already received your VIP link.";
pub const RESTART: &str = "I couldn't find your registration. Please send /start to begin again.";
pub const CONTACT_ADMIN: &str = "Sorry, the VIP link is not available right now. Please contact an admin.";
pub const NOT_YOUR_CONTACT: &str = "Please share your own phone number using the button below.";
pub const SHARE_PHONE: &str = "Please share your phone number using the button below.";
pub const ASK_NAME_OR_PHONE: &str = "Please type your name, or share your phone number using the button below.";
pub const PHONE_SAVED: &str = "✅ Thanks, your phone number is saved.";
pub const SHARE_PHONE_BUTTON: &str = "📱 Share phone number";
pub const EDIT_CANCELLED: &str = "Edit cancelled.";
pub const NOTHING_TO_CANCEL: &str = "There is no pending edit.";
pub const NO_USERS: &str = "No users registered yet.";

/// Contact-request reply keyboard
pub fn contact_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(SHARE_PHONE_BUTTON).request(ButtonRequest::Contact)
    ]])
    .resize_keyboard()
    .one_time_keyboard()
}

/// Single confirm button under the agreement text
pub fn agreement_keyboard(config: &ConfigDocument) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(config.agreement_button_label.clone(), AGREE_CALLBACK)
    ]])
}

pub fn vip_link(link: &str) -> String {
    format!("🎉 Here is your VIP link:\n{}", link)
}

pub fn usage(command: &str, argument: &str) -> String {
    format!("Usage: /{} {}", command, argument)
}

pub fn field_prompt(label: &str) -> String {
    format!("Send the new {} as your next message, or /cancel.", label)
}

pub fn field_updated(label: &str, value: &str) -> String {
    format!("✅ The {} is now:\n{}", label, value)
}

pub fn mode_changed(mode: VipSendMode) -> String {
    match mode {
        VipSendMode::Auto => "✅ VIP mode: auto (one-time invite links)".to_string(),
        VipSendMode::Manual => "✅ VIP mode: manual (static link)".to_string(),
    }
}

/// User-facing correction for an error, if the error is the user's to fix
pub fn correction(error: &VipGateError) -> Option<String> {
    match error {
        VipGateError::InvalidInput(message) => Some(format!("⚠️ {}", message)),
        VipGateError::UrlParse(e) => Some(format!("⚠️ That is not a valid link: {}", e)),
        VipGateError::PermissionDenied(_) => Some(NOT_ADMIN.to_string()),
        _ => None,
    }
}
