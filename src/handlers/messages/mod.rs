//! Message handlers module
//!
//! Handles shared contacts and free text: pending admin edits, the name
//! fallback and phone re-prompts.

use teloxide::{Bot, types::{ChatId, Message}, prelude::*};
use tracing::{info, debug};
use crate::handlers::commands::{admin, start};
use crate::handlers::replies;
use crate::models::{OnboardingStep, SharedContact, UserProfile};
use crate::services::{ServiceFactory, ContactOutcome, NameOutcome};
use crate::utils::errors::{VipGateError, Result};
use crate::utils::logging::log_user_action;

/// Handle incoming non-command messages
pub async fn handle_message(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let profile = msg
        .from
        .as_ref()
        .map(UserProfile::from)
        .ok_or_else(|| VipGateError::InvalidInput("No user in message".to_string()))?;
    let chat_id = msg.chat.id;

    if let Some(contact) = msg.contact() {
        return handle_contact(bot, chat_id, profile, SharedContact::from(contact), services).await;
    }

    if let Some(text) = msg.text() {
        return handle_text(bot, chat_id, profile, text.to_string(), services).await;
    }

    debug!(user_id = profile.id, chat_id = ?chat_id, "Ignoring message without text or contact");
    Ok(())
}

/// Handle a shared contact card
pub async fn handle_contact(
    bot: Bot,
    chat_id: ChatId,
    profile: UserProfile,
    contact: SharedContact,
    services: ServiceFactory,
) -> Result<()> {
    match services.user_service.record_contact(&profile, &contact).await? {
        ContactOutcome::Rejected => {
            bot.send_message(chat_id, replies::NOT_YOUR_CONTACT)
                .reply_markup(replies::contact_keyboard())
                .await?;
        }
        ContactOutcome::Saved(user) => {
            log_user_action(user.id, "phone_shared", None);
            let config = services.config_service.snapshot().await;
            start::send_agreement(&bot, chat_id, &config).await?;
        }
    }
    Ok(())
}

/// Handle free text
pub async fn handle_text(
    bot: Bot,
    chat_id: ChatId,
    profile: UserProfile,
    text: String,
    services: ServiceFactory,
) -> Result<()> {
    let user_id = profile.id;

    if text.starts_with('/') {
        debug!(user_id = user_id, "Ignoring unknown command");
        return Ok(());
    }

    if services.auth_service.is_admin(user_id).await {
        if let Some(field) = services.config_service.take_pending(user_id).await? {
            let accepted = admin::submit_value(&bot, chat_id, user_id, field, &text, &services).await?;
            if !accepted {
                // Keep the edit armed so the admin can try again
                services.config_service.arm_edit(user_id, field).await?;
            }
            return Ok(());
        }
    }

    match services.user_service.record_name(user_id, &text).await? {
        NameOutcome::Saved(user) => {
            info!(user_id = user_id, "Name collected from text");
            start::send_contact_prompt(&bot, chat_id, user.step).await?;
        }
        NameOutcome::NotExpected(Some(user)) if user.step == OnboardingStep::AwaitingPhone => {
            start::send_contact_prompt(&bot, chat_id, user.step).await?;
        }
        NameOutcome::NotExpected(Some(user)) => {
            debug!(user_id = user_id, step = %user.step, "Ignoring free text");
        }
        NameOutcome::NotExpected(None) => {
            debug!(user_id = user_id, "Free text from unregistered user");
            bot.send_message(chat_id, replies::RESTART).await?;
        }
    }

    Ok(())
}
