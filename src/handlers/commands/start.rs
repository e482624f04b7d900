//! Start command handler
//!
//! Handles the /start command and the onboarding prompts shared with the
//! message and callback handlers.

use teloxide::{Bot, types::{ChatId, KeyboardRemove}, prelude::*};
use tracing::{info, debug};
use crate::handlers::replies;
use crate::models::{ConfigDocument, OnboardingStep, UserProfile};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::logging::log_user_action;

/// Handle /start command - main entry point for user onboarding
pub async fn handle_start(
    bot: Bot,
    chat_id: ChatId,
    profile: UserProfile,
    services: ServiceFactory,
) -> Result<()> {
    debug!(user_id = profile.id, chat_id = ?chat_id, "Processing /start command");

    let user = services.user_service.register_or_refresh(&profile).await?;
    let config = services.config_service.snapshot().await;

    bot.send_message(chat_id, config.welcome_message.clone()).await?;
    send_contact_prompt(&bot, chat_id, user.step).await?;

    log_user_action(user.id, "start", Some(user.step.as_str()));
    info!(user_id = user.id, step = %user.step, "Onboarding prompt sent");
    Ok(())
}

/// Ask for the phone number with the contact-request keyboard
pub async fn send_contact_prompt(bot: &Bot, chat_id: ChatId, step: OnboardingStep) -> Result<()> {
    let text = if step == OnboardingStep::AwaitingName {
        replies::ASK_NAME_OR_PHONE
    } else {
        replies::SHARE_PHONE
    };

    bot.send_message(chat_id, text)
        .reply_markup(replies::contact_keyboard())
        .await?;
    Ok(())
}

/// Drop the contact keyboard and show the agreement with its confirm button
pub async fn send_agreement(bot: &Bot, chat_id: ChatId, config: &ConfigDocument) -> Result<()> {
    bot.send_message(chat_id, replies::PHONE_SAVED)
        .reply_markup(KeyboardRemove::new())
        .await?;

    bot.send_message(chat_id, config.agreement_text.clone())
        .reply_markup(replies::agreement_keyboard(config))
        .await?;
    Ok(())
}
