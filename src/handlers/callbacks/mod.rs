//! Callback query handlers module
//!
//! This module contains handlers for all inline keyboard button callbacks

use teloxide::{Bot, types::{CallbackQuery, ChatId}, prelude::*};
use tracing::{info, debug, warn};
use crate::handlers::commands::{admin::{self, AdminAction}, start};
use crate::handlers::replies;
use crate::services::{ServiceFactory, VipClaim};
use crate::utils::errors::Result;
use crate::utils::logging::{log_api_error, log_user_action};

/// Main callback query dispatcher
pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    services: ServiceFactory,
) -> Result<()> {
    let user_id = query.from.id.0 as i64;
    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(user_id));

    debug!(user_id = user_id, chat_id = ?chat_id, callback_data = ?query.data, "Processing callback query");

    // Answer first to clear the button's loading state
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        warn!(error = %e, callback_id = %query.id, "Failed to answer callback query");
    }

    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };

    if data == replies::AGREE_CALLBACK {
        return handle_agree(bot, chat_id, user_id, services).await;
    }

    if let Some(action) = data.strip_prefix(replies::ADMIN_CALLBACK_PREFIX) {
        return match action.parse::<AdminAction>() {
            Ok(action) => admin::handle_admin_action(bot, chat_id, user_id, action, services).await,
            Err(_) => {
                warn!(user_id = user_id, callback_data = %data, "Unknown admin action");
                Ok(())
            }
        };
    }

    warn!(user_id = user_id, callback_data = %data, "Unknown callback data");
    Ok(())
}

/// Handle the agreement confirm button: claim, issue, deliver
pub async fn handle_agree(bot: Bot, chat_id: ChatId, user_id: i64, services: ServiceFactory) -> Result<()> {
    let is_admin = services.auth_service.is_admin(user_id).await;

    let exempt = match services.user_service.claim_vip(user_id, is_admin).await? {
        VipClaim::UnknownUser => {
            bot.send_message(chat_id, replies::RESTART).await?;
            return Ok(());
        }
        VipClaim::PhoneMissing => {
            let step = services
                .user_service
                .get_user(user_id)
                .await
                .map(|user| user.step)
                .unwrap_or_default();
            start::send_contact_prompt(&bot, chat_id, step).await?;
            return Ok(());
        }
        VipClaim::AlreadyReceived => {
            info!(user_id = user_id, "Repeated VIP request refused");
            bot.send_message(chat_id, replies::ALREADY_RECEIVED).await?;
            return Ok(());
        }
        VipClaim::Granted { exempt } => exempt,
    };

    let config = services.config_service.snapshot().await;
    let issued = services.invite_service.issue_invite(user_id, is_admin, &config).await;

    let Some(link) = issued.link() else {
        if !exempt {
            services.user_service.release_vip_claim(user_id).await?;
        }
        bot.send_message(chat_id, replies::CONTACT_ADMIN).await?;
        return Ok(());
    };

    if let Err(e) = bot.send_message(chat_id, replies::vip_link(link)).await {
        log_api_error("sendMessage", &e.to_string(), Some("VIP link delivery"));
        if !exempt {
            services.user_service.release_vip_claim(user_id).await?;
        }
        return Err(e.into());
    }

    services.user_service.complete_vip(user_id).await?;
    log_user_action(user_id, "vip_delivered", Some(issued.source()));
    Ok(())
}
