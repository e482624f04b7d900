//! VIP invite issuance
//!
//! Produces something deliverable for every request: a fresh single-use
//! invite link when the bot can create one, otherwise the static link from
//! the config document, otherwise `Unavailable`. Failures are logged and
//! never returned to the caller.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use chrono::{DateTime, Duration, Utc};
use teloxide::prelude::*;
use teloxide::types::Recipient;
use teloxide::RequestError;
use tokio::sync::{Mutex, Semaphore};
use tracing::{info, warn, debug};
use crate::config::InviteConfig;
use crate::models::{ChannelRef, ConfigDocument, VipSendMode};
use crate::utils::errors::{VipGateError, Result};
use crate::utils::logging::log_api_error;

/// What `issue_invite` produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuedInvite {
    /// Freshly created single-use link
    Auto(String),
    /// Link created for this user moments ago
    Cached(String),
    /// Static link from the config document
    Fallback(String),
    /// Nothing could be produced
    Unavailable,
}

impl IssuedInvite {
    pub fn link(&self) -> Option<&str> {
        match self {
            IssuedInvite::Auto(link) | IssuedInvite::Cached(link) | IssuedInvite::Fallback(link) => Some(link),
            IssuedInvite::Unavailable => None,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            IssuedInvite::Auto(_) => "auto",
            IssuedInvite::Cached(_) => "cached",
            IssuedInvite::Fallback(_) => "fallback",
            IssuedInvite::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug, Clone)]
struct CachedInvite {
    link: String,
    created_at: DateTime<Utc>,
}

/// Invite service wrapping `createChatInviteLink`
#[derive(Clone)]
pub struct InviteService {
    bot: Bot,
    settings: InviteConfig,
    cache: Arc<Mutex<HashMap<i64, CachedInvite>>>,
    permits: Arc<Semaphore>,
}

impl InviteService {
    pub fn new(bot: Bot, settings: InviteConfig) -> Self {
        let permits = Arc::new(Semaphore::new(settings.max_concurrent.max(1)));
        Self {
            bot,
            settings,
            cache: Arc::new(Mutex::new(HashMap::new())),
            permits,
        }
    }

    /// Produce a VIP link for `user_id` according to the config document.
    ///
    /// Admins always get a fresh link; everyone else may be handed the link
    /// created for them within the cache window.
    pub async fn issue_invite(&self, user_id: i64, is_admin: bool, config: &ConfigDocument) -> IssuedInvite {
        if config.vip_send_mode == VipSendMode::Manual {
            debug!(user_id = user_id, "Manual mode, sending static link");
            return fallback(config);
        }

        if !is_admin {
            if let Some(link) = self.cached(user_id).await {
                debug!(user_id = user_id, "Reusing recently created invite");
                return IssuedInvite::Cached(link);
            }
        }

        match self.create_invite(user_id, config).await {
            Ok(link) => {
                info!(user_id = user_id, "One-time invite created");
                self.remember(user_id, &link).await;
                IssuedInvite::Auto(link)
            }
            Err(e) => {
                log_api_error("createChatInviteLink", &e.to_string(), Some("falling back to static link"));
                fallback(config)
            }
        }
    }

    async fn create_invite(&self, user_id: i64, config: &ConfigDocument) -> Result<String> {
        let channel: ChannelRef = config
            .vip_channel_id
            .as_deref()
            .ok_or_else(|| VipGateError::Config("VIP channel is not configured".to_string()))?
            .parse()?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| VipGateError::Config("Invite queue is closed".to_string()))?;

        let chat_id = self.resolve_channel(&channel).await?;
        let expire_date = Utc::now() + Duration::hours(self.settings.expire_hours);
        let member_limit = self.settings.member_limit;

        let link = self
            .with_retries("createChatInviteLink", || {
                self.bot
                    .create_chat_invite_link(chat_id)
                    .member_limit(member_limit)
                    .expire_date(expire_date)
                    .name(format!("vip-{}", user_id))
                    .send()
            })
            .await?;

        Ok(link.invite_link)
    }

    async fn resolve_channel(&self, channel: &ChannelRef) -> Result<ChatId> {
        match channel {
            ChannelRef::Id(id) => Ok(ChatId(*id)),
            ChannelRef::Username(name) => {
                let chat = self
                    .with_retries("getChat", || {
                        self.bot.get_chat(Recipient::ChannelUsername(name.clone())).send()
                    })
                    .await?;
                debug!(channel = %name, chat_id = chat.id.0, "Channel username resolved");
                Ok(chat.id)
            }
        }
    }

    /// Run `call`, retrying transient failures. Flood limits wait as long as
    /// Telegram asks; other failures back off linearly.
    async fn with_retries<T, F, Fut>(&self, api: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, RequestError>>,
    {
        let mut attempt = 0u32;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if is_transient(&e) && attempt < self.settings.max_retries => {
                    attempt += 1;
                    let delay = match &e {
                        RequestError::RetryAfter(wait) => wait.duration(),
                        _ => StdDuration::from_millis(self.settings.retry_backoff_ms.saturating_mul(u64::from(attempt))),
                    };
                    warn!(api = api, attempt = attempt, delay_ms = delay.as_millis() as u64, error = %e, "Transient Telegram error, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn cached(&self, user_id: i64) -> Option<String> {
        let ttl = Duration::seconds(self.settings.cache_ttl_seconds);
        let cache = self.cache.lock().await;
        cache
            .get(&user_id)
            .filter(|entry| Utc::now() - entry.created_at < ttl)
            .map(|entry| entry.link.clone())
    }

    async fn remember(&self, user_id: i64, link: &str) {
        let ttl = Duration::seconds(self.settings.cache_ttl_seconds);
        let now = Utc::now();
        let mut cache = self.cache.lock().await;
        cache.retain(|_, entry| now - entry.created_at < ttl);
        cache.insert(user_id, CachedInvite {
            link: link.to_string(),
            created_at: now,
        });
    }
}

fn fallback(config: &ConfigDocument) -> IssuedInvite {
    match config.fallback_link() {
        Some(link) => IssuedInvite::Fallback(link.to_string()),
        None => {
            warn!("No static VIP link configured");
            IssuedInvite::Unavailable
        }
    }
}

fn is_transient(error: &RequestError) -> bool {
    matches!(
        error,
        RequestError::Network(_) | RequestError::Io(_) | RequestError::RetryAfter(_)
    )
}
