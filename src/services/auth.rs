//! Authentication service implementation
//!
//! This service answers "is this user an admin" against the live config
//! document and manages the admin set itself.

use teloxide::prelude::*;
use teloxide::types::Recipient;
use tracing::{info, warn, debug};
use crate::database::repositories::{ConfigRepository, UserRepository};
use crate::models::AdminRef;
use crate::utils::errors::{VipGateError, Result};

/// Authentication service for admin checks and admin-set management
#[derive(Clone)]
pub struct AuthService {
    bot: Bot,
    config: ConfigRepository,
    users: UserRepository,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(bot: Bot, config: ConfigRepository, users: UserRepository) -> Self {
        Self { bot, config, users }
    }

    /// Check if user is an admin
    pub async fn is_admin(&self, user_id: i64) -> bool {
        self.config.snapshot().await.is_admin(user_id)
    }

    /// Require admin rights or return `PermissionDenied`
    pub async fn require_admin(&self, user_id: i64) -> Result<()> {
        if self.is_admin(user_id).await {
            debug!(user_id = user_id, "Admin authentication successful");
            Ok(())
        } else {
            warn!(user_id = user_id, "Unauthorized admin access attempt");
            Err(VipGateError::PermissionDenied(
                "Admin privileges required".to_string()
            ))
        }
    }

    /// Resolve an admin reference to a numeric user id. Usernames are looked
    /// up among registered users first, then through the Bot API.
    pub async fn resolve(&self, admin_ref: &AdminRef) -> Result<i64> {
        match admin_ref {
            AdminRef::Id(id) => Ok(*id),
            AdminRef::Username(name) => {
                if let Some(user) = self.users.find_by_username(name).await {
                    return Ok(user.id);
                }

                debug!(username = %name, "Username not in registry, asking Telegram");
                match self.bot.get_chat(Recipient::ChannelUsername(format!("@{}", name))).await {
                    Ok(chat) => Ok(chat.id.0),
                    Err(e) => {
                        warn!(username = %name, error = %e, "Username lookup failed");
                        Err(VipGateError::InvalidInput(format!(
                            "Could not find @{}. They need to /start the bot first, or use the numeric id.",
                            name
                        )))
                    }
                }
            }
        }
    }

    /// Add an admin. Returns false when the id was already an admin.
    pub async fn add_admin(&self, admin_id: i64, target: i64) -> Result<bool> {
        let added = self.config.update(|doc| Ok(doc.admins.insert(target.to_string()))).await?;
        if added {
            info!(admin_id = admin_id, target = target, "Admin added");
        }
        Ok(added)
    }

    /// Remove an admin. The last admin cannot be removed. Returns false when
    /// the id was not an admin.
    pub async fn remove_admin(&self, admin_id: i64, target: i64) -> Result<bool> {
        let removed = self.config.update(|doc| {
            let key = target.to_string();
            if !doc.admins.contains(&key) {
                return Ok(false);
            }
            if doc.admins.len() == 1 {
                return Err(VipGateError::InvalidInput("The last admin cannot be removed".to_string()));
            }
            doc.pending_admin_input.remove(&key);
            Ok(doc.admins.remove(&key))
        }).await?;

        if removed {
            info!(admin_id = admin_id, target = target, "Admin removed");
        }
        Ok(removed)
    }

    /// Current admin ids
    pub async fn list_admins(&self) -> Vec<String> {
        self.config.snapshot().await.admins.into_iter().collect()
    }
}
