//! Bot configuration service
//!
//! Validated edits to the runtime config document, the VIP send mode and
//! the per-admin pending edit register.

use tracing::{info, debug};
use crate::database::repositories::ConfigRepository;
use crate::models::{ChannelRef, ConfigDocument, EditableField, PendingEdit, VipSendMode};
use crate::utils::errors::{VipGateError, Result};
use crate::utils::helpers::validate_static_link;

const MAX_TEXT_CHARS: usize = 4096;
const MAX_BUTTON_CHARS: usize = 64;

#[derive(Clone)]
pub struct BotConfigService {
    config: ConfigRepository,
    pending_ttl_seconds: i64,
}

impl BotConfigService {
    pub fn new(config: ConfigRepository, pending_ttl_seconds: i64) -> Self {
        Self { config, pending_ttl_seconds }
    }

    pub async fn snapshot(&self) -> ConfigDocument {
        self.config.snapshot().await
    }

    /// Validate and store a new value for a text or link field. Returns the
    /// value as stored.
    pub async fn set_field(&self, admin_id: i64, field: EditableField, value: &str) -> Result<String> {
        let stored = normalize(field, value)?;

        let to_store = stored.clone();
        self.config.update(move |doc| {
            match field {
                EditableField::WelcomeMessage => doc.welcome_message = to_store,
                EditableField::AgreementText => doc.agreement_text = to_store,
                EditableField::AgreementButtonLabel => doc.agreement_button_label = to_store,
                EditableField::VipChannelLink => doc.vip_channel_link = to_store,
                EditableField::VipChannelId => doc.vip_channel_id = Some(to_store),
                EditableField::AddAdmin | EditableField::RemoveAdmin => {
                    return Err(VipGateError::InvalidInput(format!(
                        "{} is not a config text field", field.label()
                    )));
                }
            }
            Ok(())
        }).await?;

        info!(admin_id = admin_id, field = ?field, "Config field updated");
        Ok(stored)
    }

    /// Set the send mode, or toggle it when `mode` is `None`
    pub async fn set_mode(&self, admin_id: i64, mode: Option<VipSendMode>) -> Result<VipSendMode> {
        let mode = self.config.update(|doc| {
            let next = mode.unwrap_or(doc.vip_send_mode.toggled());
            doc.vip_send_mode = next;
            Ok(next)
        }).await?;

        info!(admin_id = admin_id, mode = %mode, "VIP send mode changed");
        Ok(mode)
    }

    /// Arm a pending edit for this admin, replacing any previous one
    pub async fn arm_edit(&self, admin_id: i64, field: EditableField) -> Result<()> {
        self.config.update(|doc| {
            doc.pending_admin_input.insert(admin_id.to_string(), PendingEdit::new(field));
            Ok(())
        }).await?;

        debug!(admin_id = admin_id, field = ?field, "Pending edit armed");
        Ok(())
    }

    /// Remove and return this admin's pending edit. Expired edits are
    /// discarded and reported as absent.
    pub async fn take_pending(&self, admin_id: i64) -> Result<Option<EditableField>> {
        let ttl = self.pending_ttl_seconds;
        self.config.update(|doc| {
            let edit = doc.pending_admin_input.remove(&admin_id.to_string());
            Ok(edit.filter(|e| !e.is_expired(ttl)).map(|e| e.field))
        }).await
    }

    /// Peek at this admin's live pending edit without consuming it
    pub async fn pending_for(&self, admin_id: i64) -> Option<EditableField> {
        self.config
            .snapshot()
            .await
            .pending_admin_input
            .get(&admin_id.to_string())
            .filter(|e| !e.is_expired(self.pending_ttl_seconds))
            .map(|e| e.field)
    }

    /// Drop this admin's pending edit. Returns whether one was armed.
    pub async fn cancel_edit(&self, admin_id: i64) -> Result<bool> {
        self.config.update(|doc| Ok(doc.pending_admin_input.remove(&admin_id.to_string()).is_some())).await
    }
}

fn normalize(field: EditableField, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(VipGateError::InvalidInput(format!("The {} cannot be empty", field.label())));
    }

    match field {
        EditableField::WelcomeMessage | EditableField::AgreementText => {
            if value.chars().count() > MAX_TEXT_CHARS {
                return Err(VipGateError::InvalidInput(format!(
                    "The {} must be at most {} characters", field.label(), MAX_TEXT_CHARS
                )));
            }
            Ok(value.to_string())
        }
        EditableField::AgreementButtonLabel => {
            if value.chars().count() > MAX_BUTTON_CHARS {
                return Err(VipGateError::InvalidInput(format!(
                    "The {} must be at most {} characters", field.label(), MAX_BUTTON_CHARS
                )));
            }
            Ok(value.to_string())
        }
        EditableField::VipChannelLink => validate_static_link(value),
        EditableField::VipChannelId => Ok(value.parse::<ChannelRef>()?.to_string()),
        EditableField::AddAdmin | EditableField::RemoveAdmin => Ok(value.to_string()),
    }
}
