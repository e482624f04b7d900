//! Runtime bot configuration document
//!
//! Everything an admin can change from the chat lives here. The document is
//! persisted as `config.json` and keeps the key names of earlier deployments.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use crate::utils::errors::VipGateError;

pub const DEFAULT_WELCOME: &str = "Welcome! Let's get you set up.";
pub const DEFAULT_AGREEMENT: &str = "Please read and accept the agreement to receive your VIP link.";
pub const DEFAULT_AGREEMENT_BUTTON: &str = "I agree ✅";

/// How VIP links are handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VipSendMode {
    /// Generate a single-use invite per user, static link as fallback
    #[default]
    Auto,
    /// Always send the static link
    Manual,
}

impl VipSendMode {
    pub fn toggled(self) -> Self {
        match self {
            VipSendMode::Auto => VipSendMode::Manual,
            VipSendMode::Manual => VipSendMode::Auto,
        }
    }
}

impl fmt::Display for VipSendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VipSendMode::Auto => f.write_str("auto"),
            VipSendMode::Manual => f.write_str("manual"),
        }
    }
}

impl FromStr for VipSendMode {
    type Err = VipGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(VipSendMode::Auto),
            "manual" => Ok(VipSendMode::Manual),
            other => Err(VipGateError::InvalidInput(format!("Unknown VIP mode: {}", other))),
        }
    }
}

/// Config fields editable through the admin console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditableField {
    WelcomeMessage,
    AgreementText,
    AgreementButtonLabel,
    VipChannelLink,
    VipChannelId,
    AddAdmin,
    RemoveAdmin,
}

impl EditableField {
    pub fn label(&self) -> &'static str {
        match self {
            EditableField::WelcomeMessage => "welcome message",
            EditableField::AgreementText => "agreement text",
            EditableField::AgreementButtonLabel => "agreement button label",
            EditableField::VipChannelLink => "VIP link",
            EditableField::VipChannelId => "VIP channel",
            EditableField::AddAdmin => "admin to add",
            EditableField::RemoveAdmin => "admin to remove",
        }
    }
}

/// An armed "next text message is the new value" edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEdit {
    pub field: EditableField,
    pub armed_at: DateTime<Utc>,
}

impl PendingEdit {
    pub fn new(field: EditableField) -> Self {
        Self { field, armed_at: Utc::now() }
    }

    pub fn is_expired(&self, ttl_seconds: i64) -> bool {
        Utc::now() - self.armed_at > Duration::seconds(ttl_seconds)
    }
}

/// The mutable configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    #[serde(default = "default_welcome")]
    pub welcome_message: String,
    #[serde(default = "default_agreement")]
    pub agreement_text: String,
    #[serde(default = "default_agreement_button")]
    pub agreement_button_label: String,
    #[serde(default)]
    pub vip_channel_link: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub vip_channel_id: Option<String>,
    #[serde(default)]
    pub vip_send_mode: VipSendMode,
    #[serde(default, alias = "adminIds", deserialize_with = "ids_as_strings")]
    pub admins: BTreeSet<String>,
    /// Keyed by admin id
    #[serde(default)]
    pub pending_admin_input: BTreeMap<String, PendingEdit>,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self {
            welcome_message: default_welcome(),
            agreement_text: default_agreement(),
            agreement_button_label: default_agreement_button(),
            vip_channel_link: String::new(),
            vip_channel_id: None,
            vip_send_mode: VipSendMode::default(),
            admins: BTreeSet::new(),
            pending_admin_input: BTreeMap::new(),
        }
    }
}

impl ConfigDocument {
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.contains(&user_id.to_string())
    }

    /// Static link, if one is configured
    pub fn fallback_link(&self) -> Option<&str> {
        let link = self.vip_channel_link.trim();
        (!link.is_empty()).then_some(link)
    }
}

fn default_welcome() -> String {
    DEFAULT_WELCOME.to_string()
}

fn default_agreement() -> String {
    DEFAULT_AGREEMENT.to_string()
}

fn default_agreement_button() -> String {
    DEFAULT_AGREEMENT_BUTTON.to_string()
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Admin ids may have been written as numbers or strings
fn ids_as_strings<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .collect())
}
