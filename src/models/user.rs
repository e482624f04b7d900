//! User model

use std::fmt;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::utils::errors::{VipGateError, Result};

/// Onboarding progress of a user. Declaration order is progression order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    #[default]
    AwaitingName,
    AwaitingPhone,
    AwaitingAgreement,
    Done,
}

impl OnboardingStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStep::AwaitingName => "awaiting_name",
            OnboardingStep::AwaitingPhone => "awaiting_phone",
            OnboardingStep::AwaitingAgreement => "awaiting_agreement",
            OnboardingStep::Done => "done",
        }
    }

    /// Move strictly forward to `next`.
    pub fn advance(self, next: OnboardingStep) -> Result<OnboardingStep> {
        if next > self {
            Ok(next)
        } else {
            Err(VipGateError::InvalidStateTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }

    /// Advance to `target` unless the step is already there or beyond.
    pub fn at_least(self, target: OnboardingStep) -> Result<OnboardingStep> {
        if self >= target {
            Ok(self)
        } else {
            self.advance(target)
        }
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted onboarding record, one per Telegram user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub phone: String,
    #[serde(rename = "vipSent", default)]
    pub vip_sent: bool,
    #[serde(rename = "joinDate", default = "Utc::now")]
    pub join_date: DateTime<Utc>,
    #[serde(default)]
    pub step: OnboardingStep,
}

impl UserRecord {
    /// Fresh record for a user seen for the first time
    pub fn new(profile: &UserProfile) -> Self {
        let step = if profile.first_name.trim().is_empty() {
            OnboardingStep::AwaitingName
        } else {
            OnboardingStep::AwaitingPhone
        };

        Self {
            id: profile.id,
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone().unwrap_or_default(),
            username: profile.username.clone().unwrap_or_default(),
            phone: String::new(),
            vip_sent: false,
            join_date: Utc::now(),
            step,
        }
    }

    /// Refresh profile fields from the latest Telegram update, keeping
    /// stored values where the update carries nothing.
    pub fn refresh_profile(&mut self, profile: &UserProfile) {
        if !profile.first_name.trim().is_empty() {
            self.first_name = profile.first_name.clone();
        }
        if let Some(last_name) = profile.last_name.as_ref().filter(|s| !s.is_empty()) {
            self.last_name = last_name.clone();
        }
        if let Some(username) = profile.username.as_ref().filter(|s| !s.is_empty()) {
            self.username = username.clone();
        }
    }

    /// Raise `step` to what the stored data already implies. Used for records
    /// written before the step was tracked.
    pub fn reconcile_step(&mut self) {
        let implied = if self.vip_sent {
            OnboardingStep::Done
        } else if !self.phone.is_empty() {
            OnboardingStep::AwaitingAgreement
        } else if !self.first_name.is_empty() {
            OnboardingStep::AwaitingPhone
        } else {
            OnboardingStep::AwaitingName
        };

        if implied > self.step {
            self.step = implied;
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// The sender of an update, decoupled from teloxide's `User`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl From<&teloxide::types::User> for UserProfile {
    fn from(user: &teloxide::types::User) -> Self {
        Self {
            id: user.id.0 as i64,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
        }
    }
}

/// A contact card shared with the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedContact {
    pub phone_number: String,
    pub user_id: Option<i64>,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl From<&teloxide::types::Contact> for SharedContact {
    fn from(contact: &teloxide::types::Contact) -> Self {
        Self {
            phone_number: contact.phone_number.clone(),
            user_id: contact.user_id.map(|id| id.0 as i64),
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
        }
    }
}
