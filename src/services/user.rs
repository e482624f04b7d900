//! User service implementation
//!
//! This service owns the onboarding state machine: profile registration,
//! name and phone collection, and the one-time VIP claim.

use tracing::{info, warn, debug};
use crate::database::repositories::UserRepository;
use crate::models::{OnboardingStep, SharedContact, UserProfile, UserRecord};
use crate::utils::errors::Result;
use crate::utils::helpers::split_name;

/// Result of a contact share
#[derive(Debug, Clone, PartialEq)]
pub enum ContactOutcome {
    /// The contact card belongs to someone else
    Rejected,
    Saved(UserRecord),
}

/// Result of a typed name
#[derive(Debug, Clone, PartialEq)]
pub enum NameOutcome {
    Saved(UserRecord),
    /// The user is not expecting to type a name
    NotExpected(Option<UserRecord>),
}

/// Result of reserving a VIP delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VipClaim {
    UnknownUser,
    /// Onboarding has not reached the agreement step
    PhoneMissing,
    AlreadyReceived,
    /// Proceed with issuance. `exempt` is set for admins, whose claims hold
    /// nothing and never need releasing.
    Granted { exempt: bool },
}

/// User service for the onboarding flow
#[derive(Clone)]
pub struct UserService {
    user_repository: UserRepository,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(user_repository: UserRepository) -> Self {
        Self { user_repository }
    }

    /// Handle `/start`: create the record or refresh its profile fields
    pub async fn register_or_refresh(&self, profile: &UserProfile) -> Result<UserRecord> {
        debug!(user_id = profile.id, "Registering or refreshing user");

        let user = self.user_repository.upsert(
            profile.id,
            || UserRecord::new(profile),
            |record| {
                record.refresh_profile(profile);
                if record.step == OnboardingStep::AwaitingName && !record.first_name.is_empty() {
                    record.step = record.step.advance(OnboardingStep::AwaitingPhone)?;
                }
                Ok(())
            },
        ).await?;

        info!(user_id = user.id, step = %user.step, "User registered or refreshed");
        Ok(user)
    }

    /// Store a typed name when the user is still at the name step
    pub async fn record_name(&self, user_id: i64, text: &str) -> Result<NameOutcome> {
        let (first, last) = split_name(text);
        if first.is_empty() {
            return Ok(NameOutcome::NotExpected(self.get_user(user_id).await));
        }

        let outcome = self.user_repository.modify(user_id, |record| {
            if record.step != OnboardingStep::AwaitingName || !record.first_name.is_empty() {
                return Ok((NameOutcome::NotExpected(Some(record.clone())), false));
            }

            record.first_name = first;
            record.last_name = last;
            record.step = record.step.advance(OnboardingStep::AwaitingPhone)?;
            Ok((NameOutcome::Saved(record.clone()), true))
        }).await?;

        match outcome {
            Some(outcome) => {
                if matches!(outcome, NameOutcome::Saved(_)) {
                    info!(user_id = user_id, "Name collected");
                }
                Ok(outcome)
            }
            None => Ok(NameOutcome::NotExpected(None)),
        }
    }

    /// Store a shared phone number. The contact must belong to the sender.
    pub async fn record_contact(&self, profile: &UserProfile, contact: &SharedContact) -> Result<ContactOutcome> {
        if contact.user_id != Some(profile.id) {
            warn!(user_id = profile.id, contact_user_id = ?contact.user_id, "Rejected contact that is not the sender's own");
            return Ok(ContactOutcome::Rejected);
        }

        let phone = contact.phone_number.trim().to_string();
        let user = self.user_repository.upsert(
            profile.id,
            || UserRecord::new(profile),
            |record| {
                if !phone.is_empty() {
                    record.phone = phone.clone();
                }
                if record.first_name.is_empty() {
                    record.first_name = contact.first_name.clone();
                    record.last_name = contact.last_name.clone().unwrap_or_default();
                }
                record.step = record.step.at_least(OnboardingStep::AwaitingAgreement)?;
                Ok(())
            },
        ).await?;

        info!(user_id = user.id, step = %user.step, "Phone number collected");
        Ok(ContactOutcome::Saved(user))
    }

    /// Atomically reserve the one-time VIP delivery for `user_id`.
    ///
    /// For non-admins the `vipSent` flag is set as part of the check, so a
    /// concurrent second claim observes `AlreadyReceived`.
    pub async fn claim_vip(&self, user_id: i64, is_admin: bool) -> Result<VipClaim> {
        let claim = self.user_repository.modify(user_id, |record| {
            if record.step < OnboardingStep::AwaitingAgreement {
                return Ok((VipClaim::PhoneMissing, false));
            }
            if is_admin {
                return Ok((VipClaim::Granted { exempt: true }, false));
            }
            if record.vip_sent {
                return Ok((VipClaim::AlreadyReceived, false));
            }

            record.vip_sent = true;
            Ok((VipClaim::Granted { exempt: false }, true))
        }).await?;

        let claim = claim.unwrap_or(VipClaim::UnknownUser);
        debug!(user_id = user_id, is_admin = is_admin, claim = ?claim, "VIP claim evaluated");
        Ok(claim)
    }

    /// Give back a claim whose delivery failed
    pub async fn release_vip_claim(&self, user_id: i64) -> Result<()> {
        let released = self.user_repository.modify(user_id, |record| {
            if record.step == OnboardingStep::Done || !record.vip_sent {
                return Ok((false, false));
            }
            record.vip_sent = false;
            Ok((true, true))
        }).await?;

        if released == Some(true) {
            warn!(user_id = user_id, "VIP claim released after failed delivery");
        }
        Ok(())
    }

    /// Record a delivered invite
    pub async fn complete_vip(&self, user_id: i64) -> Result<()> {
        self.user_repository.modify(user_id, |record| {
            let changed = !record.vip_sent || record.step != OnboardingStep::Done;
            record.vip_sent = true;
            record.step = record.step.at_least(OnboardingStep::Done)?;
            Ok(((), changed))
        }).await?;

        info!(user_id = user_id, "VIP invite delivered");
        Ok(())
    }

    /// Get user by Telegram ID
    pub async fn get_user(&self, user_id: i64) -> Option<UserRecord> {
        self.user_repository.find_by_id(user_id).await
    }

    pub async fn find_by_username(&self, username: &str) -> Option<UserRecord> {
        self.user_repository.find_by_username(username).await
    }

    /// All registered users ordered by id
    pub async fn list_users(&self) -> Vec<UserRecord> {
        self.user_repository.list().await
    }
}
