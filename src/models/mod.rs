//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod bot_config;
pub mod refs;

// Re-export commonly used models
pub use user::{UserRecord, UserProfile, SharedContact, OnboardingStep};
pub use bot_config::{ConfigDocument, VipSendMode, EditableField, PendingEdit};
pub use refs::{AdminRef, ChannelRef};
