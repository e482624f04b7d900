//! Parsed references to channels and admins typed in by an admin

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use regex::Regex;
use crate::utils::errors::VipGateError;

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^@?([A-Za-z][A-Za-z0-9_]{3,31})$").expect("static username regex")
    })
}

fn public_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:https?://)?(?:t\.me|telegram\.me)/([A-Za-z][A-Za-z0-9_]{3,31})/?$")
            .expect("static link regex")
    })
}

/// A channel the bot can create invite links for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    Id(i64),
    /// Stored with the leading `@`
    Username(String),
}

impl FromStr for ChannelRef {
    type Err = VipGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VipGateError::InvalidInput("Channel reference is empty".to_string()));
        }

        if let Ok(id) = s.parse::<i64>() {
            return Ok(ChannelRef::Id(id));
        }

        // Private invite links carry no chat id and cannot be resolved
        if s.contains("t.me/+") || s.contains("t.me/joinchat") {
            return Err(VipGateError::InvalidInput(
                "Private invite links cannot identify a channel; use the numeric id or @username".to_string(),
            ));
        }

        if let Some(caps) = public_link_pattern().captures(s) {
            return Ok(ChannelRef::Username(format!("@{}", &caps[1])));
        }

        if s.starts_with('@') {
            if let Some(caps) = username_pattern().captures(s) {
                return Ok(ChannelRef::Username(format!("@{}", &caps[1])));
            }
        }

        Err(VipGateError::InvalidInput(format!("Not a channel id or @username: {}", s)))
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRef::Id(id) => write!(f, "{}", id),
            ChannelRef::Username(name) => f.write_str(name),
        }
    }
}

/// An admin to add or remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminRef {
    Id(i64),
    /// Stored without the leading `@`
    Username(String),
}

impl FromStr for AdminRef {
    type Err = VipGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i64>() {
            if id > 0 {
                return Ok(AdminRef::Id(id));
            }
        }

        if s.starts_with('@') {
            if let Some(caps) = username_pattern().captures(s) {
                return Ok(AdminRef::Username(caps[1].to_string()));
            }
        }

        Err(VipGateError::InvalidInput(format!("Not a user id or @username: {}", s)))
    }
}

impl fmt::Display for AdminRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminRef::Id(id) => write!(f, "{}", id),
            AdminRef::Username(name) => write!(f, "@{}", name),
        }
    }
}
