//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use chrono::{DateTime, Utc};
use crate::models::UserRecord;
use crate::utils::errors::{VipGateError, Result};

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Split text into chunks of at most `max_chars` characters.
///
/// Chunks break on line boundaries; a single line longer than the budget is
/// split mid-line. Line breaks that fall between chunks are dropped.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.lines() {
        let line_len = line.chars().count();

        if line_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { line_len } else { current_len + 1 + line_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// One line of the admin user listing
pub fn format_user_line(user: &UserRecord) -> String {
    format!(
        "{} | {} | {} | {} | {} | vip:{}",
        user.id,
        if user.full_name().is_empty() { "-".to_string() } else { user.full_name() },
        if user.username.is_empty() { "-".to_string() } else { format!("@{}", user.username) },
        if user.phone.is_empty() { "-" } else { user.phone.as_str() },
        format_timestamp(user.join_date),
        if user.vip_sent { "✅" } else { "❌" },
    )
}

/// Split a typed full name into first and last name
pub fn split_name(text: &str) -> (String, String) {
    let mut parts = text.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Validate a static VIP link typed by an admin
pub fn validate_static_link(link: &str) -> Result<String> {
    let link = link.trim();
    if link.is_empty() {
        return Err(VipGateError::InvalidInput("Link is empty".to_string()));
    }

    let candidate = if link.starts_with("t.me/") || link.starts_with("telegram.me/") {
        format!("https://{}", link)
    } else {
        link.to_string()
    };

    let parsed = url::Url::parse(&candidate)?;
    match parsed.scheme() {
        "http" | "https" => Ok(candidate),
        other => Err(VipGateError::InvalidInput(format!("Unsupported link scheme: {}", other))),
    }
}
