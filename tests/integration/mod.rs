//! Integration tests module
//!
//! This module contains all integration tests for the VipGate Telegram bot,
//! organized by functionality and test scenarios.

pub mod handlers;
