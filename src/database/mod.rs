//! Storage layer
//!
//! The user registry and the config document are JSON files, loaded at
//! startup and rewritten after every mutation.

pub mod json_store;
pub mod repositories;
pub mod service;

pub use json_store::{JsonStore, CorruptPolicy};
pub use repositories::{UserRepository, ConfigRepository};
pub use service::DatabaseService;
