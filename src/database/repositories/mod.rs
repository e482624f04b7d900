//! Repository layer over the JSON documents

pub mod user;
pub mod config;

pub use user::UserRepository;
pub use config::ConfigRepository;
