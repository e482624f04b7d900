//! Database service
//!
//! Bundles the two document repositories so they can be loaded together at
//! startup and handed to the service layer.

use tracing::info;
use crate::config::StorageConfig;
use crate::utils::errors::Result;
use super::repositories::{ConfigRepository, UserRepository};

#[derive(Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub config: ConfigRepository,
}

impl DatabaseService {
    /// Load both documents from the configured paths
    pub async fn load(storage: &StorageConfig, seed_admins: &[i64]) -> Result<Self> {
        let users = UserRepository::load(&storage.users_path).await?;
        let config = ConfigRepository::load(&storage.config_path, seed_admins).await?;

        info!(users = users.count().await, "Storage ready");
        Ok(Self { users, config })
    }
}
