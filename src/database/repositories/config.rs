//! Config document repository

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use crate::database::json_store::{CorruptPolicy, JsonStore};
use crate::models::ConfigDocument;
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct ConfigRepository {
    store: JsonStore<ConfigDocument>,
    doc: Arc<RwLock<ConfigDocument>>,
}

impl ConfigRepository {
    /// Load `config.json`, seeding the admin set from `seed_admins` when the
    /// document has none.
    pub async fn load(path: impl Into<std::path::PathBuf>, seed_admins: &[i64]) -> Result<Self> {
        let store: JsonStore<ConfigDocument> = JsonStore::new(path, CorruptPolicy::Fail);
        let mut doc = store.load().await?;

        if doc.admins.is_empty() && !seed_admins.is_empty() {
            doc.admins = seed_admins.iter().map(|id| id.to_string()).collect();
            store.save(&doc).await?;
            info!(count = doc.admins.len(), "Seeded admin set from settings");
        }

        info!(path = %store.path().display(), admins = doc.admins.len(), mode = %doc.vip_send_mode, "Config document loaded");

        Ok(Self {
            store,
            doc: Arc::new(RwLock::new(doc)),
        })
    }

    pub async fn snapshot(&self) -> ConfigDocument {
        self.doc.read().await.clone()
    }

    /// Apply `update` to a copy of the document and persist it. The in-memory
    /// document only changes when both the update and the save succeed.
    pub async fn update<F, R>(&self, update: F) -> Result<R>
    where
        F: FnOnce(&mut ConfigDocument) -> Result<R>,
    {
        let mut doc = self.doc.write().await;
        let mut next = doc.clone();
        let outcome = update(&mut next)?;

        if next != *doc {
            self.store.save(&next).await?;
            *doc = next;
        }

        Ok(outcome)
    }
}
