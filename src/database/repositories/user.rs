//! User repository
//!
//! The registry is held in memory and mirrored to `users.json` after every
//! mutation. Saves happen under the write lock, and a change is only committed
//! to memory once it is on disk.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use crate::database::json_store::{CorruptPolicy, JsonStore};
use crate::models::UserRecord;
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct UserRepository {
    store: JsonStore<Vec<UserRecord>>,
    users: Arc<RwLock<BTreeMap<i64, UserRecord>>>,
}

impl UserRepository {
    /// Load the registry from disk
    pub async fn load(path: impl Into<std::path::PathBuf>) -> Result<Self> {
        let store: JsonStore<Vec<UserRecord>> = JsonStore::new(path, CorruptPolicy::Reset);
        let records = store.load().await?;

        let users: BTreeMap<i64, UserRecord> = records
            .into_iter()
            .map(|mut record| {
                record.reconcile_step();
                (record.id, record)
            })
            .collect();

        info!(path = %store.path().display(), count = users.len(), "User registry loaded");

        Ok(Self {
            store,
            users: Arc::new(RwLock::new(users)),
        })
    }

    pub async fn find_by_id(&self, user_id: i64) -> Option<UserRecord> {
        self.users.read().await.get(&user_id).cloned()
    }

    /// Case-insensitive lookup, with or without the leading `@`
    pub async fn find_by_username(&self, username: &str) -> Option<UserRecord> {
        let wanted = username.trim_start_matches('@');
        self.users
            .read()
            .await
            .values()
            .find(|user| !user.username.is_empty() && user.username.eq_ignore_ascii_case(wanted))
            .cloned()
    }

    /// All records ordered by id
    pub async fn list(&self) -> Vec<UserRecord> {
        self.users.read().await.values().cloned().collect()
    }

    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Insert a record built by `create` if absent, then apply `update` to
    /// it. Returns the stored record.
    pub async fn upsert<C, U>(&self, user_id: i64, create: C, update: U) -> Result<UserRecord>
    where
        C: FnOnce() -> UserRecord,
        U: FnOnce(&mut UserRecord) -> Result<()>,
    {
        let mut users = self.users.write().await;
        let mut record = users.get(&user_id).cloned().unwrap_or_else(create);
        update(&mut record)?;
        self.persist_with(&users, &record).await?;
        users.insert(user_id, record.clone());

        debug!(user_id = user_id, step = %record.step, "User record upserted");
        Ok(record)
    }

    /// Apply `update` to an existing record. `update` decides the outcome and
    /// whether anything changed; nothing is written when it reports no change.
    /// Returns `None` when the user is unknown.
    pub async fn modify<F, R>(&self, user_id: i64, update: F) -> Result<Option<R>>
    where
        F: FnOnce(&mut UserRecord) -> Result<(R, bool)>,
    {
        let mut users = self.users.write().await;
        let Some(current) = users.get(&user_id) else {
            return Ok(None);
        };

        let mut record = current.clone();
        let (outcome, changed) = update(&mut record)?;
        if changed {
            self.persist_with(&users, &record).await?;
            users.insert(user_id, record);
        }

        Ok(Some(outcome))
    }

    /// Save the registry as it will be once `record` replaces its entry
    async fn persist_with(&self, users: &BTreeMap<i64, UserRecord>, record: &UserRecord) -> Result<()> {
        let mut snapshot: Vec<UserRecord> = users
            .values()
            .filter(|user| user.id != record.id)
            .cloned()
            .collect();
        let at = snapshot.partition_point(|user| user.id < record.id);
        snapshot.insert(at, record.clone());
        self.store.save(&snapshot).await
    }
}
