//! JSON document storage
//!
//! Each document is a single JSON file rewritten in full on every save. Writes
//! go to a sibling temp file first and are renamed into place so a crash never
//! leaves a half-written document behind.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use crate::utils::errors::Result;

/// What to do when the file exists but cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptPolicy {
    /// Log and start from the default document
    Reset,
    /// Surface the parse error to the caller
    Fail,
}

/// A typed JSON file
#[derive(Debug, Clone)]
pub struct JsonStore<T> {
    path: PathBuf,
    policy: CorruptPolicy,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>, policy: CorruptPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            _doc: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, creating it with defaults when missing
    pub async fn load(&self) -> Result<T> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Document missing, creating with defaults");
                let doc = T::default();
                self.save(&doc).await?;
                return Ok(doc);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<T>(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) if self.policy == CorruptPolicy::Reset => {
                warn!(path = %self.path.display(), error = %e, "Document is not valid JSON, resetting");
                let doc = T::default();
                self.save(&doc).await?;
                Ok(doc)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically replace the document on disk
    pub async fn save(&self, doc: &T) -> Result<()> {
        let serialized = serde_json::to_vec_pretty(doc)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &serialized).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), bytes = serialized.len(), "Document saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
