//! Draft snapshots with debounced autosave
//!
//! An in-progress form's full value set is persisted under a key scoped
//! by dataset and record, so resuming an interrupted creation flow never
//! loads another entity's draft. Snapshots are cleared on successful
//! submit and on drawer close.

use crate::core::entity::FieldSnapshot;
use crate::core::error::{DraftError, GridResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Default debounce window for autosave
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Scoped draft key: dataset plus record id (or "new" for creation)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DraftKey {
    pub dataset: String,
    pub record: Option<Uuid>,
}

impl DraftKey {
    pub fn for_new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            record: None,
        }
    }

    pub fn for_record(dataset: impl Into<String>, record: Uuid) -> Self {
        Self {
            dataset: dataset.into(),
            record: Some(record),
        }
    }

    /// Stable storage key, filesystem-safe
    pub fn storage_key(&self) -> String {
        match self.record {
            Some(id) => format!("{}--{}", self.dataset, id),
            None => format!("{}--new", self.dataset),
        }
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

/// Client-local persistence for draft snapshots
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Persist a snapshot, replacing any prior one under the key
    async fn save(&self, key: &DraftKey, snapshot: &FieldSnapshot) -> GridResult<()>;

    /// Load the snapshot under the key, if any
    async fn load(&self, key: &DraftKey) -> GridResult<Option<FieldSnapshot>>;

    /// Remove the snapshot under the key; absent is not an error
    async fn clear(&self, key: &DraftKey) -> GridResult<()>;
}

/// In-memory draft store for testing and single-process development
#[derive(Clone, Default)]
pub struct InMemoryDraftStore {
    drafts: Arc<RwLock<HashMap<String, FieldSnapshot>>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn save(&self, key: &DraftKey, snapshot: &FieldSnapshot) -> GridResult<()> {
        let mut drafts = self.drafts.write().map_err(|e| DraftError::SaveFailed {
            key: key.storage_key(),
            message: e.to_string(),
        })?;
        drafts.insert(key.storage_key(), snapshot.clone());
        Ok(())
    }

    async fn load(&self, key: &DraftKey) -> GridResult<Option<FieldSnapshot>> {
        let drafts = self.drafts.read().map_err(|e| DraftError::LoadFailed {
            key: key.storage_key(),
            message: e.to_string(),
        })?;
        Ok(drafts.get(&key.storage_key()).cloned())
    }

    async fn clear(&self, key: &DraftKey) -> GridResult<()> {
        let mut drafts = self.drafts.write().map_err(|e| DraftError::ClearFailed {
            key: key.storage_key(),
            message: e.to_string(),
        })?;
        drafts.remove(&key.storage_key());
        Ok(())
    }
}

/// Filesystem draft store: one JSON file per key under a directory
#[derive(Clone)]
pub struct FsDraftStore {
    dir: PathBuf,
}

impl FsDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &DraftKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.storage_key()))
    }
}

#[async_trait]
impl DraftStore for FsDraftStore {
    async fn save(&self, key: &DraftKey, snapshot: &FieldSnapshot) -> GridResult<()> {
        let failed = |message: String| DraftError::SaveFailed {
            key: key.storage_key(),
            message,
        };

        std::fs::create_dir_all(&self.dir).map_err(|e| failed(e.to_string()))?;
        let json = serde_json::to_string_pretty(snapshot).map_err(|e| failed(e.to_string()))?;
        std::fs::write(self.path_for(key), json).map_err(|e| failed(e.to_string()))?;
        Ok(())
    }

    async fn load(&self, key: &DraftKey) -> GridResult<Option<FieldSnapshot>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let failed = |message: String| DraftError::LoadFailed {
            key: key.storage_key(),
            message,
        };
        let content = std::fs::read_to_string(&path).map_err(|e| failed(e.to_string()))?;
        let snapshot = serde_json::from_str(&content).map_err(|e| failed(e.to_string()))?;
        Ok(Some(snapshot))
    }

    async fn clear(&self, key: &DraftKey) -> GridResult<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DraftError::ClearFailed {
                key: key.storage_key(),
                message: e.to_string(),
            }
            .into()),
        }
    }
}

/// Debounced snapshot writer
///
/// Every scheduled write cancels the previous pending one and starts the
/// debounce window over: last-write-wins, not a queue. A write that is
/// superseded before the window elapses never reaches the store.
pub struct DraftAutosaver {
    store: Arc<dyn DraftStore>,
    key: DraftKey,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl DraftAutosaver {
    pub fn new(store: Arc<dyn DraftStore>, key: DraftKey) -> Self {
        Self {
            store,
            key,
            delay: AUTOSAVE_DEBOUNCE,
            pending: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn key(&self) -> &DraftKey {
        &self.key
    }

    /// Schedule a debounced write of the full snapshot
    pub fn schedule(&mut self, snapshot: FieldSnapshot) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        let store = self.store.clone();
        let key = self.key.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = store.save(&key, &snapshot).await {
                tracing::warn!(draft = %key, error = %err, "draft autosave failed");
            }
        }));
    }

    /// Write a snapshot immediately, cancelling any pending write
    pub async fn flush(&mut self, snapshot: &FieldSnapshot) -> GridResult<()> {
        self.cancel();
        self.store.save(&self.key, snapshot).await
    }

    /// Drop any pending write without persisting it
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for DraftAutosaver {
    fn drop(&mut self) {
        self.cancel();
    }
}
