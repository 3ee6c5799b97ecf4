//! External collaborator contract for dataset mutations
//!
//! The table and drawer never persist anything themselves; they emit
//! user intents through this trait and reflect the outcome locally.
//! Implementations own the storage call and are free to reject.

use crate::form::payload::FormPayload;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Async mutation handlers for one dataset
///
/// `update` receives fully-merged records (original plus buffered
/// changes) serialized as JSON; `create` and `draft` receive the raw
/// form payload so implementations decode and validate at the boundary.
#[async_trait]
pub trait DatasetHandlers: Send + Sync {
    /// Persist a new record from the submitted form values
    ///
    /// Returns the created record as JSON so the caller can publish a
    /// refresh event.
    async fn create(&self, payload: &FormPayload) -> Result<serde_json::Value>;

    /// Persist a batch of fully-merged updated records
    async fn update(&self, records: Vec<serde_json::Value>) -> Result<()>;

    /// Delete the records with the given ids
    async fn delete(&self, ids: &[Uuid]) -> Result<()>;

    /// Persist a partial/incomplete entry
    ///
    /// Only meaningful when `supports_draft()` is true; the default
    /// implementation rejects.
    async fn draft(&self, _payload: &FormPayload) -> Result<serde_json::Value> {
        anyhow::bail!("draft is not supported by this dataset")
    }

    /// Whether the dataset accepts draft submissions
    fn supports_draft(&self) -> bool {
        false
    }

    /// Whether the dataset accepts bulk deletion
    fn supports_delete(&self) -> bool {
        true
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording handlers shared by the engine's unit tests

    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every call and can be switched into a failing mode
    #[derive(Clone, Default)]
    pub struct RecordingHandlers {
        pub created: Arc<Mutex<Vec<serde_json::Value>>>,
        pub updated: Arc<Mutex<Vec<Vec<serde_json::Value>>>>,
        pub deleted: Arc<Mutex<Vec<Vec<Uuid>>>>,
        pub drafted: Arc<Mutex<Vec<serde_json::Value>>>,
        pub fail: Arc<Mutex<bool>>,
        pub draft_enabled: bool,
    }

    impl RecordingHandlers {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_draft() -> Self {
            Self {
                draft_enabled: true,
                ..Self::default()
            }
        }

        pub fn set_failing(&self, failing: bool) {
            *self.fail.lock().unwrap() = failing;
        }

        fn check(&self, operation: &str) -> Result<()> {
            if *self.fail.lock().unwrap() {
                anyhow::bail!("{} rejected by test double", operation)
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DatasetHandlers for RecordingHandlers {
        async fn create(&self, payload: &FormPayload) -> Result<serde_json::Value> {
            self.check("create")?;
            let record = serde_json::json!({
                "name": payload.get("name").or(payload.get("title")).unwrap_or(""),
            });
            self.created.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn update(&self, records: Vec<serde_json::Value>) -> Result<()> {
            self.check("update")?;
            self.updated.lock().unwrap().push(records);
            Ok(())
        }

        async fn delete(&self, ids: &[Uuid]) -> Result<()> {
            self.check("delete")?;
            self.deleted.lock().unwrap().push(ids.to_vec());
            Ok(())
        }

        async fn draft(&self, payload: &FormPayload) -> Result<serde_json::Value> {
            self.check("draft")?;
            let record = serde_json::json!({
                "title": payload.get("title").unwrap_or(""),
                "draft": true,
            });
            self.drafted.lock().unwrap().push(record.clone());
            Ok(record)
        }

        fn supports_draft(&self) -> bool {
            self.draft_enabled
        }
    }
}
