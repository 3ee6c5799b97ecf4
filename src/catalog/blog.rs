//! Blog posts, the only dataset with a draft workflow

use crate::core::column::ColumnDescriptor;
use crate::core::descriptor::{FieldDescriptor, FieldKind};
use crate::core::entity::{Record, unknown_field};
use crate::core::error::GridError;
use crate::core::field::FieldValue;
use crate::core::validation::FieldChecks;
use crate::dataset::{Dataset, DatasetDescriptor, DatasetHandlers};
use crate::form::payload::FormPayload;
use crate::server::router::{DatasetRouteState, dataset_routes};
use crate::impl_entity_base;
use crate::storage::MemoryStore;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A blog post; `draft` marks posts saved without publishing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub photo_url: Option<String>,
    pub draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity_base!(BlogPost, "blog_post", "blog_posts");

impl BlogPost {
    pub fn new(title: String, body: String, photo_url: Option<String>, draft: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            body,
            photo_url,
            draft,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

impl Record for BlogPost {
    fn display_name(&self) -> &str {
        &self.title
    }

    fn field_keys() -> &'static [&'static str] {
        &["id", "title", "body", "photo_url", "draft", "created_at"]
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "title" => Some(self.title.clone().into()),
            "body" => Some(self.body.clone().into()),
            "photo_url" => Some(self.photo_url.clone().into()),
            "draft" => Some(self.draft.into()),
            "created_at" => Some(self.created_at.into()),
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), GridError> {
        match field {
            "title" => self.title = value.coerce_string(),
            "body" => self.body = value.coerce_string(),
            "photo_url" => {
                self.photo_url = match value {
                    FieldValue::Null => None,
                    other => Some(other.coerce_string()),
                };
            }
            "draft" => {
                self.draft = value
                    .as_bool()
                    .unwrap_or_else(|| value.coerce_string() == "true");
            }
            _ => return Err(unknown_field::<Self>(field)),
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Columns for the blog table
pub fn blog_columns() -> Vec<ColumnDescriptor<BlogPost>> {
    vec![
        ColumnDescriptor::new("title", "Title"),
        ColumnDescriptor::new("body", "Body"),
        ColumnDescriptor::new("photo_url", "Image")
            .unsortable()
            .with_render(|p: &BlogPost| p.photo_url.clone().unwrap_or_else(|| "—".to_string())),
        ColumnDescriptor::new("draft", "Draft")
            .read_only()
            .with_render(|p: &BlogPost| {
                (if p.draft { "Draft" } else { "Published" }).to_string()
            }),
    ]
}

/// Drawer fields for writing a post
pub fn blog_drawer_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("title", "Title", FieldKind::Text)
            .with_placeholder("Post title"),
        FieldDescriptor::new("body", "Body", FieldKind::LongText),
        FieldDescriptor::new("photo_url", "Image", FieldKind::Image),
    ]
}

/// Mutation handlers backed by the in-memory store
///
/// A draft submit stores the post with `draft: true` and skips the
/// required-field checks a publish enforces.
#[derive(Clone)]
pub struct BlogHandlers {
    pub posts: MemoryStore<BlogPost>,
}

impl BlogHandlers {
    pub fn new(posts: MemoryStore<BlogPost>) -> Self {
        Self { posts }
    }

    fn decode(payload: &FormPayload, draft: bool) -> Result<BlogPost> {
        let title = payload.get("title").unwrap_or_default().trim().to_string();
        let body = payload.get("body").unwrap_or_default().to_string();

        if !draft {
            let mut checks = FieldChecks::new();
            checks.required("title", payload.get("title"));
            checks.finish().map_err(GridError::Validation)?;
        }

        // Asset upload is out of scope; only a textual URL is persisted
        let photo_url = payload
            .get("photo_url")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if let Some((filename, _, _)) = payload.file("photo_url") {
            tracing::debug!(filename, "photo file received; upload is out of scope");
        }

        Ok(BlogPost::new(title, body, photo_url, draft))
    }
}

#[async_trait]
impl DatasetHandlers for BlogHandlers {
    async fn create(&self, payload: &FormPayload) -> Result<serde_json::Value> {
        let post = Self::decode(payload, false)?;
        self.posts.add(post.clone())?;
        tracing::info!(post = %post.title, "blog post published");
        Ok(serde_json::to_value(post)?)
    }

    async fn update(&self, records: Vec<serde_json::Value>) -> Result<()> {
        for value in records {
            let mut post: BlogPost = serde_json::from_value(value)?;
            post.touch();
            self.posts.update(post)?;
        }
        Ok(())
    }

    async fn delete(&self, ids: &[Uuid]) -> Result<()> {
        for id in ids {
            self.posts.delete(id)?;
        }
        Ok(())
    }

    async fn draft(&self, payload: &FormPayload) -> Result<serde_json::Value> {
        let post = Self::decode(payload, true)?;
        self.posts.add(post.clone())?;
        tracing::info!(post = %post.title, "blog post saved as draft");
        Ok(serde_json::to_value(post)?)
    }

    fn supports_draft(&self) -> bool {
        true
    }
}

/// Assemble the blog dataset
pub fn blog_dataset(
    label: impl Into<String>,
    button_label: impl Into<String>,
    posts: MemoryStore<BlogPost>,
) -> Result<Dataset<BlogPost>> {
    let records = posts.list()?;
    Ok(
        Dataset::new("blog_post", label, button_label, Arc::new(BlogHandlers::new(posts)))
            .with_records(records)
            .with_columns(blog_columns())
            .with_fields(blog_drawer_fields()),
    )
}

/// Route descriptor for the blog dataset
pub struct BlogDescriptor {
    state: DatasetRouteState<BlogPost>,
}

impl BlogDescriptor {
    pub fn new(state: DatasetRouteState<BlogPost>) -> Self {
        Self { state }
    }
}

impl DatasetDescriptor for BlogDescriptor {
    fn dataset_key(&self) -> &str {
        "blog_post"
    }

    fn plural(&self) -> &str {
        "blog_posts"
    }

    fn build_routes(&self) -> axum::Router {
        dataset_routes(self.state.clone())
    }
}
