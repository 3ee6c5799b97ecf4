//! Category groups: the top level of the catalog hierarchy

use crate::core::column::ColumnDescriptor;
use crate::core::descriptor::{FieldDescriptor, FieldKind};
use crate::core::entity::{Record, unknown_field};
use crate::core::error::{GridError, ValidationError};
use crate::core::field::{FieldValue, SelectOption};
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

/// Which side of the catalog a group belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Affiliation {
    Product,
    Service,
    Blog,
}

impl Affiliation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Affiliation::Product => "PRODUCT",
            Affiliation::Service => "SERVICE",
            Affiliation::Blog => "BLOG",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Affiliation::Product => "Product",
            Affiliation::Service => "Service",
            Affiliation::Blog => "Blog",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PRODUCT" => Some(Affiliation::Product),
            "SERVICE" => Some(Affiliation::Service),
            "BLOG" => Some(Affiliation::Blog),
            _ => None,
        }
    }

    /// All affiliations as select options
    pub fn options() -> Vec<SelectOption> {
        [Affiliation::Product, Affiliation::Service, Affiliation::Blog]
            .iter()
            .map(|a| SelectOption::new(a.as_str(), a.label()))
            .collect()
    }
}

/// A named group of categories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: Uuid,
    pub name: String,
    pub affiliation: Affiliation,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity_base!(CategoryGroup, "category_group", "category_groups");

impl CategoryGroup {
    pub fn new(name: String, affiliation: Affiliation) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            affiliation,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

impl Record for CategoryGroup {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn field_keys() -> &'static [&'static str] {
        &["id", "name", "affiliation", "created_at"]
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "affiliation" => Some(self.affiliation.as_str().into()),
            "created_at" => Some(self.created_at.into()),
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), GridError> {
        match field {
            "name" => self.name = value.coerce_string(),
            "affiliation" => {
                let raw = value.coerce_string();
                self.affiliation = Affiliation::parse(&raw).ok_or_else(|| {
                    GridError::Validation(ValidationError::FieldError {
                        field: "affiliation".to_string(),
                        message: format!("unknown affiliation '{}'", raw),
                    })
                })?;
            }
            _ => return Err(unknown_field::<Self>(field)),
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Columns for the category-group table
///
/// The category count is derived from the sibling store, not stored on
/// the record.
pub fn category_group_columns(
    categories_count: impl Fn(&CategoryGroup) -> usize + Send + Sync + 'static,
) -> Vec<ColumnDescriptor<CategoryGroup>> {
    vec![
        ColumnDescriptor::new("name", "Name"),
        ColumnDescriptor::new("id", "ID").read_only(),
        ColumnDescriptor::new("affiliation", "Affiliation")
            .with_render(|g: &CategoryGroup| g.affiliation.label().to_string()),
        ColumnDescriptor::synthetic("categories_count", "Categories Count", move |g| {
            categories_count(g).to_string()
        }),
    ]
}

/// Drawer fields for creating a category group
pub fn category_group_drawer_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", "Group Name", FieldKind::Text),
        FieldDescriptor::new("affiliation", "Affiliation", FieldKind::Select)
            .with_options(Affiliation::options()),
    ]
}

/// Mutation handlers backed by the in-memory store
#[derive(Clone)]
pub struct CategoryGroupHandlers {
    pub groups: MemoryStore<CategoryGroup>,
}

impl CategoryGroupHandlers {
    pub fn new(groups: MemoryStore<CategoryGroup>) -> Self {
        Self { groups }
    }

    fn decode(payload: &FormPayload) -> Result<CategoryGroup, ValidationError> {
        let mut checks = FieldChecks::new();

        let name = checks.required("name", payload.get("name")).map(str::to_string);
        let affiliation = checks
            .required("affiliation", payload.get("affiliation"))
            .and_then(|raw| {
                checks.in_options("affiliation", raw, &Affiliation::options());
                Affiliation::parse(raw)
            });

        checks.finish()?;
        let (Some(name), Some(affiliation)) = (name, affiliation) else {
            return Err(ValidationError::FieldError {
                field: "payload".to_string(),
                message: "missing required fields".to_string(),
            });
        };
        Ok(CategoryGroup::new(name, affiliation))
    }
}

#[async_trait]
impl DatasetHandlers for CategoryGroupHandlers {
    async fn create(&self, payload: &FormPayload) -> Result<serde_json::Value> {
        let group = Self::decode(payload)?;
        self.groups.add(group.clone())?;
        tracing::info!(group = %group.name, "category group created");
        Ok(serde_json::to_value(group)?)
    }

    async fn update(&self, records: Vec<serde_json::Value>) -> Result<()> {
        for value in records {
            let mut group: CategoryGroup = serde_json::from_value(value)?;
            group.touch();
            self.groups.update(group)?;
        }
        Ok(())
    }

    async fn delete(&self, ids: &[Uuid]) -> Result<()> {
        for id in ids {
            self.groups.delete(id)?;
        }
        Ok(())
    }
}

/// Assemble the category-group dataset
pub fn category_group_dataset(
    label: impl Into<String>,
    button_label: impl Into<String>,
    groups: MemoryStore<CategoryGroup>,
    categories_count: impl Fn(&CategoryGroup) -> usize + Send + Sync + 'static,
) -> Result<Dataset<CategoryGroup>> {
    let records = groups.list()?;
    Ok(
        Dataset::new("category_group", label, button_label, Arc::new(
            CategoryGroupHandlers::new(groups),
        ))
        .with_records(records)
        .with_columns(category_group_columns(categories_count))
        .with_fields(category_group_drawer_fields())
        .with_dropdown_options("affiliation", Affiliation::options()),
    )
}

/// Route descriptor for the category-group dataset
pub struct CategoryGroupDescriptor {
    state: DatasetRouteState<CategoryGroup>,
}

impl CategoryGroupDescriptor {
    pub fn new(state: DatasetRouteState<CategoryGroup>) -> Self {
        Self { state }
    }
}

impl DatasetDescriptor for CategoryGroupDescriptor {
    fn dataset_key(&self) -> &str {
        "category_group"
    }

    fn plural(&self) -> &str {
        "category_groups"
    }

    fn build_routes(&self) -> axum::Router {
        dataset_routes(self.state.clone())
    }
}
