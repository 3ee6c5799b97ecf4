//! Product categories

use crate::catalog::group::CategoryGroup;
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

/// A product category inside one category group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub category_group_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity_base!(Category, "category", "categories");

impl Category {
    pub fn new(name: String, category_group_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            category_group_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

impl Record for Category {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn field_keys() -> &'static [&'static str] {
        &["id", "name", "category_group_id", "created_at"]
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "category_group_id" => Some(self.category_group_id.into()),
            "created_at" => Some(self.created_at.into()),
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), GridError> {
        match field {
            "name" => self.name = value.coerce_string(),
            "category_group_id" => {
                self.category_group_id = parse_id("category_group_id", &value)?;
            }
            _ => return Err(unknown_field::<Self>(field)),
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Accept a native UUID value or its string form
pub(crate) fn parse_id(field: &str, value: &FieldValue) -> Result<Uuid, GridError> {
    if let Some(id) = value.as_uuid() {
        return Ok(id);
    }
    let raw = value.coerce_string();
    Uuid::parse_str(&raw).map_err(|_| {
        GridError::Validation(ValidationError::FieldError {
            field: field.to_string(),
            message: format!("'{}' is not a valid id", raw),
        })
    })
}

/// Select options naming each group
pub fn group_options(groups: &[CategoryGroup]) -> Vec<SelectOption> {
    groups
        .iter()
        .map(|g| SelectOption::new(g.id.to_string(), g.name.clone()))
        .collect()
}

/// Columns for the category table
///
/// The group column displays the group's name rather than its id; the
/// product count is derived and read-only.
pub fn category_columns(
    groups: Vec<CategoryGroup>,
    products_count: impl Fn(&Category) -> usize + Send + Sync + 'static,
) -> Vec<ColumnDescriptor<Category>> {
    vec![
        ColumnDescriptor::new("name", "Name"),
        ColumnDescriptor::new("category_group_id", "Category Group").with_render(
            move |c: &Category| {
                groups
                    .iter()
                    .find(|g| g.id == c.category_group_id)
                    .map(|g| g.name.clone())
                    .unwrap_or_else(|| "N/A".to_string())
            },
        ),
        ColumnDescriptor::synthetic("products_count", "Products Count", move |c| {
            products_count(c).to_string()
        }),
    ]
}

/// Drawer fields for creating a category
pub fn category_drawer_fields(groups: &[CategoryGroup]) -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", "Category Name", FieldKind::Text),
        FieldDescriptor::new("category_group_id", "Category Group", FieldKind::Select)
            .with_options(group_options(groups)),
    ]
}

/// Mutation handlers backed by the in-memory stores
///
/// The group store is consulted so a category can never point at a
/// group that does not exist.
#[derive(Clone)]
pub struct CategoryHandlers {
    pub categories: MemoryStore<Category>,
    pub groups: MemoryStore<CategoryGroup>,
}

impl CategoryHandlers {
    pub fn new(categories: MemoryStore<Category>, groups: MemoryStore<CategoryGroup>) -> Self {
        Self { categories, groups }
    }

    fn decode(&self, payload: &FormPayload) -> Result<Category> {
        let mut checks = FieldChecks::new();

        let name = checks.required("name", payload.get("name")).map(str::to_string);
        let group_id = checks
            .required("category_group_id", payload.get("category_group_id"))
            .and_then(|raw| checks.uuid("category_group_id", raw));

        if let Some(id) = group_id {
            if self.groups.get(&id)?.is_none() {
                checks.fail("category_group_id", "is not a known category group");
            }
        }

        checks.finish().map_err(GridError::Validation)?;
        let (Some(name), Some(group_id)) = (name, group_id) else {
            anyhow::bail!("missing required fields");
        };
        Ok(Category::new(name, group_id))
    }
}

#[async_trait]
impl DatasetHandlers for CategoryHandlers {
    async fn create(&self, payload: &FormPayload) -> Result<serde_json::Value> {
        let category = self.decode(payload)?;
        self.categories.add(category.clone())?;
        tracing::info!(category = %category.name, "category created");
        Ok(serde_json::to_value(category)?)
    }

    async fn update(&self, records: Vec<serde_json::Value>) -> Result<()> {
        for value in records {
            let mut category: Category = serde_json::from_value(value)?;
            category.touch();
            self.categories.update(category)?;
        }
        Ok(())
    }

    async fn delete(&self, ids: &[Uuid]) -> Result<()> {
        for id in ids {
            self.categories.delete(id)?;
        }
        Ok(())
    }
}

/// Assemble the category dataset
pub fn category_dataset(
    label: impl Into<String>,
    button_label: impl Into<String>,
    categories: MemoryStore<Category>,
    groups: MemoryStore<CategoryGroup>,
    products_count: impl Fn(&Category) -> usize + Send + Sync + 'static,
) -> Result<Dataset<Category>> {
    let records = categories.list()?;
    let group_records = groups.list()?;
    let options = group_options(&group_records);

    Ok(Dataset::new(
        "category",
        label,
        button_label,
        Arc::new(CategoryHandlers::new(categories, groups)),
    )
    .with_records(records)
    .with_columns(category_columns(group_records.clone(), products_count))
    .with_fields(category_drawer_fields(&group_records))
    .with_dropdown_options("category_group_id", options))
}

/// Route descriptor for the category dataset
pub struct CategoryDescriptor {
    state: DatasetRouteState<Category>,
}

impl CategoryDescriptor {
    pub fn new(state: DatasetRouteState<Category>) -> Self {
        Self { state }
    }
}

impl DatasetDescriptor for CategoryDescriptor {
    fn dataset_key(&self) -> &str {
        "category"
    }

    fn plural(&self) -> &str {
        "categories"
    }

    fn build_routes(&self) -> axum::Router {
        dataset_routes(self.state.clone())
    }
}
