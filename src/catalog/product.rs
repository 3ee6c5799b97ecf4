//! Products: the main catalog entity

use crate::catalog::category::{Category, parse_id};
use crate::core::column::ColumnDescriptor;
use crate::core::descriptor::{FieldDescriptor, FieldKind};
use crate::core::entity::{Record, unknown_field};
use crate::core::error::GridError;
use crate::core::field::{FieldFormat, FieldValue, SelectOption};
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

/// A catalog product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity_base!(Product, "product", "products");

impl Product {
    pub fn new(
        name: String,
        description: Option<String>,
        image_url: Option<String>,
        category_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            image_url,
            category_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

impl Record for Product {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn field_keys() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "description",
            "image_url",
            "created_at",
            "category_id",
        ]
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "description" => Some(self.description.clone().into()),
            "image_url" => Some(self.image_url.clone().into()),
            "created_at" => Some(self.created_at.into()),
            "category_id" => Some(self.category_id.into()),
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), GridError> {
        match field {
            "name" => self.name = value.coerce_string(),
            "description" => {
                self.description = match value {
                    FieldValue::Null => None,
                    other => Some(other.coerce_string()),
                };
            }
            "image_url" => {
                self.image_url = match value {
                    FieldValue::Null => None,
                    other => Some(other.coerce_string()),
                };
            }
            "category_id" => self.category_id = parse_id("category_id", &value)?,
            _ => return Err(unknown_field::<Self>(field)),
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Select options naming each category
pub fn category_options(categories: &[Category]) -> Vec<SelectOption> {
    categories
        .iter()
        .map(|c| SelectOption::new(c.id.to_string(), c.name.clone()))
        .collect()
}

/// Columns for the product table
pub fn product_columns(categories: Vec<Category>) -> Vec<ColumnDescriptor<Product>> {
    vec![
        ColumnDescriptor::new("name", "Name"),
        ColumnDescriptor::new("description", "Description")
            .with_render(|p: &Product| p.description.clone().unwrap_or_else(|| "—".to_string())),
        ColumnDescriptor::new("image_url", "Image")
            .unsortable()
            .with_render(|p: &Product| p.image_url.clone().unwrap_or_else(|| "—".to_string())),
        ColumnDescriptor::new("created_at", "Created At")
            .read_only()
            .with_render(|p: &Product| p.created_at.format("%Y-%m-%d").to_string()),
        ColumnDescriptor::new("category_id", "Category").with_render(move |p: &Product| {
            categories
                .iter()
                .find(|c| c.id == p.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "N/A".to_string())
        }),
    ]
}

/// Drawer fields for creating a product
pub fn product_drawer_fields(categories: &[Category]) -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", "Name", FieldKind::Text),
        FieldDescriptor::new("description", "Description", FieldKind::Text),
        FieldDescriptor::new("image_url", "Image", FieldKind::Image),
        FieldDescriptor::new("category_id", "Category", FieldKind::Select)
            .with_options(category_options(categories)),
    ]
}

/// Mutation handlers backed by the in-memory stores
#[derive(Clone)]
pub struct ProductHandlers {
    pub products: MemoryStore<Product>,
    pub categories: MemoryStore<Category>,
}

impl ProductHandlers {
    pub fn new(products: MemoryStore<Product>, categories: MemoryStore<Category>) -> Self {
        Self {
            products,
            categories,
        }
    }

    fn decode(&self, payload: &FormPayload) -> Result<Product> {
        let mut checks = FieldChecks::new();

        let name = checks.required("name", payload.get("name")).map(str::to_string);
        let category_id = checks
            .required("category_id", payload.get("category_id"))
            .and_then(|raw| checks.uuid("category_id", raw));

        if let Some(id) = category_id {
            if self.categories.get(&id)?.is_none() {
                checks.fail("category_id", "is not a known category");
            }
        }

        let description = payload
            .get("description")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        // Image upload to an asset host is out of scope; a caller that
        // already has a URL may pass it as text, and a raw file part is
        // accepted but not persisted.
        let image_url = payload
            .get("image_url")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if let Some(url) = &image_url {
            checks.format("image_url", url, &FieldFormat::Url);
        }
        if let Some((filename, _, _)) = payload.file("image_url") {
            tracing::debug!(filename, "image file received; upload is out of scope");
        }

        checks.finish().map_err(GridError::Validation)?;
        let (Some(name), Some(category_id)) = (name, category_id) else {
            anyhow::bail!("missing required fields");
        };
        Ok(Product::new(name, description, image_url, category_id))
    }
}

#[async_trait]
impl DatasetHandlers for ProductHandlers {
    async fn create(&self, payload: &FormPayload) -> Result<serde_json::Value> {
        let product = self.decode(payload)?;
        self.products.add(product.clone())?;
        tracing::info!(product = %product.name, "product created");
        Ok(serde_json::to_value(product)?)
    }

    async fn update(&self, records: Vec<serde_json::Value>) -> Result<()> {
        for value in records {
            let mut product: Product = serde_json::from_value(value)?;
            product.touch();
            self.products.update(product)?;
        }
        Ok(())
    }

    async fn delete(&self, ids: &[Uuid]) -> Result<()> {
        for id in ids {
            self.products.delete(id)?;
        }
        Ok(())
    }
}

/// Assemble the product dataset
pub fn product_dataset(
    label: impl Into<String>,
    button_label: impl Into<String>,
    products: MemoryStore<Product>,
    categories: MemoryStore<Category>,
) -> Result<Dataset<Product>> {
    let records = products.list()?;
    let category_records = categories.list()?;
    let options = category_options(&category_records);

    Ok(Dataset::new(
        "product",
        label,
        button_label,
        Arc::new(ProductHandlers::new(products, categories)),
    )
    .with_records(records)
    .with_fields(product_drawer_fields(&category_records))
    .with_columns(product_columns(category_records))
    .with_dropdown_options("category_id", options))
}

/// Route descriptor for the product dataset
pub struct ProductDescriptor {
    state: DatasetRouteState<Product>,
}

impl ProductDescriptor {
    pub fn new(state: DatasetRouteState<Product>) -> Self {
        Self { state }
    }
}

impl DatasetDescriptor for ProductDescriptor {
    fn dataset_key(&self) -> &str {
        "product"
    }

    fn plural(&self) -> &str {
        "products"
    }

    fn build_routes(&self) -> axum::Router {
        dataset_routes(self.state.clone())
    }
}
