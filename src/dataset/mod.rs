//! The versioned Dataset contract
//!
//! One named collection of records plus its column/field/handler
//! configuration. Per-dataset variance (selection, dropdown sources,
//! draft support) is configuration on this type, not a forked table
//! implementation.

pub mod handlers;
pub mod registry;

pub use handlers::DatasetHandlers;
pub use registry::{DatasetDescriptor, DatasetRegistry};

use crate::core::column::ColumnDescriptor;
use crate::core::descriptor::{FieldDescriptor, FieldsSource};
use crate::core::entity::Record;
use crate::core::error::{ConfigError, GridResult};
use crate::core::field::SelectOption;
use std::collections::HashMap;
use std::sync::Arc;

/// One switchable dataset: records, columns, form fields, handlers
#[derive(Clone)]
pub struct Dataset<T: Record> {
    /// Stable key used for switching and draft scoping
    pub key: String,
    /// Display label (e.g. "Category")
    pub label: String,
    /// Creation affordance label (e.g. "New Category")
    pub button_label: String,
    pub records: Vec<T>,
    pub columns: Vec<ColumnDescriptor<T>>,
    pub fields: FieldsSource<T>,
    pub handlers: Arc<dyn DatasetHandlers>,
    /// Options for inline dropdown cells and drawer selects, keyed by
    /// field/accessor key
    pub dropdown_options: HashMap<String, Vec<SelectOption>>,
}

impl<T: Record> Dataset<T> {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        button_label: impl Into<String>,
        handlers: Arc<dyn DatasetHandlers>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            button_label: button_label.into(),
            records: Vec::new(),
            columns: Vec::new(),
            fields: FieldsSource::Static(Vec::new()),
            handlers,
            dropdown_options: HashMap::new(),
        }
    }

    pub fn with_records(mut self, records: Vec<T>) -> Self {
        self.records = records;
        self
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDescriptor<T>>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_fields(mut self, fields: impl Into<FieldsSource<T>>) -> Self {
        self.fields = fields.into();
        self
    }

    pub fn with_derived_fields(
        mut self,
        f: impl Fn(&[T]) -> Vec<FieldDescriptor> + Send + Sync + 'static,
    ) -> Self {
        self.fields = FieldsSource::Derived(Arc::new(f));
        self
    }

    pub fn with_dropdown_options(
        mut self,
        key: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        self.dropdown_options.insert(key.into(), options);
        self
    }

    /// Current field descriptors, re-resolved against the record set
    pub fn resolved_fields(&self) -> Vec<FieldDescriptor> {
        self.fields.resolve(&self.records)
    }

    /// Check every declared key against the record's field set
    ///
    /// Non-synthetic column keys, field descriptor keys, and dropdown
    /// keys must all name real record fields; the table performs no
    /// schema inference at render time.
    pub fn validate(&self) -> GridResult<()> {
        let known = T::field_keys();

        for column in &self.columns {
            if !column.synthetic && !known.contains(&column.key.as_str()) {
                return Err(ConfigError::UnknownKey {
                    dataset: self.key.clone(),
                    key: column.key.clone(),
                }
                .into());
            }
        }

        for field in self.resolved_fields() {
            if !known.contains(&field.key.as_str()) {
                return Err(ConfigError::UnknownKey {
                    dataset: self.key.clone(),
                    key: field.key.clone(),
                }
                .into());
            }
        }

        for key in self.dropdown_options.keys() {
            if !known.contains(&key.as_str()) {
                return Err(ConfigError::UnknownKey {
                    dataset: self.key.clone(),
                    key: key.clone(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Find a column by key
    pub fn column(&self, key: &str) -> Option<&ColumnDescriptor<T>> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Dropdown options configured for a field/accessor key
    pub fn dropdown(&self, key: &str) -> Option<&[SelectOption]> {
        self.dropdown_options.get(key).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::FieldKind;
    use crate::core::entity::Entity;
    use crate::core::error::GridError;
    use crate::core::field::FieldValue;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    #[derive(Clone, Debug, serde::Serialize)]
    struct Item {
        id: Uuid,
        name: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    }

    impl Entity for Item {
        fn resource_name() -> &'static str {
            "items"
        }
        fn resource_name_singular() -> &'static str {
            "item"
        }
        fn id(&self) -> Uuid {
            self.id
        }
        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }
        fn updated_at(&self) -> DateTime<Utc> {
            self.updated_at
        }
    }

    impl Record for Item {
        fn display_name(&self) -> &str {
            &self.name
        }
        fn field_keys() -> &'static [&'static str] {
            &["id", "name"]
        }
        fn field_value(&self, field: &str) -> Option<FieldValue> {
            match field {
                "id" => Some(self.id.into()),
                "name" => Some(self.name.clone().into()),
                _ => None,
            }
        }
        fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), GridError> {
            match field {
                "name" => {
                    self.name = value.coerce_string();
                    Ok(())
                }
                _ => Err(crate::core::entity::unknown_field::<Self>(field)),
            }
        }
        fn touch(&mut self) {
            self.updated_at = Utc::now();
        }
    }

    fn dataset() -> Dataset<Item> {
        Dataset::new(
            "items",
            "Item",
            "New Item",
            Arc::new(handlers::testing::RecordingHandlers::new()),
        )
    }

    #[test]
    fn test_valid_dataset_passes() {
        let ds = dataset()
            .with_columns(vec![
                ColumnDescriptor::new("name", "Name"),
                ColumnDescriptor::synthetic("count", "Count", |_| "0".to_string()),
            ])
            .with_fields(vec![FieldDescriptor::new("name", "Name", FieldKind::Text)]);

        assert!(ds.validate().is_ok());
    }

    #[test]
    fn test_unknown_column_key_is_rejected() {
        let ds = dataset().with_columns(vec![ColumnDescriptor::new("price", "Price")]);

        let err = ds.validate().expect_err("unknown column key");
        assert_eq!(err.error_code(), "UNKNOWN_KEY");
    }

    #[test]
    fn test_unknown_field_key_is_rejected() {
        let ds =
            dataset().with_fields(vec![FieldDescriptor::new("price", "Price", FieldKind::Text)]);

        assert!(ds.validate().is_err());
    }

    #[test]
    fn test_unknown_dropdown_key_is_rejected() {
        let ds = dataset().with_dropdown_options("price", vec![]);

        assert!(ds.validate().is_err());
    }

    #[test]
    fn test_synthetic_columns_skip_key_check() {
        let ds = dataset().with_columns(vec![ColumnDescriptor::synthetic(
            "products_count",
            "Products Count",
            |_| "—".to_string(),
        )]);

        assert!(ds.validate().is_ok());
    }
}
