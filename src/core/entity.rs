//! Record traits defining the core abstraction for all tabular data types

use crate::core::error::{DatasetError, GridError};
use crate::core::field::FieldValue;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

/// An ordered map of field name to current value
///
/// Snapshots are what descriptor resolution, drafts, and the drawer work
/// against: the union of a record's fields (or an empty map for
/// creation) with any in-progress edits layered on top.
pub type FieldSnapshot = IndexMap<String, FieldValue>;

/// Base trait for all entities in the system.
///
/// Every entity has a stable unique identifier and automatic
/// created_at / updated_at timestamps.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The plural resource name used in URLs (e.g., "products", "categories")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "product", "category")
    fn resource_name_singular() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;
}

/// Trait for records that can be shown and edited in a table view.
///
/// Records extend the base Entity with dynamic field access: the table
/// engine reads cells through `field_value`, applies committed edits
/// through `set_field`, and hands full-row state to descriptor
/// resolution as a `FieldSnapshot`.
pub trait Record: Entity + serde::Serialize {
    /// Human-readable name used in drawer titles
    fn display_name(&self) -> &str;

    /// The complete set of field keys this record exposes
    ///
    /// Column and field descriptor keys are validated against this set
    /// when a dataset is registered.
    fn field_keys() -> &'static [&'static str];

    /// Get the value of a specific field by name
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Set the value of a specific field by name
    ///
    /// Returns an error for keys outside `field_keys()` and for values
    /// the field cannot hold. Synthetic read-only fields (derived
    /// counts) reject writes the same way.
    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), GridError>;

    /// Bump the updated_at timestamp
    fn touch(&mut self);

    /// Snapshot all fields in declaration order
    fn snapshot(&self) -> FieldSnapshot {
        Self::field_keys()
            .iter()
            .map(|key| {
                (
                    key.to_string(),
                    self.field_value(key).unwrap_or(FieldValue::Null),
                )
            })
            .collect()
    }
}

/// Build the error for a write to a key outside the record's field set
///
/// Shared by `set_field` implementations (including the macro-generated
/// ones) so unknown-field rejections carry a uniform shape.
pub fn unknown_field<T: Entity>(field: &str) -> GridError {
    GridError::Dataset(DatasetError::UnknownField {
        entity_type: T::resource_name_singular().to_string(),
        field: field.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, Serialize, Deserialize)]
    struct TestRecord {
        id: Uuid,
        name: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    }

    impl Entity for TestRecord {
        fn resource_name() -> &'static str {
            "test_records"
        }

        fn resource_name_singular() -> &'static str {
            "test_record"
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

    impl Record for TestRecord {
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
                _ => Err(unknown_field::<Self>(field)),
            }
        }

        fn touch(&mut self) {
            self.updated_at = Utc::now();
        }
    }

    #[test]
    fn test_snapshot_preserves_field_order() {
        let record = TestRecord {
            id: Uuid::new_v4(),
            name: "Soap".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let snapshot = record.snapshot();
        let keys: Vec<&str> = snapshot.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["id", "name"]);
        assert_eq!(snapshot["name"], FieldValue::String("Soap".to_string()));
    }

    #[test]
    fn test_set_unknown_field_is_rejected() {
        let mut record = TestRecord {
            id: Uuid::new_v4(),
            name: "Soap".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let err = record
            .set_field("nope", FieldValue::Null)
            .expect_err("unknown field must be rejected");
        assert_eq!(err.error_code(), "UNKNOWN_FIELD");
    }

    #[test]
    fn test_entity_metadata() {
        assert_eq!(TestRecord::resource_name(), "test_records");
        assert_eq!(TestRecord::resource_name_singular(), "test_record");
    }
}
