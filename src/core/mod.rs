//! Core module containing fundamental traits and types for the framework

pub mod column;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod events;
pub mod field;
pub mod query;
pub mod validation;

pub use column::ColumnDescriptor;
pub use descriptor::{
    BoolSource, FieldDescriptor, FieldKind, FieldsSource, OptionsSource, ResolvedField, TextSource,
};
pub use entity::{Entity, FieldSnapshot, Record};
pub use error::{GridError, GridResult};
pub use events::{CatalogEvent, EventBus, EventEnvelope};
pub use field::{FieldFormat, FieldValue, SelectOption};
pub use query::{PaginatedResponse, PaginationMeta, QueryParams, SortDirection, SortSpec};
pub use validation::FieldChecks;
