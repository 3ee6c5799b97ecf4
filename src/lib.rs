//! # Gridset Framework
//!
//! A framework for building admin catalog backends around a generic,
//! reusable tabular core: multi-dataset editable table views with a
//! descriptor-driven form drawer.
//!
//! ## Features
//!
//! - **Dataset Contract**: one versioned `Dataset` type carrying
//!   records, columns, field descriptors, dropdown sources, and async
//!   mutation handlers
//! - **Table Engine**: selection, sorting, filtering, pagination,
//!   id-keyed drag reorder, and inline cell editing with a diff-only
//!   pending-edit buffer and batched save
//! - **Optimistic With Rollback**: every local mutation reverts if the
//!   backing handler rejects
//! - **Form Drawer**: field-descriptor-driven create/edit forms with
//!   create and draft submit intents
//! - **Draft Autosave**: debounced snapshots under keys scoped by
//!   dataset and record, resumable across interruptions
//! - **Auto-Generated Routes**: paginated list plus multipart form
//!   actions per registered dataset
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gridset::prelude::*;
//!
//! let stores = CatalogStores::new();
//! let dataset = product_dataset(
//!     "Product",
//!     "New Product",
//!     stores.products.clone(),
//!     stores.categories.clone(),
//! )?;
//!
//! let mut view = TableView::new(dataset)?;
//! view.begin_edit(id, "name")?;
//! view.commit_edit("Lotion".into())?;
//! view.save_pending().await?;
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod dataset;
pub mod form;
pub mod server;
pub mod storage;
pub mod table;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        column::ColumnDescriptor,
        descriptor::{FieldDescriptor, FieldKind, FieldsSource},
        entity::{Entity, FieldSnapshot, Record},
        error::{GridError, GridResult},
        events::{CatalogEvent, EventBus},
        field::{FieldFormat, FieldValue, SelectOption},
        query::{PaginatedResponse, QueryParams, SortSpec},
    };

    // === Macros ===
    pub use crate::impl_entity_base;

    // === Table Engine ===
    pub use crate::table::{CellEditor, EditOutcome, TableSession, TableView};

    // === Form Engine ===
    pub use crate::form::{
        DraftAutosaver, DraftKey, DraftStore, DrawerForm, FormMethod, FormPayload, FsDraftStore,
        InMemoryDraftStore, SubmitIntent,
    };

    // === Datasets ===
    pub use crate::dataset::{Dataset, DatasetDescriptor, DatasetHandlers, DatasetRegistry};

    // === Storage ===
    pub use crate::storage::MemoryStore;

    // === Catalog ===
    pub use crate::catalog::{
        Affiliation, BlogPost, CatalogStores, Category, CategoryGroup, Product,
        blog_dataset, categories_session, category_dataset, category_group_dataset,
        product_dataset,
    };

    // === Config ===
    pub use crate::config::{DatasetConfig, PanelConfig};

    // === Server ===
    pub use crate::server::{DatasetRouteState, ServerBuilder, dataset_routes};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;

    // === Axum ===
    pub use axum::{
        Router,
        extract::{Query, State},
        routing::{get, post},
    };
}
