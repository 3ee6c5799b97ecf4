//! Multi-dataset table session
//!
//! One shell hosting several datasets behind a selector. Switching the
//! active dataset unconditionally resets transient view state on both
//! sides of the switch: selection, sort, filter, pagination, and pending
//! edits never leak across datasets.

use crate::core::entity::Record;
use crate::core::error::{DatasetError, GridResult};
use crate::table::view::TableView;
use indexmap::IndexMap;
use std::any::Any;

/// Object-safe surface the session needs from a typed view
pub trait ErasedTableView: Send {
    fn dataset_key(&self) -> &str;
    fn dataset_label(&self) -> &str;
    fn reset_transient_state(&mut self);
    fn has_pending_edits(&self) -> bool;
    fn selection_len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Record> ErasedTableView for TableView<T> {
    fn dataset_key(&self) -> &str {
        TableView::dataset_key(self)
    }

    fn dataset_label(&self) -> &str {
        self.label()
    }

    fn reset_transient_state(&mut self) {
        TableView::reset_transient_state(self)
    }

    fn has_pending_edits(&self) -> bool {
        TableView::has_pending_edits(self)
    }

    fn selection_len(&self) -> usize {
        TableView::selection_len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Shell hosting multiple datasets with one active at a time
#[derive(Default)]
pub struct TableSession {
    views: IndexMap<String, Box<dyn ErasedTableView>>,
    active: Option<String>,
}

impl TableSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dataset's view; the first added becomes active
    pub fn add_view<T: Record>(&mut self, view: TableView<T>) {
        let key = view.dataset_key().to_string();
        self.views.insert(key.clone(), Box::new(view));
        if self.active.is_none() {
            self.active = Some(key);
        }
    }

    /// Keys and labels of all hosted datasets, in registration order
    pub fn dataset_options(&self) -> Vec<(&str, &str)> {
        self.views
            .values()
            .map(|v| (v.dataset_key(), v.dataset_label()))
            .collect()
    }

    pub fn active_key(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Switch the active dataset
    ///
    /// Transient view state is reset on the outgoing and the incoming
    /// view; uncommitted edits are discarded, not auto-saved.
    /// Re-selecting the already-active dataset changes nothing.
    pub fn activate(&mut self, key: &str) -> GridResult<()> {
        if !self.views.contains_key(key) {
            return Err(DatasetError::UnknownDataset {
                key: key.to_string(),
            }
            .into());
        }
        if self.active.as_deref() == Some(key) {
            return Ok(());
        }

        if let Some(active) = self.active.take() {
            if let Some(view) = self.views.get_mut(&active) {
                if view.has_pending_edits() {
                    tracing::warn!(
                        dataset = %active,
                        "discarding pending edits on dataset switch"
                    );
                }
                view.reset_transient_state();
            }
        }

        if let Some(view) = self.views.get_mut(key) {
            view.reset_transient_state();
        }
        self.active = Some(key.to_string());
        Ok(())
    }

    /// Typed access to a hosted view
    pub fn view<T: Record>(&self, key: &str) -> Option<&TableView<T>> {
        self.views.get(key).and_then(|v| v.as_any().downcast_ref())
    }

    /// Typed mutable access to a hosted view
    pub fn view_mut<T: Record>(&mut self, key: &str) -> Option<&mut TableView<T>> {
        self.views
            .get_mut(key)
            .and_then(|v| v.as_any_mut().downcast_mut())
    }
}
