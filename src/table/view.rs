//! The per-dataset table view state machine
//!
//! A `TableView` renders one active dataset as a sortable, filterable,
//! paginated, selectable, drag-reorderable, inline-editable row set. It
//! owns only view state: every mutation is an optimistic local
//! reflection of an intent the dataset's handlers either confirm or
//! reject, and a rejection rolls the local state back.

use crate::core::descriptor::FieldDescriptor;
use crate::core::entity::Record;
use crate::core::error::{FormError, GridError, GridResult, HandlerError};
use crate::core::field::{FieldValue, SelectOption};
use crate::core::query::SortDirection;
use crate::dataset::Dataset;
use crate::form::drawer::DrawerForm;
use crate::table::edit::EditBuffer;
use crate::table::reorder::move_by_id;
use crate::table::state::ViewState;
use uuid::Uuid;

/// The editor to present for a cell that entered editing
#[derive(Debug, Clone, PartialEq)]
pub enum CellEditor {
    /// Single-line text input seeded with the cell's current value
    Text { seed: String },
    /// Select input bound to the configured dropdown options
    Select {
        options: Vec<SelectOption>,
        seed: String,
    },
}

/// What committing a cell edit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The committed value equals the current one; nothing buffered
    Unchanged,
    /// The row was updated optimistically and the delta buffered
    Buffered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmState {
    Idle,
    Confirming,
}

/// Tabular view over one dataset
pub struct TableView<T: Record> {
    dataset: Dataset<T>,
    state: ViewState,
    buffer: EditBuffer,
    editing: Option<(Uuid, String)>,
    confirm: ConfirmState,
}

impl<T: Record> std::fmt::Debug for TableView<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableView")
            .field("dataset_key", &self.dataset.key)
            .field("state", &self.state)
            .field("buffer", &self.buffer)
            .field("editing", &self.editing)
            .field("confirm", &self.confirm)
            .finish()
    }
}

impl<T: Record> TableView<T> {
    /// Build a view over a validated dataset
    pub fn new(dataset: Dataset<T>) -> GridResult<Self> {
        dataset.validate()?;
        Ok(Self {
            dataset,
            state: ViewState::new(),
            buffer: EditBuffer::new(),
            editing: None,
            confirm: ConfirmState::Idle,
        })
    }

    // === Dataset access ===

    pub fn dataset(&self) -> &Dataset<T> {
        &self.dataset
    }

    pub fn dataset_key(&self) -> &str {
        &self.dataset.key
    }

    pub fn label(&self) -> &str {
        &self.dataset.label
    }

    pub fn button_label(&self) -> &str {
        &self.dataset.button_label
    }

    pub fn records(&self) -> &[T] {
        &self.dataset.records
    }

    /// Row ids in current (possibly reordered) storage order
    pub fn order(&self) -> Vec<Uuid> {
        self.dataset.records.iter().map(|r| r.id()).collect()
    }

    pub fn row(&self, id: &Uuid) -> Option<&T> {
        self.dataset.records.iter().find(|r| r.id() == *id)
    }

    fn row_mut(&mut self, id: &Uuid) -> Option<&mut T> {
        self.dataset.records.iter_mut().find(|r| r.id() == *id)
    }

    /// Field descriptors, re-resolved against the current record set
    pub fn resolved_fields(&self) -> Vec<FieldDescriptor> {
        self.dataset.resolved_fields()
    }

    /// A drawer bound to an empty record, for creating in this dataset
    ///
    /// The created record is not inserted optimistically; the
    /// collaborator supplies the refreshed record list.
    pub fn creation_drawer(&self) -> DrawerForm {
        DrawerForm::for_create(
            self.dataset.key.clone(),
            self.dataset.button_label.clone(),
            self.resolved_fields(),
            self.dataset.handlers.supports_draft(),
        )
    }

    /// The handlers backing this dataset
    pub fn handlers(&self) -> std::sync::Arc<dyn crate::dataset::DatasetHandlers> {
        self.dataset.handlers.clone()
    }

    /// Replace the record set after an external data refresh
    ///
    /// The dataset's data changed, so selection and pending edits are
    /// reset; sort, filter, and page survive the refresh.
    pub fn replace_records(&mut self, records: Vec<T>) {
        self.dataset.records = records;
        self.state.clear_selection();
        self.buffer.clear();
        self.editing = None;
        self.confirm = ConfirmState::Idle;
    }

    /// Reset all transient view state (dataset switch)
    pub fn reset_transient_state(&mut self) {
        self.state.reset();
        self.buffer.clear();
        self.editing = None;
        self.confirm = ConfirmState::Idle;
    }

    // === Selection ===

    pub fn is_selected(&self, id: &Uuid) -> bool {
        self.state.is_selected(id)
    }

    pub fn toggle_row_selected(&mut self, id: Uuid) {
        self.state.toggle_selected(id);
    }

    /// Select every row on the current page
    pub fn select_all_visible(&mut self) {
        let ids: Vec<Uuid> = self.visible_rows().iter().map(|r| r.id()).collect();
        self.state.select_many(ids);
    }

    pub fn clear_selection(&mut self) {
        self.state.clear_selection();
    }

    pub fn selected_ids(&self) -> Vec<Uuid> {
        self.state.selected_ids()
    }

    pub fn selection_len(&self) -> usize {
        self.state.selection_len()
    }

    // === Sort, filter, pagination ===

    /// Cycle the sort on a column header click
    ///
    /// Synthetic and sort-disabled columns never react.
    pub fn toggle_sort(&mut self, key: &str) {
        match self.dataset.column(key) {
            Some(column) if column.sortable => self.state.toggle_sort(key),
            _ => {}
        }
    }

    pub fn sort(&self) -> Option<&crate::core::query::SortSpec> {
        self.state.sort.as_ref()
    }

    pub fn set_filter(&mut self, term: Option<String>) {
        self.state.set_filter(term);
    }

    pub fn set_page(&mut self, page: usize) {
        self.state.set_page(page);
    }

    pub fn page(&self) -> usize {
        self.state.page
    }

    pub fn page_size(&self) -> usize {
        self.state.page_size
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.state.page_size = page_size.max(1);
    }

    /// Rows on the current page after filter and sort
    pub fn visible_rows(&self) -> Vec<&T> {
        let mut rows: Vec<&T> = match &self.state.filter {
            None => self.dataset.records.iter().collect(),
            Some(term) => {
                let needle = term.to_lowercase();
                self.dataset
                    .records
                    .iter()
                    .filter(|row| {
                        self.dataset.columns.iter().any(|column| {
                            self.display_value(row, &column.key)
                                .to_lowercase()
                                .contains(&needle)
                        })
                    })
                    .collect()
            }
        };

        if let Some(spec) = &self.state.sort {
            rows.sort_by(|a, b| {
                let ordering = a
                    .field_value(&spec.key)
                    .unwrap_or(FieldValue::Null)
                    .compare(&b.field_value(&spec.key).unwrap_or(FieldValue::Null));
                match spec.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let start = (self.state.page - 1) * self.state.page_size;
        rows.into_iter().skip(start).take(self.state.page_size).collect()
    }

    /// Total row count after filtering, ignoring pagination
    pub fn filtered_len(&self) -> usize {
        match &self.state.filter {
            None => self.dataset.records.len(),
            Some(term) => {
                let needle = term.to_lowercase();
                self.dataset
                    .records
                    .iter()
                    .filter(|row| {
                        self.dataset.columns.iter().any(|column| {
                            self.display_value(row, &column.key)
                                .to_lowercase()
                                .contains(&needle)
                        })
                    })
                    .count()
            }
        }
    }

    /// The text a cell displays
    ///
    /// Custom renderer first, then the dropdown label for the raw value,
    /// then the raw value's string form.
    pub fn display_value(&self, row: &T, key: &str) -> String {
        if let Some(column) = self.dataset.column(key) {
            if let Some(render) = &column.render {
                return render(row);
            }
        }

        let raw = row
            .field_value(key)
            .unwrap_or(FieldValue::Null)
            .coerce_string();

        if let Some(options) = self.dataset.dropdown(key) {
            if let Some(option) = options.iter().find(|o| o.value == raw) {
                return option.label.clone();
            }
        }

        raw
    }

    // === Drag reorder ===

    /// Move the row with id `active` to the position of row `over`
    ///
    /// In-memory order only; a drop onto itself or an unknown id is a
    /// no-op. Returns whether the order changed.
    pub fn reorder(&mut self, active: Uuid, over: Uuid) -> bool {
        move_by_id(&mut self.dataset.records, |r| r.id(), active, over)
    }

    // === Inline cell editing ===

    /// Enter editing on a cell
    ///
    /// Yields a select editor when dropdown options are configured for
    /// the key, a text editor otherwise. Non-editable and synthetic
    /// columns reject the edit regardless of dropdown configuration.
    pub fn begin_edit(&mut self, id: Uuid, key: &str) -> GridResult<CellEditor> {
        let column = self.dataset.column(key).ok_or_else(|| {
            GridError::Dataset(crate::core::error::DatasetError::UnknownColumn {
                dataset: self.dataset.key.clone(),
                key: key.to_string(),
            })
        })?;

        if !column.editable || column.synthetic {
            return Err(FormError::NotEditable {
                dataset: self.dataset.key.clone(),
                key: key.to_string(),
            }
            .into());
        }

        let row = self.row(&id).ok_or_else(|| {
            GridError::Dataset(crate::core::error::DatasetError::UnknownRecord {
                entity_type: T::resource_name_singular().to_string(),
                id,
            })
        })?;

        let seed = row
            .field_value(key)
            .unwrap_or(FieldValue::Null)
            .coerce_string();

        let editor = match self.dataset.dropdown(key) {
            Some(options) => CellEditor::Select {
                options: options.to_vec(),
                seed,
            },
            None => CellEditor::Text { seed },
        };

        self.editing = Some((id, key.to_string()));
        Ok(editor)
    }

    /// The cell currently in editing, if any
    pub fn editing(&self) -> Option<(Uuid, &str)> {
        self.editing.as_ref().map(|(id, key)| (*id, key.as_str()))
    }

    /// Commit the in-progress cell edit (blur or Enter)
    ///
    /// Values are compared in string form so a select's string value
    /// matches a typed field. An unchanged value leaves no trace; a
    /// changed one updates the row immediately and buffers the delta.
    pub fn commit_edit(&mut self, value: FieldValue) -> GridResult<EditOutcome> {
        let (id, key) = self.editing.take().ok_or(FormError::NoActiveEdit)?;

        let current = self
            .row(&id)
            .and_then(|row| row.field_value(&key))
            .unwrap_or(FieldValue::Null);

        if value.coerce_string() == current.coerce_string() {
            return Ok(EditOutcome::Unchanged);
        }

        {
            let row = self.row_mut(&id).ok_or_else(|| {
                GridError::Dataset(crate::core::error::DatasetError::UnknownRecord {
                    entity_type: T::resource_name_singular().to_string(),
                    id,
                })
            })?;
            row.set_field(&key, value.clone())?;
        }

        self.buffer.record(id, &key, value, current);
        Ok(EditOutcome::Buffered)
    }

    /// Abandon the in-progress cell edit
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn has_pending_edits(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Number of records with uncommitted edits
    pub fn pending_edit_count(&self) -> usize {
        self.buffer.len()
    }

    /// The buffered value for a cell, if any
    pub fn pending_value(&self, id: &Uuid, key: &str) -> Option<&FieldValue> {
        self.buffer.get(id).and_then(|fields| fields.get(key)).map(|e| &e.value)
    }

    // === Batched save ===

    /// Flush the pending-edit buffer through the update handler
    ///
    /// Reconstructs one full record per buffered id and invokes the
    /// handler once with the whole list. On rejection every buffered
    /// field is rolled back to its pre-edit value and the error is
    /// surfaced. Returns the ids that were saved.
    pub async fn save_pending(&mut self) -> GridResult<Vec<Uuid>> {
        if self.buffer.is_empty() {
            return Ok(Vec::new());
        }

        let ids = self.buffer.ids();
        let mut merged = Vec::with_capacity(ids.len());
        for id in &ids {
            let row = self.row(id).ok_or_else(|| {
                GridError::Dataset(crate::core::error::DatasetError::UnknownRecord {
                    entity_type: T::resource_name_singular().to_string(),
                    id: *id,
                })
            })?;

            // Rows already carry the optimistic values; re-applying the
            // buffered diffs over a clone keeps the merge explicit.
            let mut record = row.clone();
            if let Some(fields) = self.buffer.get(id) {
                for (field, edit) in fields {
                    record.set_field(field, edit.value.clone())?;
                }
            }
            merged.push(serde_json::to_value(&record)?);
        }

        let handlers = self.dataset.handlers.clone();
        match handlers.update(merged).await {
            Ok(()) => {
                tracing::debug!(dataset = %self.dataset.key, records = ids.len(), "batched save flushed");
                self.buffer.clear();
                Ok(ids)
            }
            Err(err) => {
                self.rollback_buffered_edits();
                Err(HandlerError::new(self.dataset.key.clone(), "update", &err).into())
            }
        }
    }

    fn rollback_buffered_edits(&mut self) {
        let edits = self.buffer.drain();
        for (id, fields) in edits {
            if let Some(row) = self.row_mut(&id) {
                for (field, edit) in fields {
                    // Restoring a known field cannot fail; ignore the
                    // impossible error rather than abort mid-rollback
                    let _ = row.set_field(&field, edit.original);
                }
            }
        }
    }

    // === Bulk delete ===

    pub fn can_delete(&self) -> bool {
        self.dataset.handlers.supports_delete()
    }

    /// Ask for confirmation before deleting the selected rows
    ///
    /// Returns the ids awaiting confirmation; an empty selection stays
    /// idle. Forcing the action on a dataset without a delete handler is
    /// a contract violation rather than a silent removal.
    pub fn request_delete(&mut self) -> GridResult<Vec<Uuid>> {
        if !self.can_delete() {
            return Err(FormError::ContractViolation {
                dataset: self.dataset.key.clone(),
                action: "delete".to_string(),
            }
            .into());
        }

        let ids = self.state.selected_ids();
        if !ids.is_empty() {
            self.confirm = ConfirmState::Confirming;
        }
        Ok(ids)
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.confirm == ConfirmState::Confirming
    }

    /// Back out of the confirmation step; nothing changes
    pub fn cancel_delete(&mut self) {
        self.confirm = ConfirmState::Idle;
    }

    /// Confirm the bulk delete
    ///
    /// Removes the selected rows optimistically, invokes the delete
    /// handler with their ids, and restores rows and order if the
    /// handler rejects. On success the ids leave the selection and the
    /// pending-edit buffer.
    pub async fn confirm_delete(&mut self) -> GridResult<Vec<Uuid>> {
        if self.confirm != ConfirmState::Confirming {
            return Err(FormError::NoPendingConfirmation.into());
        }
        self.confirm = ConfirmState::Idle;

        let ids = self.state.selected_ids();
        if ids.is_empty() {
            return Ok(ids);
        }

        let snapshot = self.dataset.records.clone();
        self.dataset.records.retain(|row| !ids.contains(&row.id()));

        let handlers = self.dataset.handlers.clone();
        match handlers.delete(&ids).await {
            Ok(()) => {
                tracing::debug!(dataset = %self.dataset.key, removed = ids.len(), "bulk delete confirmed");
                self.state.deselect_many(&ids);
                self.buffer.remove_ids(&ids);
                Ok(ids)
            }
            Err(err) => {
                self.dataset.records = snapshot;
                Err(HandlerError::new(self.dataset.key.clone(), "delete", &err).into())
            }
        }
    }
}
