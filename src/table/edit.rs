//! The pending-edit buffer
//!
//! Committed cell edits land here as diffs until an explicit batched
//! save flushes them to the dataset's update handler. Each entry keeps
//! the value the cell held before its *first* uncommitted edit so a
//! rejected save can roll the row back.

use crate::core::field::FieldValue;
use indexmap::IndexMap;
use uuid::Uuid;

/// One uncommitted cell change
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    /// The value the user committed
    pub value: FieldValue,
    /// The value the cell held before the first uncommitted edit
    pub original: FieldValue,
}

/// Diff-only map of uncommitted per-record field changes
///
/// Keyed by record id, then field key. Iteration order is insertion
/// order so a batched save flushes edits deterministically.
#[derive(Debug, Clone, Default)]
pub struct EditBuffer {
    edits: IndexMap<Uuid, IndexMap<String, CellEdit>>,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed edit for `(id, field)`
    ///
    /// Overwrites any prior uncommitted edit for the same pair while
    /// preserving the first original. The caller has already established
    /// that `value` differs from the cell's current value.
    pub fn record(&mut self, id: Uuid, field: &str, value: FieldValue, current: FieldValue) {
        let fields = self.edits.entry(id).or_default();
        match fields.get_mut(field) {
            Some(edit) => edit.value = value,
            None => {
                fields.insert(
                    field.to_string(),
                    CellEdit {
                        value,
                        original: current,
                    },
                );
            }
        }
    }

    /// The uncommitted edits for one record
    pub fn get(&self, id: &Uuid) -> Option<&IndexMap<String, CellEdit>> {
        self.edits.get(id)
    }

    /// Ids with at least one uncommitted edit, in first-edit order
    pub fn ids(&self) -> Vec<Uuid> {
        self.edits.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Number of records with uncommitted edits
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Drop the edits for the given ids (after a successful delete)
    pub fn remove_ids(&mut self, ids: &[Uuid]) {
        for id in ids {
            self.edits.shift_remove(id);
        }
    }

    pub fn clear(&mut self) {
        self.edits.clear();
    }

    /// Take the buffer's contents, leaving it empty
    pub fn drain(&mut self) -> IndexMap<Uuid, IndexMap<String, CellEdit>> {
        std::mem::take(&mut self.edits)
    }
}
