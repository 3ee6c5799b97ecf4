//! Transient per-dataset view state
//!
//! Everything in here is reset wholesale on dataset switch; selection is
//! additionally reset whenever the record set itself changes. Sort,
//! filter, and pagination changes never touch selection.

use crate::core::query::{SortDirection, SortSpec};
use indexmap::IndexSet;
use uuid::Uuid;

/// Default rows per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Selection, sort, filter, and pagination state for one table view
#[derive(Debug, Clone)]
pub struct ViewState {
    selection: IndexSet<Uuid>,
    pub sort: Option<SortSpec>,
    pub filter: Option<String>,
    /// 1-based page index
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            selection: IndexSet::new(),
            sort: None,
            filter: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to defaults, keeping the configured page size
    pub fn reset(&mut self) {
        let page_size = self.page_size;
        *self = Self {
            page_size,
            ..Self::default()
        };
    }

    // === Selection ===

    pub fn is_selected(&self, id: &Uuid) -> bool {
        self.selection.contains(id)
    }

    pub fn toggle_selected(&mut self, id: Uuid) {
        if !self.selection.shift_remove(&id) {
            self.selection.insert(id);
        }
    }

    pub fn select_many(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        self.selection.extend(ids);
    }

    pub fn deselect_many(&mut self, ids: &[Uuid]) {
        for id in ids {
            self.selection.shift_remove(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_ids(&self) -> Vec<Uuid> {
        self.selection.iter().copied().collect()
    }

    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    // === Sorting ===

    /// Cycle a column's sort: none -> asc -> desc -> none
    pub fn toggle_sort(&mut self, key: &str) {
        self.sort = match self.sort.take() {
            Some(spec) if spec.key == key => match spec.direction {
                SortDirection::Asc => Some(SortSpec::desc(key)),
                SortDirection::Desc => None,
            },
            _ => Some(SortSpec::asc(key)),
        };
    }

    // === Filter & pagination ===

    pub fn set_filter(&mut self, term: Option<String>) {
        self.filter = term.filter(|t| !t.trim().is_empty());
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = ViewState::new();
        assert_eq!(state.page, 1);
        assert_eq!(state.page_size, DEFAULT_PAGE_SIZE);
        assert!(state.sort.is_none());
        assert!(state.filter.is_none());
        assert_eq!(state.selection_len(), 0);
    }

    #[test]
    fn test_toggle_selection() {
        let mut state = ViewState::new();
        let id = Uuid::new_v4();

        state.toggle_selected(id);
        assert!(state.is_selected(&id));

        state.toggle_selected(id);
        assert!(!state.is_selected(&id));
    }

    #[test]
    fn test_sort_cycle() {
        let mut state = ViewState::new();

        state.toggle_sort("name");
        assert_eq!(state.sort, Some(SortSpec::asc("name")));

        state.toggle_sort("name");
        assert_eq!(state.sort, Some(SortSpec::desc("name")));

        state.toggle_sort("name");
        assert!(state.sort.is_none());
    }

    #[test]
    fn test_sort_switch_column_starts_asc() {
        let mut state = ViewState::new();

        state.toggle_sort("name");
        state.toggle_sort("created_at");
        assert_eq!(state.sort, Some(SortSpec::asc("created_at")));
    }

    #[test]
    fn test_filter_resets_page_but_not_selection() {
        let mut state = ViewState::new();
        let id = Uuid::new_v4();
        state.toggle_selected(id);
        state.set_page(3);

        state.set_filter(Some("soap".to_string()));
        assert_eq!(state.page, 1);
        assert!(state.is_selected(&id));

        state.set_filter(Some("   ".to_string()));
        assert!(state.filter.is_none());
    }

    #[test]
    fn test_reset_keeps_page_size() {
        let mut state = ViewState {
            page_size: 25,
            ..ViewState::new()
        };
        state.toggle_selected(Uuid::new_v4());
        state.toggle_sort("name");
        state.set_page(4);

        state.reset();
        assert_eq!(state.page_size, 25);
        assert_eq!(state.page, 1);
        assert!(state.sort.is_none());
        assert_eq!(state.selection_len(), 0);
    }
}
