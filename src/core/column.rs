//! Column descriptors for the table view

use std::fmt;
use std::sync::Arc;

/// Pairs an accessor key with a header label and rendering/editing flags
///
/// Synthetic columns (derived counts, selection) have no accessor into
/// the record's field set and are never editable.
#[derive(Clone)]
pub struct ColumnDescriptor<T> {
    pub key: String,
    pub header: String,
    /// Inline cell editing; defaults to true
    pub editable: bool,
    /// Header click sorting; defaults to true
    pub sortable: bool,
    /// Accessor-less column whose content comes entirely from `render`
    pub synthetic: bool,
    /// Optional custom cell renderer
    pub render: Option<Arc<dyn Fn(&T) -> String + Send + Sync>>,
}

impl<T> fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("editable", &self.editable)
            .field("sortable", &self.sortable)
            .field("synthetic", &self.synthetic)
            .finish_non_exhaustive()
    }
}

impl<T> ColumnDescriptor<T> {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            editable: true,
            sortable: true,
            synthetic: false,
            render: None,
        }
    }

    /// An accessor-less column rendered entirely by `render`
    ///
    /// Synthetic columns are read-only and do not react to header click.
    pub fn synthetic(
        key: impl Into<String>,
        header: impl Into<String>,
        render: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            editable: false,
            sortable: false,
            synthetic: true,
            render: Some(Arc::new(render)),
        }
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn with_render(mut self, render: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(render));
        self
    }
}
