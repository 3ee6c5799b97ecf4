//! Declarative field descriptors driving the form drawer
//!
//! A dataset supplies an ordered list of [`FieldDescriptor`]s; the drawer
//! resolves each descriptor against the current record/draft snapshot and
//! renders the result. Options, disabled state, and placeholder can be
//! given statically or as functions of the snapshot; function forms are
//! re-evaluated on every resolution and never cached.

use crate::core::entity::FieldSnapshot;
use crate::core::error::{ConfigError, GridResult};
use crate::core::field::SelectOption;
use std::fmt;
use std::sync::Arc;

/// How a form field renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text input
    Text,
    /// Multi-line text input
    LongText,
    /// Dropdown bound to resolved options
    Select,
    /// Date-typed input
    Date,
    /// File-selection input; never pre-populated from an existing value
    Image,
    /// Non-visible input carrying the current value under its key
    Hidden,
}

/// Select options, static or derived from the current snapshot
#[derive(Clone)]
pub enum OptionsSource {
    None,
    Static(Vec<SelectOption>),
    Derived(Arc<dyn Fn(&FieldSnapshot) -> Vec<SelectOption> + Send + Sync>),
}

/// Disabled state, static or derived from the current snapshot
#[derive(Clone)]
pub enum BoolSource {
    Static(bool),
    Derived(Arc<dyn Fn(&FieldSnapshot) -> bool + Send + Sync>),
}

/// Placeholder text, static or derived from the current snapshot
#[derive(Clone)]
pub enum TextSource {
    None,
    Static(String),
    Derived(Arc<dyn Fn(&FieldSnapshot) -> String + Send + Sync>),
}

/// Declarative spec of how one record field renders as a form control
#[derive(Clone)]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub options: OptionsSource,
    pub disabled: BoolSource,
    pub placeholder: TextSource,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            options: OptionsSource::None,
            disabled: BoolSource::Static(false),
            placeholder: TextSource::None,
        }
    }

    /// Bind a static option list
    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = OptionsSource::Static(options);
        self
    }

    /// Bind options derived from the current snapshot
    pub fn with_derived_options(
        mut self,
        f: impl Fn(&FieldSnapshot) -> Vec<SelectOption> + Send + Sync + 'static,
    ) -> Self {
        self.options = OptionsSource::Derived(Arc::new(f));
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = BoolSource::Static(disabled);
        self
    }

    pub fn disabled_when(
        mut self,
        f: impl Fn(&FieldSnapshot) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.disabled = BoolSource::Derived(Arc::new(f));
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = TextSource::Static(placeholder.into());
        self
    }

    pub fn with_derived_placeholder(
        mut self,
        f: impl Fn(&FieldSnapshot) -> String + Send + Sync + 'static,
    ) -> Self {
        self.placeholder = TextSource::Derived(Arc::new(f));
        self
    }

    /// Resolve the descriptor against the current record/draft snapshot
    ///
    /// Derived sources are evaluated here, once per resolution. A
    /// `Select` field resolving to an empty option list is a
    /// configuration error rather than a silently dropped control.
    pub fn resolve(&self, dataset: &str, snapshot: &FieldSnapshot) -> GridResult<ResolvedField> {
        let options = match &self.options {
            OptionsSource::None => Vec::new(),
            OptionsSource::Static(opts) => opts.clone(),
            OptionsSource::Derived(f) => f(snapshot),
        };

        if self.kind == FieldKind::Select && options.is_empty() {
            return Err(ConfigError::EmptySelectOptions {
                dataset: dataset.to_string(),
                field: self.key.clone(),
            }
            .into());
        }

        let disabled = match &self.disabled {
            BoolSource::Static(b) => *b,
            BoolSource::Derived(f) => f(snapshot),
        };

        let placeholder = match &self.placeholder {
            TextSource::None => None,
            TextSource::Static(s) => Some(s.clone()),
            TextSource::Derived(f) => Some(f(snapshot)),
        };

        Ok(ResolvedField {
            key: self.key.clone(),
            label: self.label.clone(),
            kind: self.kind,
            options,
            disabled,
            placeholder,
        })
    }
}

/// A descriptor with every source evaluated against one snapshot
#[derive(Debug, Clone)]
pub struct ResolvedField {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub options: Vec<SelectOption>,
    pub disabled: bool,
    pub placeholder: Option<String>,
}

impl ResolvedField {
    /// Whether the field participates in form serialization
    ///
    /// Image fields carry their value as a file part instead of a text
    /// value; everything else (hidden included) serializes under its key.
    pub fn serializes_as_text(&self) -> bool {
        self.kind != FieldKind::Image
    }

    /// Whether the field is visible to the user
    pub fn visible(&self) -> bool {
        self.kind != FieldKind::Hidden
    }
}

/// Dataset-level field descriptor source
///
/// Static list, or a function of the full current record set (used e.g.
/// to build select options from a sibling dataset). The function form is
/// re-evaluated whenever the record set changes.
#[derive(Clone)]
pub enum FieldsSource<T> {
    Static(Vec<FieldDescriptor>),
    Derived(Arc<dyn Fn(&[T]) -> Vec<FieldDescriptor> + Send + Sync>),
}

impl<T> FieldsSource<T> {
    pub fn resolve(&self, records: &[T]) -> Vec<FieldDescriptor> {
        match self {
            FieldsSource::Static(fields) => fields.clone(),
            FieldsSource::Derived(f) => f(records),
        }
    }
}

impl<T> From<Vec<FieldDescriptor>> for FieldsSource<T> {
    fn from(fields: Vec<FieldDescriptor>) -> Self {
        FieldsSource::Static(fields)
    }
}
