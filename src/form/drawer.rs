//! The slide-in form drawer
//!
//! Renders one record (or an empty seed for creation) as a form driven
//! by the dataset's field descriptors, and serializes user input back
//! into a [`FormPayload`] on submit. Supports create and explicit
//! draft-save submit intents, plus debounced draft autosave of the
//! in-progress value set.

use crate::core::descriptor::{FieldDescriptor, FieldKind, ResolvedField};
use crate::core::entity::{FieldSnapshot, Record};
use crate::core::error::{
    DatasetError, FormError, GridResult, HandlerError, ValidationError,
};
use crate::core::field::FieldValue;
use crate::dataset::DatasetHandlers;
use crate::form::draft::{AUTOSAVE_DEBOUNCE, DraftAutosaver, DraftKey, DraftStore};
use crate::form::payload::{FormMethod, FormPayload};
use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Which submit affordance the user pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitIntent {
    Create,
    Draft,
}

/// An attached file selection for an image field
#[derive(Debug, Clone)]
struct FileSelection {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Drawer state for one create/edit flow
pub struct DrawerForm {
    dataset_key: String,
    button_label: String,
    record_id: Option<Uuid>,
    record_name: Option<String>,
    fields: Vec<FieldDescriptor>,
    values: FieldSnapshot,
    files: IndexMap<String, FileSelection>,
    supports_draft: bool,
    open: bool,
    autosave_delay: Duration,
    store: Option<Arc<dyn DraftStore>>,
    autosaver: Option<DraftAutosaver>,
}

impl DrawerForm {
    /// Drawer bound to an empty record, for creation
    pub fn for_create(
        dataset_key: impl Into<String>,
        button_label: impl Into<String>,
        fields: Vec<FieldDescriptor>,
        supports_draft: bool,
    ) -> Self {
        let mut values = FieldSnapshot::new();
        for field in &fields {
            if field.kind != FieldKind::Image {
                values.insert(field.key.clone(), FieldValue::Null);
            }
        }

        Self {
            dataset_key: dataset_key.into(),
            button_label: button_label.into(),
            record_id: None,
            record_name: None,
            fields,
            values,
            files: IndexMap::new(),
            supports_draft,
            open: false,
            autosave_delay: AUTOSAVE_DEBOUNCE,
            store: None,
            autosaver: None,
        }
    }

    /// Drawer seeded from an existing record, for editing
    ///
    /// Image fields are never pre-populated from the record's value;
    /// selecting a new file is the only way to change them.
    pub fn for_record<T: Record>(
        dataset_key: impl Into<String>,
        button_label: impl Into<String>,
        fields: Vec<FieldDescriptor>,
        supports_draft: bool,
        record: &T,
    ) -> Self {
        let mut drawer = Self::for_create(dataset_key, button_label, fields, supports_draft);
        drawer.record_id = Some(record.id());
        drawer.record_name = Some(record.display_name().to_string());
        for field in &drawer.fields {
            if field.kind == FieldKind::Image {
                continue;
            }
            let value = record.field_value(&field.key).unwrap_or(FieldValue::Null);
            drawer.values.insert(field.key.clone(), value);
        }
        drawer
    }

    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave_delay = delay;
        self
    }

    /// The draft key this drawer is scoped to
    pub fn draft_key(&self) -> DraftKey {
        match self.record_id {
            Some(id) => DraftKey::for_record(self.dataset_key.clone(), id),
            None => DraftKey::for_new(self.dataset_key.clone()),
        }
    }

    /// Open the drawer, resuming a stored draft if one exists
    ///
    /// Draft values take precedence over the record seed, per field; the
    /// record's values remain for fields the draft never touched.
    pub async fn open(&mut self, store: Option<Arc<dyn DraftStore>>) -> GridResult<()> {
        if let Some(store) = &store {
            let key = self.draft_key();
            if let Some(draft) = store.load(&key).await? {
                for (field, value) in draft {
                    if self.values.contains_key(&field) {
                        self.values.insert(field, value);
                    }
                }
            }
            self.autosaver = Some(
                DraftAutosaver::new(store.clone(), key).with_delay(self.autosave_delay),
            );
        }
        self.store = store;
        self.open = true;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Header wording: editing when the seed has an id, creating
    /// otherwise, falling back to the caller-supplied label
    pub fn title(&self) -> String {
        match (&self.record_id, &self.record_name) {
            (Some(_), Some(name)) => format!("Edit {}", name),
            (Some(id), None) => format!("Edit {}", id),
            (None, _) => self.button_label.clone(),
        }
    }

    /// Resolve every descriptor against the current working values
    pub fn resolved_fields(&self) -> GridResult<Vec<ResolvedField>> {
        self.fields
            .iter()
            .map(|field| field.resolve(&self.dataset_key, &self.values))
            .collect()
    }

    /// The current working value for a field
    pub fn value(&self, key: &str) -> FieldValue {
        self.values.get(key).cloned().unwrap_or(FieldValue::Null)
    }

    /// Update a bound field and schedule the debounced draft autosave
    pub fn set_value(&mut self, key: &str, value: FieldValue) -> GridResult<()> {
        if !self.values.contains_key(key) {
            return Err(DatasetError::UnknownField {
                entity_type: self.dataset_key.clone(),
                field: key.to_string(),
            }
            .into());
        }
        self.values.insert(key.to_string(), value);

        if let Some(autosaver) = &mut self.autosaver {
            autosaver.schedule(self.values.clone());
        }
        Ok(())
    }

    /// Attach a file selection to an image field
    pub fn attach_file(
        &mut self,
        key: &str,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> GridResult<()> {
        let field = self.fields.iter().find(|f| f.key == key).ok_or_else(|| {
            DatasetError::UnknownField {
                entity_type: self.dataset_key.clone(),
                field: key.to_string(),
            }
        })?;

        if field.kind != FieldKind::Image {
            return Err(ValidationError::FieldError {
                field: key.to_string(),
                message: "is not a file field".to_string(),
            }
            .into());
        }

        self.files.insert(
            key.to_string(),
            FileSelection {
                filename: filename.into(),
                content_type: content_type.into(),
                bytes,
            },
        );
        Ok(())
    }

    pub fn can_draft(&self) -> bool {
        self.supports_draft
    }

    /// Serialize the current values into a tagged payload
    ///
    /// All visible and hidden fields serialize under their keys; image
    /// fields contribute a file part only when a file was selected;
    /// disabled fields are omitted, matching native form semantics.
    fn serialize(&self, intent: SubmitIntent) -> GridResult<FormPayload> {
        let mut payload = FormPayload::new();

        for field in self.resolved_fields()? {
            if field.disabled {
                continue;
            }
            if field.serializes_as_text() {
                payload.append_text(&field.key, self.value(&field.key).coerce_string());
            } else if let Some(file) = self.files.get(&field.key) {
                payload.append_file(
                    &field.key,
                    file.filename.clone(),
                    file.content_type.clone(),
                    file.bytes.clone(),
                );
            }
        }

        payload.set_method(match intent {
            SubmitIntent::Create => FormMethod::Create,
            SubmitIntent::Draft => FormMethod::Draft,
        });
        Ok(payload)
    }

    /// Submit the form with the given intent
    ///
    /// Invokes the matching handler, clears the draft snapshot, and
    /// closes the drawer on a non-draft submit. A draft submit against a
    /// dataset without draft support is a contract violation. On handler
    /// rejection the drawer stays open and the draft survives.
    pub async fn submit(
        &mut self,
        intent: SubmitIntent,
        handlers: &dyn DatasetHandlers,
    ) -> GridResult<serde_json::Value> {
        if intent == SubmitIntent::Draft && !self.supports_draft {
            return Err(FormError::ContractViolation {
                dataset: self.dataset_key.clone(),
                action: "draft".to_string(),
            }
            .into());
        }

        let payload = self.serialize(intent)?;

        let result = match intent {
            SubmitIntent::Create => handlers.create(&payload).await,
            SubmitIntent::Draft => handlers.draft(&payload).await,
        };

        let created = match result {
            Ok(value) => value,
            Err(err) => {
                let operation = match intent {
                    SubmitIntent::Create => "create",
                    SubmitIntent::Draft => "draft",
                };
                return Err(HandlerError::new(self.dataset_key.clone(), operation, &err).into());
            }
        };

        if let Some(autosaver) = &mut self.autosaver {
            autosaver.cancel();
        }
        if let Some(store) = &self.store {
            store.clear(&self.draft_key()).await?;
        }
        if intent == SubmitIntent::Create {
            self.open = false;
        }

        tracing::debug!(dataset = %self.dataset_key, intent = ?intent, "drawer submitted");
        Ok(created)
    }

    /// Close the drawer without submitting
    ///
    /// Pending autosaves are dropped and the draft snapshot is cleared;
    /// drafts do not outlive an explicit close.
    pub async fn close(&mut self) -> GridResult<()> {
        if let Some(autosaver) = &mut self.autosaver {
            autosaver.cancel();
        }
        if let Some(store) = &self.store {
            store.clear(&self.draft_key()).await?;
        }
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::SelectOption;
    use crate::dataset::handlers::testing::RecordingHandlers;
    use crate::form::draft::InMemoryDraftStore;
    use crate::form::payload::METHOD_FIELD;

    fn blog_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("title", "Title", FieldKind::Text),
            FieldDescriptor::new("body", "Body", FieldKind::LongText),
            FieldDescriptor::new("photo_url", "Image", FieldKind::Image),
        ]
    }

    fn product_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("name", "Name", FieldKind::Text),
            FieldDescriptor::new("description", "Description", FieldKind::Text),
            FieldDescriptor::new("image_url", "Image", FieldKind::Image),
            FieldDescriptor::new("category_id", "Category", FieldKind::Select)
                .with_options(vec![SelectOption::new("c1", "Skincare")]),
        ]
    }

    #[tokio::test]
    async fn test_create_submit_serializes_all_fields() {
        let handlers = RecordingHandlers::new();
        let mut drawer =
            DrawerForm::for_create("products", "New Product", product_fields(), false);
        drawer.open(None).await.unwrap();

        drawer.set_value("name", "Lotion".into()).unwrap();
        drawer.set_value("description", "".into()).unwrap();
        drawer.set_value("category_id", "c1".into()).unwrap();
        drawer
            .attach_file("image_url", "lotion.png", "image/png", vec![0xAB])
            .unwrap();

        drawer.submit(SubmitIntent::Create, &handlers).await.unwrap();

        assert!(!drawer.is_open());
        assert_eq!(handlers.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_payload_contains_files_and_intent_marker() {
        let mut drawer =
            DrawerForm::for_create("products", "New Product", product_fields(), false);
        drawer.open(None).await.unwrap();
        drawer.set_value("name", "Lotion".into()).unwrap();
        drawer
            .attach_file("image_url", "lotion.png", "image/png", vec![1, 2])
            .unwrap();

        let payload = drawer.serialize(SubmitIntent::Create).unwrap();
        assert_eq!(payload.get("name"), Some("Lotion"));
        assert_eq!(payload.get("description"), Some(""));
        assert_eq!(payload.get("category_id"), Some(""));
        assert!(payload.file("image_url").is_some());
        assert_eq!(payload.get(METHOD_FIELD), Some("create"));
    }

    #[tokio::test]
    async fn test_hidden_fields_serialize_without_being_visible() {
        let fields = vec![
            FieldDescriptor::new("id", "Id", FieldKind::Hidden),
            FieldDescriptor::new("name", "Name", FieldKind::Text),
        ];
        let mut drawer = DrawerForm::for_create("products", "New Product", fields, false);
        drawer.open(None).await.unwrap();
        drawer.set_value("id", "abc-123".into()).unwrap();
        drawer.set_value("name", "Lotion".into()).unwrap();

        let resolved = drawer.resolved_fields().unwrap();
        assert!(!resolved[0].visible());

        let payload = drawer.serialize(SubmitIntent::Create).unwrap();
        assert_eq!(payload.get("id"), Some("abc-123"));
        assert_eq!(payload.get("name"), Some("Lotion"));
    }

    #[tokio::test]
    async fn test_image_field_without_selection_is_omitted() {
        let mut drawer = DrawerForm::for_create("blog_posts", "New Post", blog_fields(), true);
        drawer.open(None).await.unwrap();

        let payload = drawer.serialize(SubmitIntent::Draft).unwrap();
        assert!(!payload.contains_key("photo_url"));
        assert_eq!(payload.get(METHOD_FIELD), Some("draft"));
    }

    #[tokio::test]
    async fn test_draft_without_support_is_contract_violation() {
        let handlers = RecordingHandlers::new();
        let mut drawer =
            DrawerForm::for_create("products", "New Product", product_fields(), false);
        drawer.open(None).await.unwrap();

        assert!(!drawer.can_draft());
        let err = drawer
            .submit(SubmitIntent::Draft, &handlers)
            .await
            .expect_err("draft must be rejected");
        assert_eq!(err.error_code(), "CONTRACT_VIOLATION");
    }

    #[tokio::test]
    async fn test_draft_submit_keeps_drawer_open_and_clears_snapshot() {
        let handlers = RecordingHandlers::with_draft();
        let store: Arc<dyn DraftStore> = Arc::new(InMemoryDraftStore::new());
        let mut drawer = DrawerForm::for_create("blog_posts", "New Post", blog_fields(), true);
        drawer.open(Some(store.clone())).await.unwrap();

        drawer.set_value("title", "Half-written".into()).unwrap();
        drawer.submit(SubmitIntent::Draft, &handlers).await.unwrap();

        assert!(drawer.is_open());
        assert_eq!(handlers.drafted.lock().unwrap().len(), 1);
        assert!(store.load(&drawer.draft_key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_resumes_draft_over_record_seed() {
        let store: Arc<dyn DraftStore> = Arc::new(InMemoryDraftStore::new());
        let key = DraftKey::for_new("blog_posts");
        let mut saved = FieldSnapshot::new();
        saved.insert("title".to_string(), FieldValue::String("Resumed".into()));
        store.save(&key, &saved).await.unwrap();

        let mut drawer = DrawerForm::for_create("blog_posts", "New Post", blog_fields(), true);
        drawer.open(Some(store)).await.unwrap();

        assert_eq!(drawer.value("title"), FieldValue::String("Resumed".into()));
        // Fields the draft never touched keep their seed
        assert_eq!(drawer.value("body"), FieldValue::Null);
    }

    #[tokio::test]
    async fn test_close_clears_draft() {
        let store: Arc<dyn DraftStore> = Arc::new(InMemoryDraftStore::new());
        let mut drawer = DrawerForm::for_create("blog_posts", "New Post", blog_fields(), true);
        drawer.open(Some(store.clone())).await.unwrap();

        drawer.set_value("title", "Abandoned".into()).unwrap();
        let mut autosaver = DraftAutosaver::new(store.clone(), drawer.draft_key());
        autosaver.flush(&FieldSnapshot::new()).await.unwrap();

        drawer.close().await.unwrap();
        assert!(!drawer.is_open());
        assert!(store.load(&drawer.draft_key()).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_value_schedules_debounced_autosave() {
        let store: Arc<dyn DraftStore> = Arc::new(InMemoryDraftStore::new());
        let mut drawer = DrawerForm::for_create("blog_posts", "New Post", blog_fields(), true);
        drawer.open(Some(store.clone())).await.unwrap();

        drawer.set_value("title", "v1".into()).unwrap();
        drawer.set_value("title", "v2".into()).unwrap();

        tokio::time::sleep(AUTOSAVE_DEBOUNCE * 2).await;
        tokio::task::yield_now().await;

        let draft = store.load(&drawer.draft_key()).await.unwrap().unwrap();
        assert_eq!(draft["title"], FieldValue::String("v2".into()));
    }

    #[tokio::test]
    async fn test_title_wording() {
        let drawer = DrawerForm::for_create("products", "New Product", product_fields(), false);
        assert_eq!(drawer.title(), "New Product");
    }

    #[tokio::test]
    async fn test_handler_rejection_keeps_drawer_open() {
        let handlers = RecordingHandlers::new();
        handlers.set_failing(true);
        let mut drawer =
            DrawerForm::for_create("products", "New Product", product_fields(), false);
        drawer.open(None).await.unwrap();

        let err = drawer
            .submit(SubmitIntent::Create, &handlers)
            .await
            .expect_err("handler rejected");
        assert_eq!(err.error_code(), "HANDLER_FAILED");
        assert!(drawer.is_open());
    }

    #[tokio::test]
    async fn test_unknown_field_set_value_is_rejected() {
        let mut drawer =
            DrawerForm::for_create("products", "New Product", product_fields(), false);
        drawer.open(None).await.unwrap();

        assert!(drawer.set_value("price", "9.99".into()).is_err());
        assert!(drawer.attach_file("name", "x.png", "image/png", vec![]).is_err());
    }
}
