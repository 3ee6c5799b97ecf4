//! Integration tests for the table engine's state guarantees:
//! dataset switching, the pending-edit buffer, batched save merging,
//! reorder semantics, and descriptor re-resolution.

use gridset::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ── A small record type with a string-typed category, matching the
// shape the dropdown scenario in the product table exercises ──────────

#[derive(Clone, Debug, Serialize)]
struct Item {
    id: Uuid,
    name: String,
    category_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Item {
    fn new(name: &str, category_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category_id: category_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl_entity_base!(Item, "item", "items");

impl Record for Item {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn field_keys() -> &'static [&'static str] {
        &["id", "name", "category_id"]
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "category_id" => Some(self.category_id.clone().into()),
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), GridError> {
        match field {
            "name" => self.name = value.coerce_string(),
            "category_id" => self.category_id = value.coerce_string(),
            _ => {
                return Err(gridset::core::entity::unknown_field::<Self>(field));
            }
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Clone, Default)]
struct NoopHandlers;

#[async_trait]
impl DatasetHandlers for NoopHandlers {
    async fn create(&self, _payload: &FormPayload) -> Result<serde_json::Value> {
        Ok(serde_json::json!({}))
    }

    async fn update(&self, _records: Vec<serde_json::Value>) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _ids: &[Uuid]) -> Result<()> {
        Ok(())
    }
}

fn item_dataset(records: Vec<Item>) -> Dataset<Item> {
    Dataset::new("items", "Item", "New Item", Arc::new(NoopHandlers))
        .with_records(records)
        .with_columns(vec![
            ColumnDescriptor::new("name", "Name"),
            ColumnDescriptor::new("category_id", "Category"),
        ])
        .with_fields(vec![FieldDescriptor::new("name", "Name", FieldKind::Text)])
        .with_dropdown_options(
            "category_id",
            vec![
                SelectOption::new("c1", "Skincare"),
                SelectOption::new("c2", "Haircare"),
            ],
        )
}

// ── Property 1: no state leaks across dataset switches ───────────────

#[test]
fn switching_datasets_and_back_restores_clean_state() {
    let mut session = TableSession::new();
    session.add_view(TableView::new(item_dataset(vec![Item::new("Soap", "c1")])).unwrap());

    let other = Dataset::new("others", "Other", "New Other", Arc::new(NoopHandlers))
        .with_columns(vec![ColumnDescriptor::new("name", "Name")]);
    session.add_view(TableView::<Item>::new(other).unwrap());

    {
        let view = session.view_mut::<Item>("items").unwrap();
        let id = view.order()[0];
        view.toggle_row_selected(id);
        view.toggle_sort("name");
        view.set_filter(Some("soap".to_string()));
        view.set_page(2);
        view.begin_edit(id, "name").unwrap();
        view.commit_edit("Suds".into()).unwrap();
        assert!(view.has_pending_edits());
    }

    session.activate("others").unwrap();
    session.activate("items").unwrap();

    let view = session.view::<Item>("items").unwrap();
    assert_eq!(view.selection_len(), 0);
    assert!(!view.has_pending_edits());
    assert!(view.sort().is_none());
    assert_eq!(view.page(), 1);
}

// ── Property 2: same-value edits leave no trace; changed edits leave
// exactly one overwritable entry per (record, field) ──────────────────

#[test]
fn edit_buffer_holds_one_entry_per_cell() {
    let mut view = TableView::new(item_dataset(vec![Item::new("Soap", "c1")])).unwrap();
    let id = view.order()[0];

    view.begin_edit(id, "name").unwrap();
    assert_eq!(view.commit_edit("Soap".into()).unwrap(), EditOutcome::Unchanged);
    assert!(!view.has_pending_edits());

    view.begin_edit(id, "name").unwrap();
    view.commit_edit("Lotion".into()).unwrap();
    view.begin_edit(id, "name").unwrap();
    view.commit_edit("Balm".into()).unwrap();

    assert_eq!(view.pending_edit_count(), 1);
    assert_eq!(
        view.pending_value(&id, "name"),
        Some(&FieldValue::String("Balm".into()))
    );
}

// ── Property 3: batched save merges only buffered fields ─────────────

#[derive(Clone, Default)]
struct CapturingUpdate {
    batches: Arc<std::sync::Mutex<Vec<Vec<serde_json::Value>>>>,
}

#[async_trait]
impl DatasetHandlers for CapturingUpdate {
    async fn create(&self, _payload: &FormPayload) -> Result<serde_json::Value> {
        Ok(serde_json::json!({}))
    }

    async fn update(&self, records: Vec<serde_json::Value>) -> Result<()> {
        self.batches.lock().unwrap().push(records);
        Ok(())
    }

    async fn delete(&self, _ids: &[Uuid]) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn batched_save_overwrites_only_buffered_fields() {
    let handlers = CapturingUpdate::default();
    let original = Item::new("Soap", "c1");
    let dataset = Dataset::new("items", "Item", "New Item", Arc::new(handlers.clone()))
        .with_records(vec![original.clone()])
        .with_columns(vec![
            ColumnDescriptor::new("name", "Name"),
            ColumnDescriptor::new("category_id", "Category"),
        ]);
    let mut view = TableView::new(dataset).unwrap();

    view.begin_edit(original.id, "name").unwrap();
    view.commit_edit("Lotion".into()).unwrap();
    view.save_pending().await.unwrap();

    let batches = handlers.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);

    let sent = &batches[0][0];
    assert_eq!(sent["name"], "Lotion");
    // Untouched fields are byte-identical to the pre-edit record
    assert_eq!(sent["category_id"], original.category_id);
    assert_eq!(sent["id"], original.id.to_string());
    assert_eq!(
        sent["created_at"],
        serde_json::to_value(&original).unwrap()["created_at"]
    );
    assert_eq!(
        sent["updated_at"],
        serde_json::to_value(&original).unwrap()["updated_at"]
    );
}

// ── Property 4: reorder moves by identifier and shifts the span ──────

#[test]
fn reorder_shifts_intervening_rows_by_one() {
    let records: Vec<Item> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|n| Item::new(n, "c1"))
        .collect();
    let mut view = TableView::new(item_dataset(records)).unwrap();
    let ids = view.order();

    // Move E up to B's slot
    assert!(view.reorder(ids[4], ids[1]));
    assert_eq!(view.order(), vec![ids[0], ids[4], ids[1], ids[2], ids[3]]);

    // Self-drop is a no-op
    assert!(!view.reorder(ids[0], ids[0]));
    assert_eq!(view.order(), vec![ids[0], ids[4], ids[1], ids[2], ids[3]]);
}

// ── Property 5: function-valued sources re-evaluate per resolution ───

#[test]
fn derived_field_sources_are_never_cached() {
    let evaluations = Arc::new(AtomicUsize::new(0));
    let counter = evaluations.clone();

    let field = FieldDescriptor::new("category_id", "Category", FieldKind::Select)
        .with_derived_options(move |snapshot| {
            counter.fetch_add(1, Ordering::SeqCst);
            match snapshot.get("name").and_then(|v| v.as_str()) {
                Some("Soap") => vec![SelectOption::new("c1", "Skincare")],
                _ => vec![SelectOption::new("c2", "Haircare")],
            }
        });

    let mut soap = FieldSnapshot::new();
    soap.insert("name".to_string(), "Soap".into());
    let mut other = FieldSnapshot::new();
    other.insert("name".to_string(), "Towel".into());

    assert_eq!(field.resolve("items", &soap).unwrap().options[0].value, "c1");
    assert_eq!(field.resolve("items", &other).unwrap().options[0].value, "c2");
    assert_eq!(field.resolve("items", &soap).unwrap().options[0].value, "c1");
    assert_eq!(evaluations.load(Ordering::SeqCst), 3);
}

#[test]
fn derived_dataset_fields_follow_the_record_set() {
    let source: FieldsSource<Item> = FieldsSource::Derived(Arc::new(|records: &[Item]| {
        vec![
            FieldDescriptor::new("name", "Name", FieldKind::Text),
            FieldDescriptor::new("category_id", "Category", FieldKind::Select).with_options(
                records
                    .iter()
                    .map(|r| SelectOption::new(r.category_id.clone(), r.name.clone()))
                    .collect(),
            ),
        ]
    }));

    let one = source.resolve(&[Item::new("Soap", "c1")]);
    let two = source.resolve(&[Item::new("Soap", "c1"), Item::new("Shampoo", "c2")]);

    let options_of = |fields: &[FieldDescriptor]| match &fields[1].options {
        gridset::core::descriptor::OptionsSource::Static(opts) => opts.len(),
        _ => panic!("expected static options"),
    };
    assert_eq!(options_of(&one), 1);
    assert_eq!(options_of(&two), 2);
}

// ── Property 6: the dropdown cell scenario, end to end ───────────────

#[test]
fn dropdown_cell_edit_updates_display_and_buffer() {
    let mut view = TableView::new(item_dataset(vec![Item::new("Soap", "c1")])).unwrap();
    let id = view.order()[0];

    // Clicking the category cell yields a select pre-set to the current
    // value, whose label is "Skincare"
    let editor = view.begin_edit(id, "category_id").unwrap();
    match &editor {
        CellEditor::Select { options, seed } => {
            assert_eq!(seed, "c1");
            let current = options.iter().find(|o| o.value == *seed).unwrap();
            assert_eq!(current.label, "Skincare");
        }
        other => panic!("expected select editor, got {:?}", other),
    }

    // Choosing Haircare and blurring updates the visible text and adds
    // exactly the category delta to the buffer
    view.commit_edit("c2".into()).unwrap();
    let row = view.row(&id).unwrap().clone();
    assert_eq!(view.display_value(&row, "category_id"), "Haircare");
    assert_eq!(row.name, "Soap");
    assert_eq!(
        view.pending_value(&id, "category_id"),
        Some(&FieldValue::String("c2".into()))
    );
    assert!(view.pending_value(&id, "name").is_none());
}

// ── Registration-time key validation ─────────────────────────────────

#[test]
fn dataset_with_unknown_keys_is_rejected() {
    let bad_column = Dataset::<Item>::new("items", "Item", "New Item", Arc::new(NoopHandlers))
        .with_columns(vec![ColumnDescriptor::new("price", "Price")]);
    let err = TableView::new(bad_column).expect_err("unknown column key");
    assert_eq!(err.error_code(), "UNKNOWN_KEY");

    let bad_field = Dataset::<Item>::new("items", "Item", "New Item", Arc::new(NoopHandlers))
        .with_fields(vec![FieldDescriptor::new("price", "Price", FieldKind::Text)]);
    assert!(TableView::new(bad_field).is_err());
}

// ── Selection bulk flows against the catalog types ───────────────────

#[tokio::test]
async fn catalog_bulk_delete_removes_exactly_the_selection() {
    let stores = CatalogStores::new();
    let group = CategoryGroup::new("Skincare".to_string(), Affiliation::Product);
    stores.groups.add(group.clone()).unwrap();
    for name in ["Moisturizers", "Cleansers", "Serums"] {
        stores
            .categories
            .add(Category::new(name.to_string(), group.id))
            .unwrap();
    }

    let mut session = categories_session(&stores).unwrap();
    let view = session.view_mut::<Category>("category").unwrap();
    let ids = view.order();

    view.toggle_row_selected(ids[0]);
    view.toggle_row_selected(ids[2]);
    view.request_delete().unwrap();
    let deleted = view.confirm_delete().await.unwrap();

    assert_eq!(deleted.len(), 2);
    assert_eq!(view.order(), vec![ids[1]]);
    // The backing store saw the same deletion
    assert_eq!(stores.categories.count().unwrap(), 1);
    assert_eq!(
        stores.categories.list().unwrap()[0].id,
        ids[1]
    );
}
