//! Per-dataset HTTP routes
//!
//! Each dataset is exposed as a paginated list endpoint plus one
//! multipart form-action endpoint dispatching on the `_method` marker,
//! the same surface the admin pages submit to. Successful mutations
//! publish a [`CatalogEvent`] so table shells can refresh.

use crate::core::entity::Record;
use crate::core::error::{FormError, GridError, HandlerError, RequestError};
use crate::core::events::{CatalogEvent, EventBus};
use crate::core::field::FieldValue;
use crate::core::query::{PaginatedResponse, PaginationMeta, QueryParams, SortDirection};
use crate::dataset::DatasetHandlers;
use crate::form::payload::{FormMethod, FormPayload};
use crate::storage::MemoryStore;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

/// Shared state for one dataset's routes
#[derive(Clone)]
pub struct DatasetRouteState<T: Record> {
    pub dataset_key: String,
    pub plural: String,
    pub store: MemoryStore<T>,
    pub handlers: Arc<dyn DatasetHandlers>,
    pub events: EventBus,
}

impl<T: Record> DatasetRouteState<T> {
    pub fn new(
        dataset_key: impl Into<String>,
        plural: impl Into<String>,
        store: MemoryStore<T>,
        handlers: Arc<dyn DatasetHandlers>,
        events: EventBus,
    ) -> Self {
        Self {
            dataset_key: dataset_key.into(),
            plural: plural.into(),
            store,
            handlers,
            events,
        }
    }
}

/// Build the list + form-action routes for one dataset
pub fn dataset_routes<T: Record + DeserializeOwned>(state: DatasetRouteState<T>) -> Router {
    let path = format!("/admin/{}", state.plural);
    Router::new()
        .route(&path, get(list_records::<T>).post(form_action::<T>))
        .with_state(state)
}

/// GET /admin/{plural}: paginated, sortable, filterable list
async fn list_records<T: Record + DeserializeOwned>(
    State(state): State<DatasetRouteState<T>>,
    Query(params): Query<QueryParams>,
) -> Result<Json<PaginatedResponse<T>>, GridError> {
    let mut rows = state.store.list().map_err(GridError::from)?;

    if let Some(term) = &params.filter {
        let needle = term.to_lowercase();
        rows.retain(|row| {
            row.snapshot()
                .values()
                .any(|v| v.coerce_string().to_lowercase().contains(&needle))
        });
    }

    if let Some(spec) = params.sort_spec() {
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

    let page = params.page();
    let limit = params.limit();
    let total = rows.len();
    let data: Vec<T> = rows
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    Ok(Json(PaginatedResponse {
        data,
        pagination: PaginationMeta::new(page, limit, total),
    }))
}

/// POST /admin/{plural}: multipart form action
///
/// The `_method` marker selects the mutation: create, draft, update
/// (batched full records under `updated_items`), or delete (repeated
/// `ids` entries).
async fn form_action<T: Record + DeserializeOwned>(
    State(state): State<DatasetRouteState<T>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), GridError> {
    let payload = payload_from_multipart(multipart).await?;
    let method = payload.method()?;

    match method {
        FormMethod::Create => {
            let created = state
                .handlers
                .create(&payload)
                .await
                .map_err(|e| handler_failure(&state.dataset_key, "create", e))?;
            publish_created(&state.events, &state.dataset_key, &created);
            Ok((StatusCode::CREATED, Json(created)))
        }
        FormMethod::Draft => {
            if !state.handlers.supports_draft() {
                return Err(FormError::ContractViolation {
                    dataset: state.dataset_key.clone(),
                    action: "draft".to_string(),
                }
                .into());
            }
            let created = state
                .handlers
                .draft(&payload)
                .await
                .map_err(|e| handler_failure(&state.dataset_key, "draft", e))?;
            publish_created(&state.events, &state.dataset_key, &created);
            Ok((StatusCode::CREATED, Json(created)))
        }
        FormMethod::Update => {
            let raw = payload.get("updated_items").ok_or_else(|| {
                GridError::Request(RequestError::InvalidBody {
                    message: "missing 'updated_items'".to_string(),
                })
            })?;
            let records: Vec<Value> = serde_json::from_str(raw)?;
            let record_ids = extract_ids(&records);

            state
                .handlers
                .update(records)
                .await
                .map_err(|e| handler_failure(&state.dataset_key, "update", e))?;

            state.events.publish(CatalogEvent::Updated {
                dataset: state.dataset_key.clone(),
                record_ids,
            });
            Ok((StatusCode::OK, Json(json!({ "success": true }))))
        }
        FormMethod::Delete => {
            let ids = payload.ids().map_err(GridError::Validation)?;
            if ids.is_empty() {
                return Err(RequestError::InvalidBody {
                    message: "no ids provided".to_string(),
                }
                .into());
            }

            state
                .handlers
                .delete(&ids)
                .await
                .map_err(|e| handler_failure(&state.dataset_key, "delete", e))?;

            state.events.publish(CatalogEvent::Deleted {
                dataset: state.dataset_key.clone(),
                record_ids: ids,
            });
            Ok((StatusCode::OK, Json(json!({ "success": true }))))
        }
    }
}

/// Map a rejected handler call to a response error
///
/// Typed errors the handler raised itself (boundary validation, config)
/// pass through with their own status; anything else becomes a
/// HANDLER_FAILED envelope.
fn handler_failure(dataset: &str, operation: &str, err: anyhow::Error) -> GridError {
    match err.downcast::<GridError>() {
        Ok(grid) => grid,
        Err(err) => HandlerError::new(dataset, operation, &err).into(),
    }
}

fn publish_created(events: &EventBus, dataset: &str, created: &Value) {
    let record_id = created
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::nil);

    events.publish(CatalogEvent::Created {
        dataset: dataset.to_string(),
        record_id,
        data: created.clone(),
    });
}

fn extract_ids(records: &[Value]) -> Vec<Uuid> {
    records
        .iter()
        .filter_map(|r| r.get("id"))
        .filter_map(Value::as_str)
        .filter_map(|s| Uuid::parse_str(s).ok())
        .collect()
}

/// Decode a multipart request into a transport-agnostic payload
pub async fn payload_from_multipart(mut multipart: Multipart) -> Result<FormPayload, GridError> {
    let mut payload = FormPayload::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        GridError::Request(RequestError::InvalidBody {
            message: e.to_string(),
        })
    })? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    GridError::Request(RequestError::InvalidBody {
                        message: e.to_string(),
                    })
                })?;
                payload.append_file(name, filename, content_type, bytes.to_vec());
            }
            None => {
                let text = field.text().await.map_err(|e| {
                    GridError::Request(RequestError::InvalidBody {
                        message: e.to_string(),
                    })
                })?;
                payload.append_text(name, text);
            }
        }
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_ids_skips_malformed_entries() {
        let id = Uuid::new_v4();
        let records = vec![
            json!({"id": id.to_string(), "name": "a"}),
            json!({"name": "missing id"}),
            json!({"id": "garbage"}),
        ];

        assert_eq!(extract_ids(&records), vec![id]);
    }

    #[test]
    fn test_publish_created_tolerates_missing_id() {
        let events = EventBus::new(4);
        // No subscribers and no id; must not panic
        publish_created(&events, "products", &json!({"name": "Lotion"}));
    }
}
