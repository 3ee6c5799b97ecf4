//! Typed error handling for the gridset framework
//!
//! This module provides the error type hierarchy shared by the table
//! engine, the form drawer, and the HTTP layer. Clients can match
//! specific categories instead of dealing with generic `anyhow::Error`
//! values.
//!
//! # Error Categories
//!
//! - [`DatasetError`]: unknown datasets, records, or fields
//! - [`FormError`]: drawer contract violations and intent problems
//! - [`DraftError`]: draft store failures
//! - [`HandlerError`]: rejected external create/update/delete/draft calls
//! - [`ConfigError`]: configuration parsing and dataset registration
//! - [`ValidationError`]: boundary decode failures
//! - [`RequestError`]: malformed HTTP input

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The main error type for the gridset framework
#[derive(Debug)]
pub enum GridError {
    /// Dataset lookup and record/field addressing errors
    Dataset(DatasetError),

    /// Drawer/form contract errors
    Form(FormError),

    /// Draft store errors
    Draft(DraftError),

    /// External handler failures
    Handler(HandlerError),

    /// Configuration errors
    Config(ConfigError),

    /// Boundary validation errors
    Validation(ValidationError),

    /// HTTP/request errors
    Request(RequestError),

    /// Internal framework errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::Dataset(e) => write!(f, "{}", e),
            GridError::Form(e) => write!(f, "{}", e),
            GridError::Draft(e) => write!(f, "{}", e),
            GridError::Handler(e) => write!(f, "{}", e),
            GridError::Config(e) => write!(f, "{}", e),
            GridError::Validation(e) => write!(f, "{}", e),
            GridError::Request(e) => write!(f, "{}", e),
            GridError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GridError::Dataset(e) => Some(e),
            GridError::Form(e) => Some(e),
            GridError::Draft(e) => Some(e),
            GridError::Handler(e) => Some(e),
            GridError::Config(e) => Some(e),
            GridError::Validation(e) => Some(e),
            GridError::Request(e) => Some(e),
            GridError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl GridError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GridError::Dataset(e) => e.status_code(),
            GridError::Form(_) => StatusCode::BAD_REQUEST,
            GridError::Draft(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GridError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GridError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GridError::Validation(_) => StatusCode::BAD_REQUEST,
            GridError::Request(e) => e.status_code(),
            GridError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            GridError::Dataset(e) => e.error_code(),
            GridError::Form(e) => e.error_code(),
            GridError::Draft(_) => "DRAFT_STORE_ERROR",
            GridError::Handler(_) => "HANDLER_FAILED",
            GridError::Config(e) => e.error_code(),
            GridError::Validation(_) => "VALIDATION_ERROR",
            GridError::Request(e) => e.error_code(),
            GridError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            GridError::Dataset(DatasetError::UnknownRecord { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id.to_string()
                }))
            }
            GridError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for GridError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Dataset Errors
// =============================================================================

/// Errors related to dataset, record, and field addressing
#[derive(Debug)]
pub enum DatasetError {
    /// No dataset registered under this key
    UnknownDataset { key: String },

    /// Record not present in the dataset
    UnknownRecord { entity_type: String, id: Uuid },

    /// Field key outside the record's field set
    UnknownField { entity_type: String, field: String },

    /// Column key outside the dataset's column set
    UnknownColumn { dataset: String, key: String },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::UnknownDataset { key } => {
                write!(f, "Unknown dataset: {}", key)
            }
            DatasetError::UnknownRecord { entity_type, id } => {
                write!(f, "{} with id '{}' not found", entity_type, id)
            }
            DatasetError::UnknownField { entity_type, field } => {
                write!(f, "{} has no field '{}'", entity_type, field)
            }
            DatasetError::UnknownColumn { dataset, key } => {
                write!(f, "Dataset '{}' has no column '{}'", dataset, key)
            }
        }
    }
}

impl std::error::Error for DatasetError {}

impl DatasetError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DatasetError::UnknownDataset { .. } => StatusCode::NOT_FOUND,
            DatasetError::UnknownRecord { .. } => StatusCode::NOT_FOUND,
            DatasetError::UnknownField { .. } => StatusCode::BAD_REQUEST,
            DatasetError::UnknownColumn { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            DatasetError::UnknownDataset { .. } => "UNKNOWN_DATASET",
            DatasetError::UnknownRecord { .. } => "RECORD_NOT_FOUND",
            DatasetError::UnknownField { .. } => "UNKNOWN_FIELD",
            DatasetError::UnknownColumn { .. } => "UNKNOWN_COLUMN",
        }
    }
}

impl From<DatasetError> for GridError {
    fn from(err: DatasetError) -> Self {
        GridError::Dataset(err)
    }
}

// =============================================================================
// Form Errors
// =============================================================================

/// Errors related to drawer/form contracts
#[derive(Debug)]
pub enum FormError {
    /// An action was forced whose handler is absent
    ///
    /// The affordance checks (`can_draft`, `can_delete`) exist so callers
    /// can disable the action instead of triggering this.
    ContractViolation { dataset: String, action: String },

    /// A column marked non-editable received an edit attempt
    NotEditable { dataset: String, key: String },

    /// No cell edit in progress to commit or cancel
    NoActiveEdit,

    /// No delete confirmation pending
    NoPendingConfirmation,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::ContractViolation { dataset, action } => {
                write!(
                    f,
                    "Dataset '{}' has no handler for action '{}'",
                    dataset, action
                )
            }
            FormError::NotEditable { dataset, key } => {
                write!(f, "Column '{}' of dataset '{}' is not editable", key, dataset)
            }
            FormError::NoActiveEdit => {
                write!(f, "No cell edit in progress")
            }
            FormError::NoPendingConfirmation => {
                write!(f, "No delete confirmation pending")
            }
        }
    }
}

impl std::error::Error for FormError {}

impl FormError {
    pub fn error_code(&self) -> &'static str {
        match self {
            FormError::ContractViolation { .. } => "CONTRACT_VIOLATION",
            FormError::NotEditable { .. } => "COLUMN_NOT_EDITABLE",
            FormError::NoActiveEdit => "NO_ACTIVE_EDIT",
            FormError::NoPendingConfirmation => "NO_PENDING_CONFIRMATION",
        }
    }
}

impl From<FormError> for GridError {
    fn from(err: FormError) -> Self {
        GridError::Form(err)
    }
}

// =============================================================================
// Draft Errors
// =============================================================================

/// Errors related to the draft store
#[derive(Debug)]
pub enum DraftError {
    /// Failed to persist a snapshot
    SaveFailed { key: String, message: String },

    /// Failed to load a snapshot
    LoadFailed { key: String, message: String },

    /// Failed to clear a snapshot
    ClearFailed { key: String, message: String },
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftError::SaveFailed { key, message } => {
                write!(f, "Failed to save draft '{}': {}", key, message)
            }
            DraftError::LoadFailed { key, message } => {
                write!(f, "Failed to load draft '{}': {}", key, message)
            }
            DraftError::ClearFailed { key, message } => {
                write!(f, "Failed to clear draft '{}': {}", key, message)
            }
        }
    }
}

impl std::error::Error for DraftError {}

impl From<DraftError> for GridError {
    fn from(err: DraftError) -> Self {
        GridError::Draft(err)
    }
}

// =============================================================================
// Handler Errors
// =============================================================================

/// A rejected external handler operation
///
/// Carried back to the caller after the table has rolled its optimistic
/// local mutation back.
#[derive(Debug)]
pub struct HandlerError {
    pub dataset: String,
    pub operation: String,
    pub message: String,
}

impl HandlerError {
    pub fn new(
        dataset: impl Into<String>,
        operation: impl Into<String>,
        source: &anyhow::Error,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            operation: operation.into(),
            message: source.to_string(),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Handler '{}' failed for dataset '{}': {}",
            self.operation, self.dataset, self.message
        )
    }
}

impl std::error::Error for HandlerError {}

impl From<HandlerError> for GridError {
    fn from(err: HandlerError) -> Self {
        GridError::Handler(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration and dataset registration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Missing required field in configuration
    MissingField { field: String, context: String },

    /// Configuration file not found
    FileNotFound { path: String },

    /// IO error while reading configuration
    IoError { message: String },

    /// A column or field descriptor key is not in the record's field set
    UnknownKey { dataset: String, key: String },

    /// A select field resolved to an empty option list
    EmptySelectOptions { dataset: String, field: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::MissingField { field, context } => {
                write!(f, "Missing required field '{}' in {}", field, context)
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
            ConfigError::UnknownKey { dataset, key } => {
                write!(
                    f,
                    "Dataset '{}' declares key '{}' outside the record's field set",
                    dataset, key
                )
            }
            ConfigError::EmptySelectOptions { dataset, field } => {
                write!(
                    f,
                    "Select field '{}' of dataset '{}' resolved to no options",
                    field, dataset
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::UnknownKey { .. } => "UNKNOWN_KEY",
            ConfigError::EmptySelectOptions { .. } => "EMPTY_SELECT_OPTIONS",
            _ => "CONFIG_ERROR",
        }
    }
}

impl From<ConfigError> for GridError {
    fn from(err: ConfigError) -> Self {
        GridError::Config(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to boundary validation of form payloads
#[derive(Debug)]
pub enum ValidationError {
    /// Single field validation error
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Invalid JSON format
    InvalidJson { message: String },

    /// Invalid UUID format
    InvalidUuid { value: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
            ValidationError::InvalidUuid { value } => {
                write!(f, "Invalid UUID format: {}", value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for GridError {
    fn from(err: ValidationError) -> Self {
        GridError::Validation(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Invalid entity ID format
    InvalidEntityId { id: String },

    /// Invalid request body
    InvalidBody { message: String },

    /// The multipart action carried no `_method` marker
    MissingMethod,

    /// The `_method` marker named an unsupported action
    UnknownMethod { method: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidEntityId { id } => {
                write!(f, "Invalid entity ID format: '{}'", id)
            }
            RequestError::InvalidBody { message } => {
                write!(f, "Invalid request body: {}", message)
            }
            RequestError::MissingMethod => {
                write!(f, "Missing '_method' marker in form payload")
            }
            RequestError::UnknownMethod { method } => {
                write!(f, "Unknown form action method: '{}'", method)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidEntityId { .. } => StatusCode::BAD_REQUEST,
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::MissingMethod => StatusCode::BAD_REQUEST,
            RequestError::UnknownMethod { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidEntityId { .. } => "INVALID_ENTITY_ID",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::MissingMethod => "MISSING_METHOD",
            RequestError::UnknownMethod { .. } => "UNKNOWN_METHOD",
        }
    }
}

impl From<RequestError> for GridError {
    fn from(err: RequestError) -> Self {
        GridError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for GridError {
    fn from(err: std::io::Error) -> Self {
        GridError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for GridError {
    fn from(err: serde_yaml::Error) -> Self {
        GridError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<uuid::Error> for GridError {
    fn from(err: uuid::Error) -> Self {
        GridError::Validation(ValidationError::InvalidUuid {
            value: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for GridError {
    fn from(err: anyhow::Error) -> Self {
        GridError::Internal(err.to_string())
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for gridset operations
pub type GridResult<T> = Result<T, GridError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_error_display() {
        let err = DatasetError::UnknownRecord {
            entity_type: "product".to_string(),
            id: Uuid::nil(),
        };
        assert!(err.to_string().contains("product"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_dataset_error_status_codes() {
        let err = DatasetError::UnknownRecord {
            entity_type: "product".to_string(),
            id: Uuid::nil(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = DatasetError::UnknownField {
            entity_type: "product".to_string(),
            field: "nope".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_contract_violation_display() {
        let err = FormError::ContractViolation {
            dataset: "products".to_string(),
            action: "draft".to_string(),
        };
        assert!(err.to_string().contains("draft"));
        assert!(err.to_string().contains("products"));
    }

    #[test]
    fn test_grid_error_conversion() {
        let err: GridError = DatasetError::UnknownDataset {
            key: "orders".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "UNKNOWN_DATASET");
    }

    #[test]
    fn test_error_response_serialization() {
        let err = GridError::Dataset(DatasetError::UnknownRecord {
            entity_type: "product".to_string(),
            id: Uuid::nil(),
        });
        let response = err.to_response();
        assert_eq!(response.code, "RECORD_NOT_FOUND");
        assert!(response.details.is_some());
    }

    #[test]
    fn test_validation_error_multiple_fields() {
        let err = ValidationError::FieldErrors(vec![
            FieldValidationError {
                field: "name".to_string(),
                message: "required".to_string(),
            },
            FieldValidationError {
                field: "category_id".to_string(),
                message: "not a known category".to_string(),
            },
        ]);
        let display = err.to_string();
        assert!(display.contains("name"));
        assert!(display.contains("category_id"));
    }

    #[test]
    fn test_request_error_status_codes() {
        assert_eq!(
            RequestError::MissingMethod.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RequestError::UnknownMethod {
                method: "replace".to_string()
            }
            .status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_handler_error_from_anyhow() {
        let source = anyhow::anyhow!("connection refused");
        let err = HandlerError::new("products", "update", &source);
        assert!(err.to_string().contains("update"));
        assert!(err.to_string().contains("connection refused"));

        let grid: GridError = err.into();
        assert_eq!(grid.error_code(), "HANDLER_FAILED");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let grid: GridError = json_err.into();
        assert!(matches!(
            grid,
            GridError::Validation(ValidationError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_empty_select_options_code() {
        let err: GridError = ConfigError::EmptySelectOptions {
            dataset: "categories".to_string(),
            field: "category_group_id".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "EMPTY_SELECT_OPTIONS");
    }
}
