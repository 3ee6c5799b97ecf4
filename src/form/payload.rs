//! Transport-agnostic form payloads
//!
//! The drawer serializes its field values into a `FormPayload`, the
//! in-process equivalent of a multipart form: ordered key/value entries,
//! repeatable keys, text and binary file parts, and an explicit action
//! marker under the `_method` key.

use crate::core::error::{RequestError, ValidationError};
use serde::Serialize;
use std::fmt;

/// Key carrying the action marker
pub const METHOD_FIELD: &str = "_method";

/// The action a form payload requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Create,
    Draft,
    Update,
    Delete,
}

impl FormMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormMethod::Create => "create",
            FormMethod::Draft => "draft",
            FormMethod::Update => "update",
            FormMethod::Delete => "delete",
        }
    }

    pub fn parse(marker: &str) -> Result<Self, RequestError> {
        match marker {
            "create" => Ok(FormMethod::Create),
            "draft" => Ok(FormMethod::Draft),
            "update" => Ok(FormMethod::Update),
            "delete" => Ok(FormMethod::Delete),
            other => Err(RequestError::UnknownMethod {
                method: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for FormMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One payload entry: a text value or a binary file part
#[derive(Clone, Serialize)]
#[serde(untagged)]
pub enum PayloadPart {
    Text(String),
    File {
        filename: String,
        content_type: String,
        #[serde(skip)]
        bytes: Vec<u8>,
    },
}

impl fmt::Debug for PayloadPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadPart::Text(s) => f.debug_tuple("Text").field(s).finish(),
            PayloadPart::File {
                filename, bytes, ..
            } => f
                .debug_struct("File")
                .field("filename", filename)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// Ordered, repeatable key/value form payload
#[derive(Debug, Clone, Default)]
pub struct FormPayload {
    entries: Vec<(String, PayloadPart)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), PayloadPart::Text(value.into())));
    }

    pub fn append_file(
        &mut self,
        key: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) {
        self.entries.push((
            key.into(),
            PayloadPart::File {
                filename: filename.into(),
                content_type: content_type.into(),
                bytes,
            },
        ));
    }

    /// First text value under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find_map(|(k, part)| match part {
            PayloadPart::Text(s) if k == key => Some(s.as_str()),
            _ => None,
        })
    }

    /// All text values under `key`, in order
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|(k, part)| match part {
                PayloadPart::Text(s) if k == key => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    /// First file part under `key`
    pub fn file(&self, key: &str) -> Option<(&str, &str, &[u8])> {
        self.entries.iter().find_map(|(k, part)| match part {
            PayloadPart::File {
                filename,
                content_type,
                bytes,
            } if k == key => Some((filename.as_str(), content_type.as_str(), bytes.as_slice())),
            _ => None,
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PayloadPart)> {
        self.entries.iter().map(|(k, part)| (k.as_str(), part))
    }

    /// Tag the payload with its action marker, replacing any prior one
    pub fn set_method(&mut self, method: FormMethod) {
        self.entries.retain(|(k, _)| k != METHOD_FIELD);
        self.append_text(METHOD_FIELD, method.as_str());
    }

    /// The payload's action marker
    pub fn method(&self) -> Result<FormMethod, RequestError> {
        match self.get(METHOD_FIELD) {
            Some(marker) => FormMethod::parse(marker),
            None => Err(RequestError::MissingMethod),
        }
    }

    /// Parse all `ids` entries as UUIDs
    pub fn ids(&self) -> Result<Vec<uuid::Uuid>, ValidationError> {
        self.get_all("ids")
            .into_iter()
            .map(|raw| {
                uuid::Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidUuid {
                    value: raw.to_string(),
                })
            })
            .collect()
    }
}
