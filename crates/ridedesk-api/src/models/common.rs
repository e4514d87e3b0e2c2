use std::fmt;

use serde::{Deserialize, Serialize};

// ── EntityId ─────────────────────────────────────────────────────────

/// Backend document identifier (the `_id` field).
///
/// Opaque to the client; only compared and echoed back in paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last eight characters, as shown in list tables.
    pub fn short(&self) -> &str {
        let start = self
            .0
            .char_indices()
            .rev()
            .nth(7)
            .map_or(0, |(i, _)| i);
        &self.0[start..]
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ── Populated references ─────────────────────────────────────────────

/// A reference that the backend may or may not have expanded.
///
/// Depending on the endpoint, `serviceId` arrives either as a bare id
/// string or as the referenced document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Populated<T> {
    Id(EntityId),
    Doc(T),
}

impl<T> Populated<T> {
    pub fn doc(&self) -> Option<&T> {
        match self {
            Self::Doc(doc) => Some(doc),
            Self::Id(_) => None,
        }
    }
}

impl<T: HasId> Populated<T> {
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Id(id) => id,
            Self::Doc(doc) => doc.id(),
        }
    }
}

/// Documents that carry an `_id`.
pub trait HasId {
    fn id(&self) -> &EntityId;
}

// ── Shared shapes ────────────────────────────────────────────────────

/// Minimal user document embedded in drivers, rides and notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(rename = "_id")]
    pub id: EntityId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl HasId for UserRef {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl UserRef {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("Unknown")
    }
}

/// `{success, message}` acknowledgement returned by write endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A client-side input check failed before any request was sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Reject blank required text fields.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new(field, "is required"))
    } else {
        Ok(())
    }
}

/// `{data: T}` envelope used by single-entity endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}
