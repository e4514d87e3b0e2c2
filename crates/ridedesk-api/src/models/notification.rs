use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{EntityId, HasId, Populated, UserRef};

/// An admin inbox notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: EntityId,
    #[serde(default)]
    pub sender_id: Option<Populated<UserRef>>,
    #[serde(default)]
    pub receiver_id: Option<Populated<UserRef>>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl HasId for Notification {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Notification {
    pub fn sender_name(&self) -> &str {
        self.sender_id
            .as_ref()
            .and_then(Populated::doc)
            .map_or("System", UserRef::display_name)
    }
}

/// Number of unread notifications in a list.
pub fn unread_count<'a>(items: impl IntoIterator<Item = &'a Notification>) -> usize {
    items.into_iter().filter(|n| !n.is_read).count()
}
