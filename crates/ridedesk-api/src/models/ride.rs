use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{EntityId, HasId, Populated, UserRef};

/// Completed or in-progress trip from `GET /api/driver/trip-history`.
///
/// `status` is kept as the raw string (`requested`, `accepted`, `arrived`,
/// `started`, `completed`, `cancelled`, ...) since the backend adds states
/// without notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    #[serde(rename = "_id")]
    pub id: EntityId,
    #[serde(default)]
    pub customer_id: Option<Populated<UserRef>>,
    #[serde(default)]
    pub driver_id: Option<EntityId>,
    #[serde(default)]
    pub total_fare: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl HasId for Ride {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Ride {
    pub fn customer_name(&self) -> &str {
        self.customer_id
            .as_ref()
            .and_then(Populated::doc)
            .map_or("-", UserRef::display_name)
    }
}
