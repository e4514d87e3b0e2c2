use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::common::{EntityId, HasId, Populated, UserRef};

/// Driver onboarding status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DriverStatus {
    Pending,
    Approved,
    Rejected,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Earnings {
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ratings {
    #[serde(default)]
    pub average: f64,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

/// A driver record as listed by `GET /api/admin/drivers`.
///
/// The detail endpoint returns the same document with the optional live
/// fields (`isOnline`, `earnings`, `currentLocation`, ...) filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    #[serde(rename = "_id")]
    pub id: EntityId,
    #[serde(default)]
    pub status: DriverStatus,
    #[serde(default)]
    pub user_id: Option<Populated<UserRef>>,
    #[serde(default)]
    pub vehicle_id: Option<EntityId>,
    #[serde(default)]
    pub completed_rides: Option<u32>,
    #[serde(default)]
    pub is_online: Option<bool>,
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub earnings: Option<Earnings>,
    #[serde(default)]
    pub ratings: Option<Ratings>,
    #[serde(default)]
    pub current_location: Option<GeoPoint>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl HasId for Driver {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Driver {
    pub fn user(&self) -> Option<&UserRef> {
        self.user_id.as_ref().and_then(Populated::doc)
    }

    pub fn display_name(&self) -> &str {
        self.user().map_or("Unknown", UserRef::display_name)
    }
}

/// Drivers from `items` in the given onboarding state, in list order.
///
/// The pending-review screen is this filter over a regular drivers page.
pub fn with_status<'a>(
    items: impl IntoIterator<Item = &'a Driver>,
    status: DriverStatus,
) -> impl Iterator<Item = &'a Driver> {
    items.into_iter().filter(move |d| d.status == status)
}

/// An application to become a driver (`GET /api/admin/driver-requests`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRequest {
    #[serde(rename = "_id")]
    pub id: EntityId,
    #[serde(default)]
    pub status: DriverStatus,
    #[serde(default, alias = "driverId")]
    pub user_id: Option<Populated<UserRef>>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl HasId for DriverRequest {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl DriverRequest {
    pub fn display_name(&self) -> &str {
        self.user_id
            .as_ref()
            .and_then(Populated::doc)
            .map_or("Unknown", UserRef::display_name)
    }
}
