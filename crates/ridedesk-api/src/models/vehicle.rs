use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::common::{EntityId, HasId, Populated, UserRef, ValidationError, require};

/// Service summary embedded in a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRef {
    #[serde(rename = "_id")]
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
}

impl HasId for ServiceRef {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// Driver summary embedded in a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRef {
    #[serde(rename = "_id")]
    pub id: EntityId,
    #[serde(default)]
    pub user_id: Option<Populated<UserRef>>,
}

impl HasId for DriverRef {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// A fleet vehicle ("taxi").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(rename = "_id")]
    pub id: EntityId,
    #[serde(default)]
    pub taxi_name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub plate_number: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub service_id: Option<Populated<ServiceRef>>,
    #[serde(default)]
    pub driver_id: Option<Populated<DriverRef>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl HasId for Vehicle {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Vehicle {
    pub fn service_name(&self) -> Option<&str> {
        self.service_id
            .as_ref()
            .and_then(Populated::doc)
            .and_then(|s| s.name.as_deref())
    }

    pub fn driver_name(&self) -> Option<&str> {
        self.driver_id
            .as_ref()
            .and_then(Populated::doc)
            .and_then(|d| d.user_id.as_ref())
            .and_then(Populated::doc)
            .map(UserRef::display_name)
    }
}

/// Body of `POST /api/admin/services/{serviceId}/vehicle`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    pub taxi_name: String,
    pub model: String,
    pub plate_number: String,
    pub color: String,
    pub year: u16,
    pub vin: String,
}

impl VehicleInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("taxiName", &self.taxi_name)?;
        require("model", &self.model)?;
        require("plateNumber", &self.plate_number)?;
        let next_year = u16::try_from(Utc::now().year() + 1).unwrap_or(u16::MAX);
        if !(1950..=next_year).contains(&self.year) {
            return Err(ValidationError::new(
                "year",
                format!("must be between 1950 and {next_year}"),
            ));
        }
        Ok(())
    }
}

/// Body of `PUT /api/admin/services/vehicle/assign-vehicle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignVehicle<'a> {
    pub vehicle_id: &'a EntityId,
    pub driver_id: &'a EntityId,
}
