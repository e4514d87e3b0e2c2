use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{EntityId, HasId, ValidationError, require};

/// A ride service tier (Economy, Comfort, XL, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub service_image: Option<String>,
    #[serde(default)]
    pub base_fare: Option<f64>,
    #[serde(default)]
    pub per_km_rate: Option<f64>,
    #[serde(default)]
    pub per_minute_rate: Option<f64>,
    #[serde(default)]
    pub per_mile_rate: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl HasId for Service {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// Body of the service create / update endpoints.
///
/// `service_image` is a URL of an already-hosted image; uploads are not
/// handled by this client.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInput {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_image: Option<String>,
}

impl ServiceInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("description", &self.description)
    }
}

impl From<&Service> for ServiceInput {
    fn from(s: &Service) -> Self {
        Self {
            name: s.name.clone(),
            description: s.description.clone().unwrap_or_default(),
            service_image: s.service_image.clone(),
        }
    }
}
