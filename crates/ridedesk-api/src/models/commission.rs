use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::common::{EntityId, HasId, ValidationError};
use super::page::Page;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CommissionCharge {
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// A ride with the platform commission taken on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRide {
    #[serde(rename = "_id")]
    pub id: EntityId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub commission: Option<CommissionCharge>,
}

impl HasId for CommissionRide {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// One page of commission history plus the running total.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommissionHistory {
    pub rides: Page<CommissionRide>,
    pub total_commission: f64,
}

/// Body of `POST /api/admin/commission`.
///
/// The backend expects the rate as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionInput {
    pub date: NaiveDate,
    pub commission: String,
}

impl CommissionInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.commission.trim().parse::<f64>() {
            Ok(n) if n.is_finite() && n > 0.0 => Ok(()),
            _ => Err(ValidationError::new(
                "commission",
                "must be a valid number greater than 0",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(commission: &str) -> CommissionInput {
        CommissionInput {
            date: NaiveDate::from_ymd_opt(2025, 4, 1).expect("date"),
            commission: commission.into(),
        }
    }

    #[test]
    fn commission_must_be_positive_number() {
        assert!(input("12.5").validate().is_ok());
        assert!(input("0").validate().is_err());
        assert!(input("abc").validate().is_err());
        assert!(input("").validate().is_err());
    }

    #[test]
    fn keeps_commission_as_string_on_the_wire() {
        let json = serde_json::to_value(input("7")).expect("serialize");
        assert_eq!(json["commission"], "7");
        assert_eq!(json["date"], "2025-04-01");
    }
}
