use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::common::{EntityId, HasId, ValidationError};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PromoStatus {
    #[default]
    Active,
    Inactive,
    Expired,
}

/// A promo code as listed by `GET /api/admin/promo-codes`.
///
/// Older records use `validFrom` / `validUntil` for the date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCode {
    #[serde(rename = "_id")]
    pub id: EntityId,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub discount_type: Option<String>,
    #[serde(default)]
    pub discount_value: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "validFrom")]
    pub start_date: Option<String>,
    #[serde(default, alias = "validUntil")]
    pub expiry_date: Option<String>,
}

impl HasId for PromoCode {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl PromoCode {
    /// `10%`, `$5` or the bare value when the type is unknown.
    pub fn discount_label(&self) -> String {
        let value = self.discount_value.unwrap_or(0.0);
        match self.discount_type.as_deref() {
            Some("percentage") => format!("{value}%"),
            Some("fixed") => format!("${value}"),
            _ if value > 0.0 => value.to_string(),
            _ => "-".to_owned(),
        }
    }
}

/// Body of the promo code create / update endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeInput {
    pub discount_value: f64,
    /// Serialized as `YYYY-MM-DD`.
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: PromoStatus,
}

impl PromoCodeInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.discount_value.is_finite() || self.discount_value <= 0.0 {
            return Err(ValidationError::new(
                "discountValue",
                "must be a valid number greater than 0",
            ));
        }
        if self.expiry_date < self.start_date {
            return Err(ValidationError::new(
                "expiryDate",
                "cannot be before start date",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
    }

    fn input() -> PromoCodeInput {
        PromoCodeInput {
            discount_value: 15.0,
            start_date: date("2025-01-01"),
            expiry_date: date("2025-02-01"),
            status: PromoStatus::Active,
        }
    }

    #[test]
    fn serializes_dates_as_plain_days() {
        let json = serde_json::to_value(input()).expect("serialize");
        assert_eq!(json["startDate"], "2025-01-01");
        assert_eq!(json["expiryDate"], "2025-02-01");
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn rejects_non_positive_discount() {
        let mut bad = input();
        bad.discount_value = 0.0;
        assert_eq!(bad.validate().map_err(|e| e.field), Err("discountValue"));
        bad.discount_value = f64::NAN;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn rejects_expiry_before_start() {
        let mut bad = input();
        bad.expiry_date = date("2024-12-31");
        assert_eq!(bad.validate().map_err(|e| e.field), Err("expiryDate"));
    }

    #[test]
    fn legacy_date_fields_are_accepted() {
        let promo: PromoCode = serde_json::from_str(
            r#"{"_id":"p1","discountType":"percentage","discountValue":10,"validUntil":"2025-03-01"}"#,
        )
        .expect("decode");
        assert_eq!(promo.expiry_date.as_deref(), Some("2025-03-01"));
        assert_eq!(promo.discount_label(), "10%");
    }
}
