use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::tracking::error::{Result, TrackingError};

/// Raw query string of a tracking number request. Every field is optional
/// here so that validation can report all missing parameters at once.
#[derive(Debug, Default, Deserialize)]
pub struct ShipmentQuery {
    pub origin_country_id: Option<String>,
    pub destination_country_id: Option<String>,
    pub weight: Option<String>,
    pub created_at: Option<String>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_slug: Option<String>,
}

/// Validated shipment attributes. Values are kept exactly as received so they
/// can be echoed back and hashed unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shipment {
    pub origin_country_id: String,
    pub destination_country_id: String,
    pub weight: String,
    pub created_at: String,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_slug: String,
}

impl Shipment {
    /// Attributes in the order used to derive the tracking number prefix.
    pub fn hash_inputs(&self) -> [&str; 7] {
        [
            &self.origin_country_id,
            &self.destination_country_id,
            &self.weight,
            &self.created_at,
            &self.customer_id,
            &self.customer_name,
            &self.customer_slug,
        ]
    }
}

impl ShipmentQuery {
    /// Validates the query, defaulting `created_at` to the current time.
    pub fn validate(self) -> Result<Shipment> {
        self.validate_at(Utc::now())
    }

    pub fn validate_at(self, now: DateTime<Utc>) -> Result<Shipment> {
        let mut missing = Vec::new();
        let mut invalid = Vec::new();

        let mut required = |name: &'static str, value: Option<String>| match value {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let origin_country_id = required("origin_country_id", self.origin_country_id);
        let destination_country_id =
            required("destination_country_id", self.destination_country_id);
        let weight = required("weight", self.weight);
        let customer_id = required("customer_id", self.customer_id);
        let customer_name = required("customer_name", self.customer_name);
        let customer_slug = required("customer_slug", self.customer_slug);

        if !weight.is_empty() && !is_valid_weight(&weight) {
            invalid.push(format!("Invalid weight: {weight:?} is not a number"));
        }

        let created_at = match self.created_at {
            Some(created_at) if !created_at.trim().is_empty() => {
                if !is_valid_timestamp(&created_at) {
                    invalid.push(format!(
                        "Invalid created_at: {created_at:?} is not an RFC 3339 timestamp"
                    ));
                }
                created_at
            }
            _ => now.to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        if !missing.is_empty() {
            let missing = format!("Missing required parameters: {}", missing.join(", "));
            invalid.insert(0, missing);
        }
        if !invalid.is_empty() {
            return Err(TrackingError::Validation(invalid.join("; ")));
        }

        Ok(Shipment {
            origin_country_id,
            destination_country_id,
            weight,
            created_at,
            customer_id,
            customer_name,
            customer_slug,
        })
    }
}

fn is_valid_weight(weight: &str) -> bool {
    weight.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

/// Accepts RFC 3339, or an ISO-8601 date-time without offset taken as UTC.
fn is_valid_timestamp(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}
