//! Car records and inbound car payloads.
//!
//! # Purpose
//! Defines the stored `Car` record, the loosely typed `CarPayload` accepted on
//! create/update, and the validation step that turns one into the other.
//!
//! # Key invariants
//! - Stored prices and minimum driver ages are numeric and non-negative.
//! - Date, location, and extras collections are never null.
//! - Available dates are calendar days with duplicates removed.
use crate::availability::parse_day;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// A rental car listing as stored in the catalog.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: String,
    pub description: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub car_group: String,
    pub minimum_driver_age: u32,
    pub available_dates: Vec<NaiveDate>,
    pub available_locations: Vec<String>,
    pub available_extras: Vec<String>,
    pub discounts: String,
    pub version: u64,
}

impl Car {
    /// Build a fresh record at version 0.
    pub fn new(id: String, fields: CarFields) -> Self {
        Self {
            id,
            description: fields.description,
            make: fields.make,
            model: fields.model,
            year: fields.year,
            price: fields.price,
            car_group: fields.car_group,
            minimum_driver_age: fields.minimum_driver_age,
            available_dates: fields.available_dates,
            available_locations: fields.available_locations,
            available_extras: fields.available_extras,
            discounts: fields.discounts,
            version: 0,
        }
    }

    /// Overlay validated fields on this record and bump the version.
    ///
    /// The identifier never changes through an update.
    pub fn merged(&self, fields: CarFields) -> Self {
        Self {
            version: self.version + 1,
            ..Self::new(self.id.clone(), fields)
        }
    }
}

/// A number that clients may send either as JSON number or numeric string.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// Finite decimal value, if the input parses as one.
    pub fn as_decimal(&self) -> Option<f64> {
        let value = match self {
            Numeric::Number(value) => *value,
            Numeric::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Whole-number value, if the input is integral.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Numeric::Number(value) if value.is_finite() && value.fract() == 0.0 => {
                Some(*value as i64)
            }
            Numeric::Number(_) => None,
            Numeric::Text(text) => text.trim().parse::<i64>().ok(),
        }
    }
}

/// Create/update request body.
///
/// Every field is optional at the wire level so that missing fields surface as
/// validation failures rather than deserialization failures.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CarPayload {
    pub id: Option<String>,
    pub description: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<Numeric>,
    pub price: Option<Numeric>,
    pub car_group: Option<String>,
    pub minimum_driver_age: Option<Numeric>,
    pub available_dates: Option<Vec<String>>,
    pub available_locations: Option<Vec<String>>,
    pub available_extras: Option<Vec<String>>,
    pub discounts: Option<String>,
    /// Kept raw: a version of the wrong JSON type is a stale version, not a
    /// malformed body.
    #[schema(value_type = Option<u64>)]
    pub version: Option<serde_json::Value>,
}

/// Validated, typed car attributes (everything except identity and version).
#[derive(Debug, Clone, PartialEq)]
pub struct CarFields {
    pub description: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub car_group: String,
    pub minimum_driver_age: u32,
    pub available_dates: Vec<NaiveDate>,
    pub available_locations: Vec<String>,
    pub available_extras: Vec<String>,
    pub discounts: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct InvalidCar {
    pub field: &'static str,
    pub reason: &'static str,
}

impl InvalidCar {
    fn new(field: &'static str, reason: &'static str) -> Self {
        Self { field, reason }
    }
}

fn required_text(value: &Option<String>, field: &'static str) -> Result<String, InvalidCar> {
    match value {
        Some(text) if !text.is_empty() => Ok(text.clone()),
        _ => Err(InvalidCar::new(field, "missing or empty")),
    }
}

fn required_list(
    value: &Option<Vec<String>>,
    field: &'static str,
) -> Result<Vec<String>, InvalidCar> {
    value
        .clone()
        .ok_or_else(|| InvalidCar::new(field, "must be a list"))
}

impl CarPayload {
    /// The version the client last read, if it was sent as a whole,
    /// non-negative JSON number. Strings, fractions and negatives yield `None`.
    pub fn sent_version(&self) -> Option<u64> {
        match self.version.as_ref()? {
            serde_json::Value::Number(number) => number.as_u64().or_else(|| {
                number
                    .as_f64()
                    .filter(|value| {
                        value.fract() == 0.0 && *value >= 0.0 && *value < u64::MAX as f64
                    })
                    .map(|value| value as u64)
            }),
            _ => None,
        }
    }

    /// Check the payload and convert it into typed fields.
    ///
    /// # Errors
    /// Returns the first offending field; nothing is partially applied.
    pub fn validate(&self) -> Result<CarFields, InvalidCar> {
        let description = required_text(&self.description, "description")?;
        let make = required_text(&self.make, "make")?;
        let model = required_text(&self.model, "model")?;
        let car_group = required_text(&self.car_group, "carGroup")?;

        let year = self
            .year
            .as_ref()
            .and_then(Numeric::as_integer)
            .and_then(|year| i32::try_from(year).ok())
            .filter(|year| *year != 0)
            .ok_or_else(|| InvalidCar::new("year", "missing or not an integer"))?;
        let price = self
            .price
            .as_ref()
            .and_then(Numeric::as_decimal)
            .ok_or_else(|| InvalidCar::new("price", "not a number"))?;
        if price < 0.0 {
            return Err(InvalidCar::new("price", "must not be negative"));
        }
        let minimum_driver_age = self
            .minimum_driver_age
            .as_ref()
            .and_then(Numeric::as_integer)
            .ok_or_else(|| InvalidCar::new("minimumDriverAge", "not an integer"))?;
        let minimum_driver_age = u32::try_from(minimum_driver_age)
            .map_err(|_| InvalidCar::new("minimumDriverAge", "must not be negative"))?;

        let raw_dates = required_list(&self.available_dates, "availableDates")?;
        let mut available_dates: Vec<NaiveDate> = Vec::with_capacity(raw_dates.len());
        for raw in &raw_dates {
            let day = parse_day(raw)
                .ok_or_else(|| InvalidCar::new("availableDates", "not a calendar date"))?;
            if !available_dates.contains(&day) {
                available_dates.push(day);
            }
        }
        let available_locations = required_list(&self.available_locations, "availableLocations")?;
        let available_extras = required_list(&self.available_extras, "availableExtras")?;
        let discounts = self
            .discounts
            .clone()
            .ok_or_else(|| InvalidCar::new("discounts", "must be a string"))?;

        Ok(CarFields {
            description,
            make,
            model,
            year,
            price,
            car_group,
            minimum_driver_age,
            available_dates,
            available_locations,
            available_extras,
            discounts,
        })
    }
}
