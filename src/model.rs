//! Warehouse data model: natural keys, dimension rows and fact rows.

use crate::error::{EtlError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Warehouse-internal integer id of a dimension row.
pub type SurrogateId = i64;

/// Foreign key recorded when a natural key has no dimension row.
/// Valid surrogate ids start at [`FIRST_ID`], so this never collides.
pub const UNKNOWN_ID: SurrogateId = -1;

/// First surrogate id handed out for every dimension.
pub const FIRST_ID: SurrogateId = 1;

pub const AIRLINE_CODE_MAX_CHARS: usize = 10;
pub const AIRLINE_DESCRIPTION_MAX_CHARS: usize = 100;

/// Natural key of `dim_date`.
///
/// `day_of_week` comes verbatim from the source and is never re-derived from
/// the calendar date, even when the two disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateKey {
    pub year: i32,
    pub month: u32,
    pub day_of_month: u32,
    pub day_of_week: u32,
}

impl DateKey {
    pub fn new(year: i32, month: u32, day_of_month: u32, day_of_week: u32) -> Self {
        Self {
            year,
            month,
            day_of_month,
            day_of_week,
        }
    }

    /// Calendar date of (year, month, day_of_month).
    pub fn full_date(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day_of_month).ok_or(
            EtlError::InvalidDate {
                year: self.year,
                month: self.month,
                day: self.day_of_month,
            },
        )
    }
}

/// Natural key of `dim_airport`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AirportKey {
    pub code: String,
    pub city_name: String,
    pub state_name: String,
}

impl AirportKey {
    /// Builds a key from raw source values, normalizing the city name.
    pub fn new(code: &str, city_name: &str, state_name: &str) -> Self {
        Self {
            code: code.trim().to_string(),
            city_name: normalize_city_name(city_name).to_string(),
            state_name: state_name.trim().to_string(),
        }
    }
}

/// Keeps the part of a city name before the first comma.
///
/// `"Atlanta, GA"` and `"Atlanta,Georgia"` both become `"Atlanta"`.
pub fn normalize_city_name(raw: &str) -> &str {
    match raw.split_once(',') {
        Some((head, _)) => head.trim(),
        None => raw.trim(),
    }
}

/// Cuts `value` to at most `max_chars` characters, never inside a code point.
pub fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &value[..byte_index],
        None => value,
    }
}

/// Normalized airline code, as stored in `dim_airline` and used for lookups.
pub fn normalize_airline_code(raw: &str) -> &str {
    truncate_chars(raw.trim(), AIRLINE_CODE_MAX_CHARS)
}

/// Row of `dim_airline`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineRecord {
    pub airline_id: SurrogateId,
    pub code: String,
    pub description: String,
}

impl AirlineRecord {
    /// Trims and silently truncates code and description.
    pub fn normalized(airline_id: SurrogateId, code: &str, description: &str) -> Self {
        Self {
            airline_id,
            code: normalize_airline_code(code).to_string(),
            description: truncate_chars(description.trim(), AIRLINE_DESCRIPTION_MAX_CHARS)
                .to_string(),
        }
    }
}

/// Row of `dim_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRow {
    pub date_id: SurrogateId,
    pub key: DateKey,
    pub full_date: NaiveDate,
}

/// Row of `dim_airport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportRow {
    pub airport_id: SurrogateId,
    pub key: AirportKey,
}

/// Row of `fact_flights`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactRow {
    pub airline_id: SurrogateId,
    pub origin_airport_id: SurrogateId,
    pub destination_airport_id: SurrogateId,
    pub date_id: SurrogateId,
    pub dep_delay: f64,
    pub arr_delay: f64,
    pub cancelled: i64,
    pub diverted: i64,
    pub carrier_delay: f64,
    pub weather_delay: f64,
    pub nas_delay: f64,
    pub security_delay: f64,
    pub late_aircraft_delay: f64,
}
