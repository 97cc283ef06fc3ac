//! Dimension building: key deduplication, surrogate assignment and lookup.

pub mod dedup;
pub mod lookup;
pub mod surrogate;

pub use dedup::{DistinctKeys, KeyDeduplicator};
pub use lookup::DimensionLookup;
pub use surrogate::{AssignedDimensions, SurrogateAssigner};

use crate::error::Result;
use crate::ingestion::{Column, RowView};
use crate::model::{AirportKey, DateKey};

/// Date natural key of a flights row.
pub fn date_key(row: &RowView<'_>) -> Result<DateKey> {
    Ok(DateKey::new(
        row.integer(Column::Year)?,
        row.integer(Column::Month)?,
        row.integer(Column::DayOfMonth)?,
        row.integer(Column::DayOfWeek)?,
    ))
}

/// Origin airport natural key of a flights row.
pub fn origin_key(row: &RowView<'_>) -> Result<AirportKey> {
    Ok(AirportKey::new(
        row.text(Column::OriginAirportId)?,
        row.text(Column::OriginCityName)?,
        row.text(Column::OriginStateName)?,
    ))
}

/// Destination airport natural key of a flights row.
pub fn destination_key(row: &RowView<'_>) -> Result<AirportKey> {
    Ok(AirportKey::new(
        row.text(Column::DestAirportId)?,
        row.text(Column::DestCityName)?,
        row.text(Column::DestStateName)?,
    ))
}
