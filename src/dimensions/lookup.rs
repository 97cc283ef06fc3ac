//! Dimension Lookup
//!
//! In-memory natural key → surrogate id maps, loaded once from the warehouse
//! before the fact pass and read-only afterwards.

use crate::db::Warehouse;
use crate::error::Result;
use crate::model::{normalize_airline_code, AirportKey, DateKey, SurrogateId};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct DimensionLookup {
    airlines: HashMap<String, SurrogateId>,
    dates: HashMap<DateKey, SurrogateId>,
    airports: HashMap<AirportKey, SurrogateId>,
}

impl DimensionLookup {
    /// Reads all three dimension tables.
    pub fn load(warehouse: &Warehouse) -> Result<Self> {
        let lookup = Self::from_entries(
            warehouse.fetch_airlines()?,
            warehouse.fetch_dates()?,
            warehouse.fetch_airports()?,
        );
        info!(
            "Loaded dimension lookup: {} airlines, {} dates, {} airports",
            lookup.airlines.len(),
            lookup.dates.len(),
            lookup.airports.len()
        );
        Ok(lookup)
    }

    pub fn from_entries(
        airlines: impl IntoIterator<Item = (String, SurrogateId)>,
        dates: impl IntoIterator<Item = (DateKey, SurrogateId)>,
        airports: impl IntoIterator<Item = (AirportKey, SurrogateId)>,
    ) -> Self {
        Self {
            airlines: airlines.into_iter().collect(),
            dates: dates.into_iter().collect(),
            airports: airports.into_iter().collect(),
        }
    }

    /// Carrier code is normalized the same way as `dim_airline.code`.
    pub fn airline_id(&self, carrier: &str) -> Option<SurrogateId> {
        self.airlines.get(normalize_airline_code(carrier)).copied()
    }

    pub fn date_id(&self, key: &DateKey) -> Option<SurrogateId> {
        self.dates.get(key).copied()
    }

    pub fn airport_id(&self, key: &AirportKey) -> Option<SurrogateId> {
        self.airports.get(key).copied()
    }

    /// Reverse lookup; linear scan, meant for verification only.
    pub fn airline_code(&self, id: SurrogateId) -> Option<&str> {
        self.airlines
            .iter()
            .find(|(_, &v)| v == id)
            .map(|(code, _)| code.as_str())
    }

    /// Reverse lookup; linear scan, meant for verification only.
    pub fn date_key(&self, id: SurrogateId) -> Option<&DateKey> {
        self.dates.iter().find(|(_, &v)| v == id).map(|(key, _)| key)
    }

    /// Reverse lookup; linear scan, meant for verification only.
    pub fn airport_key(&self, id: SurrogateId) -> Option<&AirportKey> {
        self.airports.iter().find(|(_, &v)| v == id).map(|(key, _)| key)
    }

    /// (airlines, dates, airports)
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.airlines.len(), self.dates.len(), self.airports.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensions::{DistinctKeys, SurrogateAssigner};
    use crate::model::AirlineRecord;

    #[test]
    fn test_load_reflects_persisted_dimensions() {
        let mut warehouse = Warehouse::open_in_memory().unwrap();
        warehouse.init_schema().unwrap();

        let keys = DistinctKeys {
            dates: [DateKey::new(2011, 1, 5, 3)].into_iter().collect(),
            airports: [
                AirportKey::new("10397", "Atlanta, GA", "Georgia"),
                AirportKey::new("12953", "New York, NY", "New York"),
            ]
            .into_iter()
            .collect(),
        };
        let mut loader = warehouse.batch_loader();
        loader
            .load(0, &[AirlineRecord::normalized(1, "DL", "Delta Air Lines Inc.")])
            .unwrap();
        let assigned = SurrogateAssigner::assign_and_persist(&mut loader, keys).unwrap();

        let lookup = DimensionLookup::load(&warehouse).unwrap();
        assert_eq!(lookup.sizes(), (1, 1, 2));
        assert_eq!(lookup.airline_id(" DL "), Some(1));
        assert_eq!(lookup.airline_id("AA"), None);
        for row in &assigned.airports {
            assert_eq!(lookup.airport_id(&row.key), Some(row.airport_id));
            assert_eq!(lookup.airport_key(row.airport_id), Some(&row.key));
        }
        assert_eq!(lookup.date_id(&DateKey::new(2011, 1, 5, 3)), Some(1));
        assert_eq!(lookup.date_id(&DateKey::new(2011, 1, 5, 4)), None);
        assert_eq!(lookup.airline_code(1), Some("DL"));
    }

    #[test]
    fn test_long_carrier_codes_match_truncated_dimension() {
        let lookup = DimensionLookup::from_entries(
            [("ABCDEFGHIJ".to_string(), 7)],
            Vec::<(DateKey, SurrogateId)>::new(),
            Vec::<(AirportKey, SurrogateId)>::new(),
        );
        assert_eq!(lookup.airline_id("ABCDEFGHIJKLMNOP"), Some(7));
    }
}
