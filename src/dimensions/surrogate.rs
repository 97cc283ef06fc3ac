//! Surrogate Assigner
//!
//! Numbers every distinct natural key and persists the dimension rows. All
//! dates are validated before anything is written, so an invalid calendar
//! date leaves both dimensions untouched.

use crate::db::BatchLoader;
use crate::dimensions::DistinctKeys;
use crate::error::Result;
use crate::model::{AirportRow, DateRow, FIRST_ID};
use tracing::info;

/// Dimension rows with their surrogate ids, ready to persist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignedDimensions {
    pub dates: Vec<DateRow>,
    pub airports: Vec<AirportRow>,
}

/// Hands out surrogate ids and writes the dimension tables.
pub struct SurrogateAssigner;

impl SurrogateAssigner {
    /// Sorts the keys and numbers them from [`FIRST_ID`].
    ///
    /// Dates come out in calendar order, airports by code, city and state.
    /// Fails on the first key whose (year, month, day) is not a real date.
    pub fn assign(keys: DistinctKeys) -> Result<AssignedDimensions> {
        let mut date_keys: Vec<_> = keys.dates.into_iter().collect();
        date_keys.sort_unstable();
        let dates = date_keys
            .into_iter()
            .zip(FIRST_ID..)
            .map(|(key, date_id)| {
                key.full_date().map(|full_date| DateRow {
                    date_id,
                    key,
                    full_date,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut airport_keys: Vec<_> = keys.airports.into_iter().collect();
        airport_keys.sort_unstable();
        let airports = airport_keys
            .into_iter()
            .zip(FIRST_ID..)
            .map(|(key, airport_id)| AirportRow { airport_id, key })
            .collect();

        Ok(AssignedDimensions { dates, airports })
    }

    /// Writes each dimension as one all-or-nothing batch.
    pub fn persist(loader: &mut BatchLoader<'_>, dimensions: &AssignedDimensions) -> Result<()> {
        let dates = loader.load(0, &dimensions.dates)?;
        info!("Inserted {} rows into dim_date", dates);
        let airports = loader.load(0, &dimensions.airports)?;
        info!("Inserted {} rows into dim_airport", airports);
        Ok(())
    }

    /// [`Self::assign`] followed by [`Self::persist`].
    pub fn assign_and_persist(
        loader: &mut BatchLoader<'_>,
        keys: DistinctKeys,
    ) -> Result<AssignedDimensions> {
        let dimensions = Self::assign(keys)?;
        Self::persist(loader, &dimensions)?;
        Ok(dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Warehouse, DIM_AIRPORT, DIM_DATE};
    use crate::error::{EtlError, FailureKind};
    use crate::model::{AirportKey, DateKey, UNKNOWN_ID};
    use std::collections::HashSet;

    fn keys() -> DistinctKeys {
        DistinctKeys {
            dates: [
                DateKey::new(2011, 2, 1, 2),
                DateKey::new(2011, 1, 31, 1),
                DateKey::new(2011, 1, 5, 3),
            ]
            .into_iter()
            .collect(),
            airports: [
                AirportKey::new("12953", "New York, NY", "New York"),
                AirportKey::new("10397", "Atlanta, GA", "Georgia"),
            ]
            .into_iter()
            .collect(),
        }
    }

    #[test]
    fn test_ids_are_a_bijection() {
        let input = keys();
        let assigned = SurrogateAssigner::assign(input.clone()).unwrap();

        assert_eq!(assigned.dates.len(), input.dates.len());
        assert_eq!(assigned.airports.len(), input.airports.len());

        let date_ids: HashSet<_> = assigned.dates.iter().map(|d| d.date_id).collect();
        let date_keys: HashSet<_> = assigned.dates.iter().map(|d| d.key).collect();
        assert_eq!(date_ids.len(), assigned.dates.len());
        assert_eq!(date_keys, input.dates);
        assert!(!date_ids.contains(&UNKNOWN_ID));

        let airport_ids: HashSet<_> = assigned.airports.iter().map(|a| a.airport_id).collect();
        assert_eq!(airport_ids.len(), assigned.airports.len());
        assert_eq!(airport_ids, HashSet::from([1, 2]));
    }

    #[test]
    fn test_dates_numbered_chronologically() {
        let assigned = SurrogateAssigner::assign(keys()).unwrap();
        let ordered: Vec<_> = assigned
            .dates
            .iter()
            .map(|d| (d.date_id, d.full_date.to_string()))
            .collect();
        assert_eq!(
            ordered,
            vec![
                (1, "2011-01-05".to_string()),
                (2, "2011-01-31".to_string()),
                (3, "2011-02-01".to_string()),
            ]
        );
        assert_eq!(assigned.airports[0].key.code, "10397");
    }

    #[test]
    fn test_invalid_date_aborts_before_any_insert() {
        let mut input = keys();
        input.dates.insert(DateKey::new(2011, 4, 31, 7));

        let mut warehouse = Warehouse::open_in_memory().unwrap();
        warehouse.init_schema().unwrap();
        let err = SurrogateAssigner::assign_and_persist(&mut warehouse.batch_loader(), input)
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Validation);
        assert!(matches!(err, EtlError::InvalidDate { year: 2011, month: 4, day: 31 }));
        assert_eq!(warehouse.row_count(DIM_DATE).unwrap(), 0);
        assert_eq!(warehouse.row_count(DIM_AIRPORT).unwrap(), 0);
    }

    #[test]
    fn test_persist_writes_one_row_per_key() {
        let mut warehouse = Warehouse::open_in_memory().unwrap();
        warehouse.init_schema().unwrap();
        SurrogateAssigner::assign_and_persist(&mut warehouse.batch_loader(), keys()).unwrap();

        assert_eq!(warehouse.row_count(DIM_DATE).unwrap(), 3);
        assert_eq!(warehouse.row_count(DIM_AIRPORT).unwrap(), 2);
    }
}
