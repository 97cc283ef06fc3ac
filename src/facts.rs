//! Fact Transformer
//!
//! Second pass over the flights file. Each row is joined against the
//! [`DimensionLookup`] maps and turned into a [`FactRow`].
//!
//! Join misses are not dropped: the missing foreign key becomes
//! [`UNKNOWN_ID`] and the row is still emitted. Misses are counted per batch.

use crate::dimensions::{date_key, destination_key, origin_key, DimensionLookup};
use crate::error::Result;
use crate::ingestion::{Chunk, Column, RowView};
use crate::model::{FactRow, SurrogateId, UNKNOWN_ID};
use serde::{Deserialize, Serialize};

/// Rows whose foreign key fell back to [`UNKNOWN_ID`], per key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedCounts {
    pub airline: u64,
    pub origin: u64,
    pub destination: u64,
    pub date: u64,
}

impl UnresolvedCounts {
    pub fn total(&self) -> u64 {
        self.airline + self.origin + self.destination + self.date
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn add(&mut self, other: &UnresolvedCounts) {
        self.airline += other.airline;
        self.origin += other.origin;
        self.destination += other.destination;
        self.date += other.date;
    }
}

/// Fact rows of one input chunk.
#[derive(Debug, Clone)]
pub struct FactBatch {
    /// Index of the source chunk.
    pub index: usize,
    pub rows: Vec<FactRow>,
    pub unresolved: UnresolvedCounts,
}

/// Resolves flights rows into fact rows against a loaded lookup.
pub struct FactTransformer<'l> {
    lookup: &'l DimensionLookup,
}

fn resolve(id: Option<SurrogateId>, misses: &mut u64) -> SurrogateId {
    id.unwrap_or_else(|| {
        *misses += 1;
        UNKNOWN_ID
    })
}

impl<'l> FactTransformer<'l> {
    /// Create a new transformer over `lookup`
    pub fn new(lookup: &'l DimensionLookup) -> Self {
        Self { lookup }
    }

    /// Transform one row, counting join misses into `unresolved`.
    pub fn transform_row(
        &self,
        row: &RowView<'_>,
        unresolved: &mut UnresolvedCounts,
    ) -> Result<FactRow> {
        let airline = self.lookup.airline_id(row.text(Column::Carrier)?);
        let origin = self.lookup.airport_id(&origin_key(row)?);
        let destination = self.lookup.airport_id(&destination_key(row)?);
        let date = self.lookup.date_id(&date_key(row)?);

        Ok(FactRow {
            airline_id: resolve(airline, &mut unresolved.airline),
            origin_airport_id: resolve(origin, &mut unresolved.origin),
            destination_airport_id: resolve(destination, &mut unresolved.destination),
            date_id: resolve(date, &mut unresolved.date),
            dep_delay: row.measure(Column::DepDelay)?,
            arr_delay: row.measure(Column::ArrDelay)?,
            cancelled: row.flag(Column::Cancelled)?,
            diverted: row.flag(Column::Diverted)?,
            carrier_delay: row.measure(Column::CarrierDelay)?,
            weather_delay: row.measure(Column::WeatherDelay)?,
            nas_delay: row.measure(Column::NasDelay)?,
            security_delay: row.measure(Column::SecurityDelay)?,
            late_aircraft_delay: row.measure(Column::LateAircraftDelay)?,
        })
    }

    /// One batch per chunk, same order as the input rows.
    pub fn transform_chunk(&self, chunk: &Chunk) -> Result<FactBatch> {
        let mut unresolved = UnresolvedCounts::default();
        let rows = chunk
            .rows()
            .map(|row| self.transform_row(&row, &mut unresolved))
            .collect::<Result<Vec<_>>>()?;

        Ok(FactBatch {
            index: chunk.index,
            rows,
            unresolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::{ChunkReader, FACT_COLUMNS};
    use crate::model::{AirportKey, DateKey};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "YEAR,MONTH,DAY_OF_MONTH,DAY_OF_WEEK,OP_UNIQUE_CARRIER,ORIGIN_AIRPORT_ID,ORIGIN_CITY_NAME,ORIGIN_STATE_NM,DEST_AIRPORT_ID,DEST_CITY_NAME,DEST_STATE_NM,DEP_DELAY,ARR_DELAY,CANCELLED,DIVERTED,CARRIER_DELAY,WEATHER_DELAY,NAS_DELAY,SECURITY_DELAY,LATE_AIRCRAFT_DELAY";

    fn lookup() -> DimensionLookup {
        DimensionLookup::from_entries(
            [("DL".to_string(), 1)],
            [(DateKey::new(2011, 1, 5, 3), 1)],
            [
                (AirportKey::new("10397", "Atlanta", "Georgia"), 1),
                (AirportKey::new("12953", "New York", "New York"), 2),
            ],
        )
    }

    fn batch_for(rows: &[&str]) -> FactBatch {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file.flush().unwrap();

        let mut reader = ChunkReader::open(file.path(), 100, FACT_COLUMNS).unwrap();
        let chunk = reader.next_chunk().unwrap().unwrap();
        let lookup = lookup();
        FactTransformer::new(&lookup).transform_chunk(&chunk).unwrap()
    }

    #[test]
    fn test_resolves_keys_and_defaults_missing_measures() {
        let batch = batch_for(&[
            r#"2011,1,5,3,DL,10397,"Atlanta, GA",Georgia,12953,"New York, NY",New York,15.00,-3.00,0.00,0.00,,,,,"#,
            r#"2011,1,5,3,DL,10397,"Atlanta, GA",Georgia,12953,"New York, NY",New York,,,1.00,0.00,,,,,"#,
        ]);

        assert_eq!(batch.rows.len(), 2);
        assert!(batch.unresolved.is_empty());

        let first = &batch.rows[0];
        assert_eq!(
            (first.airline_id, first.origin_airport_id, first.destination_airport_id, first.date_id),
            (1, 1, 2, 1)
        );
        assert_eq!(first.dep_delay, 15.0);
        assert_eq!(first.arr_delay, -3.0);

        let second = &batch.rows[1];
        assert_eq!(second.dep_delay, 0.0);
        assert_eq!(second.cancelled, 1);
        assert_eq!(second.late_aircraft_delay, 0.0);
    }

    #[test]
    fn test_unknown_keys_get_sentinel_and_row_is_kept() {
        let batch = batch_for(&[
            r#"2011,1,5,3,ZZ,99999,"Nowhere, XX",Nowhere,12953,"New York, NY",New York,1,2,0,0,0,0,0,0,0"#,
            r#"2011,1,6,4,DL,10397,"Atlanta, GA",Georgia,12953,"New York, NY",New York,1,2,0,1,0,0,0,0,0"#,
        ]);

        assert_eq!(batch.rows.len(), 2);
        let first = &batch.rows[0];
        assert_eq!(first.airline_id, UNKNOWN_ID);
        assert_eq!(first.origin_airport_id, UNKNOWN_ID);
        assert_eq!(first.destination_airport_id, 2);
        assert_eq!(first.date_id, 1);
        assert_eq!(batch.rows[1].date_id, UNKNOWN_ID);
        assert_eq!(batch.rows[1].diverted, 1);

        assert_eq!(
            batch.unresolved,
            UnresolvedCounts { airline: 1, origin: 1, destination: 0, date: 1 }
        );
        assert_eq!(batch.unresolved.total(), 3);
    }

    #[test]
    fn test_bad_measure_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, r#"2011,1,5,3,DL,10397,Atlanta,Georgia,12953,New York,New York,late,,,,,,,,"#).unwrap();
        file.flush().unwrap();

        let mut reader = ChunkReader::open(file.path(), 10, FACT_COLUMNS).unwrap();
        let chunk = reader.next_chunk().unwrap().unwrap();
        let lookup = lookup();
        let err = FactTransformer::new(&lookup).transform_chunk(&chunk).unwrap_err();
        assert!(matches!(err, crate::error::EtlError::Parse { column: "DEP_DELAY", .. }));
    }
}
