//! Load Pipeline - coordinates a full warehouse load
//!
//! airlines → dimension pass → surrogate ids → lookup → fact pass.
//! The fact pass cannot start before the dimension pass has been drained,
//! because the lookup is only built from persisted dimension rows.

use crate::config::EtlConfig;
use crate::db::{Warehouse, DIM_AIRLINE, DIM_AIRPORT, DIM_DATE, FACT_FLIGHTS};
use crate::dimensions::{DimensionLookup, KeyDeduplicator, SurrogateAssigner};
use crate::error::Result;
use crate::facts::{FactTransformer, UnresolvedCounts};
use crate::ingestion::{AirlineLoader, ChunkReader, DIMENSION_COLUMNS, FACT_COLUMNS};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of a completed load
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Load run ID
    pub run_id: String,

    /// Rows in `dim_airline` after the load
    pub airlines: u64,

    /// Rows written to `dim_date`
    pub dates: usize,

    /// Rows written to `dim_airport`
    pub airports: usize,

    /// Rows written to `fact_flights`
    pub fact_rows: u64,

    /// Fact batches committed
    pub fact_chunks: usize,

    /// Foreign keys recorded as unknown
    pub unresolved: UnresolvedCounts,

    pub elapsed_ms: u64,
}

/// Runs a complete load against one warehouse.
pub struct Pipeline {
    config: EtlConfig,
    warehouse: Warehouse,
}

impl Pipeline {
    /// Create a new pipeline; `config` is validated up front.
    pub fn new(config: EtlConfig, warehouse: Warehouse) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, warehouse })
    }

    /// Opens the warehouse named in `config`.
    pub fn from_config(config: EtlConfig) -> Result<Self> {
        let warehouse = Warehouse::open(&config.database_path)?;
        Self::new(config, warehouse)
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    pub fn into_warehouse(self) -> Warehouse {
        self.warehouse
    }

    /// Runs every stage. Any error stops the run where it happened.
    pub fn run(&mut self) -> Result<LoadSummary> {
        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        info!("Starting warehouse load {}", run_id);

        self.warehouse.init_schema()?;
        if self.config.reset {
            if self.config.skip_airlines {
                self.warehouse.clear(&[DIM_DATE, DIM_AIRPORT, FACT_FLIGHTS])?;
            } else {
                self.warehouse.reset()?;
            }
        }

        if self.config.skip_airlines {
            let existing = self.warehouse.row_count(DIM_AIRLINE)?;
            if existing == 0 {
                warn!("Skipping airline load but dim_airline is empty; every fact will have an unknown airline");
            } else {
                info!("Skipping airline load, keeping {} existing airlines", existing);
            }
        } else {
            let airlines = AirlineLoader::new(&self.config.airlines_csv);
            let count = airlines.load(&mut self.warehouse.batch_loader())?;
            info!("dim_airline: {} rows from {}", count, airlines.path().display());
        }

        let (dates, airports) = self.load_dimensions()?;
        let lookup = DimensionLookup::load(&self.warehouse)?;
        let (fact_rows, fact_chunks, unresolved) = self.load_facts(&lookup)?;

        let summary = LoadSummary {
            run_id,
            airlines: self.warehouse.row_count(DIM_AIRLINE)?,
            dates,
            airports,
            fact_rows,
            fact_chunks,
            unresolved,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            "Load {} finished: {} fact rows in {} chunks ({} ms)",
            summary.run_id, summary.fact_rows, summary.fact_chunks, summary.elapsed_ms
        );
        Ok(summary)
    }

    /// Pass 1 plus surrogate assignment. Returns (dates, airports) written.
    fn load_dimensions(&mut self) -> Result<(usize, usize)> {
        let reader = ChunkReader::open(
            &self.config.flights_csv,
            self.config.chunk_size,
            DIMENSION_COLUMNS,
        )?;
        info!(
            "Dimension pass over {} ({} rows per chunk)",
            reader.path().display(),
            self.config.chunk_size
        );
        let keys = KeyDeduplicator::new().consume(reader)?;
        info!(
            "Distinct keys: {} dates, {} airports",
            keys.dates.len(),
            keys.airports.len()
        );

        let assigned =
            SurrogateAssigner::assign_and_persist(&mut self.warehouse.batch_loader(), keys)?;
        Ok((assigned.dates.len(), assigned.airports.len()))
    }

    /// Pass 2: one committed fact batch per chunk.
    fn load_facts(&mut self, lookup: &DimensionLookup) -> Result<(u64, usize, UnresolvedCounts)> {
        let chunk_size = self.config.fact_chunk_size();
        let reader = ChunkReader::open(&self.config.flights_csv, chunk_size, FACT_COLUMNS)?;
        info!(
            "Fact pass over {} ({} rows per chunk)",
            reader.path().display(),
            chunk_size
        );

        let transformer = FactTransformer::new(lookup);
        let mut loader = self.warehouse.batch_loader();
        let mut totals = UnresolvedCounts::default();
        let mut rows_written = 0u64;
        let mut chunks = 0usize;

        for chunk in reader {
            let chunk = chunk?;
            let batch = transformer.transform_chunk(&chunk)?;
            if !batch.unresolved.is_empty() {
                warn!(
                    "Chunk {}: unknown keys (airline={}, origin={}, destination={}, date={})",
                    batch.index + 1,
                    batch.unresolved.airline,
                    batch.unresolved.origin,
                    batch.unresolved.destination,
                    batch.unresolved.date
                );
            }
            rows_written += loader.load(batch.index, &batch.rows)? as u64;
            totals.add(&batch.unresolved);
            chunks += 1;
            info!(
                "Fact pass: chunk {} inserted ({} rows, {} total)",
                batch.index + 1,
                batch.rows.len(),
                rows_written
            );
        }

        Ok((rows_written, chunks, totals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_rejected() {
        let config = EtlConfig {
            chunk_size: 0,
            ..EtlConfig::default()
        };
        let warehouse = Warehouse::open_in_memory().unwrap();
        assert!(Pipeline::new(config, warehouse).is_err());
    }

    #[test]
    fn test_missing_flights_file_aborts_after_airlines() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let airlines = temp_dir.path().join("airlines.csv");
        std::fs::write(&airlines, "Code,Description\nDL,Delta\n").unwrap();

        let config = EtlConfig {
            airlines_csv: airlines,
            flights_csv: temp_dir.path().join("missing.csv"),
            ..EtlConfig::default()
        };
        let mut pipeline = Pipeline::new(config, Warehouse::open_in_memory().unwrap()).unwrap();
        let err = pipeline.run().unwrap_err();

        assert_eq!(err.kind(), crate::error::FailureKind::Io);
        assert_eq!(pipeline.warehouse().row_count(DIM_AIRLINE).unwrap(), 1);
    }
}
