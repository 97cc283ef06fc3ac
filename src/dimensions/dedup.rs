//! Key Deduplicator
//!
//! First pass over the flights file. Memory grows with the number of
//! distinct dates and airports, never with the number of rows.

use crate::dimensions::{date_key, destination_key, origin_key};
use crate::error::Result;
use crate::ingestion::{Chunk, ChunkReader};
use crate::model::{AirportKey, DateKey};
use std::collections::HashSet;
use tracing::info;

/// Distinct natural keys found by a complete first pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinctKeys {
    pub dates: HashSet<DateKey>,
    pub airports: HashSet<AirportKey>,
}

/// Accumulates distinct date and airport keys chunk by chunk.
#[derive(Debug, Default)]
pub struct KeyDeduplicator {
    dates: HashSet<DateKey>,
    airports: HashSet<AirportKey>,
    rows_seen: u64,
}

impl KeyDeduplicator {
    /// Create an empty deduplicator
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the keys of every row in `chunk`.
    pub fn observe_chunk(&mut self, chunk: &Chunk) -> Result<()> {
        for row in chunk.rows() {
            self.dates.insert(date_key(&row)?);
            self.airports.insert(origin_key(&row)?);
            self.airports.insert(destination_key(&row)?);
        }
        self.rows_seen += chunk.len() as u64;
        Ok(())
    }

    /// Folds another deduplicator in, e.g. one shard of a parallel pass.
    pub fn merge(&mut self, other: KeyDeduplicator) {
        self.dates.extend(other.dates);
        self.airports.extend(other.airports);
        self.rows_seen += other.rows_seen;
    }

    pub fn rows_seen(&self) -> u64 {
        self.rows_seen
    }

    /// Drains `reader` to the end and returns the distinct keys.
    pub fn consume(mut self, reader: ChunkReader) -> Result<DistinctKeys> {
        for chunk in reader {
            let chunk = chunk?;
            self.observe_chunk(&chunk)?;
            info!(
                "Dimension pass: chunk {} ({} rows, {} rows total, {} dates, {} airports)",
                chunk.index + 1,
                chunk.len(),
                self.rows_seen,
                self.dates.len(),
                self.airports.len()
            );
        }
        Ok(self.finish())
    }

    pub fn finish(self) -> DistinctKeys {
        DistinctKeys {
            dates: self.dates,
            airports: self.airports,
        }
    }
}
