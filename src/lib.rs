//! Streaming star-schema loader for flight records.
//!
//! Pass 1 reads the flights file chunk by chunk and collects distinct date and
//! airport keys. Those keys get surrogate ids and are persisted as dimensions.
//! Pass 2 re-reads the file, resolves every row against the dimension maps and
//! commits one fact batch per chunk.

pub mod config;
pub mod db;
pub mod dimensions;
pub mod error;
pub mod facts;
pub mod ingestion;
pub mod model;
pub mod pipeline;

pub use config::EtlConfig;
pub use db::{BatchLoader, Warehouse, WarehouseRecord};
pub use dimensions::{DimensionLookup, DistinctKeys, KeyDeduplicator, SurrogateAssigner};
pub use error::{EtlError, FailureKind, Result};
pub use facts::{FactBatch, FactTransformer, UnresolvedCounts};
pub use ingestion::{AirlineLoader, Chunk, ChunkReader, Column};
pub use model::{AirlineRecord, AirportKey, DateKey, FactRow, SurrogateId, UNKNOWN_ID};
pub use pipeline::{LoadSummary, Pipeline};
