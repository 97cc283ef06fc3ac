//! Ingestion Module
//!
//! Reading side of the loader:
//! - Column contract of the flights file
//! - Chunked, projected streaming of the flights file
//! - The airline reference file

pub mod airline_loader;
pub mod chunk_reader;
pub mod columns;

pub use airline_loader::AirlineLoader;
pub use chunk_reader::{Chunk, ChunkReader, Projection, RawRow, RowView};
pub use columns::{Column, DIMENSION_COLUMNS, FACT_COLUMNS};
