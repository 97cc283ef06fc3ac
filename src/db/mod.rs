//! Database module for the SQLite warehouse
//!
//! This module provides the warehouse client, table mappings and the
//! transactional batch loader.

pub mod batch_loader;
pub mod records;
pub mod warehouse;

pub use batch_loader::{BatchLoader, WarehouseRecord};
pub use records::{ALL_TABLES, DIM_AIRLINE, DIM_AIRPORT, DIM_DATE, FACT_FLIGHTS};
pub use warehouse::Warehouse;
