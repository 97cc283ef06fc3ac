//! Warehouse client backed by SQLite
//!
//! One [`Warehouse`] owns one connection for the whole run. The connection is
//! closed when the value is dropped, whatever path the run exits through.

use crate::db::batch_loader::BatchLoader;
use crate::db::records::{ALL_TABLES, DIM_AIRLINE, DIM_AIRPORT, DIM_DATE, FACT_FLIGHTS};
use crate::error::{EtlError, Result};
use crate::model::{AirportKey, DateKey, FactRow, SurrogateId};
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS dim_airline (
    airline_id INTEGER PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS dim_date (
    date_id INTEGER PRIMARY KEY,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    day_of_month INTEGER NOT NULL,
    day_of_week INTEGER NOT NULL,
    full_date TEXT NOT NULL,
    UNIQUE (year, month, day_of_month, day_of_week)
);

CREATE TABLE IF NOT EXISTS dim_airport (
    airport_id INTEGER PRIMARY KEY,
    code TEXT NOT NULL,
    city_name TEXT NOT NULL,
    state_name TEXT NOT NULL,
    UNIQUE (code, city_name, state_name)
);

CREATE TABLE IF NOT EXISTS fact_flights (
    airline_id INTEGER NOT NULL,
    origin_airport_id INTEGER NOT NULL,
    destination_airport_id INTEGER NOT NULL,
    date_id INTEGER NOT NULL,
    dep_delay REAL NOT NULL,
    arr_delay REAL NOT NULL,
    cancelled INTEGER NOT NULL,
    diverted INTEGER NOT NULL,
    carrier_delay REAL NOT NULL,
    weather_delay REAL NOT NULL,
    nas_delay REAL NOT NULL,
    security_delay REAL NOT NULL,
    late_aircraft_delay REAL NOT NULL
);
"#;

pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    /// Open (or create) a file-backed warehouse.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EtlError::io(parent, e))?;
        }

        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        info!("Opened warehouse {} (journal_mode={})", path.display(), mode);

        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Create the four star-schema tables if they do not exist yet.
    pub fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Delete every row of every warehouse table in one transaction.
    pub fn reset(&mut self) -> Result<()> {
        self.clear(&ALL_TABLES)
    }

    /// Delete every row of `tables` in one transaction.
    pub fn clear(&mut self, tables: &[&str]) -> Result<()> {
        if let Some(unknown) = tables.iter().find(|t| !ALL_TABLES.contains(*t)) {
            return Err(EtlError::Config(format!("Unknown warehouse table: {}", unknown)));
        }
        let tx = self.conn.transaction()?;
        for table in tables {
            tx.execute(&format!("DELETE FROM {}", table), [])?;
        }
        tx.commit()?;
        info!("Cleared warehouse tables: {}", tables.join(", "));
        Ok(())
    }

    pub fn batch_loader(&mut self) -> BatchLoader<'_> {
        BatchLoader::new(&mut self.conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// `(code, airline_id)` for every airline.
    pub fn fetch_airlines(&self) -> Result<Vec<(String, SurrogateId)>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT code, airline_id FROM {}", DIM_AIRLINE))?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// `(natural key, date_id)` for every date.
    pub fn fetch_dates(&self) -> Result<Vec<(DateKey, SurrogateId)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT year, month, day_of_month, day_of_week, date_id FROM {}",
            DIM_DATE
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((
                DateKey::new(row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?),
                row.get(4)?,
            ))
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// `(natural key, airport_id)` for every airport.
    pub fn fetch_airports(&self) -> Result<Vec<(AirportKey, SurrogateId)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT code, city_name, state_name, airport_id FROM {}",
            DIM_AIRPORT
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((
                AirportKey {
                    code: row.get(0)?,
                    city_name: row.get(1)?,
                    state_name: row.get(2)?,
                },
                row.get(3)?,
            ))
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// All fact rows in insertion order.
    pub fn fetch_facts(&self) -> Result<Vec<FactRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT airline_id, origin_airport_id, destination_airport_id, date_id, \
             dep_delay, arr_delay, cancelled, diverted, carrier_delay, weather_delay, \
             nas_delay, security_delay, late_aircraft_delay FROM {} ORDER BY rowid",
            FACT_FLIGHTS
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(FactRow {
                airline_id: row.get(0)?,
                origin_airport_id: row.get(1)?,
                destination_airport_id: row.get(2)?,
                date_id: row.get(3)?,
                dep_delay: row.get(4)?,
                arr_delay: row.get(5)?,
                cancelled: row.get(6)?,
                diverted: row.get(7)?,
                carrier_delay: row.get(8)?,
                weather_delay: row.get(9)?,
                nas_delay: row.get(10)?,
                security_delay: row.get(11)?,
                late_aircraft_delay: row.get(12)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn row_count(&self, table: &str) -> Result<u64> {
        if !ALL_TABLES.contains(&table) {
            return Err(EtlError::Config(format!("Unknown warehouse table: {}", table)));
        }
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AirportRow, DateRow};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_schema_is_idempotent() {
        let warehouse = Warehouse::open_in_memory().unwrap();
        warehouse.init_schema().unwrap();
        warehouse.init_schema().unwrap();
        for table in ALL_TABLES {
            assert_eq!(warehouse.row_count(table).unwrap(), 0);
        }
        assert!(warehouse.row_count("sqlite_master").is_err());
    }

    #[test]
    fn test_dimension_reads_round_trip() {
        let mut warehouse = Warehouse::open_in_memory().unwrap();
        warehouse.init_schema().unwrap();

        let key = DateKey::new(2011, 1, 5, 3);
        let date = DateRow {
            date_id: 4,
            key,
            full_date: NaiveDate::from_ymd_opt(2011, 1, 5).unwrap(),
        };
        let airport = AirportRow {
            airport_id: 9,
            key: AirportKey::new("10397", "Atlanta, GA", "Georgia"),
        };
        let mut loader = warehouse.batch_loader();
        loader.load(0, &[date]).unwrap();
        loader.load(0, &[airport.clone()]).unwrap();

        assert_eq!(warehouse.fetch_dates().unwrap(), vec![(key, 4)]);
        assert_eq!(warehouse.fetch_airports().unwrap(), vec![(airport.key, 9)]);
        let full_date: String = warehouse
            .connection()
            .query_row("SELECT full_date FROM dim_date", [], |row| row.get(0))
            .unwrap();
        assert_eq!(full_date, "2011-01-05");
    }

    #[test]
    fn test_reset_clears_tables() {
        let temp_dir = TempDir::new().unwrap();
        let mut warehouse = Warehouse::open(temp_dir.path().join("nested/warehouse.db")).unwrap();
        warehouse.init_schema().unwrap();
        warehouse
            .connection()
            .execute("INSERT INTO dim_airline VALUES (1, 'AA', 'American')", [])
            .unwrap();
        assert_eq!(warehouse.row_count(DIM_AIRLINE).unwrap(), 1);

        warehouse.reset().unwrap();
        assert_eq!(warehouse.row_count(DIM_AIRLINE).unwrap(), 0);
    }

    #[test]
    fn test_clear_leaves_other_tables() {
        let mut warehouse = Warehouse::open_in_memory().unwrap();
        warehouse.init_schema().unwrap();
        warehouse
            .connection()
            .execute_batch(
                "INSERT INTO dim_airline VALUES (1, 'AA', 'American');
                 INSERT INTO dim_airport VALUES (1, '10397', 'Atlanta', 'Georgia');",
            )
            .unwrap();

        warehouse.clear(&[DIM_DATE, DIM_AIRPORT, FACT_FLIGHTS]).unwrap();
        assert_eq!(warehouse.row_count(DIM_AIRLINE).unwrap(), 1);
        assert_eq!(warehouse.row_count(DIM_AIRPORT).unwrap(), 0);

        let err = warehouse.clear(&[DIM_AIRLINE, "sqlite_master"]).unwrap_err();
        assert_eq!(err.kind(), crate::error::FailureKind::Configuration);
        assert_eq!(warehouse.row_count(DIM_AIRLINE).unwrap(), 1);
    }
}
