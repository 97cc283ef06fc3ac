//! Table mappings for the warehouse rows.

use crate::db::batch_loader::WarehouseRecord;
use crate::model::{AirlineRecord, AirportRow, DateRow, FactRow};
use rusqlite::types::Value;

pub const DIM_AIRLINE: &str = "dim_airline";
pub const DIM_DATE: &str = "dim_date";
pub const DIM_AIRPORT: &str = "dim_airport";
pub const FACT_FLIGHTS: &str = "fact_flights";

/// Every warehouse table, dimensions first.
pub const ALL_TABLES: [&str; 4] = [DIM_AIRLINE, DIM_DATE, DIM_AIRPORT, FACT_FLIGHTS];

impl WarehouseRecord for AirlineRecord {
    const TABLE: &'static str = DIM_AIRLINE;
    const COLUMNS: &'static [&'static str] = &["airline_id", "code", "description"];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.airline_id),
            Value::Text(self.code.clone()),
            Value::Text(self.description.clone()),
        ]
    }
}

impl WarehouseRecord for DateRow {
    const TABLE: &'static str = DIM_DATE;
    const COLUMNS: &'static [&'static str] = &[
        "date_id",
        "year",
        "month",
        "day_of_month",
        "day_of_week",
        "full_date",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.date_id),
            Value::Integer(self.key.year.into()),
            Value::Integer(self.key.month.into()),
            Value::Integer(self.key.day_of_month.into()),
            Value::Integer(self.key.day_of_week.into()),
            Value::Text(self.full_date.format("%Y-%m-%d").to_string()),
        ]
    }
}

impl WarehouseRecord for AirportRow {
    const TABLE: &'static str = DIM_AIRPORT;
    const COLUMNS: &'static [&'static str] = &["airport_id", "code", "city_name", "state_name"];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.airport_id),
            Value::Text(self.key.code.clone()),
            Value::Text(self.key.city_name.clone()),
            Value::Text(self.key.state_name.clone()),
        ]
    }
}

impl WarehouseRecord for FactRow {
    const TABLE: &'static str = FACT_FLIGHTS;
    const COLUMNS: &'static [&'static str] = &[
        "airline_id",
        "origin_airport_id",
        "destination_airport_id",
        "date_id",
        "dep_delay",
        "arr_delay",
        "cancelled",
        "diverted",
        "carrier_delay",
        "weather_delay",
        "nas_delay",
        "security_delay",
        "late_aircraft_delay",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.airline_id),
            Value::Integer(self.origin_airport_id),
            Value::Integer(self.destination_airport_id),
            Value::Integer(self.date_id),
            Value::Real(self.dep_delay),
            Value::Real(self.arr_delay),
            Value::Integer(self.cancelled),
            Value::Integer(self.diverted),
            Value::Real(self.carrier_delay),
            Value::Real(self.weather_delay),
            Value::Real(self.nas_delay),
            Value::Real(self.security_delay),
            Value::Real(self.late_aircraft_delay),
        ]
    }
}
