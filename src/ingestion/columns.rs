//! Column contract of the flights file and per-pass projections.

/// Columns of the flights file this loader depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Year,
    Month,
    DayOfMonth,
    DayOfWeek,
    Carrier,
    OriginAirportId,
    OriginCityName,
    OriginStateName,
    DestAirportId,
    DestCityName,
    DestStateName,
    DepDelay,
    ArrDelay,
    Cancelled,
    Diverted,
    CarrierDelay,
    WeatherDelay,
    NasDelay,
    SecurityDelay,
    LateAircraftDelay,
}

impl Column {
    pub const COUNT: usize = 20;

    pub const ALL: [Column; Column::COUNT] = [
        Column::Year,
        Column::Month,
        Column::DayOfMonth,
        Column::DayOfWeek,
        Column::Carrier,
        Column::OriginAirportId,
        Column::OriginCityName,
        Column::OriginStateName,
        Column::DestAirportId,
        Column::DestCityName,
        Column::DestStateName,
        Column::DepDelay,
        Column::ArrDelay,
        Column::Cancelled,
        Column::Diverted,
        Column::CarrierDelay,
        Column::WeatherDelay,
        Column::NasDelay,
        Column::SecurityDelay,
        Column::LateAircraftDelay,
    ];

    /// Header name in the source file.
    pub fn name(self) -> &'static str {
        match self {
            Column::Year => "YEAR",
            Column::Month => "MONTH",
            Column::DayOfMonth => "DAY_OF_MONTH",
            Column::DayOfWeek => "DAY_OF_WEEK",
            Column::Carrier => "OP_UNIQUE_CARRIER",
            Column::OriginAirportId => "ORIGIN_AIRPORT_ID",
            Column::OriginCityName => "ORIGIN_CITY_NAME",
            Column::OriginStateName => "ORIGIN_STATE_NM",
            Column::DestAirportId => "DEST_AIRPORT_ID",
            Column::DestCityName => "DEST_CITY_NAME",
            Column::DestStateName => "DEST_STATE_NM",
            Column::DepDelay => "DEP_DELAY",
            Column::ArrDelay => "ARR_DELAY",
            Column::Cancelled => "CANCELLED",
            Column::Diverted => "DIVERTED",
            Column::CarrierDelay => "CARRIER_DELAY",
            Column::WeatherDelay => "WEATHER_DELAY",
            Column::NasDelay => "NAS_DELAY",
            Column::SecurityDelay => "SECURITY_DELAY",
            Column::LateAircraftDelay => "LATE_AIRCRAFT_DELAY",
        }
    }

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

/// Columns read by the dimension pass.
pub const DIMENSION_COLUMNS: &[Column] = &[
    Column::Year,
    Column::Month,
    Column::DayOfMonth,
    Column::DayOfWeek,
    Column::OriginAirportId,
    Column::OriginCityName,
    Column::OriginStateName,
    Column::DestAirportId,
    Column::DestCityName,
    Column::DestStateName,
];

/// Columns read by the fact pass.
pub const FACT_COLUMNS: &[Column] = &Column::ALL;
