//! Airline Loader - reads the small airline reference file into `dim_airline`

use crate::db::BatchLoader;
use crate::error::{EtlError, Result};
use crate::model::{AirlineRecord, SurrogateId, FIRST_ID};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const REQUIRED_HEADERS: [&str; 2] = ["Code", "Description"];

#[derive(Debug, Deserialize)]
struct AirlineCsvRow {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Description", default)]
    description: String,
}

/// Loader for the `Code, Description` reference file.
pub struct AirlineLoader {
    path: PathBuf,
}

impl AirlineLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads, trims and truncates the reference rows.
    ///
    /// Ids are handed out in file order. A code that collides with an earlier
    /// one after truncation is skipped so the lookup stays a function.
    pub fn read(&self) -> Result<Vec<AirlineRecord>> {
        let file = File::open(&self.path).map_err(|e| EtlError::io(&self.path, e))?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(file);

        let headers = rdr.headers()?.clone();
        let missing: Vec<String> = REQUIRED_HEADERS
            .iter()
            .filter(|required| !headers.iter().any(|h| h == **required))
            .map(|required| required.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(EtlError::MissingColumns {
                path: self.path.clone(),
                columns: missing,
            });
        }

        let mut seen = HashSet::new();
        let mut records = Vec::new();
        let mut next_id: SurrogateId = FIRST_ID;

        for result in rdr.deserialize::<AirlineCsvRow>() {
            let row = result?;
            let record = AirlineRecord::normalized(next_id, &row.code, &row.description);
            if !seen.insert(record.code.clone()) {
                warn!(
                    "Skipping airline {:?} ({:?}): code already loaded",
                    row.code, record.description
                );
                continue;
            }
            records.push(record);
            next_id += 1;
        }

        Ok(records)
    }

    /// Reads the file and inserts it as a single batch.
    pub fn load(&self, loader: &mut BatchLoader<'_>) -> Result<usize> {
        let records = self.read()?;
        info!("Loading {} airlines", records.len());
        loader.load(0, &records)
    }
}
