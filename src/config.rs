//! Load configuration: input paths, warehouse location and chunk sizes.

use crate::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for one warehouse load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    /// `Code, Description` reference file
    pub airlines_csv: PathBuf,

    /// The large flights file, read twice
    pub flights_csv: PathBuf,

    /// SQLite warehouse file
    pub database_path: PathBuf,

    /// Rows per chunk in the dimension pass
    pub chunk_size: usize,

    /// Rows per chunk in the fact pass (None = same as `chunk_size`)
    pub fact_chunk_size: Option<usize>,

    /// Delete existing warehouse rows before loading
    pub reset: bool,

    /// Leave `dim_airline` as it is
    pub skip_airlines: bool,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            airlines_csv: PathBuf::from("datos/aerolineas.csv"),
            flights_csv: PathBuf::from("datos/vuelos.csv"),
            database_path: PathBuf::from("warehouse.db"),
            chunk_size: 500_000,
            fact_chunk_size: None,
            reset: false,
            skip_airlines: false,
        }
    }
}

impl EtlConfig {
    /// Load configuration from a JSON file; absent fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EtlError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| {
            EtlError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn fact_chunk_size(&self) -> usize {
        self.fact_chunk_size.unwrap_or(self.chunk_size)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.fact_chunk_size == Some(0) {
            return Err(EtlError::Config("chunk sizes must be at least 1".to_string()));
        }
        for (name, path) in [
            ("airlines_csv", &self.airlines_csv),
            ("flights_csv", &self.flights_csv),
            ("database_path", &self.database_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(EtlError::Config(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = EtlConfig::default();
        assert_eq!(config.chunk_size, 500_000);
        assert_eq!(config.fact_chunk_size(), 500_000);
        assert!(!config.reset);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "flights_csv": "big.csv", "fact_chunk_size": 7 }}"#).unwrap();
        file.flush().unwrap();

        let config = EtlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.flights_csv, PathBuf::from("big.csv"));
        assert_eq!(config.chunk_size, 500_000);
        assert_eq!(config.fact_chunk_size(), 7);
    }

    #[test]
    fn test_validation() {
        let config = EtlConfig {
            chunk_size: 0,
            ..EtlConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EtlConfig {
            database_path: PathBuf::new(),
            ..EtlConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_file_is_configuration_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "chunk_size = 3").unwrap();
        file.flush().unwrap();
        let err = EtlConfig::from_file(file.path()).unwrap_err();
        assert_eq!(err.kind(), crate::error::FailureKind::Configuration);
    }
}
