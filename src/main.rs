use anyhow::{Context, Result};
use clap::Parser;
use flight_warehouse::{EtlConfig, Pipeline};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flight-warehouse")]
#[command(about = "Load flight records into a star-schema warehouse")]
struct Args {
    /// JSON configuration file; flags and env vars override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Flights CSV, read once per pass
    #[arg(long, env = "FLIGHTS_CSV")]
    flights: Option<PathBuf>,

    /// Airlines CSV (`Code,Description`)
    #[arg(long, env = "AIRLINES_CSV")]
    airlines: Option<PathBuf>,

    /// SQLite warehouse file
    #[arg(short, long, env = "WAREHOUSE_DB")]
    database: Option<PathBuf>,

    /// Rows per chunk
    #[arg(long, env = "CHUNK_SIZE")]
    chunk_size: Option<usize>,

    /// Rows per chunk in the fact pass (defaults to --chunk-size)
    #[arg(long, env = "FACT_CHUNK_SIZE")]
    fact_chunk_size: Option<usize>,

    /// Delete existing warehouse rows first
    #[arg(long)]
    reset: bool,

    /// Keep the current dim_airline contents
    #[arg(long)]
    skip_airlines: bool,
}

impl Args {
    fn into_config(self) -> Result<EtlConfig> {
        let mut config = match &self.config {
            Some(path) => EtlConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => EtlConfig::default(),
        };

        if let Some(flights) = self.flights {
            config.flights_csv = flights;
        }
        if let Some(airlines) = self.airlines {
            config.airlines_csv = airlines;
        }
        if let Some(database) = self.database {
            config.database_path = database;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if self.fact_chunk_size.is_some() {
            config.fact_chunk_size = self.fact_chunk_size;
        }
        config.reset |= self.reset;
        config.skip_airlines |= self.skip_airlines;
        Ok(config)
    }
}

fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    if let Err(e) = run(Args::parse()) {
        error!("Warehouse load failed: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = args.into_config()?;
    info!(
        "Loading {} into {}",
        config.flights_csv.display(),
        config.database_path.display()
    );

    let mut pipeline = Pipeline::from_config(config)?;
    let summary = pipeline.run()?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
