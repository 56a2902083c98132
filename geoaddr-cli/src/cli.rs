use clap::{Parser, Subcommand, ValueEnum};
use geoaddr_core::{clean_coordinate, ProviderKind};
use std::path::PathBuf;

/// Turn coordinates or place names into canonical addresses
#[derive(Parser, Debug)]
#[command(name = "geoaddr")]
#[command(author = "4n6h4x0r")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reverse geocode coordinates into microformat addresses", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Geocoding backend (nominatim, locationiq); overrides GEOADDR_PROVIDER
    #[arg(short = 'p', long = "provider", value_parser = parse_provider, global = true)]
    pub provider: Option<ProviderKind>,

    /// LocationIQ API key; overrides GEOADDR_LOCATIONIQ_API_KEY
    #[arg(long = "api-key", global = true)]
    pub api_key: Option<String>,

    /// Preferred response language, e.g. "en" or "de"
    #[arg(short = 'l', long = "language", global = true)]
    pub language: Option<String>,

    /// Nominatim reverse zoom level (3 = country ... 18 = building)
    #[arg(short = 'z', long = "zoom", value_parser = clap::value_parser!(u8).range(0..=18), global = true)]
    pub zoom: Option<u8>,

    /// JSON file mapping country codes to names, replaces the bundled table
    #[arg(long = "country-table", value_name = "FILE", global = true)]
    pub country_table: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub format: OutputFormat,

    /// Keep the full provider response in `raw`
    #[arg(long = "debug-raw", global = true)]
    pub debug_raw: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up the address at a latitude/longitude
    Reverse {
        #[arg(value_name = "LAT", value_parser = parse_coordinate, allow_hyphen_values = true)]
        latitude: f64,
        #[arg(value_name = "LON", value_parser = parse_coordinate, allow_hyphen_values = true)]
        longitude: f64,
    },
    /// Look up a place by name or address
    Geocode {
        #[arg(value_name = "QUERY", required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Flat canonical record
    Json,
    /// Microformats-2 h-adr item
    HAdr,
}

fn parse_coordinate(value: &str) -> Result<f64, String> {
    clean_coordinate(value)
        .ok_or_else(|| format!("`{}` is not a decimal coordinate like 47.6062", value))
}

fn parse_provider(value: &str) -> Result<ProviderKind, String> {
    value.parse().map_err(|e: geoaddr_core::GeoError| e.to_string())
}

/// Parses command-line arguments
pub fn parse_args() -> Args {
    Args::parse()
}
