use anyhow::{Context, Result};
use geoaddr_core::{GeocodeConfig, Geocoder};

mod cli;

use cli::{Command, OutputFormat};

fn main() -> Result<()> {
    let args = cli::parse_args();

    // Initialize logger with appropriate level based on verbose flag
    if std::env::var("RUST_LOG").is_err() {
        if args.verbose {
            std::env::set_var("RUST_LOG", "debug");
        } else {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    // Environment first, then command-line overrides
    let mut config = GeocodeConfig::from_env();
    if let Some(provider) = args.provider {
        config.provider = provider;
    }
    if args.api_key.is_some() {
        config.locationiq_api_key = args.api_key.clone();
    }
    if args.language.is_some() {
        config.language = args.language.clone();
    }
    if let Some(zoom) = args.zoom {
        config.reverse_zoom = zoom;
    }
    if args.country_table.is_some() {
        config.country_table_path = args.country_table.clone();
    }
    config.verbose_raw |= args.debug_raw;

    let geocoder = Geocoder::new(config).context("Failed to set up geocoder")?;
    log::debug!("Provider: {}", geocoder.provider().name());

    let address = match &args.command {
        Command::Reverse {
            latitude,
            longitude,
        } => geocoder
            .reverse(*latitude, *longitude)
            .with_context(|| format!("Reverse lookup of {},{} failed", latitude, longitude))?,
        Command::Geocode { query } => {
            let query = query.join(" ");
            geocoder
                .geocode(&query)
                .with_context(|| format!("Geocoding {:?} failed", query))?
        }
    };

    let output = match args.format {
        OutputFormat::Json => address.to_json()?,
        OutputFormat::HAdr => address.to_h_adr(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
