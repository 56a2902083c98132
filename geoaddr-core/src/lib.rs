use std::sync::Arc;

mod address;
mod config;
mod coordinates;
mod country;
mod error;
mod fetch;
mod mf2;
mod normalizer;
mod provider;

// Re-export public types
pub use address::{pick_first, CanonicalAddress, RawAddress};
pub use config::GeocodeConfig;
pub use coordinates::{clean_coordinate, Coordinates};
pub use country::{CountryNameLookup, RemoteCountryTable, StaticCountryTable};
pub use error::{GeoError, Result};
pub use fetch::{FetchJson, HttpFetcher};
pub use normalizer::{normalize, normalize_address};
pub use provider::{build_provider, GeocodeProvider, LocationIq, Nominatim, ProviderKind};

/// Main lookup engine: a configured provider backed by a real HTTP client
pub struct Geocoder {
    config: GeocodeConfig,
    provider: Box<dyn GeocodeProvider>,
}

impl Geocoder {
    /// Create a geocoder for `config.provider` using blocking HTTP
    pub fn new(config: GeocodeConfig) -> Result<Self> {
        let fetcher: Arc<dyn FetchJson> = Arc::new(HttpFetcher::from_config(&config)?);
        Self::with_fetcher(config, fetcher)
    }

    /// Create a geocoder that issues requests through `fetcher`
    pub fn with_fetcher(config: GeocodeConfig, fetcher: Arc<dyn FetchJson>) -> Result<Self> {
        let provider = build_provider(config.provider, &config, fetcher)?;
        Ok(Self { config, provider })
    }

    /// Create a geocoder from `GEOADDR_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GeocodeConfig::from_env())
    }

    pub fn config(&self) -> &GeocodeConfig {
        &self.config
    }

    pub fn provider(&self) -> &dyn GeocodeProvider {
        self.provider.as_ref()
    }

    /// Look up the address at the given coordinates
    pub fn reverse(&self, latitude: f64, longitude: f64) -> Result<CanonicalAddress> {
        let result = self.provider.reverse(latitude, longitude);
        if let Err(e) = &result {
            log::warn!(
                "{} reverse lookup for {},{} failed: {}",
                self.provider.name(),
                latitude,
                longitude,
                e
            );
        }
        result
    }

    /// Look up a place by free text
    pub fn geocode(&self, query: &str) -> Result<CanonicalAddress> {
        let result = self.provider.geocode(query);
        if let Err(e) = &result {
            log::warn!("{} geocode for {:?} failed: {}", self.provider.name(), query, e);
        }
        result
    }
}
