use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::address::CanonicalAddress;
use crate::config::GeocodeConfig;
use crate::country::{CountryNameLookup, RemoteCountryTable, StaticCountryTable};
use crate::error::{GeoError, Result};
use crate::fetch::FetchJson;

mod locationiq;
mod nominatim;

pub use locationiq::LocationIq;
pub use nominatim::Nominatim;

/// A geocoding backend
///
/// Every implementation hands the provider's `address` object to the shared
/// normalizer; only request construction and response unwrapping differ.
pub trait GeocodeProvider {
    /// Human-readable provider name
    fn name(&self) -> &'static str;

    fn slug(&self) -> &'static str;

    /// Coordinates to address
    fn reverse(&self, latitude: f64, longitude: f64) -> Result<CanonicalAddress>;

    /// Free-text query to coordinates and address
    fn geocode(&self, query: &str) -> Result<CanonicalAddress> {
        log::debug!("{} cannot geocode {:?}", self.name(), query);
        Err(GeoError::Unsupported {
            provider: self.name(),
            operation: "forward geocoding",
        })
    }
}

/// Known backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Nominatim,
    LocationIq,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Nominatim, ProviderKind::LocationIq];

    pub fn slug(&self) -> &'static str {
        match self {
            ProviderKind::Nominatim => "nominatim",
            ProviderKind::LocationIq => "locationiq",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ProviderKind {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == wanted)
            .ok_or_else(|| GeoError::UnknownProvider(s.to_string()))
    }
}

/// Create the provider for `kind`, wired to its country-name strategy
///
/// Nominatim resolves country names from a local table (bundled, or the
/// file at `config.country_table_path`); LocationIQ asks the remote country
/// directory through the same `fetcher`.
pub fn build_provider(
    kind: ProviderKind,
    config: &GeocodeConfig,
    fetcher: Arc<dyn FetchJson>,
) -> Result<Box<dyn GeocodeProvider>> {
    let provider: Box<dyn GeocodeProvider> = match kind {
        ProviderKind::Nominatim => {
            let countries = match &config.country_table_path {
                Some(path) => StaticCountryTable::load(path)?,
                None => StaticCountryTable::bundled(),
            };
            Box::new(Nominatim::new(fetcher, Box::new(countries), config))
        }
        ProviderKind::LocationIq => {
            let countries = RemoteCountryTable::new(fetcher.clone(), config.country_names_url.clone());
            Box::new(LocationIq::new(fetcher, Box::new(countries), config))
        }
    };
    log::debug!("Using {} provider", provider.name());
    Ok(provider)
}

/// Pull the `address` object out of a decoded provider response
pub(crate) fn response_address(body: &Value) -> Result<&Value> {
    if let Some(message) = body.get("error") {
        let message = message
            .as_str()
            .map(str::to_string)
            .or_else(|| message.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| message.to_string());
        return Err(GeoError::ProviderMessage(message));
    }

    body.get("address")
        .ok_or_else(|| GeoError::InvalidInput("response has no `address` object".to_string()))
}

/// Provider-independent lookup settings carried by each adapter
pub(crate) struct AdapterSettings {
    pub fetcher: Arc<dyn FetchJson>,
    pub countries: Box<dyn CountryNameLookup>,
    pub verbose_raw: bool,
}

impl AdapterSettings {
    /// Swap `raw` for the whole response in verbose mode
    pub fn attach_raw(&self, mut address: CanonicalAddress, body: &Value) -> CanonicalAddress {
        if self.verbose_raw {
            address.raw = body.clone();
        }
        address
    }
}
