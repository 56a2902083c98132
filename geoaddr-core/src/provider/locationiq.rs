use std::sync::Arc;

use super::{response_address, AdapterSettings, GeocodeProvider};
use crate::address::CanonicalAddress;
use crate::config::GeocodeConfig;
use crate::coordinates::Coordinates;
use crate::country::CountryNameLookup;
use crate::error::{GeoError, Result};
use crate::fetch::FetchJson;
use crate::normalizer::normalize;

/// LocationIQ reverse geocoding (API key required)
pub struct LocationIq {
    settings: AdapterSettings,
    base_url: String,
    api_key: Option<String>,
}

impl LocationIq {
    pub fn new(
        fetcher: Arc<dyn FetchJson>,
        countries: Box<dyn CountryNameLookup>,
        config: &GeocodeConfig,
    ) -> Self {
        Self {
            settings: AdapterSettings {
                fetcher,
                countries,
                verbose_raw: config.verbose_raw,
            },
            base_url: config.locationiq_url.trim_end_matches('/').to_string(),
            api_key: config.locationiq_api_key.clone(),
        }
    }
}

impl GeocodeProvider for LocationIq {
    fn name(&self) -> &'static str {
        "LocationIQ"
    }

    fn slug(&self) -> &'static str {
        "locationiq"
    }

    fn reverse(&self, latitude: f64, longitude: f64) -> Result<CanonicalAddress> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GeoError::MissingApiKey {
                provider: "LocationIQ",
            })?;
        let coords = Coordinates::new(latitude, longitude)?;
        log::debug!("Reverse geocoding {} via LocationIQ", coords);

        let query = [
            ("key", api_key.to_string()),
            ("format", "json".to_string()),
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
        ];
        let url = format!("{}/reverse.php", self.base_url);

        let body = self.settings.fetcher.fetch_json(&url, &query)?;
        let address = response_address(&body)?;
        let canonical = normalize(address, latitude, longitude, self.settings.countries.as_ref())?;

        Ok(self.settings.attach_raw(canonical, &body))
    }
}
