use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{response_address, AdapterSettings, GeocodeProvider};
use crate::address::{non_empty, CanonicalAddress};
use crate::config::GeocodeConfig;
use crate::coordinates::Coordinates;
use crate::country::CountryNameLookup;
use crate::error::{GeoError, Result};
use crate::fetch::FetchJson;
use crate::normalizer::normalize;

/// One match from `/search`; `address` is read separately as a raw payload
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: Option<CoordinateValue>,
    lon: Option<CoordinateValue>,
    #[serde(default)]
    extratags: Option<ExtraTags>,
}

/// Nominatim reports coordinates as strings; accept numbers too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoordinateValue {
    Text(String),
    Number(f64),
}

#[derive(Debug, Default, Deserialize)]
struct ExtraTags {
    website: Option<String>,
    image: Option<String>,
}

impl CoordinateValue {
    fn to_f64(&self) -> Option<f64> {
        match self {
            CoordinateValue::Text(s) => s.trim().parse().ok(),
            CoordinateValue::Number(n) => Some(*n),
        }
    }
}

fn coordinate(value: Option<&CoordinateValue>, key: &str) -> Result<f64> {
    value
        .and_then(CoordinateValue::to_f64)
        .ok_or_else(|| GeoError::InvalidInput(format!("result has no usable `{}`", key)))
}

/// OpenStreetMap Nominatim
pub struct Nominatim {
    settings: AdapterSettings,
    base_url: String,
    language: Option<String>,
    reverse_zoom: u8,
}

impl Nominatim {
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
            base_url: config.nominatim_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            reverse_zoom: config.reverse_zoom,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn push_language(&self, query: &mut Vec<(&'static str, String)>) {
        if let Some(language) = &self.language {
            query.push(("accept-language", language.clone()));
        }
    }
}

impl GeocodeProvider for Nominatim {
    fn name(&self) -> &'static str {
        "OpenStreetMap Nominatim"
    }

    fn slug(&self) -> &'static str {
        "nominatim"
    }

    fn reverse(&self, latitude: f64, longitude: f64) -> Result<CanonicalAddress> {
        let coords = Coordinates::new(latitude, longitude)?;
        log::debug!("Reverse geocoding {} via Nominatim", coords);

        let mut query = vec![
            ("format", "json".to_string()),
            ("extratags", "1".to_string()),
            ("addressdetails", "1".to_string()),
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("zoom", self.reverse_zoom.to_string()),
        ];
        self.push_language(&mut query);

        let body = self
            .settings
            .fetcher
            .fetch_json(&self.endpoint("reverse"), &query)?;
        let address = response_address(&body)?;
        let canonical = normalize(address, latitude, longitude, self.settings.countries.as_ref())?;

        Ok(self.settings.attach_raw(canonical, &body))
    }

    fn geocode(&self, query_text: &str) -> Result<CanonicalAddress> {
        let query_text = query_text.trim();
        if query_text.is_empty() {
            return Err(GeoError::InvalidInput("empty geocoding query".to_string()));
        }
        log::debug!("Geocoding {:?} via Nominatim", query_text);

        let mut query = vec![
            ("q", query_text.to_string()),
            ("format", "jsonv2".to_string()),
            ("extratags", "1".to_string()),
            ("addressdetails", "1".to_string()),
            ("namedetails", "1".to_string()),
        ];
        self.push_language(&mut query);

        let body = self
            .settings
            .fetcher
            .fetch_json(&self.endpoint("search"), &query)?;

        // Search answers with a list of matches; the best one comes first
        let place = match &body {
            Value::Array(results) => results.first().ok_or_else(|| GeoError::NoResults {
                query: query_text.to_string(),
            })?,
            other => other,
        };

        let address = response_address(place)?;
        let result = SearchResult::deserialize(place)?;
        let latitude = coordinate(result.lat.as_ref(), "lat")?;
        let longitude = coordinate(result.lon.as_ref(), "lon")?;
        let mut canonical = normalize(address, latitude, longitude, self.settings.countries.as_ref())?;

        let extratags = result.extratags.unwrap_or_default();
        canonical.url = non_empty(extratags.website);
        canonical.photo = non_empty(extratags.image);

        Ok(self.settings.attach_raw(canonical, place))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::StaticCountryTable;
    use crate::fetch::testing::StubFetcher;
    use serde_json::json;

    const REVERSE: &str = "https://nominatim.test/reverse";
    const SEARCH: &str = "https://nominatim.test/search";

    fn config() -> GeocodeConfig {
        GeocodeConfig {
            nominatim_url: "https://nominatim.test/".to_string(),
            ..GeocodeConfig::default()
        }
    }

    fn provider(stub: Arc<StubFetcher>, config: &GeocodeConfig) -> Nominatim {
        Nominatim::new(stub, Box::new(StaticCountryTable::bundled()), config)
    }

    fn springfield() -> Value {
        json!({
            "place_id": 1,
            "display_name": "Springfield, Sangamon County, Illinois, 62701, United States",
            "address": {
                "city": "Springfield",
                "county": "Sangamon County",
                "state": "Illinois",
                "postcode": "62701",
                "country_code": "us"
            }
        })
    }

    #[test]
    fn test_reverse() -> Result<()> {
        let stub = Arc::new(StubFetcher::new().respond(REVERSE, springfield()));
        let nominatim = provider(stub.clone(), &config());

        let addr = nominatim.reverse(39.78, -89.65)?;
        assert_eq!(addr.locality.as_deref(), Some("Springfield"));
        assert_eq!(addr.region.as_deref(), Some("Illinois"));
        assert_eq!(addr.country_code, "US");
        // Not in the payload, resolved from the bundled table
        assert_eq!(addr.country_name.as_deref(), Some("United States"));
        assert_eq!(addr.latitude, 39.78);
        assert_eq!(addr.display_name, "Springfield, Illinois, 62701, United States");
        assert_eq!(addr.raw, springfield()["address"]);

        assert_eq!(stub.request_count(), 1);
        assert_eq!(stub.param(REVERSE, "lat"), Some("39.78".to_string()));
        assert_eq!(stub.param(REVERSE, "lon"), Some("-89.65".to_string()));
        assert_eq!(stub.param(REVERSE, "zoom"), Some("18".to_string()));
        assert_eq!(stub.param(REVERSE, "format"), Some("json".to_string()));
        assert_eq!(stub.param(REVERSE, "accept-language"), None);
        Ok(())
    }

    #[test]
    fn test_reverse_language_and_verbose_raw() -> Result<()> {
        let stub = Arc::new(StubFetcher::new().respond(REVERSE, springfield()));
        let config = GeocodeConfig {
            language: Some("fr".to_string()),
            verbose_raw: true,
            ..config()
        };
        let addr = provider(stub.clone(), &config).reverse(39.78, -89.65)?;

        assert_eq!(stub.param(REVERSE, "accept-language"), Some("fr".to_string()));
        assert_eq!(addr.raw, springfield());
        Ok(())
    }

    #[test]
    fn test_reverse_upstream_failure_propagates() {
        let stub = Arc::new(StubFetcher::new().fail(REVERSE, 503));
        let err = provider(stub, &config()).reverse(39.78, -89.65).unwrap_err();
        assert!(matches!(err, GeoError::UpstreamStatus { status: 503, .. }));
    }

    #[test]
    fn test_reverse_rejects_bad_coordinates_without_request() {
        let stub = Arc::new(StubFetcher::new().respond(REVERSE, springfield()));
        let result = provider(stub.clone(), &config()).reverse(123.0, 0.0);
        assert!(matches!(result, Err(GeoError::InvalidInput(_))));
        assert_eq!(stub.request_count(), 0);
    }

    #[test]
    fn test_reverse_incomplete_address() {
        let stub = Arc::new(StubFetcher::new().respond(
            REVERSE,
            json!({"address": {"city": "Atlantis"}}),
        ));
        let result = provider(stub, &config()).reverse(0.0, 0.0);
        assert!(matches!(result, Err(GeoError::IncompleteAddress { .. })));
    }

    #[test]
    fn test_reverse_provider_error_message() {
        let stub = Arc::new(StubFetcher::new().respond(REVERSE, json!({"error": "Unable to geocode"})));
        let result = provider(stub, &config()).reverse(0.0, -150.0);
        assert!(matches!(result, Err(GeoError::ProviderMessage(_))));
    }

    #[test]
    fn test_geocode() -> Result<()> {
        let stub = Arc::new(StubFetcher::new().respond(
            SEARCH,
            json!([
                {
                    "lat": "48.8611473",
                    "lon": "2.33802768704666",
                    "display_name": "Louvre",
                    "address": {
                        "attraction": "Musée du Louvre",
                        "road": "Rue de Rivoli",
                        "city": "Paris",
                        "state": "Île-de-France",
                        "country": "France",
                        "country_code": "fr"
                    },
                    "extratags": {
                        "website": "https://www.louvre.fr",
                        "image": "",
                        "wikidata": "Q19675"
                    }
                },
                {
                    "lat": "0",
                    "lon": "0",
                    "address": {"country_code": "zz"}
                }
            ]),
        ));
        let nominatim = provider(stub.clone(), &config());

        let addr = nominatim.geocode("  Louvre Paris ")?;
        assert_eq!(addr.name.as_deref(), Some("Musée du Louvre"));
        assert_eq!(addr.street_address.as_deref(), Some("Rue de Rivoli"));
        assert_eq!(addr.country_name.as_deref(), Some("France"));
        assert!((addr.latitude - 48.8611473).abs() < 1e-9);
        assert!((addr.longitude - 2.33802768704666).abs() < 1e-9);
        assert_eq!(addr.url.as_deref(), Some("https://www.louvre.fr"));
        assert_eq!(addr.photo, None);

        assert_eq!(stub.param(SEARCH, "q"), Some("Louvre Paris".to_string()));
        assert_eq!(stub.param(SEARCH, "format"), Some("jsonv2".to_string()));
        assert_eq!(stub.param(SEARCH, "namedetails"), Some("1".to_string()));
        Ok(())
    }

    #[test]
    fn test_geocode_single_object_and_numeric_coordinates() -> Result<()> {
        let stub = Arc::new(StubFetcher::new().respond(
            SEARCH,
            json!({
                "lat": 51.752,
                "lon": -1.2577,
                "address": {"town": "Oxford", "county": "Oxfordshire", "country_code": "gb"}
            }),
        ));
        let addr = provider(stub, &config()).geocode("Oxford")?;
        assert_eq!(addr.region.as_deref(), Some("Oxfordshire"));
        assert_eq!(addr.latitude, 51.752);
        assert_eq!(addr.url, None);
        Ok(())
    }

    #[test]
    fn test_geocode_no_results() {
        let stub = Arc::new(StubFetcher::new().respond(SEARCH, json!([])));
        match provider(stub, &config()).geocode("qwertyuiop") {
            Err(GeoError::NoResults { query }) => assert_eq!(query, "qwertyuiop"),
            other => panic!("expected NoResults, got {:?}", other),
        }
    }

    #[test]
    fn test_geocode_empty_query() {
        let stub = Arc::new(StubFetcher::new());
        let result = provider(stub.clone(), &config()).geocode("   ");
        assert!(matches!(result, Err(GeoError::InvalidInput(_))));
        assert_eq!(stub.request_count(), 0);
    }

    #[test]
    fn test_geocode_null_extratags_and_unparsable_coordinates() -> Result<()> {
        let stub = Arc::new(StubFetcher::new().respond(
            SEARCH,
            json!([{
                "lat": " 40.7484 ",
                "lon": "-73.9857",
                "extratags": null,
                "address": {"building": "Empire State Building", "country_code": "us"}
            }]),
        ));
        let addr = provider(stub, &config()).geocode("Empire State Building")?;
        assert_eq!(addr.latitude, 40.7484);
        assert_eq!(addr.url, None);
        assert_eq!(addr.photo, None);

        let stub = Arc::new(StubFetcher::new().respond(
            SEARCH,
            json!([{ "lat": "north", "lon": "0", "address": {"country_code": "us"} }]),
        ));
        let result = provider(stub, &config()).geocode("Somewhere");
        assert!(matches!(result, Err(GeoError::InvalidInput(msg)) if msg.contains("lat")));
        Ok(())
    }

    #[test]
    fn test_geocode_missing_coordinates() {
        let stub = Arc::new(StubFetcher::new().respond(
            SEARCH,
            json!([{ "address": {"country_code": "gb"} }]),
        ));
        let result = provider(stub, &config()).geocode("Nowhere");
        assert!(matches!(result, Err(GeoError::InvalidInput(msg)) if msg.contains("lat")));
    }
}
