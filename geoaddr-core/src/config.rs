use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::country::DEFAULT_COUNTRY_NAMES_URL;
use crate::provider::ProviderKind;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_LOCATIONIQ_URL: &str = "https://us1.locationiq.com/v1";
pub const DEFAULT_REVERSE_ZOOM: u8 = 18;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration options for geocoding lookups
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// Backend used for lookups
    pub provider: ProviderKind,
    /// Required by LocationIQ, ignored by Nominatim
    pub locationiq_api_key: Option<String>,
    /// Sent as `accept-language` to Nominatim when set
    pub language: Option<String>,
    /// Nominatim reverse zoom (3 = country ... 18 = building)
    pub reverse_zoom: u8,
    pub user_agent: String,
    /// Network timeout per request
    pub timeout: Duration,
    /// Keep the whole provider response in `raw` instead of the address only
    pub verbose_raw: bool,
    pub nominatim_url: String,
    pub locationiq_url: String,
    pub country_names_url: String,
    /// Replaces the bundled country table when set
    pub country_table_path: Option<PathBuf>,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Nominatim,
            locationiq_api_key: None,
            language: None,
            reverse_zoom: DEFAULT_REVERSE_ZOOM,
            user_agent: format!(
                "geoaddr/{} (https://github.com/h4x0r/geoaddr)",
                env!("CARGO_PKG_VERSION")
            ),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            verbose_raw: false,
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            locationiq_url: DEFAULT_LOCATIONIQ_URL.to_string(),
            country_names_url: DEFAULT_COUNTRY_NAMES_URL.to_string(),
            country_table_path: None,
        }
    }
}

impl GeocodeConfig {
    /// Defaults overridden by `GEOADDR_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(provider) = var("GEOADDR_PROVIDER") {
            config.provider = parse_or_default("GEOADDR_PROVIDER", &provider, config.provider);
        }
        config.locationiq_api_key = var("GEOADDR_LOCATIONIQ_API_KEY");
        config.language = var("GEOADDR_LANGUAGE");
        if let Some(zoom) = var("GEOADDR_REVERSE_ZOOM") {
            config.reverse_zoom = parse_or_default("GEOADDR_REVERSE_ZOOM", &zoom, config.reverse_zoom);
        }
        if let Some(user_agent) = var("GEOADDR_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(secs) = var("GEOADDR_TIMEOUT_SECS") {
            let secs = match parse_or_default("GEOADDR_TIMEOUT_SECS", &secs, DEFAULT_TIMEOUT_SECS) {
                0 => {
                    log::warn!(
                        "Ignoring GEOADDR_TIMEOUT_SECS=0, using {}",
                        DEFAULT_TIMEOUT_SECS
                    );
                    DEFAULT_TIMEOUT_SECS
                }
                secs => secs,
            };
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(debug) = var("GEOADDR_DEBUG") {
            config.verbose_raw = parse_flag(&debug).unwrap_or_else(|| {
                log::warn!("Ignoring GEOADDR_DEBUG={:?}, expected a boolean", debug);
                false
            });
        }
        if let Some(url) = var("GEOADDR_NOMINATIM_URL") {
            config.nominatim_url = url;
        }
        if let Some(url) = var("GEOADDR_LOCATIONIQ_URL") {
            config.locationiq_url = url;
        }
        if let Some(url) = var("GEOADDR_COUNTRY_NAMES_URL") {
            config.country_names_url = url;
        }
        config.country_table_path = var("GEOADDR_COUNTRY_TABLE").map(PathBuf::from);

        config
    }
}

fn parse_or_default<T>(key: &str, value: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    value.parse().unwrap_or_else(|_| {
        log::warn!("Ignoring {}={:?}, using {:?}", key, value, default);
        default
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GeocodeConfig::from_lookup(lookup(&[]));
        assert_eq!(config.provider, ProviderKind::Nominatim);
        assert_eq!(config.reverse_zoom, 18);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(!config.verbose_raw);
        assert!(config.locationiq_api_key.is_none());
        assert!(config.user_agent.starts_with("geoaddr/"));
    }

    #[test]
    fn test_overrides() {
        let config = GeocodeConfig::from_lookup(lookup(&[
            ("GEOADDR_PROVIDER", "locationiq"),
            ("GEOADDR_LOCATIONIQ_API_KEY", "pk.123"),
            ("GEOADDR_LANGUAGE", "de"),
            ("GEOADDR_REVERSE_ZOOM", "10"),
            ("GEOADDR_TIMEOUT_SECS", "3"),
            ("GEOADDR_DEBUG", "yes"),
            ("GEOADDR_COUNTRY_TABLE", "/tmp/countries.json"),
        ]));
        assert_eq!(config.provider, ProviderKind::LocationIq);
        assert_eq!(config.locationiq_api_key.as_deref(), Some("pk.123"));
        assert_eq!(config.language.as_deref(), Some("de"));
        assert_eq!(config.reverse_zoom, 10);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.verbose_raw);
        assert_eq!(
            config.country_table_path,
            Some(PathBuf::from("/tmp/countries.json"))
        );
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = GeocodeConfig::from_lookup(lookup(&[
            ("GEOADDR_PROVIDER", "bing"),
            ("GEOADDR_REVERSE_ZOOM", "street"),
            ("GEOADDR_TIMEOUT_SECS", "-1"),
            ("GEOADDR_DEBUG", "maybe"),
            ("GEOADDR_LOCATIONIQ_API_KEY", "   "),
        ]));
        assert_eq!(config.provider, ProviderKind::Nominatim);
        assert_eq!(config.reverse_zoom, 18);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(!config.verbose_raw);
        assert!(config.locationiq_api_key.is_none());
    }

    #[test]
    fn test_zero_timeout_falls_back() {
        let config = GeocodeConfig::from_lookup(lookup(&[("GEOADDR_TIMEOUT_SECS", "0")]));
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
