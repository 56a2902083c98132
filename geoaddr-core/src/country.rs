use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{GeoError, Result};
use crate::fetch::FetchJson;

/// ISO 3166-1 alpha-2 code to English short name, shipped with the crate
const BUNDLED_COUNTRIES: &str = include_str!("../data/countries.json");

/// Public directory of country names keyed by alpha-2 code
pub const DEFAULT_COUNTRY_NAMES_URL: &str = "http://country.io/names.json";

lazy_static::lazy_static! {
    static ref BUNDLED_TABLE: HashMap<String, String> = parse_table(BUNDLED_COUNTRIES)
        .unwrap_or_else(|e| {
            log::warn!("Bundled country table is unreadable: {}", e);
            HashMap::new()
        });
}

/// Resolves a country code to a display name
///
/// Unknown codes and lookup failures yield `None`; callers treat the
/// country name as optional.
pub trait CountryNameLookup {
    fn country_name(&self, country_code: &str) -> Option<String>;
}

/// Table held in memory, either the bundled one or loaded from disk
#[derive(Debug, Clone)]
pub struct StaticCountryTable {
    names: Cow<'static, HashMap<String, String>>,
}

impl StaticCountryTable {
    /// Shares the table compiled into the crate
    pub fn bundled() -> Self {
        Self {
            names: Cow::Borrowed(&*BUNDLED_TABLE),
        }
    }

    /// Load a `{"US": "United States", ...}` JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| {
            GeoError::InvalidInput(format!(
                "cannot read country table {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self {
            names: Cow::Owned(parse_table(&data)?),
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl CountryNameLookup for StaticCountryTable {
    fn country_name(&self, country_code: &str) -> Option<String> {
        let name = self.names.get(&country_code.trim().to_uppercase()).cloned();
        if name.is_none() {
            log::debug!("Country code {:?} not in static table", country_code);
        }
        name
    }
}

/// Fetches the country directory over HTTP on every lookup
pub struct RemoteCountryTable {
    fetcher: Arc<dyn FetchJson>,
    url: String,
}

impl RemoteCountryTable {
    pub fn new(fetcher: Arc<dyn FetchJson>, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }
}

impl CountryNameLookup for RemoteCountryTable {
    fn country_name(&self, country_code: &str) -> Option<String> {
        let body = match self.fetcher.fetch_json(&self.url, &[]) {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Country name lookup via {} failed: {}", self.url, e);
                return None;
            }
        };

        let table = match table_from_value(&body) {
            Ok(table) => table,
            Err(e) => {
                log::warn!("Country directory at {} is malformed: {}", self.url, e);
                return None;
            }
        };

        table.get(&country_code.trim().to_uppercase()).cloned()
    }
}

fn parse_table(data: &str) -> Result<HashMap<String, String>> {
    let value: Value = serde_json::from_str(data)?;
    table_from_value(&value)
}

fn table_from_value(value: &Value) -> Result<HashMap<String, String>> {
    let object = value
        .as_object()
        .ok_or_else(|| GeoError::InvalidInput("country table must be a JSON object".to_string()))?;

    Ok(object
        .iter()
        .filter_map(|(code, name)| {
            name.as_str()
                .map(|n| (code.trim().to_uppercase(), n.to_string()))
        })
        .collect())
}
