use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{GeoError, Result};

/// Provider-shaped address payload, e.g. the `address` object of a Nominatim
/// response. Keys vary by provider and by location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawAddress(BTreeMap<String, String>);

impl RawAddress {
    /// Build from a decoded JSON value
    ///
    /// The value must be an object. `null` members are skipped, numbers and
    /// booleans are kept in their textual form, nested arrays or objects are
    /// rejected.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            GeoError::InvalidInput(format!(
                "address must be a JSON object, got {}",
                json_kind(value)
            ))
        })?;

        let mut fields = BTreeMap::new();
        for (key, member) in object {
            let text = match member {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(GeoError::InvalidInput(format!(
                        "address field `{}` is {}, expected a scalar",
                        key,
                        json_kind(member)
                    )));
                }
            };
            fields.insert(key.clone(), text);
        }

        Ok(Self(fields))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawAddress {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Returns the first candidate key holding a non-blank value, trimmed.
///
/// Only `keys` decides precedence; the map's own ordering never does.
pub fn pick_first<'a>(map: &'a RawAddress, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| map.get(key))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Canonical address record, serialized with microformats-2 property names.
///
/// Optional members are omitted from the output instead of being written as
/// `null` or `""`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CanonicalAddress {
    /// Landmark or building name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    /// Borough, neighbourhood or suburb
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// ISO 3166-1 alpha-2, always uppercase
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Website of the place (forward geocoding only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Image of the place (forward geocoding only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    /// Provider payload kept for diagnostics
    #[serde(skip_serializing_if = "Value::is_null")]
    pub raw: Value,
}

impl CanonicalAddress {
    /// Fields that make up the display name, highest priority first
    pub fn display_parts(&self) -> impl Iterator<Item = &str> {
        [
            &self.name,
            &self.street_address,
            &self.extended_address,
            &self.locality,
            &self.region,
            &self.postal_code,
            &self.country_name,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
    }

    /// Human-readable one-line rendering of the populated fields
    pub fn compose_display_name(&self) -> String {
        self.display_parts().collect::<Vec<_>>().join(", ")
    }

    /// Serialize to a sparse JSON object
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Trim and drop blank values
pub(crate) fn non_empty<S: AsRef<str>>(value: Option<S>) -> Option<String> {
    value
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
}
