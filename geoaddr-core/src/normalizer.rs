use serde_json::Value;

use crate::address::{non_empty, pick_first, CanonicalAddress, RawAddress};
use crate::country::CountryNameLookup;
use crate::error::{GeoError, Result};

const NAME_KEYS: &[&str] = &["attraction", "building", "hotel", "address29", "address26"];
const ROAD_KEYS: &[&str] = &["road", "highway", "footway"];
const EXTENDED_KEYS: &[&str] = &["boro", "neighbourhood", "suburb"];
const LOCALITY_KEYS: &[&str] = &["hamlet", "village", "town", "city"];
const COUNTRY_KEYS: &[&str] = &["country"];
const POSTCODE_KEYS: &[&str] = &["postcode"];

/// US addresses are better described by their state than their county
const REGION_KEYS_US: &[&str] = &["state", "county"];
const REGION_KEYS_DEFAULT: &[&str] = &["county", "state"];

/// Map a provider address payload onto a [`CanonicalAddress`]
///
/// `latitude`/`longitude` are echoed from the request. The country name is
/// taken from the payload when present, otherwise from `countries`.
/// `raw` on the result holds the payload itself.
pub fn normalize(
    raw_address: &Value,
    latitude: f64,
    longitude: f64,
    countries: &dyn CountryNameLookup,
) -> Result<CanonicalAddress> {
    let address = RawAddress::from_json(raw_address)?;
    let mut canonical = normalize_address(&address, latitude, longitude, countries)?;
    canonical.raw = raw_address.clone();
    Ok(canonical)
}

/// [`normalize`] for an already parsed payload
///
/// `raw` is rebuilt from `address`, so it holds the string form of every
/// member that survived parsing.
pub fn normalize_address(
    address: &RawAddress,
    latitude: f64,
    longitude: f64,
    countries: &dyn CountryNameLookup,
) -> Result<CanonicalAddress> {
    let country_code = pick_first(address, &["country_code"])
        .ok_or(GeoError::IncompleteAddress {
            field: "country_code",
        })?
        .to_uppercase();

    let region_keys = if country_code == "US" {
        REGION_KEYS_US
    } else {
        REGION_KEYS_DEFAULT
    };

    let street = format!(
        "{} {}",
        pick_first(address, &["house_number"]).unwrap_or_default(),
        pick_first(address, ROAD_KEYS).unwrap_or_default()
    );

    let country_name = non_empty(pick_first(address, COUNTRY_KEYS)).or_else(|| {
        log::debug!("No country in payload, looking up {}", country_code);
        non_empty(countries.country_name(&country_code))
    });
    if country_name.is_none() {
        log::warn!("No country name known for code {}", country_code);
    }

    let mut canonical = CanonicalAddress {
        name: non_empty(pick_first(address, NAME_KEYS)),
        street_address: non_empty(Some(street)),
        extended_address: non_empty(pick_first(address, EXTENDED_KEYS)),
        locality: non_empty(pick_first(address, LOCALITY_KEYS)),
        region: non_empty(pick_first(address, region_keys)),
        country_name,
        postal_code: non_empty(pick_first(address, POSTCODE_KEYS)),
        country_code,
        latitude,
        longitude,
        url: None,
        photo: None,
        display_name: String::new(),
        raw: address.to_json(),
    };
    canonical.display_name = canonical.compose_display_name();

    Ok(canonical)
}
