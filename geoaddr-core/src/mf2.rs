use serde_json::{json, Map, Value};

use crate::address::CanonicalAddress;

impl CanonicalAddress {
    /// Render as a microformats-2 `h-adr` item
    ///
    /// Each property is a single-element array. The display name stands in
    /// for `name` when the place has no name of its own; `raw` is left out.
    pub fn to_h_adr(&self) -> Value {
        let mut properties = Map::new();
        let mut text = |key: &str, value: Option<&str>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                properties.insert(key.to_string(), json!([value]));
            }
        };

        let name = self
            .name
            .as_deref()
            .or(Some(self.display_name.as_str()));
        text("name", name);
        text("street-address", self.street_address.as_deref());
        text("extended-address", self.extended_address.as_deref());
        text("locality", self.locality.as_deref());
        text("region", self.region.as_deref());
        text("postal-code", self.postal_code.as_deref());
        text("country-name", self.country_name.as_deref());
        text("country-code", Some(self.country_code.as_str()));
        text("url", self.url.as_deref());
        text("photo", self.photo.as_deref());

        properties.insert("latitude".to_string(), json!([self.latitude]));
        properties.insert("longitude".to_string(), json!([self.longitude]));

        json!({
            "type": ["h-adr"],
            "properties": properties,
        })
    }
}
