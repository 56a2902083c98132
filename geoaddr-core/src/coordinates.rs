use regex::Regex;
use std::fmt;

use crate::error::{GeoError, Result};

lazy_static::lazy_static! {
    static ref DECIMAL_COORDINATE: Regex = Regex::new(r"^(-)?(\d{1,3})\.(\d{1,15})").unwrap();
}

/// A validated latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::InvalidInput(format!(
                "latitude {} outside [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::InvalidInput(format!(
                "longitude {} outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Example: "37.7749N 122.4194W"
impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat_dir = if self.latitude >= 0.0 { "N" } else { "S" };
        let lon_dir = if self.longitude >= 0.0 { "E" } else { "W" };
        write!(
            f,
            "{:.4}{} {:.4}{}",
            self.latitude.abs(),
            lat_dir,
            self.longitude.abs(),
            lon_dir
        )
    }
}

/// Extracts a decimal coordinate from the start of user input
///
/// Accepts an optional minus sign, up to three integer digits and up to
/// fifteen fractional digits; anything after that is ignored. Input without
/// a fractional part is rejected.
pub fn clean_coordinate(input: &str) -> Option<f64> {
    let captures = DECIMAL_COORDINATE.captures(input.trim())?;
    captures.get(0)?.as_str().parse().ok()
}
