use reqwest::header::ACCEPT;
use serde_json::Value;
use std::io::Read;
use std::time::Duration;

use crate::config::GeocodeConfig;
use crate::error::{GeoError, Result};

/// Largest response body accepted from a provider (1 MiB)
pub const MAX_RESPONSE_BYTES: u64 = 1_048_576;

/// Issues a GET request and decodes the body as JSON
///
/// Implementations surface transport failures and non-2xx statuses as
/// upstream errors and never retry.
pub trait FetchJson {
    fn fetch_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value>;
}

/// Blocking `reqwest` implementation of [`FetchJson`]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(1))
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &GeocodeConfig) -> Result<Self> {
        Self::new(&config.user_agent, config.timeout)
    }
}

impl FetchJson for HttpFetcher {
    fn fetch_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        log::debug!("GET {} ({} query parameters)", url, query.len());

        let response = self
            .client
            .get(url)
            .query(query)
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("{} answered {}", url, status);
            // Error pages can be large; keep at most the capped prefix
            let mut body = read_capped(response).unwrap_or_else(|e| {
                log::debug!("Failed to read error body from {}: {}", url, e);
                Vec::new()
            });
            body.truncate(MAX_RESPONSE_BYTES as usize);
            return Err(GeoError::UpstreamStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        if let Some(length) = response.content_length() {
            if length > MAX_RESPONSE_BYTES {
                return Err(GeoError::InvalidInput(format!(
                    "response from {} is {} bytes, limit is {}",
                    url, length, MAX_RESPONSE_BYTES
                )));
            }
        }

        // Content-Length may be absent; cap the read as well
        let body = read_capped(response)
            .map_err(|e| GeoError::InvalidInput(format!("failed to read response body: {}", e)))?;
        if body.len() as u64 > MAX_RESPONSE_BYTES {
            return Err(GeoError::InvalidInput(format!(
                "response from {} exceeds {} bytes",
                url, MAX_RESPONSE_BYTES
            )));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

/// Read at most one byte past the cap so oversized bodies can be detected
fn read_capped(response: reqwest::blocking::Response) -> std::io::Result<Vec<u8>> {
    let mut body = Vec::new();
    response.take(MAX_RESPONSE_BYTES + 1).read_to_end(&mut body)?;
    Ok(body)
}
