//! genderize.io client
//!
//! Requires the `genderize` feature:
//! ```toml
//! lexigrade = { version = "0.3", features = ["genderize"] }
//! ```

use super::{Gender, GenderError, GenderResolver};
use log::warn;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.genderize.io";

/// Blocking HTTP resolver. Wrap it in [`super::MemoizedGender`] so each
/// word is requested once.
pub struct GenderizeClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GenderizeResponse {
    #[serde(default)]
    gender: Option<String>,
}

impl GenderizeClient {
    pub fn new(timeout: Duration) -> Result<Self, GenderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenderError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point at another endpoint (self-hosted mirror, test server)
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn fetch(&self, name: &str) -> Result<Gender, GenderError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("name", name)])
            .send()
            .map_err(|e| GenderError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenderError::Request(format!("HTTP {}", status)));
        }

        let body: GenderizeResponse = response
            .json()
            .map_err(|e| GenderError::Decode(e.to_string()))?;
        Ok(body.gender.as_deref().map(Gender::parse).unwrap_or_default())
    }
}

impl GenderResolver for GenderizeClient {
    fn gender(&self, word: &str) -> Gender {
        match self.fetch(word) {
            Ok(gender) => gender,
            Err(e) => {
                warn!("gender lookup for '{}' failed: {}", word, e);
                Gender::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_service_is_unknown() {
        let client = GenderizeClient::new(Duration::from_millis(200))
            .unwrap()
            .base_url("http://127.0.0.1:9/");
        assert_eq!(client.gender("joan"), Gender::Unknown);
    }

    #[test]
    fn test_response_decoding() {
        let r: GenderizeResponse =
            serde_json::from_str(r#"{"name":"joan","gender":null,"probability":0.0}"#).unwrap();
        assert!(r.gender.is_none());
    }
}
