//! Patient location auto-detect via IP geolocation

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::LocationError;

/// Default IP geolocation endpoint
pub const DEFAULT_GEOLOCATION_URL: &str = "https://ipapi.co/json/";

/// Kept short so a slow lookup never stalls the form
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(4);

/// Subset of the geolocation response we read
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoLookup {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub postal: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

fn clean(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl GeoLookup {
    /// Best description: "City, Region", else postal code, else country
    pub fn describe(&self) -> Option<String> {
        let region = clean(&self.region).or_else(|| clean(&self.region_code));
        let city_region: Vec<&str> = [clean(&self.city), region].into_iter().flatten().collect();
        if !city_region.is_empty() {
            return Some(city_region.join(", "));
        }

        clean(&self.postal)
            .or_else(|| clean(&self.country_name).or_else(|| clean(&self.country)))
            .map(str::to_string)
    }
}

/// Client for the geolocation endpoint
#[derive(Debug, Clone)]
pub struct LocationClient {
    client: Client,
    url: String,
}

impl LocationClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.into(),
        }
    }

    /// Fetch the raw lookup
    pub async fn lookup(&self) -> Result<GeoLookup, LocationError> {
        debug!("Looking up location via {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(LocationError::Status(response.status().as_u16()));
        }
        Ok(response.json::<GeoLookup>().await?)
    }

    /// Detect a location description, `None` when nothing precise came back
    pub async fn detect(&self) -> Result<Option<String>, LocationError> {
        let detected = self.lookup().await?.describe();
        info!("Detected location: {:?}", detected);
        Ok(detected)
    }
}

impl Default for LocationClient {
    fn default() -> Self {
        Self::new(DEFAULT_GEOLOCATION_URL, DEFAULT_LOOKUP_TIMEOUT)
    }
}
