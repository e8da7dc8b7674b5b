//! HTTP clients for the geocoding and timezone-lookup services.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::ephemeris::Coordinates;
use crate::error::ServiceError;
use crate::location::Geocoder;
use crate::time::TimezoneLookup;

fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, ServiceError> {
    Ok(Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?)
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Nominatim-compatible `search` endpoint.
pub struct NominatimGeocoder {
    client: Client,
    url: String,
}

impl NominatimGeocoder {
    pub fn new(url: &str, user_agent: &str, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            client: build_client(user_agent, timeout)?,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, ServiceError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?;

        let places: Vec<NominatimPlace> = response.json().await?;
        let Some(first) = places.into_iter().next() else {
            return Ok(None);
        };

        let parse = |field: &str, value: &str| {
            value
                .parse::<f64>()
                .map_err(|_| ServiceError::Malformed(format!("{field} = {value:?}")))
        };
        let coords = Coordinates::new(parse("lat", &first.lat)?, parse("lon", &first.lon)?)
            .map_err(|e| ServiceError::Malformed(e.to_string()))?;
        Ok(Some(coords))
    }
}

#[derive(Debug, Deserialize)]
struct ZoneResponse {
    #[serde(alias = "timezone", alias = "zoneName")]
    #[serde(rename = "timeZone")]
    time_zone: Option<String>,
}

/// Coordinate-to-zone endpoint answering `{"timeZone": "Area/City"}`.
pub struct HttpTimezoneLookup {
    client: Client,
    url: String,
}

impl HttpTimezoneLookup {
    pub fn new(url: &str, user_agent: &str, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            client: build_client(user_agent, timeout)?,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl TimezoneLookup for HttpTimezoneLookup {
    async fn zone_at(&self, location: &Coordinates) -> Result<Option<String>, ServiceError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
            ])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: ZoneResponse = response.error_for_status()?.json().await?;
        Ok(body.time_zone.filter(|z| !z.is_empty()))
    }
}
