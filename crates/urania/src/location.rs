//! Location specifier to coordinates.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

use crate::ephemeris::Coordinates;
use crate::error::{ChartError, ServiceError};

/// Resolves a free-text place name to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, ServiceError>;
}

/// How the caller identified the location.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates(Coordinates),
    Place(String),
}

impl LocationQuery {
    /// Build a query from the loose request fields.
    ///
    /// Explicit coordinates win over a place name. A lone latitude or
    /// longitude is an error rather than a silent fallback to the place.
    pub fn from_parts(
        latitude: Option<f64>,
        longitude: Option<f64>,
        place: Option<&str>,
    ) -> Result<Self, ChartError> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Ok(LocationQuery::Coordinates(Coordinates::new(lat, lon)?)),
            (Some(_), None) => Err(ChartError::MissingField("longitude")),
            (None, Some(_)) => Err(ChartError::MissingField("latitude")),
            (None, None) => match place.map(str::trim).filter(|p| !p.is_empty()) {
                Some(p) => Ok(LocationQuery::Place(p.to_string())),
                None => Err(ChartError::LocationMissing),
            },
        }
    }
}

pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    timeout: Duration,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, timeout: Duration) -> Self {
        Self { geocoder, timeout }
    }

    /// Coordinates pass through; a place name costs exactly one geocoder call.
    /// Failures are not retried here.
    pub async fn resolve(&self, query: &LocationQuery) -> Result<Coordinates, ChartError> {
        let place = match query {
            LocationQuery::Coordinates(c) => return Ok(*c),
            LocationQuery::Place(place) => place,
        };

        debug!("geocoding {:?}", place);
        match tokio::time::timeout(self.timeout, self.geocoder.geocode(place)).await {
            Err(_) => {
                warn!("geocoder timed out after {:?} for {:?}", self.timeout, place);
                Err(ChartError::Timeout {
                    service: "geocoder",
                    timeout: self.timeout,
                })
            }
            Ok(Err(e)) => Err(ChartError::Collaborator {
                service: "geocoder",
                message: e.to_string(),
            }),
            Ok(Ok(None)) => Err(ChartError::LocationNotFound(place.clone())),
            Ok(Ok(Some(coords))) => Ok(coords),
        }
    }
}
