use serde::Serialize;

use crate::ephemeris::{Body, Coordinates};
use crate::houses::HouseData;
use crate::motion::Motion;
use crate::time::Instant;
use crate::zodiac::ZodiacPosition;

/// One body in an assembled chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyPlacement {
    pub body: Body,
    /// Longitude speed in degrees per day
    pub speed: f64,
    pub position: ZodiacPosition,
    pub motion: Motion,
    /// House 1..=12, `None` when the chart has no houses
    pub house: Option<u8>,
}

impl BodyPlacement {
    pub fn longitude(&self) -> f64 {
        self.position.longitude
    }
}

/// A computed chart. Built once per request and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub instant: Instant,
    pub location: Coordinates,
    pub placements: Vec<BodyPlacement>,
    pub houses: Option<HouseData>,
}

impl Chart {
    pub fn placement(&self, body: Body) -> Option<&BodyPlacement> {
        self.placements.iter().find(|p| p.body == body)
    }
}

/// A natal body moved forward by the progression arc.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressedPlacement {
    pub body: Body,
    pub natal_longitude: f64,
    pub position: ZodiacPosition,
}
