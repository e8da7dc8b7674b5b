use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ChartError;

/// Geographic location coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, north positive (-90..=90)
    pub latitude: f64,
    /// Longitude in degrees, east positive (-180..=180)
    pub longitude: f64,
    /// Altitude above sea level in meters
    #[serde(default)]
    pub altitude: f64,
}

impl Coordinates {
    /// Validated constructor; altitude defaults to sea level.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ChartError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ChartError::CoordinatesOutOfRange {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
            altitude: 0.0,
        })
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }
}

/// Where positions are observed from. Passed on every provider call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observer {
    Geocentric,
    Topocentric(Coordinates),
}

/// Bodies a chart reports, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    MeanNode,
    TrueNode,
}

// Swiss Ephemeris planet ids
const BODY_CODES: &[(Body, i32)] = &[
    (Body::Sun, 0),
    (Body::Moon, 1),
    (Body::Mercury, 2),
    (Body::Venus, 3),
    (Body::Mars, 4),
    (Body::Jupiter, 5),
    (Body::Saturn, 6),
    (Body::Uranus, 7),
    (Body::Neptune, 8),
    (Body::Pluto, 9),
    (Body::MeanNode, 10),
    (Body::TrueNode, 11),
];

impl Body {
    pub const ALL: [Body; 12] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
        Body::MeanNode,
        Body::TrueNode,
    ];

    pub fn swiss_code(self) -> i32 {
        BODY_CODES
            .iter()
            .find(|(body, _)| *body == self)
            .map(|(_, code)| *code)
            .unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
            Body::MeanNode => "Mean Node",
            Body::TrueNode => "True Node",
        }
    }

    /// Lunar nodes are computed points without a physical distance.
    pub fn is_point(self) -> bool {
        matches!(self, Body::MeanNode | Body::TrueNode)
    }
}

/// House system mapping: (name, Swiss Ephemeris code)
const HOUSE_SYSTEMS: &[(HouseSystem, &str, u8)] = &[
    (HouseSystem::Porphyry, "porphyry", b'O'),
    (HouseSystem::Placidus, "placidus", b'P'),
    (HouseSystem::Koch, "koch", b'K'),
    (HouseSystem::Equal, "equal", b'E'),
    (HouseSystem::WholeSign, "whole_sign", b'W'),
    (HouseSystem::Regiomontanus, "regiomontanus", b'R'),
    (HouseSystem::Campanus, "campanus", b'C'),
    (HouseSystem::Alcabitius, "alcabitius", b'B'),
    (HouseSystem::Morinus, "morinus", b'M'),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseSystem {
    #[default]
    Porphyry,
    Placidus,
    Koch,
    Equal,
    WholeSign,
    Regiomontanus,
    Campanus,
    Alcabitius,
    Morinus,
}

impl HouseSystem {
    pub fn parse(name: &str) -> Result<Self, ChartError> {
        let wanted = name.trim().to_lowercase();
        HOUSE_SYSTEMS
            .iter()
            .find(|(_, n, _)| *n == wanted)
            .map(|(system, _, _)| *system)
            .ok_or_else(|| ChartError::UnknownHouseSystem {
                system: name.to_string(),
                valid: HOUSE_SYSTEMS.iter().map(|(_, n, _)| n.to_string()).collect(),
            })
    }

    pub fn name(self) -> &'static str {
        HOUSE_SYSTEMS
            .iter()
            .find(|(system, _, _)| *system == self)
            .map(|(_, n, _)| *n)
            .unwrap_or("porphyry")
    }

    pub fn code(self) -> u8 {
        HOUSE_SYSTEMS
            .iter()
            .find(|(system, _, _)| *system == self)
            .map(|(_, _, code)| *code)
            .unwrap_or(b'O')
    }

    /// Maximum |latitude| at which the system is defined.
    pub fn latitude_limit(self) -> Option<f64> {
        match self {
            HouseSystem::Placidus | HouseSystem::Koch => Some(66.5),
            _ => None,
        }
    }
}

/// Raw ecliptic position as returned by a provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPosition {
    /// Longitude in degrees (not necessarily normalized)
    pub longitude: f64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Distance in AU (0 for computed points)
    pub distance: f64,
    /// Speed in longitude (degrees per day)
    pub speed_longitude: f64,
}

/// Raw house data as returned by a provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawHouses {
    pub cusps: [f64; 12],
    pub ascendant: f64,
    pub midheaven: f64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("position calculation failed for {body:?} at JD {jd}: {message}")]
    CalculationFailed { body: Body, jd: f64, message: String },
    #[error("house calculation failed: {message}")]
    HouseCalculationFailed { message: String },
    #[error("house system {0:?} is undefined at this latitude")]
    HouseSystemUndefined(HouseSystem),
}
