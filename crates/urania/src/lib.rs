//! Tropical chart computation: natal placements, houses, transits and
//! solar arc progressions over a pluggable ephemeris.

pub mod chart;
pub mod ephemeris;
pub mod error;
pub mod houses;
pub mod location;
pub mod motion;
pub mod remote;
pub mod time;
pub mod zodiac;

pub use chart::{Chart, ChartDefaults, ChartService};
pub use ephemeris::{Body, Coordinates, HouseSystem, PositionProvider, SwissEphemerisAdapter};
pub use error::{ChartError, ErrorKind};
pub use zodiac::{Sign, ZodiacPosition};
