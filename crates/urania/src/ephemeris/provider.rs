use crate::ephemeris::types::{
    Body, Coordinates, HouseSystem, Observer, ProviderError, RawHouses, RawPosition,
};

/// Source of raw ecliptic positions and house cusps.
///
/// Every per-call setting (observer, house system) is an explicit argument;
/// implementations hold no request-dependent state, so one instance can be
/// shared by concurrent requests.
pub trait PositionProvider: Send + Sync {
    fn body_position(
        &self,
        jd: f64,
        body: Body,
        observer: &Observer,
    ) -> Result<RawPosition, ProviderError>;

    fn houses(
        &self,
        jd: f64,
        location: &Coordinates,
        system: HouseSystem,
    ) -> Result<RawHouses, ProviderError>;
}
