use std::env;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::debug;
use swisseph::swe::{calc_ut, houses_ex};
use swisseph::{AscMc, Cusp};
use thiserror::Error;

use crate::ephemeris::provider::PositionProvider;
use crate::ephemeris::topocentric::apply_parallax;
use crate::ephemeris::types::{
    Body, Coordinates, HouseSystem, Observer, ProviderError, RawHouses, RawPosition,
};

/// Swiss Ephemeris keeps file handles and caches in C statics; every call
/// into the library holds this lock.
static SWISS_LOCK: Mutex<()> = Mutex::new(());

const FLG_SWIEPH: i32 = 2;
const FLG_MOSEPH: i32 = 4;
const FLG_SPEED: i32 = 256;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("ephemeris directory {} does not exist; unset it to use the built-in Moshier model", .0.display())]
    MissingDirectory(PathBuf),
}

/// Swiss Ephemeris implementation of [`PositionProvider`].
pub struct SwissEphemerisAdapter {
    ephemeris_path: Option<PathBuf>,
    flags: i32,
}

impl SwissEphemerisAdapter {
    /// Create an adapter reading data files from `ephemeris_path`.
    ///
    /// Falls back to `SWISS_EPHEMERIS_PATH`; with neither set the built-in
    /// Moshier model is used and no data files are needed.
    pub fn new(ephemeris_path: Option<PathBuf>) -> Result<Self, AdapterError> {
        let path = ephemeris_path.or_else(|| env::var("SWISS_EPHEMERIS_PATH").ok().map(PathBuf::from));

        let flags = match &path {
            Some(p) if !p.exists() => {
                return Err(AdapterError::MissingDirectory(p.clone()));
            }
            Some(_) => FLG_SWIEPH | FLG_SPEED,
            None => FLG_MOSEPH | FLG_SPEED,
        };

        Ok(Self {
            ephemeris_path: path,
            flags,
        })
    }

    pub fn ephemeris_path(&self) -> Option<&Path> {
        self.ephemeris_path.as_deref()
    }

    /// "swiss" when reading data files, "moshier" otherwise.
    pub fn mode(&self) -> &'static str {
        if self.flags & FLG_SWIEPH != 0 {
            "swiss"
        } else {
            "moshier"
        }
    }

    fn geocentric_position(&self, jd: f64, body: Body) -> Result<RawPosition, ProviderError> {
        let result = {
            let _guard = SWISS_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            calc_ut(jd, body.swiss_code() as u32, self.flags as u32)
        }
        .map_err(|e| ProviderError::CalculationFailed {
            body,
            jd,
            message: format!("Swiss Ephemeris error: {}", e),
        })?;

        let out = result.out;
        if out.iter().take(4).any(|v| !v.is_finite()) {
            return Err(ProviderError::CalculationFailed {
                body,
                jd,
                message: "non-finite position".to_string(),
            });
        }

        Ok(RawPosition {
            longitude: out[0],
            latitude: out[1],
            distance: if body.is_point() { 0.0 } else { out[2] },
            speed_longitude: out[3],
        })
    }
}

impl PositionProvider for SwissEphemerisAdapter {
    fn body_position(
        &self,
        jd: f64,
        body: Body,
        observer: &Observer,
    ) -> Result<RawPosition, ProviderError> {
        let geocentric = self.geocentric_position(jd, body)?;
        Ok(match observer {
            Observer::Geocentric => geocentric,
            Observer::Topocentric(location) => apply_parallax(geocentric, jd, location),
        })
    }

    fn houses(
        &self,
        jd: f64,
        location: &Coordinates,
        system: HouseSystem,
    ) -> Result<RawHouses, ProviderError> {
        if let Some(limit) = system.latitude_limit() {
            if location.latitude.abs() > limit {
                return Err(ProviderError::HouseSystemUndefined(system));
            }
        }

        let (c, a) = {
            let _guard = SWISS_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            houses_ex(jd, 0, location.latitude, location.longitude, system.code() as i32)
        };
        let cusps = Cusp::from_array(c);
        let ascmc = AscMc::from_array(a);

        let raw = RawHouses {
            cusps: [
                cusps.first, cusps.second, cusps.third, cusps.fourth,
                cusps.fifth, cusps.sixth, cusps.seventh, cusps.eighth,
                cusps.ninth, cusps.tenth, cusps.eleventh, cusps.twelfth,
            ],
            ascendant: ascmc.ascendant,
            midheaven: ascmc.mc,
        };
        debug!("houses {:?} at JD {}: asc {:.4}", system, jd, raw.ascendant);

        if raw.cusps.iter().chain([&raw.ascendant, &raw.midheaven]).any(|v| !v.is_finite()) {
            return Err(ProviderError::HouseCalculationFailed {
                message: "non-finite cusp".to_string(),
            });
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_is_rejected() {
        let result = SwissEphemerisAdapter::new(Some(PathBuf::from("/nonexistent/ephe")));
        assert!(matches!(result, Err(AdapterError::MissingDirectory(_))));
    }

    #[test]
    fn test_polar_placidus_is_undefined() {
        let adapter = SwissEphemerisAdapter::new(None).unwrap();
        let longyearbyen = Coordinates::new(78.2, 15.6).unwrap();
        let result = adapter.houses(2_451_545.0, &longyearbyen, HouseSystem::Placidus);
        assert_eq!(result, Err(ProviderError::HouseSystemUndefined(HouseSystem::Placidus)));
    }
}
