//! House cusps, chart angles, and body-to-house assignment.

use serde::Serialize;

use crate::ephemeris::{Coordinates, HouseSystem, PositionProvider, ProviderError};
use crate::error::ChartError;
use crate::zodiac::normalize;

/// Twelve cusp longitudes forming a cyclic partition of the ecliptic.
///
/// House `i` spans from cusp `i` forward (increasing, mod 360) to cusp `i + 1`,
/// with cusp 13 aliased to cusp 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HouseCusps([f64; 12]);

impl HouseCusps {
    /// Normalize and validate raw cusps.
    ///
    /// Returns `None` when the cusps do not walk once around the circle in
    /// increasing order.
    pub fn new(raw: [f64; 12]) -> Option<Self> {
        if raw.iter().any(|c| !c.is_finite()) {
            return None;
        }
        let cusps = raw.map(normalize);

        let mut total = 0.0;
        for i in 0..12 {
            let gap = normalize(cusps[(i + 1) % 12] - cusps[i]);
            if gap <= 0.0 {
                return None;
            }
            total += gap;
        }
        if (total - 360.0).abs() > 1e-6 {
            return None;
        }
        Some(Self(cusps))
    }

    /// Cusp of house `house` (1..=12).
    pub fn cusp(&self, house: u8) -> Option<f64> {
        self.0.get(usize::from(house).checked_sub(1)?).copied()
    }

    pub fn as_array(&self) -> &[f64; 12] {
        &self.0
    }

    /// House (1..=12) containing `longitude`.
    ///
    /// Intervals are closed at the lower cusp and open at the upper one, so a
    /// longitude exactly on a cusp belongs to the house starting there.
    pub fn house_of(&self, longitude: f64) -> Result<u8, ChartError> {
        let base = self.0[0];
        let rel = normalize(longitude - base);

        for i in 0..12 {
            let start = normalize(self.0[i] - base);
            let end = if i == 11 {
                360.0
            } else {
                normalize(self.0[i + 1] - base)
            };
            if start <= rel && rel < end {
                return Ok(i as u8 + 1);
            }
        }
        Err(ChartError::HouseAssignmentFailed { longitude })
    }
}

/// Chart angles, normalized to [0, 360)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Angles {
    pub ascendant: f64,
    pub midheaven: f64,
    pub descendant: f64,
    pub imum_coeli: f64,
}

impl Angles {
    pub fn new(ascendant: f64, midheaven: f64) -> Self {
        let asc = normalize(ascendant);
        let mc = normalize(midheaven);
        Self {
            ascendant: asc,
            midheaven: mc,
            descendant: normalize(asc + 180.0),
            imum_coeli: normalize(mc + 180.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HouseData {
    pub system: HouseSystem,
    pub cusps: HouseCusps,
    pub angles: Angles,
}

/// Delegates to the provider's house routine and canonicalizes the result.
pub struct HouseCalculator<'a> {
    provider: &'a dyn PositionProvider,
}

impl<'a> HouseCalculator<'a> {
    pub fn new(provider: &'a dyn PositionProvider) -> Self {
        Self { provider }
    }

    pub fn calculate(
        &self,
        jd: f64,
        location: &Coordinates,
        system: HouseSystem,
    ) -> Result<HouseData, ChartError> {
        let undefined = || ChartError::HouseSystemUndefined {
            system: system.name().to_string(),
            latitude: location.latitude,
        };

        let raw = match self.provider.houses(jd, location, system) {
            Ok(raw) => raw,
            Err(ProviderError::HouseSystemUndefined(_))
            | Err(ProviderError::HouseCalculationFailed { .. }) => return Err(undefined()),
            Err(e) => return Err(e.into()),
        };

        let cusps = HouseCusps::new(raw.cusps).ok_or_else(undefined)?;
        let angles = Angles::new(raw.ascendant, raw.midheaven);

        Ok(HouseData {
            system,
            cusps,
            angles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{Body, Observer, RawHouses, RawPosition};

    fn cusps_from(start: f64, widths: [f64; 12]) -> [f64; 12] {
        let mut out = [0.0; 12];
        let mut acc = start;
        for (i, w) in widths.iter().enumerate() {
            out[i] = acc;
            acc += w;
        }
        out
    }

    fn uneven() -> HouseCusps {
        // Porphyry-like: quadrants of 100, 80, 100, 80 degrees starting in Leo
        let w = [33.0, 33.0, 34.0, 26.0, 27.0, 27.0, 33.0, 33.0, 34.0, 26.0, 27.0, 27.0];
        HouseCusps::new(cusps_from(130.0, w)).unwrap()
    }

    #[test]
    fn test_new_normalizes_and_validates() {
        let cusps = uneven();
        assert!(cusps.as_array().iter().all(|c| (0.0..360.0).contains(c)));
        assert_eq!(cusps.cusp(1), Some(130.0));
        assert_eq!(cusps.cusp(13), None);
        assert_eq!(cusps.cusp(0), None);

        // out of order
        let mut bad = cusps_from(0.0, [30.0; 12]);
        bad.swap(3, 4);
        assert!(HouseCusps::new(bad).is_none());
        // collapsed
        assert!(HouseCusps::new([10.0; 12]).is_none());
        assert!(HouseCusps::new([f64::NAN; 12]).is_none());
    }

    #[test]
    fn test_every_longitude_gets_one_house() {
        let cusps = uneven();
        let mut lon = 0.0;
        while lon < 360.0 {
            let house = cusps.house_of(lon).unwrap();
            assert!((1..=12).contains(&house));
            lon += 0.25;
        }
    }

    #[test]
    fn test_cusp_is_lower_inclusive() {
        let cusps = uneven();
        for house in 1..=12u8 {
            let cusp = cusps.cusp(house).unwrap();
            assert_eq!(cusps.house_of(cusp).unwrap(), house);
            let before = if house == 1 { 12 } else { house - 1 };
            assert_eq!(cusps.house_of(cusp - 1e-6).unwrap(), before);
        }
    }

    #[test]
    fn test_wraparound_house() {
        // house 8 spans 349..16 across 0 Aries
        let cusps = HouseCusps::new(cusps_from(139.0, [30.0; 12])).unwrap();
        assert_eq!(cusps.cusp(8), Some(349.0));
        assert_eq!(cusps.house_of(355.0).unwrap(), 8);
        assert_eq!(cusps.house_of(0.0).unwrap(), 8);
        assert_eq!(cusps.house_of(18.9).unwrap(), 8);
        assert_eq!(cusps.house_of(19.0).unwrap(), 9);
        assert_eq!(cusps.house_of(720.0 + 5.0).unwrap(), 8);
    }

    #[test]
    fn test_angles_derive_opposites() {
        let angles = Angles::new(350.0, -100.0);
        assert_eq!(angles.ascendant, 350.0);
        assert_eq!(angles.descendant, 170.0);
        assert_eq!(angles.midheaven, 260.0);
        assert_eq!(angles.imum_coeli, 80.0);
    }

    struct PolarProvider;

    impl PositionProvider for PolarProvider {
        fn body_position(&self, jd: f64, body: Body, _: &Observer) -> Result<RawPosition, ProviderError> {
            Err(ProviderError::CalculationFailed {
                body,
                jd,
                message: "unused".into(),
            })
        }

        fn houses(&self, _: f64, _: &Coordinates, system: HouseSystem) -> Result<RawHouses, ProviderError> {
            match system {
                HouseSystem::Placidus => Err(ProviderError::HouseSystemUndefined(system)),
                _ => Ok(RawHouses {
                    cusps: [0.0; 12],
                    ascendant: 0.0,
                    midheaven: 270.0,
                }),
            }
        }
    }

    #[test]
    fn test_calculator_surfaces_undefined_systems() {
        let calc = HouseCalculator::new(&PolarProvider);
        let north = Coordinates::new(80.0, 10.0).unwrap();
        let placidus = calc.calculate(2_451_545.0, &north, HouseSystem::Placidus);
        assert!(matches!(placidus, Err(ChartError::HouseSystemUndefined { .. })));
        // degenerate cusps are rejected rather than passed through
        let porphyry = calc.calculate(2_451_545.0, &north, HouseSystem::Porphyry);
        assert!(matches!(porphyry, Err(ChartError::HouseSystemUndefined { .. })));
    }
}
