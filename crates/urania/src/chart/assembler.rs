use log::debug;

use crate::chart::types::{BodyPlacement, Chart};
use crate::ephemeris::{Body, Coordinates, HouseSystem, Observer, PositionProvider};
use crate::error::ChartError;
use crate::houses::HouseCalculator;
use crate::motion::Motion;
use crate::time::Instant;
use crate::zodiac::ZodiacPosition;

/// Per-request chart options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    /// `None` skips house computation; placements then carry no house.
    pub house_system: Option<HouseSystem>,
    pub topocentric: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            house_system: Some(HouseSystem::default()),
            topocentric: false,
        }
    }
}

/// Composes provider output, houses, motion and zodiac labels into a [`Chart`].
pub struct ChartAssembler<'a> {
    provider: &'a dyn PositionProvider,
}

impl<'a> ChartAssembler<'a> {
    pub fn new(provider: &'a dyn PositionProvider) -> Self {
        Self { provider }
    }

    pub fn assemble(
        &self,
        instant: Instant,
        location: Coordinates,
        options: &ChartOptions,
    ) -> Result<Chart, ChartError> {
        let jd = instant.julian_day;
        let observer = if options.topocentric {
            Observer::Topocentric(location)
        } else {
            Observer::Geocentric
        };

        let houses = options
            .house_system
            .map(|system| HouseCalculator::new(self.provider).calculate(jd, &location, system))
            .transpose()?;

        let mut placements = Vec::with_capacity(Body::ALL.len());
        for body in Body::ALL {
            let raw = self.provider.body_position(jd, body, &observer)?;
            let position = ZodiacPosition::from_longitude(raw.longitude);
            let house = match &houses {
                Some(h) => Some(h.cusps.house_of(position.longitude)?),
                None => None,
            };
            placements.push(BodyPlacement {
                body,
                speed: raw.speed_longitude,
                position,
                motion: Motion::from_speed(raw.speed_longitude),
                house,
            });
        }
        debug!(
            "assembled chart at JD {:.5} ({} bodies, houses: {})",
            jd,
            placements.len(),
            houses.is_some()
        );

        Ok(Chart {
            instant,
            location,
            placements,
            houses,
        })
    }
}
