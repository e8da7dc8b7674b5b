//! The request pipeline shared by natal, transit and solar arc charts.
//!
//! location → zone → instant → (blocking) provider loop, houses, assembly.
//! The three entry points differ only in which instant they use and whether
//! houses are computed.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use log::debug;

use crate::chart::assembler::{ChartAssembler, ChartOptions};
use crate::chart::progression::{CivilSpan, ProgressionEngine, ProgressionMethod, ProgressionResult};
use crate::chart::transit::transit_chart;
use crate::chart::types::Chart;
use crate::ephemeris::{Coordinates, HouseSystem, PositionProvider};
use crate::error::ChartError;
use crate::location::{LocationQuery, LocationResolver};
use crate::time::{CivilDateTime, Instant, TimeResolver, ZoneSource};

/// Service-wide defaults that requests may override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartDefaults {
    pub house_system: HouseSystem,
    pub topocentric: bool,
    pub default_zone: Tz,
    /// Derive the civil zone from the chart location instead of `default_zone`.
    pub zone_from_coordinates: bool,
    pub transit_location: Coordinates,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NatalRequest {
    pub civil: CivilDateTime,
    pub location: LocationQuery,
    pub timezone: Option<Tz>,
    pub house_system: Option<HouseSystem>,
    pub topocentric: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransitRequest {
    /// `None` uses the configured reference location.
    pub location: Option<LocationQuery>,
    pub house_system: Option<HouseSystem>,
    pub topocentric: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolarArcRequest {
    pub birth: CivilDateTime,
    /// `None` progresses to the current instant.
    pub target: Option<NaiveDate>,
    pub location: LocationQuery,
    pub timezone: Option<Tz>,
    pub method: ProgressionMethod,
    pub topocentric: Option<bool>,
}

pub struct ChartService {
    provider: Arc<dyn PositionProvider>,
    locations: LocationResolver,
    times: TimeResolver,
    defaults: ChartDefaults,
}

impl ChartService {
    pub fn new(
        provider: Arc<dyn PositionProvider>,
        locations: LocationResolver,
        times: TimeResolver,
        defaults: ChartDefaults,
    ) -> Self {
        Self {
            provider,
            locations,
            times,
            defaults,
        }
    }

    pub fn defaults(&self) -> &ChartDefaults {
        &self.defaults
    }

    fn options(&self, house_system: Option<HouseSystem>, topocentric: Option<bool>) -> ChartOptions {
        ChartOptions {
            house_system: Some(house_system.unwrap_or(self.defaults.house_system)),
            topocentric: topocentric.unwrap_or(self.defaults.topocentric),
        }
    }

    async fn zone_for(&self, location: Coordinates, explicit: Option<Tz>) -> Result<Tz, ChartError> {
        let source = match explicit {
            Some(tz) => ZoneSource::Fixed(tz),
            None if self.defaults.zone_from_coordinates => ZoneSource::FromCoordinates(location),
            None => ZoneSource::Fixed(self.defaults.default_zone),
        };
        self.times.zone(&source).await
    }

    /// Run provider work off the async workers.
    async fn compute<T, F>(&self, work: F) -> Result<T, ChartError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn PositionProvider) -> Result<T, ChartError> + Send + 'static,
    {
        let provider = Arc::clone(&self.provider);
        tokio::task::spawn_blocking(move || work(provider.as_ref()))
            .await
            .map_err(|e| ChartError::Collaborator {
                service: "ephemeris",
                message: format!("worker failed: {e}"),
            })?
    }

    pub async fn natal(&self, request: NatalRequest) -> Result<Chart, ChartError> {
        let location = self.locations.resolve(&request.location).await?;
        let tz = self.zone_for(location, request.timezone).await?;
        let instant = self.times.localize(&request.civil, tz)?;
        debug!("natal chart for {} at {:?}", instant.formatted(), location);

        let options = self.options(request.house_system, request.topocentric);
        self.compute(move |provider| ChartAssembler::new(provider).assemble(instant, location, &options))
            .await
    }

    pub async fn transit(&self, request: TransitRequest) -> Result<Chart, ChartError> {
        self.transit_at(request, Utc::now()).await
    }

    pub async fn transit_at(
        &self,
        request: TransitRequest,
        now: DateTime<Utc>,
    ) -> Result<Chart, ChartError> {
        let location = match &request.location {
            Some(query) => self.locations.resolve(query).await?,
            None => self.defaults.transit_location,
        };
        let options = self.options(request.house_system, request.topocentric);
        self.compute(move |provider| transit_chart(provider, now, location, &options))
            .await
    }

    pub async fn solar_arc(&self, request: SolarArcRequest) -> Result<ProgressionResult, ChartError> {
        self.solar_arc_at(request, Utc::now()).await
    }

    pub async fn solar_arc_at(
        &self,
        request: SolarArcRequest,
        now: DateTime<Utc>,
    ) -> Result<ProgressionResult, ChartError> {
        let location = self.locations.resolve(&request.location).await?;
        let tz = self.zone_for(location, request.timezone).await?;
        let natal = self.times.localize(&request.birth, tz)?;

        let (target, target_date) = match request.target {
            Some(date) => {
                // the natal clock time on the target date; a DST gap moves it forward
                let civil = CivilDateTime::new(
                    date.year(),
                    date.month(),
                    date.day(),
                    request.birth.hour,
                    request.birth.minute,
                );
                (self.times.localize_forward(&civil, tz)?, date)
            }
            None => (
                Instant::from_utc(now),
                now.with_timezone(&tz).date_naive(),
            ),
        };
        let span = CivilSpan {
            birth: request.birth.date()?,
            target: target_date,
        };
        debug!(
            "solar arc ({}) from {} to {}",
            request.method.name(),
            natal.formatted(),
            target.formatted()
        );

        // progression moves longitudes only; houses are not needed
        let options = ChartOptions {
            house_system: None,
            ..self.options(None, request.topocentric)
        };
        let method = request.method;
        self.compute(move |provider| {
            let chart = ChartAssembler::new(provider).assemble(natal, location, &options)?;
            ProgressionEngine::new(provider).progress(chart, target, span, method)
        })
        .await
    }
}
