//! Civil date/time to absolute instant and Julian Day.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{
    DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;
use log::warn;
use serde::Serialize;
use swisseph::swe::julday;

use crate::ephemeris::Coordinates;
use crate::error::{ChartError, ServiceError};

/// A civil (wall clock) date and time. Hour and minute may be fractional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CivilDateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: f64,
    pub minute: f64,
}

impl CivilDateTime {
    pub fn new(year: i32, month: u32, day: u32, hour: f64, minute: f64) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
        }
    }

    pub fn date(&self) -> Result<NaiveDate, ChartError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            ChartError::InvalidCalendarDate(format!(
                "{:04}-{:02}-{:02}",
                self.year, self.month, self.day
            ))
        })
    }

    pub fn to_naive(&self) -> Result<NaiveDateTime, ChartError> {
        let date = self.date()?;
        if !self.hour.is_finite() || !(0.0..24.0).contains(&self.hour) {
            return Err(ChartError::invalid("hour", format!("{} is outside 0..24", self.hour)));
        }
        if !self.minute.is_finite() || !(0.0..60.0).contains(&self.minute) {
            return Err(ChartError::invalid("minute", format!("{} is outside 0..60", self.minute)));
        }

        // hour and minute may both be fractional; their sum must stay inside the day
        let millis = ((self.hour * 3600.0 + self.minute * 60.0) * 1000.0).round() as u32;
        if millis >= 86_400_000 {
            return Err(ChartError::InvalidCalendarDate(format!(
                "{}h {}m runs past the end of {}",
                self.hour, self.minute, date
            )));
        }
        let time = NaiveTime::from_num_seconds_from_midnight_opt(millis / 1000, (millis % 1000) * 1_000_000)
            .ok_or_else(|| ChartError::InvalidCalendarDate(format!("{}h {}m", self.hour, self.minute)))?;
        Ok(date.and_time(time))
    }
}

/// An absolute point in time and its Julian Day (UT).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Instant {
    pub utc: DateTime<Utc>,
    pub julian_day: f64,
}

impl Instant {
    pub fn from_utc(utc: DateTime<Utc>) -> Self {
        Self {
            utc,
            julian_day: datetime_to_julian_day(utc),
        }
    }

    /// `YYYY-MM-DD HH:MM`
    pub fn formatted(&self) -> String {
        self.utc.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Convert UTC datetime to Julian Day (proleptic Gregorian).
pub fn datetime_to_julian_day(dt: DateTime<Utc>) -> f64 {
    let hour = dt.hour() as f64;
    let minute = dt.minute() as f64;
    let second = dt.second() as f64 + dt.nanosecond() as f64 / 1e9;
    let hour_decimal = hour + minute / 60.0 + second / 3600.0;

    // GREG_CAL = 1
    julday(dt.year(), dt.month() as i32, dt.day() as i32, hour_decimal, 1)
}

/// What to do with a wall-clock time that occurs twice (clocks set back).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbiguityPolicy {
    /// Take the occurrence on standard time (the smaller UTC offset).
    #[default]
    PreferStandard,
    Reject,
}

/// Where the civil zone comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneSource {
    Fixed(Tz),
    FromCoordinates(Coordinates),
}

pub fn parse_zone(name: &str) -> Result<Tz, ChartError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ChartError::UnknownTimezone(name.to_string()))
}

/// Resolves coordinates to an IANA zone name.
#[async_trait]
pub trait TimezoneLookup: Send + Sync {
    async fn zone_at(&self, location: &Coordinates) -> Result<Option<String>, ServiceError>;
}

pub struct TimeResolver {
    lookup: Option<Arc<dyn TimezoneLookup>>,
    timeout: Duration,
    policy: AmbiguityPolicy,
}

impl TimeResolver {
    pub fn new(
        lookup: Option<Arc<dyn TimezoneLookup>>,
        timeout: Duration,
        policy: AmbiguityPolicy,
    ) -> Self {
        Self {
            lookup,
            timeout,
            policy,
        }
    }

    /// Resolver that only accepts fixed zones.
    pub fn fixed_only(policy: AmbiguityPolicy) -> Self {
        Self::new(None, Duration::from_secs(5), policy)
    }

    pub async fn zone(&self, source: &ZoneSource) -> Result<Tz, ChartError> {
        let location = match source {
            ZoneSource::Fixed(tz) => return Ok(*tz),
            ZoneSource::FromCoordinates(location) => location,
        };
        let failed = |message: String| ChartError::TimezoneResolutionFailed {
            latitude: location.latitude,
            longitude: location.longitude,
            message,
        };

        let lookup = self
            .lookup
            .as_ref()
            .ok_or_else(|| failed("no timezone lookup service configured".to_string()))?;

        let name = match tokio::time::timeout(self.timeout, lookup.zone_at(location)).await {
            Err(_) => {
                warn!("timezone lookup timed out after {:?}", self.timeout);
                return Err(ChartError::Timeout {
                    service: "timezone lookup",
                    timeout: self.timeout,
                });
            }
            Ok(Err(e)) => {
                return Err(ChartError::Collaborator {
                    service: "timezone lookup",
                    message: e.to_string(),
                })
            }
            Ok(Ok(None)) => return Err(failed("no zone at these coordinates".to_string())),
            Ok(Ok(Some(name))) => name,
        };

        name.parse::<Tz>()
            .map_err(|_| failed(format!("lookup returned unknown zone {name}")))
    }

    /// Interpret `civil` in `tz`.
    pub fn localize(&self, civil: &CivilDateTime, tz: Tz) -> Result<Instant, ChartError> {
        let naive = civil.to_naive()?;
        let local = match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(a, b) => match self.policy {
                AmbiguityPolicy::Reject => {
                    return Err(ChartError::AmbiguousLocalTime {
                        local: naive.to_string(),
                        zone: tz.name().to_string(),
                    })
                }
                AmbiguityPolicy::PreferStandard => {
                    let offset = |dt: &DateTime<Tz>| dt.offset().fix().local_minus_utc();
                    if offset(&a) <= offset(&b) {
                        a
                    } else {
                        b
                    }
                }
            },
            LocalResult::None => {
                return Err(ChartError::NonexistentLocalTime {
                    local: naive.to_string(),
                    zone: tz.name().to_string(),
                })
            }
        };
        Ok(Instant::from_utc(local.with_timezone(&Utc)))
    }

    /// Like [`localize`](Self::localize), but a wall time inside a DST gap
    /// moves forward to the first minute that exists on the clock.
    pub fn localize_forward(&self, civil: &CivilDateTime, tz: Tz) -> Result<Instant, ChartError> {
        let err = match self.localize(civil, tz) {
            Err(err @ ChartError::NonexistentLocalTime { .. }) => err,
            other => return other,
        };
        let naive = civil.to_naive()?;
        let start = naive.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(naive);
        (1..=24 * 60)
            .map(|m| start + chrono::Duration::minutes(m))
            .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
            .map(|local| Instant::from_utc(local.with_timezone(&Utc)))
            .ok_or(err)
    }

    pub async fn resolve(
        &self,
        civil: &CivilDateTime,
        source: &ZoneSource,
    ) -> Result<Instant, ChartError> {
        let tz = self.zone(source).await?;
        self.localize(civil, tz)
    }
}
