//! Request bodies and their translation into pipeline requests.

use chrono::NaiveDate;
use serde::Deserialize;
use urania::chart::{NatalRequest, ProgressionMethod, SolarArcRequest, TransitRequest};
use urania::ephemeris::HouseSystem;
use urania::error::ChartError;
use urania::location::LocationQuery;
use urania::time::{parse_zone, CivilDateTime};

/// Location fields shared by every endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct LocationFields {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location: Option<String>,
}

impl LocationFields {
    fn is_empty(&self) -> bool {
        self.latitude.is_none() && self.longitude.is_none() && self.location.is_none()
    }

    fn query(&self) -> Result<LocationQuery, ChartError> {
        LocationQuery::from_parts(self.latitude, self.longitude, self.location.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartOverrides {
    pub timezone: Option<String>,
    pub house_system: Option<String>,
    pub topocentric: Option<bool>,
}

impl ChartOverrides {
    fn house_system(&self) -> Result<Option<HouseSystem>, ChartError> {
        self.house_system.as_deref().map(HouseSystem::parse).transpose()
    }

    fn timezone(&self) -> Result<Option<chrono_tz::Tz>, ChartError> {
        self.timezone.as_deref().map(parse_zone).transpose()
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ChartError> {
    value.ok_or(ChartError::MissingField(field))
}

/// Calendar fields arrive as JSON numbers; reject fractional or out-of-range ones.
fn whole<T: TryFrom<i64>>(value: f64, field: &'static str) -> Result<T, ChartError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(ChartError::invalid(field, format!("{value} is not a whole number")));
    }
    T::try_from(value as i64).map_err(|_| ChartError::invalid(field, format!("{value} is out of range")))
}

/// `POST /planet`
#[derive(Debug, Deserialize)]
pub struct PlanetRequest {
    pub year: Option<f64>,
    pub month: Option<f64>,
    pub day: Option<f64>,
    pub hour: Option<f64>,
    pub minute: Option<f64>,
    #[serde(flatten)]
    pub location: LocationFields,
    #[serde(flatten)]
    pub overrides: ChartOverrides,
}

impl PlanetRequest {
    pub fn into_natal(self) -> Result<NatalRequest, ChartError> {
        let civil = CivilDateTime::new(
            whole(required(self.year, "year")?, "year")?,
            whole(required(self.month, "month")?, "month")?,
            whole(required(self.day, "day")?, "day")?,
            required(self.hour, "hour")?,
            required(self.minute, "minute")?,
        );
        Ok(NatalRequest {
            civil,
            location: self.location.query()?,
            timezone: self.overrides.timezone()?,
            house_system: self.overrides.house_system()?,
            topocentric: self.overrides.topocentric,
        })
    }
}

/// `POST /transit`; every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct TransitBody {
    #[serde(flatten)]
    pub location: LocationFields,
    pub house_system: Option<String>,
    pub topocentric: Option<bool>,
}

impl TransitBody {
    pub fn into_transit(self) -> Result<TransitRequest, ChartError> {
        let location = if self.location.is_empty() {
            None
        } else {
            Some(self.location.query()?)
        };
        Ok(TransitRequest {
            location,
            house_system: self.house_system.as_deref().map(HouseSystem::parse).transpose()?,
            topocentric: self.topocentric,
        })
    }
}

/// `POST /solararc`
#[derive(Debug, Deserialize)]
pub struct SolarArcBody {
    pub birth_year: Option<f64>,
    pub birth_month: Option<f64>,
    pub birth_day: Option<f64>,
    pub birth_hour: Option<f64>,
    pub birth_minute: Option<f64>,
    pub target_year: Option<f64>,
    pub target_month: Option<f64>,
    pub target_day: Option<f64>,
    pub method: Option<String>,
    pub timezone: Option<String>,
    pub topocentric: Option<bool>,
    #[serde(flatten)]
    pub location: LocationFields,
}

impl SolarArcBody {
    fn target(&self) -> Result<Option<NaiveDate>, ChartError> {
        match (self.target_year, self.target_month, self.target_day) {
            (None, None, None) => Ok(None),
            (Some(y), Some(m), Some(d)) => {
                let (y, m, d) = (whole(y, "target_year")?, whole(m, "target_month")?, whole(d, "target_day")?);
                NaiveDate::from_ymd_opt(y, m, d)
                    .map(Some)
                    .ok_or_else(|| ChartError::InvalidCalendarDate(format!("{y:04}-{m:02}-{d:02}")))
            }
            (None, _, _) => Err(ChartError::MissingField("target_year")),
            (_, None, _) => Err(ChartError::MissingField("target_month")),
            (_, _, None) => Err(ChartError::MissingField("target_day")),
        }
    }

    pub fn into_solar_arc(self) -> Result<SolarArcRequest, ChartError> {
        let birth = CivilDateTime::new(
            whole(required(self.birth_year, "birth_year")?, "birth_year")?,
            whole(required(self.birth_month, "birth_month")?, "birth_month")?,
            whole(required(self.birth_day, "birth_day")?, "birth_day")?,
            required(self.birth_hour, "birth_hour")?,
            required(self.birth_minute, "birth_minute")?,
        );
        let method = match self.method.as_deref() {
            Some(name) => ProgressionMethod::parse(name)?,
            None => ProgressionMethod::default(),
        };
        Ok(SolarArcRequest {
            birth,
            target: self.target()?,
            location: self.location.query()?,
            timezone: self.timezone.as_deref().map(parse_zone).transpose()?,
            method,
            topocentric: self.topocentric,
        })
    }
}
