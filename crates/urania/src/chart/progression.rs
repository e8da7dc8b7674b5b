//! Solar arc progressions.
//!
//! Both methods add one arc to every natal longitude. They differ only in
//! how the arc is found, and they do not agree numerically: the Sun moves a
//! little less than one degree per day and the exact amount varies through
//! the year.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::chart::types::{Chart, ProgressedPlacement};
use crate::ephemeris::{Body, Observer, PositionProvider};
use crate::error::ChartError;
use crate::time::Instant;
use crate::zodiac::{normalize, ZodiacPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionMethod {
    /// Arc = Sun at target minus Sun at birth.
    #[default]
    #[serde(alias = "ephemeris_arc")]
    Ephemeris,
    /// Arc = whole years of age, one degree each.
    #[serde(alias = "age_rule")]
    Age,
}

impl ProgressionMethod {
    pub fn parse(name: &str) -> Result<Self, ChartError> {
        match name.trim().to_lowercase().as_str() {
            "ephemeris" | "ephemeris_arc" => Ok(ProgressionMethod::Ephemeris),
            "age" | "age_rule" => Ok(ProgressionMethod::Age),
            other => Err(ChartError::invalid(
                "method",
                format!("{other:?} is not one of \"ephemeris\", \"age\""),
            )),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProgressionMethod::Ephemeris => "ephemeris",
            ProgressionMethod::Age => "age",
        }
    }
}

/// Completed years between two civil dates.
///
/// One less than the calendar-year difference when the target's (month, day)
/// falls before the birth (month, day).
pub fn age_in_years(birth: NaiveDate, target: NaiveDate) -> i32 {
    let years = target.year() - birth.year();
    if (target.month(), target.day()) < (birth.month(), birth.day()) {
        years - 1
    } else {
        years
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionResult {
    pub natal: Chart,
    pub target: Instant,
    pub method: ProgressionMethod,
    pub span: CivilSpan,
    /// Arc in degrees, [0, 360)
    pub arc: f64,
    /// Whole years of age, reported by the age method only
    pub age: Option<i32>,
    pub placements: Vec<ProgressedPlacement>,
}

/// The civil dates the age method counts between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CivilSpan {
    pub birth: NaiveDate,
    pub target: NaiveDate,
}

pub struct ProgressionEngine<'a> {
    provider: &'a dyn PositionProvider,
}

impl<'a> ProgressionEngine<'a> {
    pub fn new(provider: &'a dyn PositionProvider) -> Self {
        Self { provider }
    }

    /// Sun(target) − Sun(natal), normalized.
    pub fn ephemeris_arc(&self, natal: &Instant, target: &Instant) -> Result<f64, ChartError> {
        let observer = Observer::Geocentric;
        let sun_natal = self
            .provider
            .body_position(natal.julian_day, Body::Sun, &observer)?;
        let sun_target = self
            .provider
            .body_position(target.julian_day, Body::Sun, &observer)?;
        Ok(normalize(sun_target.longitude - sun_natal.longitude))
    }

    pub fn progress(
        &self,
        natal: Chart,
        target: Instant,
        span: CivilSpan,
        method: ProgressionMethod,
    ) -> Result<ProgressionResult, ChartError> {
        if target.utc < natal.instant.utc {
            return Err(ChartError::invalid("target", "precedes the birth date"));
        }

        let (arc, age) = match method {
            ProgressionMethod::Ephemeris => (self.ephemeris_arc(&natal.instant, &target)?, None),
            ProgressionMethod::Age => {
                let age = age_in_years(span.birth, span.target);
                (normalize(age as f64 * 1.0), Some(age))
            }
        };

        let placements = natal
            .placements
            .iter()
            .map(|p| ProgressedPlacement {
                body: p.body,
                natal_longitude: p.longitude(),
                position: ZodiacPosition::from_longitude(p.longitude() + arc),
            })
            .collect();

        Ok(ProgressionResult {
            natal,
            target,
            method,
            span,
            arc,
            age,
            placements,
        })
    }
}
