use chrono::NaiveDate;
use serde::Serialize;
use urania::chart::{BodyPlacement, Chart, ProgressedPlacement, ProgressionResult};
use urania::houses::HouseData;
use urania::zodiac::{normalize, round2, ZodiacPosition};

/// Two-decimal longitude that never rounds up to 360.
fn longitude2(value: f64) -> f64 {
    round2(normalize(round2(value)))
}



#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct CoordinatesBody {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct PlanetBody {
    pub name: &'static str,
    pub sign: &'static str,
    pub degree: f64,
    pub longitude: f64,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrograde: Option<bool>,
}

impl PlanetBody {
    fn placed(p: &BodyPlacement) -> Self {
        Self {
            house: p.house,
            retrograde: Some(p.motion.is_retrograde()),
            ..Self::position(p.body.name(), &p.position)
        }
    }

    fn progressed(p: &ProgressedPlacement) -> Self {
        Self::position(p.body.name(), &p.position)
    }

    /// Sign, degree, longitude and label all come from the one rounded longitude.
    fn position(name: &'static str, position: &ZodiacPosition) -> Self {
        let shown = ZodiacPosition::from_longitude(longitude2(position.longitude));
        Self {
            name,
            sign: shown.sign.name(),
            degree: round2(shown.degree),
            longitude: round2(shown.longitude),
            label: shown.label(),
            house: None,
            retrograde: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnglesBody {
    pub ascendant: f64,
    pub midheaven: f64,
    pub descendant: f64,
    pub imum_coeli: f64,
}

#[derive(Debug, Serialize)]
pub struct HousesBody {
    pub system: &'static str,
    pub cusps: Vec<f64>,
    pub angles: AnglesBody,
}

impl From<&HouseData> for HousesBody {
    fn from(h: &HouseData) -> Self {
        Self {
            system: h.system.name(),
            cusps: h.cusps.as_array().iter().map(|c| longitude2(*c)).collect(),
            angles: AnglesBody {
                ascendant: longitude2(h.angles.ascendant),
                midheaven: longitude2(h.angles.midheaven),
                descendant: longitude2(h.angles.descendant),
                imum_coeli: longitude2(h.angles.imum_coeli),
            },
        }
    }
}

/// `/planet` and `/transit`
#[derive(Debug, Serialize)]
pub struct ChartBody {
    pub input_datetime_utc: String,
    pub coordinates: CoordinatesBody,
    pub planets: Vec<PlanetBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub houses: Option<HousesBody>,
}

impl From<&Chart> for ChartBody {
    fn from(chart: &Chart) -> Self {
        Self {
            input_datetime_utc: chart.instant.formatted(),
            coordinates: CoordinatesBody {
                latitude: chart.location.latitude,
                longitude: chart.location.longitude,
            },
            planets: chart.placements.iter().map(PlanetBody::placed).collect(),
            houses: chart.houses.as_ref().map(HousesBody::from),
        }
    }
}

/// `/solararc`
#[derive(Debug, Serialize)]
pub struct SolarArcResponse {
    pub input_datetime_utc: String,
    pub target_datetime_utc: String,
    pub target_date: NaiveDate,
    pub coordinates: CoordinatesBody,
    pub method: &'static str,
    pub arc: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    pub planets: Vec<PlanetBody>,
}

impl From<&ProgressionResult> for SolarArcResponse {
    fn from(result: &ProgressionResult) -> Self {
        Self {
            input_datetime_utc: result.natal.instant.formatted(),
            target_datetime_utc: result.target.formatted(),
            target_date: result.span.target,
            coordinates: CoordinatesBody {
                latitude: result.natal.location.latitude,
                longitude: result.natal.location.longitude,
            },
            method: result.method.name(),
            arc: longitude2(result.arc),
            age: result.age,
            planets: result.placements.iter().map(PlanetBody::progressed).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown(longitude: f64) -> PlanetBody {
        PlanetBody::position("Sun", &ZodiacPosition::from_longitude(longitude))
    }

    #[test]
    fn test_rounding_up_to_sign_boundary() {
        let body = shown(29.996);
        assert_eq!(body.longitude, 30.0);
        assert_eq!(body.sign, "Taurus");
        assert_eq!(body.degree, 0.0);
        assert_eq!(body.label, "0°00' Taurus");
    }

    #[test]
    fn test_rounding_up_to_full_circle() {
        let body = shown(359.996);
        assert_eq!(body.longitude, 0.0);
        assert_eq!(body.sign, "Aries");
        assert_eq!(body.degree, 0.0);
    }

    #[test]
    fn test_fields_agree_inside_a_sign() {
        let body = shown(123.456);
        assert_eq!(body.longitude, 123.46);
        assert_eq!(body.sign, "Leo");
        assert_eq!(body.degree, 3.46);
        assert_eq!(body.label, "3°27' Leo");
    }
}
