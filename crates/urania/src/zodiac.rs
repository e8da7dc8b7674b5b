//! Zodiac sign and degree labels for ecliptic longitudes.
//!
//! All sign arithmetic goes through [`normalize`], so the sign index and the
//! degree within the sign always agree at 0°, 30° and 360°.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

const SIGN_ORDER: [Sign; 12] = [
    Sign::Aries,
    Sign::Taurus,
    Sign::Gemini,
    Sign::Cancer,
    Sign::Leo,
    Sign::Virgo,
    Sign::Libra,
    Sign::Scorpio,
    Sign::Sagittarius,
    Sign::Capricorn,
    Sign::Aquarius,
    Sign::Pisces,
];

impl Sign {
    /// Sign for index 0..=11 (wraps).
    pub fn from_index(index: usize) -> Sign {
        SIGN_ORDER[index % 12]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Sign::Aries => "Aries",
            Sign::Taurus => "Taurus",
            Sign::Gemini => "Gemini",
            Sign::Cancer => "Cancer",
            Sign::Leo => "Leo",
            Sign::Virgo => "Virgo",
            Sign::Libra => "Libra",
            Sign::Scorpio => "Scorpio",
            Sign::Sagittarius => "Sagittarius",
            Sign::Capricorn => "Capricorn",
            Sign::Aquarius => "Aquarius",
            Sign::Pisces => "Pisces",
        }
    }

    pub fn all() -> &'static [Sign; 12] {
        &SIGN_ORDER
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Map any longitude into [0, 360).
pub fn normalize(longitude: f64) -> f64 {
    // rem_euclid can return 360.0 for tiny negative inputs; this form cannot
    ((longitude % 360.0) + 360.0) % 360.0
}

/// A longitude split into sign and degree within the sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZodiacPosition {
    /// Normalized longitude, [0, 360)
    pub longitude: f64,
    pub sign: Sign,
    /// Degree within the sign, [0, 30)
    pub degree: f64,
}

impl ZodiacPosition {
    pub fn from_longitude(longitude: f64) -> Self {
        let lon = normalize(longitude);
        let index = ((lon / 30.0).floor() as usize).min(11);
        let degree = lon - index as f64 * 30.0;
        Self {
            longitude: lon,
            sign: Sign::from_index(index),
            degree,
        }
    }

    /// Whole degrees and minutes within the sign, never rounding up to 30°.
    pub fn degrees_minutes(&self) -> (u32, u32) {
        let total_minutes = (self.degree * 60.0).floor() as u32;
        let total_minutes = total_minutes.min(30 * 60 - 1);
        (total_minutes / 60, total_minutes % 60)
    }

    /// e.g. `12°34' Aries`
    pub fn label(&self) -> String {
        let (d, m) = self.degrees_minutes();
        format!("{}°{:02}' {}", d, m, self.sign)
    }
}

/// Round to two decimals for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
