use serde::Serialize;

/// Apparent motion along the ecliptic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Motion {
    Direct,
    Retrograde,
}

impl Motion {
    /// Negative speed is retrograde. A stationary body (speed exactly 0) is
    /// reported as direct; there is no separate stationary state.
    pub fn from_speed(speed_longitude: f64) -> Self {
        if speed_longitude < 0.0 {
            Motion::Retrograde
        } else {
            Motion::Direct
        }
    }

    pub fn is_retrograde(self) -> bool {
        self == Motion::Retrograde
    }
}
