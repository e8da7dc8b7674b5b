use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "URANIA_CONFIG";
pub const EPHEMERIS_PATH_ENV: &str = "SWISS_EPHEMERIS_PATH";

const CONFIG_PATHS: [&str; 2] = ["configs/urania.toml", "../../configs/urania.toml"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EphemerisSettings {
    /// Swiss Ephemeris data directory; `None` selects the built-in Moshier model.
    pub path: Option<PathBuf>,
    pub house_system: String,
    pub topocentric: bool,
}

impl Default for EphemerisSettings {
    fn default() -> Self {
        Self {
            path: None,
            house_system: "porphyry".to_string(),
            topocentric: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneSourceSetting {
    #[default]
    Fixed,
    Coordinates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguousSetting {
    #[default]
    Standard,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimeSettings {
    pub default_zone: String,
    pub zone_source: ZoneSourceSetting,
    pub ambiguous: AmbiguousSetting,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            default_zone: "Asia/Tokyo".to_string(),
            zone_source: ZoneSourceSetting::Fixed,
            ambiguous: AmbiguousSetting::Standard,
        }
    }
}

/// Reference location for transit charts requested without one.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransitSettings {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for TransitSettings {
    fn default() -> Self {
        Self {
            latitude: 35.6895,
            longitude: 139.6917,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeocoderSettings {
    pub url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            url: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: default_user_agent(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimezoneLookupSettings {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for TimezoneLookupSettings {
    fn default() -> Self {
        Self {
            url: "https://timeapi.io/api/TimeZone/coordinate".to_string(),
            timeout_secs: 10,
        }
    }
}

fn default_user_agent() -> String {
    format!("urania/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UraniaConfig {
    pub server: ServerSettings,
    pub ephemeris: EphemerisSettings,
    pub time: TimeSettings,
    pub transit: TransitSettings,
    pub geocoder: GeocoderSettings,
    pub timezone_lookup: TimezoneLookupSettings,
}

impl UraniaConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).map_err(|e| anyhow::anyhow!("Failed to parse urania.toml: {e}"))
    }

    /// `SWISS_EPHEMERIS_PATH` wins over the file when set and non-empty.
    pub fn apply_env_overrides(&mut self, ephemeris_path: Option<String>) {
        if let Some(path) = ephemeris_path.filter(|p| !p.trim().is_empty()) {
            self.ephemeris.path = Some(PathBuf::from(path));
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.ephemeris.path {
            if !path.exists() {
                anyhow::bail!("ephemeris.path does not exist: {}", path.display());
            }
        }
        if !(-90.0..=90.0).contains(&self.transit.latitude)
            || !(-180.0..=180.0).contains(&self.transit.longitude)
        {
            anyhow::bail!(
                "transit location out of range: ({}, {})",
                self.transit.latitude,
                self.transit.longitude
            );
        }
        if self.geocoder.timeout_secs == 0 || self.timezone_lookup.timeout_secs == 0 {
            anyhow::bail!("collaborator timeouts must be at least one second");
        }
        Ok(())
    }
}

/// `URANIA_CONFIG` if set, else the first of the common relative paths that
/// can be read. `Ok(None)` when no file is found.
pub fn read_config_text() -> anyhow::Result<Option<(PathBuf, String)>> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(path);
        let text = fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Could not read {}: {e}", path.display()))?;
        return Ok(Some((path, text)));
    }
    for p in &CONFIG_PATHS {
        if let Ok(c) = fs::read_to_string(p) {
            return Ok(Some((PathBuf::from(p), c)));
        }
    }
    Ok(None)
}

/// Load, apply environment overrides and validate.
pub fn load() -> anyhow::Result<UraniaConfig> {
    let mut config = match read_config_text()? {
        Some((_, text)) => UraniaConfig::from_toml(&text)?,
        None => UraniaConfig::default(),
    };
    config.apply_env_overrides(std::env::var(EPHEMERIS_PATH_ENV).ok());
    config.validate()?;
    Ok(config)
}
