//! Application configuration loaded from environment variables.
//!
//! Everything has a default, so a bare checkout runs against the bundled
//! sample data in `data/`.

use std::env;
use std::str::FromStr;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Initial map centre latitude
    pub initial_lat: f64,
    /// Initial map centre longitude
    pub initial_long: f64,
    /// Initial map zoom level
    pub initial_zoom: u8,
    /// Catchment polygon document (path or http(s) URL)
    pub polygons_file: String,
    /// School location document (path or http(s) URL)
    pub locations_file: String,
    /// Nominatim base URL
    pub nominatim_url: String,
    /// Language hint for geocoder results
    pub geocode_language: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_lat: 37.9838,
            initial_long: 23.7275,
            initial_zoom: 13,
            polygons_file: "data/polygons.geojson".to_string(),
            locations_file: "data/schools.geojson".to_string(),
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            geocode_language: "el".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();
        Ok(Self {
            initial_lat: parse_var("INITIAL_LAT", defaults.initial_lat)?,
            initial_long: parse_var("INITIAL_LONG", defaults.initial_long)?,
            initial_zoom: parse_var("INITIAL_ZOOM", defaults.initial_zoom)?,
            polygons_file: env::var("POLYGONS_FILE").unwrap_or(defaults.polygons_file),
            locations_file: env::var("LOCATIONS_FILE").unwrap_or(defaults.locations_file),
            nominatim_url: env::var("NOMINATIM_URL").unwrap_or(defaults.nominatim_url),
            geocode_language: env::var("GEOCODE_LANGUAGE").unwrap_or(defaults.geocode_language),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            port: parse_var("PORT", defaults.port)?,
        })
    }
}

/// Parse an optional variable, using `default` when it is unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
