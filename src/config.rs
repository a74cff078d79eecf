//! Configuration management for the `CityBrief` application
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::CityBriefError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `CityBrief` application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CityBriefConfig {
    /// Weather service configuration
    pub weather: WeatherConfig,
    /// Image service configuration
    pub images: ImageConfig,
    /// Summary generation configuration
    pub summary: SummaryConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Weather service configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Base URL for the forecast API
    pub base_url: String,
    /// Base URL for the geocoding API
    pub geocoding_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Forecast horizon in days
    pub forecast_days: u8,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            geocoding_url: default_geocoding_url(),
            timeout_seconds: default_timeout(),
            forecast_days: default_forecast_days(),
        }
    }
}

/// Image service configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Pexels API key; without one the deterministic placeholder
    /// generator is used
    pub pexels_api_key: Option<String>,
    /// Base URL for the image search API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Number of images per report
    pub count: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            pexels_api_key: None,
            base_url: default_images_base_url(),
            timeout_seconds: default_timeout(),
            count: default_image_count(),
        }
    }
}

/// Summary generation configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Gemini API key; without one the templated summary is used
    pub gemini_api_key: Option<String>,
    /// Model used for generated summaries
    pub model: String,
    /// Base URL for the text generation API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            model: default_summary_model(),
            base_url: default_summary_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_images_base_url() -> String {
    "https://api.pexels.com/v1".to_string()
}

fn default_summary_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_summary_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_timeout() -> u32 {
    10
}

fn default_forecast_days() -> u8 {
    7
}

fn default_image_count() -> usize {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl CityBriefConfig {
    /// Load configuration from the default file location and environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from the specified path and environment.
    ///
    /// A missing file is fine: defaults apply, and `CITYBRIEF_*`
    /// environment variables (`__`-separated sections, e.g.
    /// `CITYBRIEF_IMAGES__PEXELS_API_KEY`) override either source.
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));

        let mut builder = Config::builder();

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("CITYBRIEF")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: CityBriefConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        for (name, timeout) in [
            ("Weather", self.weather.timeout_seconds),
            ("Image", self.images.timeout_seconds),
            ("Summary", self.summary.timeout_seconds),
        ] {
            if timeout == 0 || timeout > 300 {
                return Err(CityBriefError::config(format!(
                    "{name} API timeout must be between 1 and 300 seconds"
                ))
                .into());
            }
        }

        // Open-Meteo serves at most 16 forecast days
        if self.weather.forecast_days == 0 || self.weather.forecast_days > 16 {
            return Err(
                CityBriefError::config("Forecast horizon must be between 1 and 16 days").into(),
            );
        }

        if self.images.count == 0 || self.images.count > 20 {
            return Err(
                CityBriefError::config("Image count must be between 1 and 20").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(CityBriefError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(CityBriefError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for url in [
            &self.weather.base_url,
            &self.weather.geocoding_url,
            &self.images.base_url,
            &self.summary.base_url,
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CityBriefError::config(format!(
                    "Service base URL '{url}' must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if let Some(key) = &self.images.pexels_api_key {
            if key.is_empty() {
                return Err(CityBriefError::config(
                    "Pexels API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
        }

        if let Some(key) = &self.summary.gemini_api_key {
            if key.is_empty() {
                return Err(CityBriefError::config(
                    "Gemini API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CityBriefConfig::default();
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(
            config.weather.geocoding_url,
            "https://geocoding-api.open-meteo.com/v1"
        );
        assert_eq!(config.weather.forecast_days, 7);
        assert_eq!(config.images.count, 4);
        assert_eq!(config.logging.level, "info");
        assert!(config.images.pexels_api_key.is_none());
        assert!(config.summary.gemini_api_key.is_none());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(CityBriefConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = CityBriefConfig::default();
        config.logging.level = "loud".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = CityBriefConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout"));

        let mut config = CityBriefConfig::default();
        config.weather.forecast_days = 30;
        assert!(config.validate().is_err());

        let mut config = CityBriefConfig::default();
        config.images.count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_api_key() {
        let mut config = CityBriefConfig::default();
        config.images.pexels_api_key = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = CityBriefConfig::default();
        config.weather.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = CityBriefConfig::load_from_path(Some(PathBuf::from(
            "definitely-not-a-config-file.toml",
        )))
        .expect("missing file falls back to defaults");
        assert_eq!(config.weather.forecast_days, 7);
    }
}
