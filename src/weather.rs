//! Weather provider for Open-Meteo integration
//!
//! Geocodes a city name and retrieves a fixed-horizon daily forecast from
//! the Open-Meteo API (no API key required). Upstream failures are
//! recovered locally: [`fetch_weather`] returns an empty sequence instead
//! of propagating the error, and the rest of the pipeline tolerates it.

use crate::config::WeatherConfig;
use crate::knowledge::KnowledgeBase;
use crate::models::forecast::is_chronological;
use crate::models::{ForecastPoint, Location};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Seam for the geocoding + forecast service
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Resolve a location name into candidate locations, best match first
    async fn geocode(&self, name: &str) -> Result<Vec<Location>>;

    /// Daily forecast for the given coordinates over a fixed horizon
    async fn daily_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: u8,
    ) -> Result<Vec<ForecastPoint>>;
}

/// Open-Meteo HTTP client
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    geocoding_url: String,
}

impl OpenMeteoClient {
    /// Create a new client with the configured timeout
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("citybrief/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            geocoding_url: config.geocoding_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn geocode(&self, name: &str) -> Result<Vec<Location>> {
        let url = format!(
            "{}/search?name={}&count=5&language=en&format=json",
            self.geocoding_url,
            urlencoding::encode(name)
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;

        let openmeteo_response: openmeteo::GeocodingResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse Open-Meteo geocoding response")?;

        let locations: Vec<Location> = openmeteo_response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(Location::from)
            .collect();

        debug!("Geocoding '{}' returned {} result(s)", name, locations.len());
        Ok(locations)
    }

    #[instrument(skip(self))]
    async fn daily_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: u8,
    ) -> Result<Vec<ForecastPoint>> {
        let url = format!(
            "{}/forecast?latitude={latitude}&longitude={longitude}&daily=temperature_2m_max,temperature_2m_min,precipitation_sum,weathercode&timezone=auto&forecast_days={days}",
            self.base_url
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;

        let forecast_response: openmeteo::ForecastResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse Open-Meteo forecast response")?;

        forecast_response
            .daily
            .ok_or_else(|| anyhow!("No daily data in Open-Meteo response"))?
            .into_points()
    }
}

/// Fetch the forecast for a city, fail-safe.
///
/// Curated cities resolve to their stored coordinates without a geocoding
/// round-trip; everything else takes the first geocoding result as ranked
/// by the service. Any upstream failure — no match, transport error,
/// timeout, or a payload that cannot yield exactly `days` chronologically
/// increasing points — produces an empty sequence, never a partial one.
pub async fn fetch_weather(
    provider: &dyn WeatherProvider,
    knowledge: &KnowledgeBase,
    city: &str,
    days: u8,
) -> Vec<ForecastPoint> {
    let location = match knowledge.lookup(city) {
        Some(entry) => entry.location(),
        None => match provider.geocode(city).await {
            Ok(results) => match results.into_iter().next() {
                Some(location) => location,
                None => {
                    warn!("No geocoding match for '{}', returning empty forecast", city);
                    return Vec::new();
                }
            },
            Err(e) => {
                warn!("Geocoding failed for '{}': {:#}", city, e);
                return Vec::new();
            }
        },
    };

    debug!(
        "Fetching {}-day forecast for {} at ({:.4}, {:.4})",
        days, location.name, location.latitude, location.longitude
    );

    let points = match provider
        .daily_forecast(location.latitude, location.longitude, days)
        .await
    {
        Ok(points) => points,
        Err(e) => {
            warn!("Forecast fetch failed for '{}': {:#}", city, e);
            return Vec::new();
        }
    };

    match normalize_points(points, days) {
        Some(points) => points,
        None => {
            warn!("Discarding malformed forecast payload for '{}'", city);
            Vec::new()
        }
    }
}

/// Enforce the all-or-nothing sequence invariant: exactly `days` points in
/// strictly increasing date order, or nothing.
fn normalize_points(mut points: Vec<ForecastPoint>, days: u8) -> Option<Vec<ForecastPoint>> {
    let days = usize::from(days);
    if points.len() < days {
        return None;
    }
    points.truncate(days);
    if !is_chronological(&points) {
        return None;
    }
    Some(points)
}

/// Open-Meteo API response structures and conversion utilities
pub mod openmeteo {
    use super::{ForecastPoint, Location};
    use anyhow::{Result, anyhow};
    use chrono::NaiveDate;
    use serde::Deserialize;

    /// Forecast response from Open-Meteo
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub latitude: f64,
        pub longitude: f64,
        pub timezone: Option<String>,
        pub daily: Option<DailyData>,
    }

    /// Daily weather data from Open-Meteo
    #[derive(Debug, Deserialize)]
    pub struct DailyData {
        pub time: Vec<String>,
        #[serde(rename = "temperature_2m_max")]
        pub temperature_max: Option<Vec<Option<f32>>>,
        #[serde(rename = "temperature_2m_min")]
        pub temperature_min: Option<Vec<Option<f32>>>,
        #[serde(rename = "precipitation_sum")]
        pub precipitation: Option<Vec<Option<f32>>>,
        #[serde(rename = "weathercode")]
        pub weather_code: Option<Vec<Option<u8>>>,
    }

    impl DailyData {
        /// Convert the column-oriented payload into per-day points.
        ///
        /// Dates and both temperatures are required for every day; a gap
        /// means the provider violated its own contract and the whole
        /// payload is rejected.
        pub fn into_points(self) -> Result<Vec<ForecastPoint>> {
            let temperature_max = self
                .temperature_max
                .ok_or_else(|| anyhow!("Missing temperature_2m_max column"))?;
            let temperature_min = self
                .temperature_min
                .ok_or_else(|| anyhow!("Missing temperature_2m_min column"))?;
            if temperature_max.len() != self.time.len() || temperature_min.len() != self.time.len()
            {
                return Err(anyhow!("Mismatched column lengths in daily data"));
            }

            let mut points = Vec::with_capacity(self.time.len());
            for (i, day) in self.time.iter().enumerate() {
                let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
                    .map_err(|e| anyhow!("Unparseable forecast date '{day}': {e}"))?;
                let high_c = temperature_max[i]
                    .ok_or_else(|| anyhow!("Missing maximum temperature for {date}"))?;
                let low_c = temperature_min[i]
                    .ok_or_else(|| anyhow!("Missing minimum temperature for {date}"))?;
                let condition = self
                    .weather_code
                    .as_ref()
                    .and_then(|codes| codes.get(i).copied().flatten())
                    .map(|code| weather_code_to_description(code).to_string());
                let precipitation_mm = self
                    .precipitation
                    .as_ref()
                    .and_then(|sums| sums.get(i).copied().flatten());

                points.push(ForecastPoint {
                    date,
                    high_c,
                    low_c,
                    condition,
                    precipitation_mm,
                });
            }
            Ok(points)
        }
    }

    /// Geocoding response from Open-Meteo
    #[derive(Debug, Deserialize)]
    pub struct GeocodingResponse {
        pub results: Option<Vec<GeocodingResult>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResult {
        pub name: String,
        pub latitude: f64,
        pub longitude: f64,
        pub country: Option<String>,
        pub admin1: Option<String>,
        pub timezone: Option<String>,
    }

    impl From<GeocodingResult> for Location {
        fn from(result: GeocodingResult) -> Self {
            Location {
                latitude: result.latitude,
                longitude: result.longitude,
                name: result.name,
                country: result.country,
            }
        }
    }

    /// Convert an Open-Meteo weather code to a human-readable description
    #[must_use]
    pub fn weather_code_to_description(code: u8) -> &'static str {
        match code {
            0 => "Clear sky",
            1 => "Mainly clear",
            2 => "Partly cloudy",
            3 => "Overcast",
            45 => "Fog",
            48 => "Depositing rime fog",
            51 => "Light drizzle",
            53 => "Moderate drizzle",
            55 => "Dense drizzle",
            61 => "Slight rain",
            63 => "Moderate rain",
            65 => "Heavy rain",
            66 => "Light freezing rain",
            67 => "Heavy freezing rain",
            71 => "Slight snow fall",
            73 => "Moderate snow fall",
            75 => "Heavy snow fall",
            77 => "Snow grains",
            80 => "Slight rain showers",
            81 => "Moderate rain showers",
            82 => "Violent rain showers",
            85 => "Slight snow showers",
            86 => "Heavy snow showers",
            95 => "Thunderstorm",
            96 => "Thunderstorm with slight hail",
            99 => "Thunderstorm with heavy hail",
            _ => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge;
    use chrono::NaiveDate;

    fn point(date: &str) -> ForecastPoint {
        ForecastPoint {
            date: date.parse().unwrap(),
            high_c: 20.0,
            low_c: 10.0,
            condition: None,
            precipitation_mm: None,
        }
    }

    fn week_of_points() -> Vec<ForecastPoint> {
        (1..=7).map(|d| point(&format!("2024-06-{d:02}"))).collect()
    }

    struct StubProvider {
        geocode_result: Result<Vec<Location>, String>,
        forecast_result: Result<Vec<ForecastPoint>, String>,
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn geocode(&self, _name: &str) -> Result<Vec<Location>> {
            self.geocode_result
                .clone()
                .map_err(|e| anyhow!(e))
        }

        async fn daily_forecast(
            &self,
            _latitude: f64,
            _longitude: f64,
            _days: u8,
        ) -> Result<Vec<ForecastPoint>> {
            self.forecast_result
                .clone()
                .map_err(|e| anyhow!(e))
        }
    }

    #[test]
    fn test_normalize_exact_horizon() {
        let points = normalize_points(week_of_points(), 7).expect("full week is valid");
        assert_eq!(points.len(), 7);
    }

    #[test]
    fn test_normalize_truncates_long_payload() {
        let mut points = week_of_points();
        points.push(point("2024-06-08"));
        let points = normalize_points(points, 7).expect("extra days are truncated");
        assert_eq!(points.len(), 7);
        assert_eq!(
            points.last().unwrap().date,
            NaiveDate::from_ymd_opt(2024, 6, 7).unwrap()
        );
    }

    #[test]
    fn test_normalize_rejects_short_payload() {
        let mut points = week_of_points();
        points.pop();
        assert!(normalize_points(points, 7).is_none());
    }

    #[test]
    fn test_normalize_rejects_out_of_order_days() {
        let mut points = week_of_points();
        points.swap(2, 3);
        assert!(normalize_points(points, 7).is_none());
    }

    #[test]
    fn test_daily_data_into_points() {
        let daily = openmeteo::DailyData {
            time: vec!["2024-06-01".to_string(), "2024-06-02".to_string()],
            temperature_max: Some(vec![Some(21.3), Some(24.0)]),
            temperature_min: Some(vec![Some(11.0), Some(13.5)]),
            precipitation: Some(vec![Some(0.0), Some(2.4)]),
            weather_code: Some(vec![Some(0), Some(61)]),
        };
        let points = daily.into_points().expect("well-formed payload");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].condition.as_deref(), Some("Clear sky"));
        assert_eq!(points[1].condition.as_deref(), Some("Slight rain"));
        assert_eq!(points[1].precipitation_mm, Some(2.4));
    }

    #[test]
    fn test_daily_data_rejects_temperature_gap() {
        let daily = openmeteo::DailyData {
            time: vec!["2024-06-01".to_string(), "2024-06-02".to_string()],
            temperature_max: Some(vec![Some(21.3), None]),
            temperature_min: Some(vec![Some(11.0), Some(13.5)]),
            precipitation: None,
            weather_code: None,
        };
        assert!(daily.into_points().is_err());
    }

    #[test]
    fn test_weather_code_descriptions() {
        assert_eq!(openmeteo::weather_code_to_description(0), "Clear sky");
        assert_eq!(openmeteo::weather_code_to_description(95), "Thunderstorm");
        assert_eq!(openmeteo::weather_code_to_description(42), "Unknown");
    }

    #[tokio::test]
    async fn test_fetch_weather_curated_city_skips_geocoding() {
        // Geocoding is rigged to fail; a curated city must not need it.
        let provider = StubProvider {
            geocode_result: Err("geocoding must not be called".to_string()),
            forecast_result: Ok(week_of_points()),
        };
        let forecast = fetch_weather(&provider, knowledge::curated(), "Paris", 7).await;
        assert_eq!(forecast.len(), 7);
    }

    #[tokio::test]
    async fn test_fetch_weather_recovers_from_provider_error() {
        let provider = StubProvider {
            geocode_result: Ok(vec![Location::new(35.0, 135.8, "Kyoto".to_string())]),
            forecast_result: Err("service unreachable".to_string()),
        };
        let forecast = fetch_weather(&provider, knowledge::curated(), "Kyoto", 7).await;
        assert!(forecast.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_weather_no_geocoding_match() {
        let provider = StubProvider {
            geocode_result: Ok(vec![]),
            forecast_result: Ok(week_of_points()),
        };
        let forecast = fetch_weather(&provider, knowledge::curated(), "Atlantis", 7).await;
        assert!(forecast.is_empty());
    }
}
