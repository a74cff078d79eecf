//! The assembled per-request report

use super::ForecastPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary text for a city, either curated or generated
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CitySummary {
    /// City name as resolved for this run
    pub city: String,
    /// Country name, when known (curated entries carry one)
    pub country: Option<String>,
    /// Free-text description of the city
    pub text: String,
}

/// The complete structured answer for one request.
///
/// Produced once per request and immutable afterwards; the caller owns it
/// exclusively.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CityReport {
    /// City name as requested (trimmed)
    pub city: String,
    /// Whether the summary came from the curated knowledge base
    pub from_knowledge_base: bool,
    /// Summary record for this run
    pub summary: CitySummary,
    /// Daily forecast points, chronologically ordered; empty when the
    /// weather service was unavailable
    pub forecast: Vec<ForecastPoint>,
    /// Image URLs, always exactly the configured count
    pub images: Vec<String>,
    /// When this report was assembled
    pub generated_at: DateTime<Utc>,
}

impl CityReport {
    /// Temperature range over the whole forecast, when any points exist
    #[must_use]
    pub fn temperature_span(&self) -> Option<(f32, f32)> {
        let low = self
            .forecast
            .iter()
            .map(|p| p.low_c)
            .fold(f32::INFINITY, f32::min);
        let high = self
            .forecast
            .iter()
            .map(|p| p.high_c)
            .fold(f32::NEG_INFINITY, f32::max);
        if self.forecast.is_empty() {
            None
        } else {
            Some((low, high))
        }
    }
}
