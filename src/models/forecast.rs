//! Daily forecast model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of a weather forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastPoint {
    /// Calendar day this point covers
    pub date: NaiveDate,
    /// Daily maximum temperature in Celsius
    pub high_c: f32,
    /// Daily minimum temperature in Celsius
    pub low_c: f32,
    /// Human-readable condition label, when the provider reports one
    pub condition: Option<String>,
    /// Precipitation sum in mm, when the provider reports one
    pub precipitation_mm: Option<f32>,
}

impl ForecastPoint {
    /// Format the temperature range with unit
    #[must_use]
    pub fn format_range(&self) -> String {
        format!("{:.1}°C / {:.1}°C", self.low_c, self.high_c)
    }
}

/// Check that a sequence of points covers strictly increasing days.
///
/// An empty sequence is chronological.
#[must_use]
pub fn is_chronological(points: &[ForecastPoint]) -> bool {
    points.windows(2).all(|pair| pair[0].date < pair[1].date)
}
