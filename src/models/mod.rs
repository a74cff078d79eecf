//! Core data models for the `CityBrief` pipeline

pub mod forecast;
pub mod location;
pub mod report;

pub use forecast::ForecastPoint;
pub use location::Location;
pub use report::{CityReport, CitySummary};
