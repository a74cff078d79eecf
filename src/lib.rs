//! `CityBrief` - city briefings from curated knowledge, weather and photos
//!
//! This library turns a city name into one structured report: a summary
//! from a curated knowledge base (or a generated fallback), a 7-day
//! weather forecast, and a fixed-size list of photo URLs.

pub mod config;
pub mod error;
pub mod images;
pub mod knowledge;
pub mod models;
pub mod pipeline;
pub mod summary;
pub mod weather;

// Re-export core types for public API
pub use config::CityBriefConfig;
pub use error::CityBriefError;
pub use images::{ImageProvider, PexelsClient};
pub use knowledge::{CityEntry, KnowledgeBase};
pub use models::{CityReport, CitySummary, ForecastPoint, Location};
pub use pipeline::CityPipeline;
pub use summary::SummaryGenerator;
pub use weather::{OpenMeteoClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, CityBriefError>;
