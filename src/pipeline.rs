//! The city briefing pipeline
//!
//! One request runs a fixed sequence: validate the input, decide the data
//! source, produce exactly one summary (curated or generated), fetch the
//! forecast and the image list, and assemble the report. The source
//! decision is the only branch, it is evaluated exactly once, and there is
//! no retry or rollback between steps — a step that fails safe (empty
//! forecast, placeholder images) never stops the steps after it.

use crate::CityBriefError;
use crate::config::CityBriefConfig;
use crate::images::{self, ImageProvider, PexelsClient};
use crate::knowledge::{self, KnowledgeBase};
use crate::models::{CityReport, CitySummary};
use crate::summary::SummaryGenerator;
use crate::weather::{self, OpenMeteoClient, WeatherProvider};
use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, instrument};

/// Validate a raw city name before the pipeline runs.
///
/// Returns the trimmed name, or a validation error for empty and
/// whitespace-only input.
pub fn validate_city(input: &str) -> crate::Result<&str> {
    let city = input.trim();
    if city.is_empty() {
        return Err(CityBriefError::validation("City name cannot be empty"));
    }
    Ok(city)
}

/// The request cycle: routing, summary, forecast, images, assembly
pub struct CityPipeline {
    knowledge: &'static KnowledgeBase,
    weather: Box<dyn WeatherProvider>,
    images: Option<Box<dyn ImageProvider>>,
    summaries: SummaryGenerator,
    forecast_days: u8,
    image_count: usize,
}

impl CityPipeline {
    /// Build a pipeline with the real upstream clients
    pub fn new(config: &CityBriefConfig) -> Result<Self> {
        let weather = OpenMeteoClient::new(&config.weather)?;
        let images = PexelsClient::from_config(&config.images)?;
        let summaries = SummaryGenerator::new(&config.summary)?;

        Ok(Self {
            knowledge: knowledge::curated(),
            weather: Box::new(weather),
            images: images.map(|client| Box::new(client) as Box<dyn ImageProvider>),
            summaries,
            forecast_days: config.weather.forecast_days,
            image_count: config.images.count,
        })
    }

    /// Build a pipeline over explicit providers (test seam)
    #[must_use]
    pub fn with_providers(
        knowledge: &'static KnowledgeBase,
        weather: Box<dyn WeatherProvider>,
        images: Option<Box<dyn ImageProvider>>,
        summaries: SummaryGenerator,
        forecast_days: u8,
        image_count: usize,
    ) -> Self {
        Self {
            knowledge,
            weather,
            images,
            summaries,
            forecast_days,
            image_count,
        }
    }

    /// Whether a request for this city would use the curated branch
    #[must_use]
    pub fn uses_knowledge_base(&self, city: &str) -> bool {
        self.knowledge.contains(city)
    }

    /// Run one request to completion.
    ///
    /// Only invalid input produces an error; an unrecognized city, an
    /// unreachable weather service, or a failed image search all still
    /// yield a complete report.
    #[instrument(skip(self))]
    pub async fn run(&self, city: &str) -> crate::Result<CityReport> {
        let city = validate_city(city)?;
        info!("Running city briefing for '{}'", city);

        // The single branch point, evaluated once per request
        let curated = self.knowledge.lookup(city);
        let from_knowledge_base = curated.is_some();
        debug!(
            "Routing '{}' to the {} branch",
            city,
            if from_knowledge_base { "curated" } else { "generated" }
        );

        let summary = match curated {
            Some(entry) => CitySummary {
                city: entry.name.clone(),
                country: Some(entry.country.clone()),
                text: entry.summary.clone(),
            },
            None => CitySummary {
                city: city.to_string(),
                country: None,
                text: self.summaries.generate(city).await,
            },
        };

        // Independent fetches; both complete (or fail safe) before assembly
        let (forecast, images) = tokio::join!(
            weather::fetch_weather(
                self.weather.as_ref(),
                self.knowledge,
                city,
                self.forecast_days
            ),
            images::fetch_images(self.images.as_deref(), city, self.image_count),
        );

        info!(
            "Assembled report for '{}': {} forecast point(s), {} image(s)",
            city,
            forecast.len(),
            images.len()
        );

        Ok(CityReport {
            city: city.to_string(),
            from_knowledge_base,
            summary,
            forecast,
            images,
            generated_at: Utc::now(),
        })
    }
}
