//! Fallback summary generation
//!
//! Produces a summary for cities outside the curated knowledge base. A
//! deterministic template always works; when a Gemini API key is
//! configured the text is generated remotely instead, with the template as
//! the safety net for any failure.

use crate::config::SummaryConfig;
use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Generator for the non-curated summary branch
pub struct SummaryGenerator {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl SummaryGenerator {
    /// Create a new generator with the configured timeout
    pub fn new(config: &SummaryConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("citybrief/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Produce a summary for a city. Always succeeds.
    #[instrument(skip(self))]
    pub async fn generate(&self, city: &str) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("No summary API key configured, using template for '{}'", city);
            return template_summary(city);
        };

        match self.generate_remote(city, api_key).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Remote summary generation failed for '{}', using template: {:#}",
                    city, e
                );
                template_summary(city)
            }
        }
    }

    /// Request a generated summary from the Gemini API
    async fn generate_remote(&self, city: &str, api_key: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );

        let prompt = format!(
            "Provide a comprehensive 3-4 sentence summary about {city} as a travel \
             destination. Include information about famous landmarks, culture, cuisine, \
             and what makes it special. Be informative and engaging."
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let generated: gemini::GenerateContentResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse Gemini response")?;

        let text = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| anyhow!("No candidates in Gemini response"))?;

        let text = text.trim();
        if text.is_empty() {
            return Err(anyhow!("Empty summary in Gemini response"));
        }
        Ok(text.to_string())
    }
}

/// Deterministic templated summary mentioning the city by name
#[must_use]
pub fn template_summary(city: &str) -> String {
    format!(
        "{city} is a vibrant city with rich culture, fascinating history, and \
         world-class attractions. It offers visitors unique experiences through its \
         landmarks, cuisine, and local traditions that make it a must-visit destination."
    )
}

/// Gemini API response structures
mod gemini {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct GenerateContentResponse {
        #[serde(default)]
        pub candidates: Vec<Candidate>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Candidate {
        pub content: Content,
    }

    #[derive(Debug, Deserialize)]
    pub struct Content {
        #[serde(default)]
        pub parts: Vec<Part>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Part {
        pub text: String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SummaryConfig;

    #[test]
    fn test_template_mentions_city() {
        let text = template_summary("Kyoto");
        assert!(text.contains("Kyoto"));
    }

    #[test]
    fn test_template_is_deterministic() {
        assert_eq!(template_summary("Kyoto"), template_summary("Kyoto"));
    }

    #[tokio::test]
    async fn test_generate_without_key_uses_template() {
        let generator =
            SummaryGenerator::new(&SummaryConfig::default()).expect("default config is valid");
        let text = generator.generate("Kyoto").await;
        assert_eq!(text, template_summary("Kyoto"));
    }

    #[test]
    fn test_gemini_response_parsing() {
        let payload = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "Kyoto is lovely." } ], "role": "model" } }
            ]
        }"#;
        let parsed: gemini::GenerateContentResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.candidates[0].content.parts[0].text, "Kyoto is lovely.");
    }

    #[test]
    fn test_gemini_empty_response_parsing() {
        let parsed: gemini::GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
