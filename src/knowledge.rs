//! Curated city knowledge base
//!
//! A fixed, in-memory mapping from city name to a curated summary record.
//! Lookup is an exact match after trimming and case folding; there is no
//! substring or similarity matching.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::models::Location;

static CURATED: LazyLock<KnowledgeBase> = LazyLock::new(KnowledgeBase::curated);

/// A curated entry for one city
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CityEntry {
    /// Canonical city name
    pub name: String,
    /// Country the city is in
    pub country: String,
    /// Curated summary text
    pub summary: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl CityEntry {
    /// The entry's coordinates as a [`Location`]
    #[must_use]
    pub fn location(&self) -> Location {
        Location::with_country(
            self.latitude,
            self.longitude,
            self.name.clone(),
            self.country.clone(),
        )
    }
}

/// In-memory city → entry mapping, keyed case-insensitively
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: HashMap<String, CityEntry>,
}

impl KnowledgeBase {
    /// Create an empty knowledge base
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The curated set shipped with the application
    #[must_use]
    pub fn curated() -> Self {
        let mut kb = Self::new();
        kb.insert(CityEntry {
            name: "Paris".to_string(),
            country: "France".to_string(),
            summary: "Paris, the capital of France, is renowned for its art, fashion, \
                      gastronomy, and culture. Famous landmarks include the Eiffel Tower, \
                      Louvre Museum, Notre-Dame Cathedral, and Champs-Élysées. The city is \
                      known as the 'City of Light' and offers world-class cuisine, charming \
                      cafes, and romantic Seine River views."
                .to_string(),
            latitude: 48.8566,
            longitude: 2.3522,
        });
        kb.insert(CityEntry {
            name: "Tokyo".to_string(),
            country: "Japan".to_string(),
            summary: "Tokyo, Japan's capital, blends traditional and modern life. It features \
                      ancient temples, imperial palaces, and cutting-edge technology. Famous \
                      areas include Shibuya, Shinjuku, Asakusa's Senso-ji Temple, and the \
                      Imperial Palace. The city is known for its efficient public transport, \
                      incredible food scene, and unique pop culture."
                .to_string(),
            latitude: 35.6762,
            longitude: 139.6503,
        });
        kb.insert(CityEntry {
            name: "New York".to_string(),
            country: "USA".to_string(),
            summary: "New York City, often called 'The Big Apple', is a global center of \
                      culture, finance, and entertainment. Iconic landmarks include the Statue \
                      of Liberty, Central Park, Times Square, and the Empire State Building. \
                      The city offers world-class museums, Broadway shows, diverse \
                      neighborhoods, and exceptional dining from around the world."
                .to_string(),
            latitude: 40.7128,
            longitude: -74.0060,
        });
        kb
    }

    /// Add an entry, keyed by its lowercased name
    pub fn insert(&mut self, entry: CityEntry) {
        self.entries.insert(entry.name.trim().to_lowercase(), entry);
    }

    /// Look up a city by name.
    ///
    /// Trims surrounding whitespace and matches case-insensitively. Returns
    /// `None` for cities outside the curated set; a miss is not an error.
    #[must_use]
    pub fn lookup(&self, city: &str) -> Option<&CityEntry> {
        self.entries.get(&city.trim().to_lowercase())
    }

    /// Whether the city is in the curated set
    #[must_use]
    pub fn contains(&self, city: &str) -> bool {
        self.lookup(city).is_some()
    }

    /// Number of curated entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the knowledge base is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The process-wide curated knowledge base.
///
/// Initialized on first access and read-only thereafter.
#[must_use]
pub fn curated() -> &'static KnowledgeBase {
    &CURATED
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_curated_set_size() {
        assert_eq!(curated().len(), 3);
    }

    #[rstest]
    #[case("Paris")]
    #[case("paris")]
    #[case("PARIS")]
    #[case(" Paris  ")]
    #[case("\tnew york ")]
    #[case("Tokyo")]
    fn test_lookup_is_case_and_whitespace_insensitive(#[case] query: &str) {
        assert!(curated().contains(query));
    }

    #[rstest]
    #[case("Kyoto")]
    #[case("")]
    #[case("New York City")]
    #[case("Par")]
    fn test_lookup_miss_is_none(#[case] query: &str) {
        assert!(curated().lookup(query).is_none());
    }

    #[test]
    fn test_lookup_returns_curated_entry() {
        let entry = curated().lookup(" PARIS  ").expect("Paris is curated");
        assert_eq!(entry.name, "Paris");
        assert_eq!(entry.country, "France");
        assert!(entry.summary.contains("Eiffel Tower"));
    }

    #[test]
    fn test_entry_location() {
        let entry = curated().lookup("tokyo").expect("Tokyo is curated");
        let location = entry.location();
        assert_eq!(location.latitude, 35.6762);
        assert_eq!(location.country.as_deref(), Some("Japan"));
    }

    #[test]
    fn test_dynamic_insertion_path() {
        let mut kb = KnowledgeBase::new();
        assert!(kb.is_empty());
        kb.insert(CityEntry {
            name: "Lyon".to_string(),
            country: "France".to_string(),
            summary: "Gastronomic capital of France.".to_string(),
            latitude: 45.7640,
            longitude: 4.8357,
        });
        assert!(kb.contains("lyon"));
    }
}
