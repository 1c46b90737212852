use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::search::fuzzy;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    // Paths
    pub source_dir: PathBuf,
    pub collection_path: PathBuf,

    // Caché
    #[serde(with = "humantime_serde_compat")]
    pub cache_ttl: Duration,

    // Búsqueda
    pub search_max_results: usize,
    pub fuzzy_max_results: usize,
    pub fuzzy_threshold: f64,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            // Paths
            source_dir: std::env::var("LYRICS_SOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.source_dir),
            collection_path: std::env::var("LYRICS_COLLECTION_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.collection_path),

            // Caché
            cache_ttl: match std::env::var("CACHE_TTL") {
                Ok(val) if !val.trim().is_empty() => humantime::parse_duration(val.trim())
                    .with_context(|| format!("Invalid CACHE_TTL: {val}"))?,
                _ => defaults.cache_ttl,
            },

            // Búsqueda
            search_max_results: std::env::var("SEARCH_MAX_RESULTS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()?,
            fuzzy_max_results: std::env::var("FUZZY_MAX_RESULTS")
                .unwrap_or_else(|_| fuzzy::DEFAULT_MAX_RESULTS.to_string())
                .parse()?,
            fuzzy_threshold: std::env::var("FUZZY_THRESHOLD")
                .unwrap_or_else(|_| fuzzy::DEFAULT_THRESHOLD.to_string())
                .parse()?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validates configuration values for correctness.
    ///
    /// # Validation Rules
    ///
    /// - Cache TTL must be non-zero
    /// - Result limits must be greater than 0
    /// - Fuzzy threshold must be between 0.0 and 1.0
    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl.is_zero() {
            anyhow::bail!("Cache TTL must be greater than 0");
        }

        if self.search_max_results == 0 {
            anyhow::bail!("Search max results must be greater than 0");
        }

        if self.fuzzy_max_results == 0 {
            anyhow::bail!("Fuzzy max results must be greater than 0");
        }

        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            anyhow::bail!(
                "Fuzzy threshold must be between 0.0 and 1.0, got: {}",
                self.fuzzy_threshold
            );
        }

        Ok(())
    }

    pub fn fuzzy_matcher(&self) -> fuzzy::FuzzyMatcher {
        fuzzy::FuzzyMatcher::new(self.fuzzy_max_results, self.fuzzy_threshold)
    }

    /// Returns a summary of the current configuration for logging.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Source: {}\n  \
            Collection: {}\n  \
            Cache TTL: {}\n  \
            Search: {} results\n  \
            Fuzzy: {} results, threshold {:.2}",
            self.source_dir.display(),
            self.collection_path.display(),
            humantime::format_duration(self.cache_ttl),
            self.search_max_results,
            self.fuzzy_max_results,
            self.fuzzy_threshold
        )
    }
}

/// Default configuration values.
///
/// Used as fallbacks when environment variables are not provided.
impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: "./lyrics".into(),
            collection_path: "./data/lyrics_collection.json".into(),
            cache_ttl: Duration::from_secs(600),
            search_max_results: 20,
            fuzzy_max_results: fuzzy::DEFAULT_MAX_RESULTS,
            fuzzy_threshold: fuzzy::DEFAULT_THRESHOLD,
        }
    }
}

/// Serializes the TTL as a humantime string ("10m")
mod humantime_serde_compat {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*ttl).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(D::Error::custom)
    }
}
