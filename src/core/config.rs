use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::similarity::Scorer;
use crate::storage::writer::DEFAULT_SINK_CHUNK_SIZE;
use crate::TaxbridgeError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Run the fuzzy stage on taxa left unmatched by the exact passes
    #[serde(default)]
    pub fuzzy_enabled: bool,
    /// Minimum similarity (0-100) for a name to be considered at all
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    /// Candidates must score strictly above this to survive homonym resolution
    #[serde(default = "default_homonym_cutoff")]
    pub homonym_cutoff: f64,
    /// Names kept per query before expanding to candidate records
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    #[serde(default)]
    pub scorer: Scorer,
    /// Also match taxa flagged inactive in the internal taxonomy
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Taxa per fuzzy-match batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Worker threads for the fuzzy stage (unset = available CPUs - 1)
    #[serde(default)]
    pub workers: Option<usize>,
    /// Records per sink transaction
    #[serde(default = "default_sink_chunk_size")]
    pub sink_chunk_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// ISO 639-3 language code of common names to attach
    #[serde(default = "default_language")]
    pub language: String,
    /// Only use vernacular names flagged preferred
    #[serde(default = "default_preferred_only")]
    pub preferred_only: bool,
}

fn default_fuzzy_threshold() -> f64 { 90.0 }
fn default_homonym_cutoff() -> f64 { 89.0 }
fn default_max_candidates() -> usize { 5 }
fn default_batch_size() -> usize { 1000 }
fn default_sink_chunk_size() -> usize { DEFAULT_SINK_CHUNK_SIZE }
fn default_language() -> String { "eng".to_string() }
fn default_preferred_only() -> bool { true }

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_enabled: false,
            fuzzy_threshold: default_fuzzy_threshold(),
            homonym_cutoff: default_homonym_cutoff(),
            max_candidates: default_max_candidates(),
            scorer: Scorer::default(),
            include_inactive: false,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            workers: None,
            sink_chunk_size: default_sink_chunk_size(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            preferred_only: default_preferred_only(),
        }
    }
}

impl Config {
    /// Reject settings that would make a run meaningless. Called before any
    /// data is loaded.
    pub fn validate(&self) -> Result<(), TaxbridgeError> {
        let m = &self.matching;
        if !(0.0..=100.0).contains(&m.fuzzy_threshold) {
            return Err(TaxbridgeError::Configuration(format!(
                "fuzzy threshold must be within 0-100, got {}",
                m.fuzzy_threshold
            )));
        }
        if !(0.0..=100.0).contains(&m.homonym_cutoff) {
            return Err(TaxbridgeError::Configuration(format!(
                "homonym cutoff must be within 0-100, got {}",
                m.homonym_cutoff
            )));
        }
        if m.max_candidates == 0 {
            return Err(TaxbridgeError::Configuration(
                "max_candidates must be at least 1".to_string(),
            ));
        }

        let p = &self.performance;
        if p.batch_size == 0 {
            return Err(TaxbridgeError::Configuration(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if p.sink_chunk_size == 0 {
            return Err(TaxbridgeError::Configuration(
                "sink_chunk_size must be at least 1".to_string(),
            ));
        }
        if p.workers == Some(0) {
            return Err(TaxbridgeError::Configuration(
                "workers must be at least 1 when set".to_string(),
            ));
        }

        if self.enrichment.language.trim().is_empty() {
            return Err(TaxbridgeError::Configuration(
                "enrichment language must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Worker count for the fuzzy stage
    pub fn worker_count(&self) -> usize {
        self.performance
            .workers
            .unwrap_or_else(crate::utils::parallel::default_worker_count)
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, TaxbridgeError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| TaxbridgeError::Configuration(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), TaxbridgeError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| TaxbridgeError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
