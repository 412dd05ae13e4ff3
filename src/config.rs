use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::MatchingParams;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// JSON corpus file; the bundled sample corpus is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corpus_path: Option<String>,
    #[serde(default = "default_sura")]
    pub default_sura: u32,
    #[serde(default = "default_window_size")]
    pub default_window_size: usize,
    #[serde(default = "default_initial_confidence_threshold")]
    pub initial_confidence_threshold: f64,
    #[serde(default = "default_confidence_floor")]
    pub confidence_floor: f64,
    #[serde(default = "default_threshold_step")]
    pub threshold_step: f64,
    #[serde(default = "default_max_window_size")]
    pub max_window_size: usize,
    #[serde(default = "default_recovery_after_failures")]
    pub recovery_after_failures: u32,
    #[serde(default = "default_min_search_radius")]
    pub min_search_radius: usize,
    #[serde(default = "default_word_similarity")]
    pub word_similarity: f64,
}

fn default_sura() -> u32 {
    1
}
fn default_window_size() -> usize {
    MatchingParams::default().default_window_size
}
fn default_initial_confidence_threshold() -> f64 {
    MatchingParams::default().initial_confidence_threshold
}
fn default_confidence_floor() -> f64 {
    MatchingParams::default().confidence_floor
}
fn default_threshold_step() -> f64 {
    MatchingParams::default().threshold_step
}
fn default_max_window_size() -> usize {
    MatchingParams::default().max_window_size
}
fn default_recovery_after_failures() -> u32 {
    MatchingParams::default().recovery_after_failures
}
fn default_min_search_radius() -> usize {
    MatchingParams::default().min_search_radius
}
fn default_word_similarity() -> f64 {
    MatchingParams::default().word_similarity
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_path: None,
            default_sura: default_sura(),
            default_window_size: default_window_size(),
            initial_confidence_threshold: default_initial_confidence_threshold(),
            confidence_floor: default_confidence_floor(),
            threshold_step: default_threshold_step(),
            max_window_size: default_max_window_size(),
            recovery_after_failures: default_recovery_after_failures(),
            min_search_radius: default_min_search_radius(),
            word_similarity: default_word_similarity(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Write to the default location, returning where the file went.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hifz")
            .join("config.toml")
    }

    /// Reset out-of-range or mutually inconsistent values to their defaults.
    /// Returns the names of the keys that were corrected.
    pub fn validate(&mut self) -> Vec<&'static str> {
        let mut fixed = Vec::new();

        if !(0.0..=1.0).contains(&self.initial_confidence_threshold) {
            self.initial_confidence_threshold = default_initial_confidence_threshold();
            fixed.push("initial_confidence_threshold");
        }
        if !(0.0..=1.0).contains(&self.confidence_floor)
            || self.confidence_floor > self.initial_confidence_threshold
        {
            self.confidence_floor = default_confidence_floor().min(self.initial_confidence_threshold);
            fixed.push("confidence_floor");
        }
        if !(self.threshold_step > 0.0 && self.threshold_step <= 1.0) {
            self.threshold_step = default_threshold_step();
            fixed.push("threshold_step");
        }
        if self.max_window_size == 0 {
            self.max_window_size = default_max_window_size();
            fixed.push("max_window_size");
        }
        if self.default_window_size == 0 || self.default_window_size > self.max_window_size {
            self.default_window_size = default_window_size().min(self.max_window_size);
            fixed.push("default_window_size");
        }
        if self.recovery_after_failures == 0 {
            self.recovery_after_failures = default_recovery_after_failures();
            fixed.push("recovery_after_failures");
        }
        if !(0.0..=1.0).contains(&self.word_similarity) {
            self.word_similarity = default_word_similarity();
            fixed.push("word_similarity");
        }

        fixed
    }

    pub fn matching_params(&self) -> MatchingParams {
        MatchingParams {
            initial_confidence_threshold: self.initial_confidence_threshold,
            confidence_floor: self.confidence_floor,
            threshold_step: self.threshold_step,
            default_window_size: self.default_window_size,
            max_window_size: self.max_window_size,
            recovery_after_failures: self.recovery_after_failures,
            min_search_radius: self.min_search_radius,
            word_similarity: self.word_similarity,
        }
    }
}
