//! Configuration management for fittrack
//!
//! Handles loading data locations, model hyperparameters and display
//! settings from a JSON file, falling back to defaults.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dataset::DatasetPaths;
use crate::error::{Result, TrackerError};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
  /// Input CSVs and the submission database
  #[serde(default)]
  pub data: DataPaths,
  /// Gradient boosting and split settings
  #[serde(default)]
  pub model: ModelSettings,
  /// "Similar results" lookup settings
  #[serde(default)]
  pub similar: SimilarSettings,
  /// Fixed UTC offset for the header clock, e.g. "+05:30". Local time when unset.
  #[serde(default)]
  pub clock_offset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPaths {
  #[serde(default = "default_exercise")]
  pub exercise: PathBuf,
  #[serde(default = "default_calories")]
  pub calories: PathBuf,
  #[serde(default = "default_database")]
  pub database: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
  #[serde(default = "default_n_estimators")]
  pub n_estimators: usize,
  #[serde(default = "default_learning_rate")]
  pub learning_rate: f64,
  #[serde(default = "default_max_depth")]
  pub max_depth: usize,
  #[serde(default = "default_min_samples_leaf")]
  pub min_samples_leaf: usize,
  #[serde(default = "default_test_fraction")]
  pub test_fraction: f64,
  #[serde(default = "default_seed")]
  pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarSettings {
  /// Half-width of the calorie window around the prediction
  #[serde(default = "default_window")]
  pub window: f64,
  /// Maximum rows sampled for display
  #[serde(default = "default_limit")]
  pub limit: usize,
}

fn default_exercise() -> PathBuf {
  PathBuf::from("exercise.csv")
}
fn default_calories() -> PathBuf {
  PathBuf::from("calories.csv")
}
fn default_database() -> PathBuf {
  PathBuf::from("fitness_tracker.db")
}
fn default_n_estimators() -> usize {
  500
}
fn default_learning_rate() -> f64 {
  0.05
}
fn default_max_depth() -> usize {
  5
}
fn default_min_samples_leaf() -> usize {
  1
}
fn default_test_fraction() -> f64 {
  0.2
}
fn default_seed() -> u64 {
  1
}
fn default_window() -> f64 {
  10.0
}
fn default_limit() -> usize {
  5
}

impl DataPaths {
  pub fn dataset_paths(&self) -> DatasetPaths {
    DatasetPaths::new(self.exercise.clone(), self.calories.clone())
  }
}

impl Default for DataPaths {
  fn default() -> Self {
    Self { exercise: default_exercise(), calories: default_calories(), database: default_database() }
  }
}

impl Default for ModelSettings {
  fn default() -> Self {
    Self {
      n_estimators: default_n_estimators(),
      learning_rate: default_learning_rate(),
      max_depth: default_max_depth(),
      min_samples_leaf: default_min_samples_leaf(),
      test_fraction: default_test_fraction(),
      seed: default_seed(),
    }
  }
}

impl Default for SimilarSettings {
  fn default() -> Self {
    Self { window: default_window(), limit: default_limit() }
  }
}

impl Config {
  /// Load configuration from a file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
  }

  /// Load configuration from current directory or defaults
  pub fn load() -> Result<Self> {
    let config_paths = ["fittrack.json", ".fittrack.json", ".fittrack/config.json"];

    for path in &config_paths {
      if Path::new(path).exists() {
        return Self::load_from_file(path);
      }
    }

    Ok(Config::default())
  }

  /// Save configuration to a file
  pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(self)?;
    std::fs::write(path, content)?;
    Ok(())
  }

  pub fn validate(&self) -> Result<()> {
    let model = &self.model;
    if model.n_estimators == 0 {
      return Err(invalid("model.n_estimators must be at least 1"));
    }
    if model.learning_rate.is_nan() || model.learning_rate <= 0.0 {
      return Err(invalid("model.learning_rate must be positive"));
    }
    if model.max_depth == 0 {
      return Err(invalid("model.max_depth must be at least 1"));
    }
    if model.min_samples_leaf == 0 {
      return Err(invalid("model.min_samples_leaf must be at least 1"));
    }
    if !(0.0..1.0).contains(&model.test_fraction) {
      return Err(invalid("model.test_fraction must be in [0, 1)"));
    }
    if self.similar.window < 0.0 {
      return Err(invalid("similar.window must not be negative"));
    }
    self.clock_offset()?;
    Ok(())
  }

  /// Parsed header clock offset, `None` meaning local time.
  pub fn clock_offset(&self) -> Result<Option<FixedOffset>> {
    self.clock_offset.as_deref().map(parse_utc_offset).transpose()
  }
}

fn invalid(message: &str) -> TrackerError {
  TrackerError::InvalidConfig { message: message.to_string() }
}

/// Parse "+HH:MM" / "-HH:MM" into a fixed offset.
pub fn parse_utc_offset(text: &str) -> Result<FixedOffset> {
  let bad = || invalid(&format!("clock_offset '{text}' is not of the form +HH:MM"));

  let (sign, rest) = match text.as_bytes().first() {
    Some(b'+') => (1, &text[1..]),
    Some(b'-') => (-1, &text[1..]),
    _ => return Err(bad()),
  };
  let (hours, minutes) = rest.split_once(':').ok_or_else(bad)?;
  let hours: i32 = hours.parse().map_err(|_| bad())?;
  let minutes: i32 = minutes.parse().map_err(|_| bad())?;
  if hours > 23 || !(0..60).contains(&minutes) {
    return Err(bad());
  }

  FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(bad)
}
