//! One submission end to end
//!
//! Load (or reuse) the training table, store the submission as pending,
//! fit the model, predict, write the prediction back onto the stored row
//! and collect what the report needs.

use rand::rng;
use std::io::Write;
use tracing::{debug, info};

use crate::config::Config;
use crate::dataset::DatasetCache;
use crate::error::Result;
use crate::form::{round2, SessionRecord};
use crate::presenter::{self, Report};
use crate::regressor::CaloriePredictor;
use crate::store::{PersistedRow, RecordStore, RowId};

/// Result of a single submission
#[derive(Debug, Clone)]
pub struct Outcome {
  pub id: RowId,
  /// Prediction rounded to two decimals, as stored and displayed
  pub prediction: f64,
  /// Unrounded model output; the similar-rows window is centred on it
  pub raw_prediction: f64,
  pub similar: Vec<usize>,
  pub history: Vec<PersistedRow>,
}

pub struct Pipeline {
  config: Config,
  cache: DatasetCache,
}

impl Pipeline {
  pub fn new(config: Config) -> Self {
    let cache = DatasetCache::new(config.data.dataset_paths());
    Self { config, cache }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn cache(&self) -> &DatasetCache {
    &self.cache
  }

  fn open_store(&self) -> Result<RecordStore> {
    let store = RecordStore::open(&self.config.data.database)?;
    store.ensure_schema()?;
    Ok(store)
  }

  pub fn submit(&self, record: &SessionRecord) -> Result<Outcome> {
    let table = self.cache.training_table()?;

    let store = self.open_store()?;
    let id = store.insert_pending(record)?;

    let predictor = CaloriePredictor::fit(table, &self.config.model)?;
    let raw = predictor.predict(record);
    let prediction = round2(raw);
    debug!(raw, prediction, "predicted calories");

    store.update_latest(id, prediction)?;
    info!(%id, prediction, "stored submission");

    let similar = presenter::similar_rows(
      table.calories().view(),
      raw,
      self.config.similar.window,
      self.config.similar.limit,
      &mut rng(),
    );
    let history = store.read_all()?;

    Ok(Outcome { id, prediction, raw_prediction: raw, similar, history })
  }

  /// Render the full report for a finished submission
  pub fn report(
    &self,
    record: &SessionRecord,
    outcome: &Outcome,
    chart_size: (usize, usize),
    out: &mut impl Write,
  ) -> Result<()> {
    let table = self.cache.training_table()?;
    let report = Report {
      clock: presenter::clock_text(self.config.clock_offset()?),
      record,
      prediction: outcome.prediction,
      table,
      similar: &outcome.similar,
      history: &outcome.history,
      chart_size,
    };
    presenter::render(out, &report)?;
    Ok(())
  }

  /// Stored submissions only, without touching the dataset.
  /// Returns how many rows were printed.
  pub fn history(&self, out: &mut impl Write) -> Result<usize> {
    let rows = self.open_store()?.read_all()?;
    presenter::render_history(out, &rows)?;
    Ok(rows.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ModelSettings;
  use crate::error::TrackerError;
  use crate::form::{FormInput, Gender};
  use crate::test_support;
  use tempfile::TempDir;

  fn config(temp: &TempDir) -> Config {
    let paths = test_support::write_dataset(temp.path(), 80);
    let mut config = Config {
      model: ModelSettings { n_estimators: 30, learning_rate: 0.1, max_depth: 3, ..ModelSettings::default() },
      ..Config::default()
    };
    config.data.exercise = paths.exercise;
    config.data.calories = paths.calories;
    config.data.database = temp.path().join("fitness_tracker.db");
    config
  }

  #[test]
  fn test_submit_stores_rounded_prediction() {
    let temp = TempDir::new().unwrap();
    let pipeline = Pipeline::new(config(&temp));
    let record = SessionRecord::new(FormInput::default());

    let outcome = pipeline.submit(&record).unwrap();

    assert_eq!(outcome.prediction, round2(outcome.prediction));
    assert_eq!(outcome.history.len(), 1);
    let row = &outcome.history[0];
    assert_eq!(row.id, outcome.id);
    assert_eq!(row.gender, "Male");
    assert_eq!(row.bmi, 24.22);
    assert_eq!(row.calories, outcome.prediction);
    assert!(outcome.similar.len() <= 5);
  }

  #[test]
  fn test_similar_rows_centred_on_raw_prediction() {
    let temp = TempDir::new().unwrap();
    let pipeline = Pipeline::new(config(&temp));
    let outcome = pipeline.submit(&SessionRecord::new(FormInput::default())).unwrap();

    assert_eq!(outcome.prediction, round2(outcome.raw_prediction));
    let calories = pipeline.cache().training_table().unwrap().calories();
    let window = pipeline.config().similar.window;
    for &row in &outcome.similar {
      assert!((calories[row] - outcome.raw_prediction).abs() <= window, "row {row} outside window");
    }
  }

  #[test]
  fn test_repeat_submissions_append_and_reuse_cache() {
    let temp = TempDir::new().unwrap();
    let pipeline = Pipeline::new(config(&temp));

    pipeline.submit(&SessionRecord::new(FormInput::default())).unwrap();
    assert!(pipeline.cache().is_loaded());

    let female = SessionRecord::new(FormInput { gender: Gender::Female, duration_min: 20, ..FormInput::default() });
    let outcome = pipeline.submit(&female).unwrap();

    assert_eq!(outcome.history.len(), 2);
    assert_eq!(outcome.history[1].gender, "Female");
    assert!(outcome.history.iter().all(|row| row.calories > 0.0));
  }

  #[test]
  fn test_missing_files_leave_store_untouched() {
    let temp = TempDir::new().unwrap();
    let mut config = Config::default();
    config.data.exercise = temp.path().join("exercise.csv");
    config.data.calories = temp.path().join("calories.csv");
    config.data.database = temp.path().join("fitness_tracker.db");

    let pipeline = Pipeline::new(config);
    let err = pipeline.submit(&SessionRecord::new(FormInput::default())).unwrap_err();

    assert!(matches!(err, TrackerError::MissingDataFiles { .. }));
    assert!(!temp.path().join("fitness_tracker.db").exists());
  }

  #[test]
  fn test_report_contains_every_section() {
    colored::control::set_override(false);
    let temp = TempDir::new().unwrap();
    let pipeline = Pipeline::new(config(&temp));
    let record = SessionRecord::new(FormInput::default());
    let outcome = pipeline.submit(&record).unwrap();

    let mut out = Vec::new();
    pipeline.report(&record, &outcome, (40, 8), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    for heading in [
      "Personal Fitness Tracker",
      "Your Input Data",
      "Predicted Calories Burned",
      "Similar Results from Dataset",
      "Fitness Trends Over Age",
      "Health Advisory & Feedback",
      "Past User Records",
    ] {
      assert!(text.contains(heading), "missing section {heading}");
    }
    assert!(text.contains(&format!("{:.2} kcal", outcome.prediction)));
    assert!(text.contains("Gender_female = 1"));
  }

  #[test]
  fn test_history_without_dataset() {
    colored::control::set_override(false);
    let temp = TempDir::new().unwrap();
    let mut config = Config::default();
    config.data.database = temp.path().join("fitness_tracker.db");
    config.data.exercise = temp.path().join("missing.csv");

    let mut out = Vec::new();
    assert_eq!(Pipeline::new(config).history(&mut out).unwrap(), 0);
    assert!(String::from_utf8(out).unwrap().contains("(no rows)"));
  }
}
