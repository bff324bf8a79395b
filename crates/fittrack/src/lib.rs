//! Fittrack - Personal Fitness Tracker
//!
//! Predicts kilocalories burned for a workout from a gradient boosted model
//! trained on a reference exercise dataset, keeps every submission in a
//! local SQLite history and prints rule-based health advice.

pub mod advice;
pub mod boosting;
pub mod chart;
pub mod config;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod form;
pub mod pipeline;
pub mod presenter;
pub mod regressor;
pub mod scaler;
pub mod store;

pub use config::Config;
pub use dataset::{DatasetCache, DatasetPaths};
pub use error::{Result, TrackerError};
pub use form::{FormInput, Gender, SessionRecord};
pub use regressor::CaloriePredictor;
pub use store::{PersistedRow, RecordStore, RowId};

#[cfg(test)]
pub(crate) mod test_support {
  use std::fs;
  use std::path::Path;

  use tempfile::TempDir;

  use crate::dataset::{load_joined, DatasetPaths, JOIN_KEY};
  use crate::encoder::{self, TrainingTable};

  const EXERCISE_HEADERS: [&str; 8] =
    ["User_ID", "Gender", "Age", "Height", "Weight", "Duration", "Heart_Rate", "Body_Temp"];

  /// Deterministic exercise rows and their calories, keyed by `User_ID`
  pub fn dataset_records(n: usize) -> (Vec<Vec<String>>, Vec<Vec<String>>) {
    let mut exercise = Vec::with_capacity(n);
    let mut calories = Vec::with_capacity(n);

    for i in 0..n {
      let male = i % 2 == 0;
      let age = 20 + (i * 7) % 50;
      let height = 150 + (i * 11) % 45;
      let weight = 50 + (i * 13) % 60;
      let duration = 1 + (i * 17) % 29;
      let heart_rate = 75 + (i * 5) % 30;
      let body_temp = 38.0 + ((i * 3) % 20) as f64 / 10.0;

      let kcal = duration as f64 * (0.5 + heart_rate as f64 * 0.04)
        + if male { 5.0 } else { 0.0 }
        + age as f64 * 0.05;
      let kcal = (kcal * 10.0).round() / 10.0;

      let id = (10_000 + i).to_string();
      exercise.push(vec![
        id.clone(),
        if male { "male" } else { "female" }.to_string(),
        age.to_string(),
        height.to_string(),
        weight.to_string(),
        duration.to_string(),
        heart_rate.to_string(),
        format!("{body_temp:.1}"),
      ]);
      calories.push(vec![id, kcal.to_string()]);
    }

    (exercise, calories)
  }

  pub fn training_table(n: usize) -> TrainingTable {
    let temp = TempDir::new().unwrap();
    let paths = write_dataset(temp.path(), n);
    let joined = load_joined(&paths).unwrap();
    encoder::build_training_table(encoder::one_hot(joined).unwrap()).unwrap()
  }

  /// Write `exercise.csv` and `calories.csv` into `dir`. Calories are written
  /// in reverse order so the join has to match on the key.
  pub fn write_dataset(dir: &Path, n: usize) -> DatasetPaths {
    let (exercise, calories) = dataset_records(n);

    let mut exercise_csv = EXERCISE_HEADERS.join(",");
    for row in &exercise {
      exercise_csv.push('\n');
      exercise_csv.push_str(&row.join(","));
    }

    let mut calories_csv = format!("{JOIN_KEY},{}", encoder::TARGET);
    for row in calories.iter().rev() {
      calories_csv.push('\n');
      calories_csv.push_str(&row.join(","));
    }

    let paths = DatasetPaths::new(dir.join("exercise.csv"), dir.join("calories.csv"));
    fs::write(&paths.exercise, exercise_csv + "\n").unwrap();
    fs::write(&paths.calories, calories_csv + "\n").unwrap();
    paths
  }
}
