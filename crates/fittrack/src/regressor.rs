//! Calorie regressor
//!
//! Seeded train/test split, feature scaling fit on the training partition,
//! gradient boosting, and alignment of a submission onto the training
//! columns before prediction. The model is fit fresh on every run.

use ndarray::{Array1, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use crate::boosting::{BoostingParams, GradientBoostedRegressor};
use crate::config::ModelSettings;
use crate::encoder::{self, TrainingTable};
use crate::error::{Result, TrackerError};
use crate::form::SessionRecord;
use crate::scaler::StandardScaler;

/// Row indices of each partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
  pub train: Vec<usize>,
  pub test: Vec<usize>,
}

/// Shuffle `0..n` with a fixed seed and hold out `ceil(n * test_fraction)`
/// rows for testing. At least one row always stays in training.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Split {
  let mut indices: Vec<usize> = (0..n).collect();
  indices.shuffle(&mut StdRng::seed_from_u64(seed));

  let test_len = ((n as f64) * test_fraction.clamp(0.0, 1.0)).ceil() as usize;
  let test_len = test_len.min(n.saturating_sub(1));

  let train = indices.split_off(test_len);
  Split { train, test: indices }
}

/// Lay out named values in exactly the training column order. Missing
/// columns become 0 and names outside the training set are dropped.
pub fn align_features(named: &[(String, f64)], columns: &[String]) -> Array1<f64> {
  columns
    .iter()
    .map(|column| named.iter().find(|(name, _)| name == column).map(|(_, value)| *value).unwrap_or(0.0))
    .collect()
}

impl From<&ModelSettings> for BoostingParams {
  fn from(settings: &ModelSettings) -> Self {
    Self {
      n_estimators: settings.n_estimators,
      learning_rate: settings.learning_rate,
      max_depth: settings.max_depth,
      min_samples_leaf: settings.min_samples_leaf,
      ..BoostingParams::default()
    }
  }
}

/// Scaler plus boosted ensemble, fit on one training table
#[derive(Debug, Clone)]
pub struct CaloriePredictor {
  columns: Vec<String>,
  gender_columns: Vec<String>,
  scaler: StandardScaler,
  model: GradientBoostedRegressor,
  split: Split,
}

impl CaloriePredictor {
  pub fn fit(table: &TrainingTable, settings: &ModelSettings) -> Result<Self> {
    if table.is_empty() {
      return Err(TrackerError::EmptyDataset);
    }

    let split = train_test_split(table.len(), settings.test_fraction, settings.seed);
    let x_train = table.features().select(Axis(0), &split.train);
    let y_train = table.calories().select(Axis(0), &split.train);

    let scaler = StandardScaler::fit(x_train.view());
    let x_train_scaled = scaler.transform(x_train.view());

    let params = BoostingParams::from(settings);
    info!(
      train_rows = split.train.len(),
      test_rows = split.test.len(),
      stages = params.n_estimators,
      "training calorie model"
    );
    let model = GradientBoostedRegressor::fit(x_train_scaled.view(), y_train.view(), params)?;

    Ok(Self {
      columns: table.feature_names().to_vec(),
      gender_columns: table.gender_columns().to_vec(),
      scaler,
      model,
      split,
    })
  }

  pub fn columns(&self) -> &[String] {
    &self.columns
  }

  /// Held-out partition; kept for inspection, not scored
  pub fn split(&self) -> &Split {
    &self.split
  }

  /// Raw (unrounded) calorie estimate for a submission
  pub fn predict(&self, record: &SessionRecord) -> f64 {
    let named = encoder::record_features(record, &self.gender_columns);
    let row = align_features(&named, &self.columns);
    self.model.predict_row(self.scaler.transform_row(row.view()).view())
  }
}
