//! Feature encoding
//!
//! Turns the joined dataset into the numeric training table: categorical
//! columns become indicator columns, BMI is derived from height and weight.

use ndarray::{Array1, Array2, ArrayView1};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

use crate::dataset;
use crate::error::{Result, TrackerError};
use crate::form::SessionRecord;

/// Substring identifying gender indicator columns after encoding
pub const GENDER_MARKER: &str = "Gender";
/// Numeric features following the gender indicators, in model order
pub const NUMERIC_FEATURES: [&str; 5] = ["Age", "BMI", "Duration", "Heart_Rate", "Body_Temp"];
pub const TARGET: &str = "Calories";

/// weight / (height in metres)²
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
  let height_m = height_cm / 100.0;
  weight_kg / (height_m * height_m)
}

/// Replace every text column `C` by `f64` indicator columns `C_<category>`,
/// one per distinct value in sorted order. Other columns pass through.
pub fn one_hot(frame: DataFrame) -> Result<DataFrame> {
  let mut columns: Vec<Column> = Vec::with_capacity(frame.width());

  for column in frame.get_columns() {
    if column.dtype() != &DataType::String {
      columns.push(column.clone());
      continue;
    }

    let values: Vec<Option<&str>> = column.as_materialized_series().str()?.into_iter().collect();
    let categories: BTreeSet<&str> = values.iter().flatten().copied().collect();
    for category in categories {
      let indicator: Vec<f64> = values.iter().map(|v| if *v == Some(category) { 1.0 } else { 0.0 }).collect();
      columns.push(Series::new(format!("{}_{}", column.name(), category).into(), indicator).into());
    }
  }

  Ok(DataFrame::new(columns)?)
}

/// Columns whose name mentions gender, in frame order
pub fn gender_columns(frame: &DataFrame) -> Result<Vec<String>> {
  let columns: Vec<String> =
    dataset::column_names(frame).into_iter().filter(|name| name.contains(GENDER_MARKER)).collect();

  if columns.is_empty() {
    return Err(TrackerError::MissingGenderColumn);
  }
  Ok(columns)
}

/// Encoded training rows: gender indicators and numeric features, with the
/// measured calories as target.
#[derive(Debug, Clone)]
pub struct TrainingTable {
  feature_names: Vec<String>,
  gender_columns: Vec<String>,
  features: Array2<f64>,
  calories: Array1<f64>,
}

impl TrainingTable {
  pub fn new(
    feature_names: Vec<String>,
    gender_columns: Vec<String>,
    features: Array2<f64>,
    calories: Array1<f64>,
  ) -> Result<Self> {
    if features.nrows() == 0 {
      return Err(TrackerError::EmptyDataset);
    }
    debug_assert_eq!(features.ncols(), feature_names.len());
    debug_assert_eq!(features.nrows(), calories.len());
    Ok(Self { feature_names, gender_columns, features, calories })
  }

  pub fn len(&self) -> usize {
    self.features.nrows()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn feature_names(&self) -> &[String] {
    &self.feature_names
  }

  pub fn gender_columns(&self) -> &[String] {
    &self.gender_columns
  }

  /// Column used to colour charts: the first detected gender column
  pub fn hue_column(&self) -> &str {
    &self.gender_columns[0]
  }

  pub fn features(&self) -> &Array2<f64> {
    &self.features
  }

  pub fn calories(&self) -> &Array1<f64> {
    &self.calories
  }

  pub fn feature(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
    self.feature_names.iter().position(|n| n == name).map(|i| self.features.column(i))
  }
}

/// Derive BMI and select the model columns from a one-hot encoded frame
pub fn build_training_table(frame: DataFrame) -> Result<TrainingTable> {
  let gender = gender_columns(&frame)?;

  let weight = dataset::numeric_column(&frame, "Weight")?;
  let height = dataset::numeric_column(&frame, "Height")?;
  let bmi_values: Vec<f64> = weight.iter().zip(&height).map(|(&w, &h)| bmi(w, h)).collect();

  let mut feature_names = gender.clone();
  feature_names.extend(NUMERIC_FEATURES.iter().map(|s| s.to_string()));

  let rows = frame.height();
  let mut features = Array2::<f64>::zeros((rows, feature_names.len()));
  for (j, name) in feature_names.iter().enumerate() {
    let values = if name == "BMI" { bmi_values.clone() } else { dataset::numeric_column(&frame, name)? };
    for (i, value) in values.into_iter().enumerate() {
      features[[i, j]] = value;
    }
  }

  let calories = Array1::from(dataset::numeric_column(&frame, TARGET)?);
  debug!(rows, features = ?feature_names, "encoded training table");

  TrainingTable::new(feature_names, gender, features, calories)
}

/// Named numeric features of a submission. Includes the raw `Gender` flag
/// and one indicator per training gender column, so alignment against the
/// training columns picks whichever shape the dataset uses.
///
/// The indicator matching the submitted gender is set to 1. Plain
/// reindexing onto the training columns would leave every `Gender_*`
/// indicator at 0 and hide gender from the model.
pub fn record_features(record: &SessionRecord, gender_columns: &[String]) -> Vec<(String, f64)> {
  let mut named = vec![
    ("Age".to_string(), f64::from(record.age())),
    ("Height".to_string(), f64::from(record.height_cm())),
    ("Weight".to_string(), f64::from(record.weight_kg())),
    ("BMI".to_string(), record.bmi()),
    ("Duration".to_string(), f64::from(record.duration_min())),
    ("Heart_Rate".to_string(), f64::from(record.heart_rate_bpm())),
    ("Body_Temp".to_string(), record.body_temp_c()),
    (GENDER_MARKER.to_string(), f64::from(record.gender().as_flag())),
  ];

  let prefix = format!("{GENDER_MARKER}_");
  for column in gender_columns {
    if let Some(category) = column.strip_prefix(&prefix) {
      let matches = category.eq_ignore_ascii_case(record.gender().label());
      named.push((column.clone(), if matches { 1.0 } else { 0.0 }));
    }
  }

  named
}
