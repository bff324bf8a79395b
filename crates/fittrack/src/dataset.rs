//! Dataset loading
//!
//! Reads the exercise and calorie CSVs into polars frames, inner-joins them
//! on the shared user identifier and keeps the encoded result in an explicit
//! cache object.

use once_cell::unsync::OnceCell;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::encoder::{self, TrainingTable};
use crate::error::{Result, TrackerError};

/// Column both input files must carry
pub const JOIN_KEY: &str = "User_ID";

const LEFT_ROW: &str = "__left_row";
const RIGHT_ROW: &str = "__right_row";

/// Locations of the two input files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
  pub exercise: PathBuf,
  pub calories: PathBuf,
}

impl DatasetPaths {
  pub fn new(exercise: impl Into<PathBuf>, calories: impl Into<PathBuf>) -> Self {
    Self { exercise: exercise.into(), calories: calories.into() }
  }

  /// Every configured path that does not exist on disk
  pub fn missing(&self) -> Vec<PathBuf> {
    [&self.calories, &self.exercise].into_iter().filter(|p| !p.exists()).cloned().collect()
  }
}

/// Column names of a frame as owned strings
pub fn column_names(frame: &DataFrame) -> Vec<String> {
  frame.get_column_names().iter().map(|name| name.to_string()).collect()
}

fn has_column(frame: &DataFrame, name: &str) -> bool {
  frame.get_column_names().iter().any(|c| c.as_str() == name)
}

fn require_column(frame: &DataFrame, name: &str, source_name: &str) -> Result<()> {
  if has_column(frame, name) {
    Ok(())
  } else {
    Err(TrackerError::MissingColumn { column: name.to_string(), source_name: source_name.to_string() })
  }
}

/// Values of a column as `f64`. Text cells that do not parse, and empty
/// cells, are reported with their row.
pub fn numeric_column(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
  require_column(frame, name, "joined dataset")?;
  let series = frame.column(name)?.as_materialized_series();
  let cast = series.cast(&DataType::Float64)?;

  cast
    .f64()?
    .into_iter()
    .enumerate()
    .map(|(row, value)| {
      value.ok_or_else(|| TrackerError::InvalidCell {
        column: name.to_string(),
        row,
        value: series.get(row).map(|v| v.to_string()).unwrap_or_default(),
      })
    })
    .collect()
}

/// Read a CSV file with a header row; column types are inferred by polars
pub fn read_csv(path: &Path) -> Result<DataFrame> {
  let frame = CsvReadOptions::default()
    .with_has_header(true)
    .try_into_reader_with_file_path(Some(path.to_path_buf()))?
    .finish()?;
  Ok(frame)
}

/// Inner join on `key`. Left rows keep their order; a left row matching
/// several right rows yields one output row per match, in right order.
/// Non-key columns present on both sides get `_x` / `_y` suffixes.
pub fn inner_join(left: &DataFrame, right: &DataFrame, key: &str) -> Result<DataFrame> {
  require_column(left, key, "exercise")?;
  require_column(right, key, "calories")?;

  let mut left = left.with_row_index(LEFT_ROW.into(), None)?;
  let mut right = right.with_row_index(RIGHT_ROW.into(), None)?;

  let shared: Vec<String> = column_names(&left)
    .into_iter()
    .filter(|name| name != key && name != LEFT_ROW && has_column(&right, name))
    .collect();
  for name in &shared {
    left.rename(name, format!("{name}_x").into())?;
    right.rename(name, format!("{name}_y").into())?;
  }

  let joined = left
    .inner_join(&right, [key], [key])?
    .sort([LEFT_ROW, RIGHT_ROW], SortMultipleOptions::default().with_maintain_order(true))?
    .drop(LEFT_ROW)?
    .drop(RIGHT_ROW)?;
  Ok(joined)
}

/// Check both files exist, read them and join exercise with calories on `User_ID`
pub fn load_joined(paths: &DatasetPaths) -> Result<DataFrame> {
  let missing = paths.missing();
  if !missing.is_empty() {
    return Err(TrackerError::MissingDataFiles { paths: missing });
  }

  let exercise = read_csv(&paths.exercise)?;
  let calories = read_csv(&paths.calories)?;
  debug!(exercise_rows = exercise.height(), calorie_rows = calories.height(), "read input files");

  let joined = inner_join(&exercise, &calories, JOIN_KEY)?;
  info!(rows = joined.height(), columns = joined.width(), "joined dataset");
  Ok(joined)
}

/// Lifetime-scoped memo of the encoded training table.
///
/// The first call reads and encodes the files; later calls on the same
/// cache return the stored table without touching disk.
#[derive(Debug)]
pub struct DatasetCache {
  paths: DatasetPaths,
  table: OnceCell<TrainingTable>,
}

impl DatasetCache {
  pub fn new(paths: DatasetPaths) -> Self {
    Self { paths, table: OnceCell::new() }
  }

  pub fn paths(&self) -> &DatasetPaths {
    &self.paths
  }

  pub fn is_loaded(&self) -> bool {
    self.table.get().is_some()
  }

  pub fn training_table(&self) -> Result<&TrainingTable> {
    self.table.get_or_try_init(|| {
      let joined = load_joined(&self.paths)?;
      encoder::build_training_table(encoder::one_hot(joined)?)
    })
  }
}
