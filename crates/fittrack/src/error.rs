use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
  #[error("Required CSV files are missing: {}", format_paths(.paths))]
  MissingDataFiles { paths: Vec<PathBuf> },

  #[error("Column '{column}' not found in {source_name}")]
  MissingColumn { column: String, source_name: String },

  #[error("No gender-related column found after encoding")]
  MissingGenderColumn,

  #[error("Column '{column}' row {row}: expected a number, found '{value}'")]
  InvalidCell { column: String, row: usize, value: String },

  #[error("Dataset has no rows to train on")]
  EmptyDataset,

  #[error("Stored record {id} not found")]
  RowNotFound { id: i64 },

  #[error("Invalid configuration: {message}")]
  InvalidConfig { message: String },

  #[error("Dataset error: {0}")]
  Frame(#[from] polars::prelude::PolarsError),

  #[error("Record store error: {0}")]
  Store(#[from] rusqlite::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Configuration parse error: {0}")]
  Config(#[from] serde_json::Error),

  #[error("Prompt failed: {0}")]
  Prompt(#[from] dialoguer::Error),
}

fn format_paths(paths: &[PathBuf]) -> String {
  paths.iter().map(|p| format!("`{}`", p.display())).collect::<Vec<_>>().join(", ")
}

pub type Result<T> = std::result::Result<T, TrackerError>;
