//! Record store
//!
//! One SQLite table holding every submission. Rows are inserted with zero
//! calories and updated through the id handed back by the insert.

use rusqlite::{params, Connection};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, TrackerError};
use crate::form::SessionRecord;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    age INTEGER,
    gender TEXT,
    height REAL,
    weight REAL,
    bmi REAL,
    calories REAL
);
";

/// Handle to a stored submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(i64);

impl RowId {
  pub fn get(self) -> i64 {
    self.0
  }
}

impl fmt::Display for RowId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A submission as stored on disk
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRow {
  pub id: RowId,
  pub age: i64,
  pub gender: String,
  pub height: f64,
  pub weight: f64,
  pub bmi: f64,
  pub calories: f64,
}

pub struct RecordStore {
  conn: Connection,
}

impl RecordStore {
  pub fn open(path: &Path) -> Result<Self> {
    let conn = Connection::open(path)?;
    debug!(path = %path.display(), "opened record store");
    Ok(Self { conn })
  }

  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    Ok(Self { conn })
  }

  /// Create the submissions table when it does not exist yet
  pub fn ensure_schema(&self) -> Result<()> {
    self.conn.execute_batch(SCHEMA)?;
    Ok(())
  }

  /// Store a fresh submission with calories = 0
  pub fn insert_pending(&self, record: &SessionRecord) -> Result<RowId> {
    self.conn.execute(
      "INSERT INTO users (age, gender, height, weight, bmi, calories) VALUES (?1, ?2, ?3, ?4, ?5, 0)",
      params![
        record.age(),
        record.gender().label(),
        f64::from(record.height_cm()),
        f64::from(record.weight_kg()),
        record.bmi()
      ],
    )?;

    let id = RowId(self.conn.last_insert_rowid());
    debug!(%id, "inserted pending submission");
    Ok(id)
  }

  /// Write the prediction onto the submission that was just inserted
  pub fn update_latest(&self, id: RowId, calories: f64) -> Result<()> {
    let changed = self.conn.execute("UPDATE users SET calories = ?1 WHERE id = ?2", params![calories, id.0])?;

    if changed == 0 {
      return Err(TrackerError::RowNotFound { id: id.0 });
    }
    debug!(%id, calories, "stored prediction");
    Ok(())
  }

  /// Every stored submission ordered by id
  pub fn read_all(&self) -> Result<Vec<PersistedRow>> {
    let mut stmt = self.conn.prepare(
      "SELECT id, age, gender, height, weight, bmi, calories FROM users ORDER BY id",
    )?;

    let rows = stmt
      .query_map([], |row| {
        Ok(PersistedRow {
          id: RowId(row.get(0)?),
          age: row.get::<_, Option<i64>>(1)?.unwrap_or_default(),
          gender: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
          height: row.get::<_, Option<f64>>(3)?.unwrap_or_default(),
          weight: row.get::<_, Option<f64>>(4)?.unwrap_or_default(),
          bmi: row.get::<_, Option<f64>>(5)?.unwrap_or_default(),
          calories: row.get::<_, Option<f64>>(6)?.unwrap_or_default(),
        })
      })?
      .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::form::{FormInput, Gender};
  use tempfile::TempDir;

  fn store() -> RecordStore {
    let store = RecordStore::open_in_memory().unwrap();
    store.ensure_schema().unwrap();
    store
  }

  #[test]
  fn test_ensure_schema_is_idempotent() {
    let store = store();
    store.ensure_schema().unwrap();
    assert!(store.read_all().unwrap().is_empty());
  }

  #[test]
  fn test_insert_pending_stores_zero_calories() {
    let store = store();
    let record = SessionRecord::new(FormInput::default());

    let id = store.insert_pending(&record).unwrap();
    let rows = store.read_all().unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].age, 30);
    assert_eq!(rows[0].gender, "Male");
    assert_eq!(rows[0].height, 170.0);
    assert_eq!(rows[0].weight, 70.0);
    assert_eq!(rows[0].bmi, 24.22);
    assert_eq!(rows[0].calories, 0.0);
  }

  #[test]
  fn test_update_targets_the_inserted_row() {
    let store = store();
    let first = store.insert_pending(&SessionRecord::new(FormInput::default())).unwrap();
    let second = store
      .insert_pending(&SessionRecord::new(FormInput { gender: Gender::Female, ..FormInput::default() }))
      .unwrap();

    // the older row is updated even though a newer one exists
    store.update_latest(first, 123.45).unwrap();

    let rows = store.read_all().unwrap();
    assert_eq!(rows[0].id, first);
    assert_eq!(rows[0].calories, 123.45);
    assert_eq!(rows[1].id, second);
    assert_eq!(rows[1].gender, "Female");
    assert_eq!(rows[1].calories, 0.0);
  }

  #[test]
  fn test_update_unknown_row_fails() {
    let store = store();
    let err = store.update_latest(RowId(42), 1.0).unwrap_err();
    assert!(matches!(err, TrackerError::RowNotFound { id: 42 }));
  }

  #[test]
  fn test_history_persists_across_connections() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("fitness_tracker.db");

    {
      let store = RecordStore::open(&path).unwrap();
      store.ensure_schema().unwrap();
      let id = store.insert_pending(&SessionRecord::new(FormInput::default())).unwrap();
      store.update_latest(id, 88.0).unwrap();
    }

    let store = RecordStore::open(&path).unwrap();
    store.ensure_schema().unwrap();
    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].calories, 88.0);
  }
}
