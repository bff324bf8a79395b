//! Report rendering
//!
//! Everything shown after a submission: input echo, prediction, similar
//! dataset rows, the age/calorie chart, advice and the stored history.

use chrono::{FixedOffset, Local, Utc};
use colored::*;
use ndarray::ArrayView1;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::io::{self, Write};

use crate::advice::{self, Advisory, Severity};
use crate::chart::ScatterChart;
use crate::encoder::TrainingTable;
use crate::form::SessionRecord;
use crate::store::PersistedRow;

pub const TITLE: &str = "🏋️ Personal Fitness Tracker";

/// Indices of dataset rows whose calories lie within `window` of the
/// prediction, sampled down to at most `limit` rows and returned sorted.
pub fn similar_rows<R: Rng + ?Sized>(
  calories: ArrayView1<'_, f64>,
  prediction: f64,
  window: f64,
  limit: usize,
  rng: &mut R,
) -> Vec<usize> {
  let candidates: Vec<usize> = calories
    .iter()
    .enumerate()
    .filter(|(_, &c)| c >= prediction - window && c <= prediction + window)
    .map(|(i, _)| i)
    .collect();

  let mut picked: Vec<usize> = candidates.choose_multiple(rng, limit).copied().collect();
  picked.sort_unstable();
  picked
}

/// Current wall-clock time for the header, in a fixed offset or local time
pub fn clock_text(offset: Option<FixedOffset>) -> String {
  const FORMAT: &str = "%I:%M:%S %p";
  match offset {
    Some(offset) => Utc::now().with_timezone(&offset).format(FORMAT).to_string(),
    None => Local::now().format(FORMAT).to_string(),
  }
}

/// Chart size that fits the current terminal width
pub fn terminal_chart_size() -> (usize, usize) {
  let (_rows, cols) = console::Term::stdout().size();
  (usize::from(cols).saturating_sub(12).clamp(20, 100), 16)
}

/// Everything a full report needs
pub struct Report<'a> {
  pub clock: String,
  pub record: &'a SessionRecord,
  pub prediction: f64,
  pub table: &'a TrainingTable,
  pub similar: &'a [usize],
  pub history: &'a [PersistedRow],
  pub chart_size: (usize, usize),
}

fn section(out: &mut impl Write, title: &str) -> io::Result<()> {
  writeln!(out)?;
  writeln!(out, "{}", title.bold())?;
  writeln!(out, "{}", "=".repeat(title.chars().count().max(40)))
}

/// Aligned text table; widths come from the widest cell per column
pub fn write_table(out: &mut impl Write, headers: &[String], rows: &[Vec<String>]) -> io::Result<()> {
  let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
  for row in rows {
    for (i, cell) in row.iter().enumerate() {
      if let Some(width) = widths.get_mut(i) {
        *width = (*width).max(cell.chars().count());
      }
    }
  }

  let header_line: Vec<String> =
    headers.iter().zip(&widths).map(|(h, &w)| format!("{:>w$}", h, w = w).cyan().bold().to_string()).collect();
  writeln!(out, "{}", header_line.join("  "))?;

  for row in rows {
    let line: Vec<String> = row.iter().zip(&widths).map(|(c, &w)| format!("{:>w$}", c, w = w)).collect();
    writeln!(out, "{}", line.join("  "))?;
  }

  if rows.is_empty() {
    writeln!(out, "{}", "(no rows)".dimmed())?;
  }
  Ok(())
}

fn number(value: f64) -> String {
  if value.fract() == 0.0 {
    format!("{value:.0}")
  } else {
    format!("{value:.2}")
  }
}

pub fn render_input(out: &mut impl Write, record: &SessionRecord) -> io::Result<()> {
  section(out, "📝 Your Input Data")?;
  let headers: Vec<String> =
    ["Age", "Height", "Weight", "BMI", "Duration", "Heart_Rate", "Body_Temp", "Gender"].map(String::from).to_vec();
  let row = vec![
    record.age().to_string(),
    record.height_cm().to_string(),
    record.weight_kg().to_string(),
    format!("{:.2}", record.bmi()),
    record.duration_min().to_string(),
    record.heart_rate_bpm().to_string(),
    number(record.body_temp_c()),
    record.gender().to_string(),
  ];
  write_table(out, &headers, &[row])
}

pub fn render_prediction(out: &mut impl Write, prediction: f64) -> io::Result<()> {
  writeln!(out)?;
  writeln!(out, "{}", format!("🔥 Predicted Calories Burned: {prediction:.2} kcal").red().bold())
}

pub fn render_similar(out: &mut impl Write, table: &TrainingTable, similar: &[usize]) -> io::Result<()> {
  section(out, "📍 Similar Results from Dataset")?;

  let mut headers = table.feature_names().to_vec();
  headers.push(crate::encoder::TARGET.to_string());

  let rows: Vec<Vec<String>> = similar
    .iter()
    .map(|&i| {
      let mut row: Vec<String> = table.features().row(i).iter().map(|&v| number(v)).collect();
      row.push(number(table.calories()[i]));
      row
    })
    .collect();

  write_table(out, &headers, &rows)
}

pub fn render_chart(out: &mut impl Write, table: &TrainingTable, size: (usize, usize)) -> io::Result<()> {
  section(out, "📊 Fitness Trends Over Age")?;

  let hue = table.hue_column();
  let (Some(ages), Some(hues)) = (table.feature("Age"), table.feature(hue)) else {
    return writeln!(out, "{}", "(chart unavailable)".dimmed());
  };

  let xs = ages.to_vec();
  let ys = table.calories().to_vec();
  let groups: Vec<usize> = hues.iter().map(|&h| usize::from(h > 0.5)).collect();
  let legend = vec![format!("{hue} = 0"), format!("{hue} = 1")];

  let chart = ScatterChart::new(&xs, &ys, &groups, legend, ("Age", "Calories"), size);
  for line in chart.lines() {
    writeln!(out, "{line}")?;
  }
  Ok(())
}

fn render_advisory(out: &mut impl Write, advisory: &Advisory) -> io::Result<()> {
  let headline = match advisory.severity {
    Severity::Good => advisory.headline.green().bold(),
    Severity::Caution => advisory.headline.yellow().bold(),
    Severity::Alert => advisory.headline.red().bold(),
  };
  writeln!(out, "{headline} {}", advisory.detail)?;
  writeln!(out, "{}", advisory.tips_heading.bold())?;
  for tip in advisory.tips {
    writeln!(out, "  - {tip}")?;
  }
  writeln!(out)
}

pub fn render_advice(out: &mut impl Write, record: &SessionRecord) -> io::Result<()> {
  section(out, "🩺 Health Advisory & Feedback")?;
  for advisory in advice::advise(record) {
    render_advisory(out, &advisory)?;
  }
  for (title, text) in advice::GENERAL_TIPS {
    writeln!(out, "{} {text}", title.bold())?;
  }
  Ok(())
}

pub fn render_history(out: &mut impl Write, history: &[PersistedRow]) -> io::Result<()> {
  section(out, "📜 Past User Records")?;
  let headers: Vec<String> = ["id", "age", "gender", "height", "weight", "bmi", "calories"].map(String::from).to_vec();
  let rows: Vec<Vec<String>> = history
    .iter()
    .map(|r| {
      vec![
        r.id.to_string(),
        r.age.to_string(),
        r.gender.clone(),
        number(r.height),
        number(r.weight),
        format!("{:.2}", r.bmi),
        format!("{:.2}", r.calories),
      ]
    })
    .collect();
  write_table(out, &headers, &rows)
}

/// Full report in display order
pub fn render(out: &mut impl Write, report: &Report<'_>) -> io::Result<()> {
  writeln!(out, "{}", TITLE.purple().bold())?;
  writeln!(out, "{} {}", "🕒".dimmed(), report.clock.cyan())?;
  writeln!(
    out,
    "{}",
    "Enter your age, gender, BMI inputs and workout metrics to see the predicted kilocalories burned.".italic()
  )?;

  render_input(out, report.record)?;
  render_prediction(out, report.prediction)?;
  render_similar(out, report.table, report.similar)?;
  render_chart(out, report.table, report.chart_size)?;
  render_advice(out, report.record)?;
  render_history(out, report.history)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::form::FormInput;
  use crate::store::RecordStore;
  use ndarray::array;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn plain() {
    colored::control::set_override(false);
  }

  #[test]
  fn test_similar_rows_stay_in_window() {
    let calories = array![100.0, 89.9, 90.0, 110.0, 110.1, 105.0, 95.0, 101.0, 99.0, 250.0];
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..20 {
      let picked = similar_rows(calories.view(), 100.0, 10.0, 5, &mut rng);
      assert_eq!(picked.len(), 5);
      assert!(picked.iter().all(|&i| (90.0..=110.0).contains(&calories[i])));
      assert!(picked.windows(2).all(|w| w[0] < w[1]));
    }
  }

  #[test]
  fn test_similar_rows_window_is_inclusive() {
    let calories = array![90.0, 110.0, 89.99, 110.01];
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(similar_rows(calories.view(), 100.0, 10.0, 5, &mut rng), vec![0, 1]);
  }

  #[test]
  fn test_similar_rows_returns_fewer_when_scarce() {
    let calories = array![10.0, 500.0, 505.0];
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(similar_rows(calories.view(), 502.0, 10.0, 5, &mut rng), vec![1, 2]);
    assert!(similar_rows(calories.view(), 200.0, 10.0, 5, &mut rng).is_empty());
  }

  #[test]
  fn test_write_table_aligns_columns() {
    plain();
    let mut out = Vec::new();
    let headers = vec!["id".to_string(), "gender".to_string()];
    write_table(&mut out, &headers, &[vec!["1".into(), "Male".into()], vec!["10".into(), "Female".into()]]).unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["id  gender", " 1    Male", "10  Female"]);
  }

  #[test]
  fn test_prediction_has_two_decimals() {
    plain();
    let mut out = Vec::new();
    render_prediction(&mut out, 231.5).unwrap();
    assert!(String::from_utf8(out).unwrap().contains("Predicted Calories Burned: 231.50 kcal"));
  }

  #[test]
  fn test_history_and_advice_sections() {
    plain();
    let mut out = Vec::new();
    let store = RecordStore::open_in_memory().unwrap();
    store.ensure_schema().unwrap();
    let id = store.insert_pending(&SessionRecord::new(FormInput::default())).unwrap();
    store.update_latest(id, 123.4).unwrap();
    let history = store.read_all().unwrap();

    render_history(&mut out, &history).unwrap();
    render_advice(&mut out, &SessionRecord::new(FormInput::default())).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Past User Records"));
    assert!(text.contains("24.22") && text.contains("123.40"));
    assert!(text.contains("healthy range"));
    assert!(text.contains("Stay Hydrated"));
  }

  #[test]
  fn test_clock_text_format() {
    let text = clock_text(FixedOffset::east_opt(19800));
    assert_eq!(text.len(), "12:00:00 AM".len());
    assert!(text.ends_with("AM") || text.ends_with("PM"));
  }
}
