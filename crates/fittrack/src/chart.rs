//! Terminal scatter chart

use colored::*;

const Y_LABEL_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
  Empty,
  Group(usize),
  Mixed,
}

/// Points binned onto a character grid, row 0 at the top
#[derive(Debug, Clone)]
pub struct ScatterChart {
  width: usize,
  height: usize,
  x_range: (f64, f64),
  y_range: (f64, f64),
  cells: Vec<Cell>,
  x_label: String,
  y_label: String,
  legend: Vec<String>,
}

fn range_of(values: &[f64]) -> (f64, f64) {
  let (min, max) = values
    .iter()
    .filter(|v| v.is_finite())
    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

  if min > max {
    (0.0, 1.0)
  } else if min == max {
    (min - 0.5, max + 0.5)
  } else {
    (min, max)
  }
}

fn slot(value: f64, (min, max): (f64, f64), slots: usize) -> usize {
  let fraction = (value - min) / (max - min);
  ((fraction * (slots - 1) as f64).round() as usize).min(slots - 1)
}

impl ScatterChart {
  /// Plot `xs` against `ys`, each point tagged with an index into `legend`
  pub fn new(
    xs: &[f64],
    ys: &[f64],
    groups: &[usize],
    legend: Vec<String>,
    (x_label, y_label): (&str, &str),
    (width, height): (usize, usize),
  ) -> Self {
    let width = width.max(2);
    let height = height.max(2);
    let x_range = range_of(xs);
    let y_range = range_of(ys);
    let mut cells = vec![Cell::Empty; width * height];

    for ((&x, &y), &group) in xs.iter().zip(ys).zip(groups) {
      if !x.is_finite() || !y.is_finite() {
        continue;
      }
      let col = slot(x, x_range, width);
      let row = height - 1 - slot(y, y_range, height);
      let cell = &mut cells[row * width + col];
      *cell = match *cell {
        Cell::Empty => Cell::Group(group),
        Cell::Group(existing) if existing == group => Cell::Group(group),
        _ => Cell::Mixed,
      };
    }

    Self { width, height, x_range, y_range, cells, x_label: x_label.to_string(), y_label: y_label.to_string(), legend }
  }

  pub fn cell(&self, row: usize, col: usize) -> Cell {
    self.cells[row * self.width + col]
  }

  pub fn plotted_cells(&self) -> usize {
    self.cells.iter().filter(|c| **c != Cell::Empty).count()
  }

  fn marker(cell: Cell) -> String {
    match cell {
      Cell::Empty => " ".to_string(),
      Cell::Group(0) => "•".blue().to_string(),
      Cell::Group(1) => "•".magenta().to_string(),
      Cell::Group(_) => "•".yellow().to_string(),
      Cell::Mixed => "*".white().bold().to_string(),
    }
  }

  /// Rendered lines: y-axis labels, grid, x-axis and legend
  pub fn lines(&self) -> Vec<String> {
    let mut lines = vec![format!("{:>w$} {}", "", self.y_label.bold(), w = Y_LABEL_WIDTH)];

    for row in 0..self.height {
      let label = if row == 0 {
        format!("{:.0}", self.y_range.1)
      } else if row == self.height - 1 {
        format!("{:.0}", self.y_range.0)
      } else {
        String::new()
      };
      let body: String = (0..self.width).map(|col| Self::marker(self.cell(row, col))).collect();
      lines.push(format!("{label:>w$} │{body}", w = Y_LABEL_WIDTH - 1));
    }

    lines.push(format!("{:>w$} └{}", "", "─".repeat(self.width), w = Y_LABEL_WIDTH - 1));
    let min = format!("{:.0}", self.x_range.0);
    let max = format!("{:.0}", self.x_range.1);
    let gap = self.width.saturating_sub(min.len() + max.len());
    lines.push(format!("{:>w$}  {min}{}{max}", "", " ".repeat(gap), w = Y_LABEL_WIDTH - 1));
    lines.push(format!("{:>w$}  {}", "", self.x_label.bold(), w = Y_LABEL_WIDTH - 1));

    let legend: Vec<String> =
      self.legend.iter().enumerate().map(|(i, label)| format!("{} {label}", Self::marker(Cell::Group(i)))).collect();
    if !legend.is_empty() {
      lines.push(format!("{:>w$}  {}", "", legend.join("   "), w = Y_LABEL_WIDTH - 1));
    }

    lines
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn chart(xs: &[f64], ys: &[f64], groups: &[usize]) -> ScatterChart {
    ScatterChart::new(xs, ys, groups, vec!["a".into(), "b".into()], ("Age", "Calories"), (10, 5))
  }

  #[test]
  fn test_corners_map_to_grid_corners() {
    let c = chart(&[0.0, 10.0], &[0.0, 100.0], &[0, 1]);
    assert_eq!(c.cell(4, 0), Cell::Group(0));
    assert_eq!(c.cell(0, 9), Cell::Group(1));
    assert_eq!(c.plotted_cells(), 2);
  }

  #[test]
  fn test_overlapping_groups_are_mixed() {
    let c = chart(&[0.0, 0.0, 10.0], &[0.0, 0.0, 10.0], &[0, 1, 0]);
    assert_eq!(c.cell(4, 0), Cell::Mixed);
    assert_eq!(c.cell(0, 9), Cell::Group(0));
  }

  #[test]
  fn test_constant_values_do_not_divide_by_zero() {
    let c = chart(&[5.0, 5.0], &[3.0, 3.0], &[1, 1]);
    assert_eq!(c.plotted_cells(), 1);
  }

  #[test]
  fn test_lines_include_axes_and_legend() {
    colored::control::set_override(false);
    let c = chart(&[20.0, 80.0], &[10.0, 300.0], &[0, 1]);
    let lines = c.lines();

    assert_eq!(lines.len(), 1 + 5 + 3 + 1);
    assert!(lines[1].trim_start().starts_with("300 │"));
    assert!(lines[5].trim_start().starts_with("10 │"));
    assert!(lines[7].contains("20") && lines[7].contains("80"));
    assert!(lines.last().unwrap().contains("• a") && lines.last().unwrap().contains("• b"));
  }
}
