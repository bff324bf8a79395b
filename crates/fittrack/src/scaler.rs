use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Zero-mean, unit-variance feature scaling fit on the training partition
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
  mean: Array1<f64>,
  scale: Array1<f64>,
}

impl StandardScaler {
  /// Column means and population standard deviations. Constant columns
  /// get a scale of 1 so they map to zero instead of NaN.
  pub fn fit(features: ArrayView2<'_, f64>) -> Self {
    let columns = features.ncols();
    if features.nrows() == 0 {
      return Self { mean: Array1::zeros(columns), scale: Array1::ones(columns) };
    }

    let mean = features.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(columns));
    let scale = features
      .std_axis(Axis(0), 0.0)
      .mapv(|std| if std > f64::EPSILON { std } else { 1.0 });

    Self { mean, scale }
  }

  pub fn mean(&self) -> &Array1<f64> {
    &self.mean
  }

  pub fn scale(&self) -> &Array1<f64> {
    &self.scale
  }

  pub fn transform(&self, features: ArrayView2<'_, f64>) -> Array2<f64> {
    (&features - &self.mean) / &self.scale
  }

  pub fn transform_row(&self, row: ArrayView1<'_, f64>) -> Array1<f64> {
    (&row - &self.mean) / &self.scale
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use ndarray::array;

  #[test]
  fn test_fit_transform_standardizes_columns() {
    let x = array![[1.0, 10.0], [2.0, 10.0], [3.0, 10.0]];
    let scaler = StandardScaler::fit(x.view());

    assert_eq!(scaler.mean(), &array![2.0, 10.0]);
    assert!((scaler.scale()[0] - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    assert_eq!(scaler.scale()[1], 1.0);

    let scaled = scaler.transform(x.view());
    let column = scaled.column(0);
    assert!(column.sum().abs() < 1e-12);
    assert!((column.mapv(|v| v * v).sum() / 3.0 - 1.0).abs() < 1e-12);
    assert!(scaled.column(1).iter().all(|&v| v == 0.0));
  }

  #[test]
  fn test_transform_row_matches_matrix_transform() {
    let x = array![[1.0, 4.0], [3.0, 8.0]];
    let scaler = StandardScaler::fit(x.view());
    let row = scaler.transform_row(array![2.0, 6.0].view());
    assert_eq!(row, array![0.0, 0.0]);
    assert_eq!(scaler.transform_row(x.row(1)), scaler.transform(x.view()).row(1).to_owned());
  }
}
