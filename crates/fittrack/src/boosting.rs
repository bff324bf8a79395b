//! Gradient-boosted regression trees
//!
//! Squared-error boosting: the ensemble starts from the target mean and each
//! stage fits a depth-limited tree to the current residuals. Split search
//! runs on per-feature histograms over quantile bins computed once per fit.

use ndarray::{ArrayView1, ArrayView2};
use tracing::debug;

use crate::error::{Result, TrackerError};

#[derive(Debug, Clone, PartialEq)]
pub struct BoostingParams {
  pub n_estimators: usize,
  pub learning_rate: f64,
  pub max_depth: usize,
  pub min_samples_leaf: usize,
  pub max_bins: usize,
}

impl Default for BoostingParams {
  fn default() -> Self {
    Self { n_estimators: 500, learning_rate: 0.05, max_depth: 5, min_samples_leaf: 1, max_bins: 256 }
  }
}

/// Per-feature cut points. A value falls in bin `b` when exactly `b` cuts
/// lie strictly below it, so bin `<= s` is the same test as `x <= cuts[s]`.
#[derive(Debug, Clone)]
struct BinMapper {
  cuts: Vec<Vec<f64>>,
}

impl BinMapper {
  fn fit(features: ArrayView2<'_, f64>, max_bins: usize) -> Self {
    let max_bins = max_bins.clamp(2, usize::from(u16::MAX));
    let cuts = features
      .columns()
      .into_iter()
      .map(|column| {
        let mut unique: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
        unique.sort_by(f64::total_cmp);
        unique.dedup();

        let midpoint = |i: usize| (unique[i - 1] + unique[i]) / 2.0;
        if unique.len() <= max_bins {
          (1..unique.len()).map(midpoint).collect()
        } else {
          let mut cuts: Vec<f64> = (1..max_bins).map(|k| midpoint(k * unique.len() / max_bins)).collect();
          cuts.dedup();
          cuts
        }
      })
      .collect();

    Self { cuts }
  }

  fn bin(&self, feature: usize, value: f64) -> u16 {
    self.cuts[feature].partition_point(|&cut| cut < value) as u16
  }

  fn n_bins(&self, feature: usize) -> usize {
    self.cuts[feature].len() + 1
  }

  fn threshold(&self, feature: usize, bin: usize) -> f64 {
    self.cuts[feature][bin]
  }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
  Split { feature: usize, threshold: f64, left: usize, right: usize },
  Leaf { value: f64 },
}

/// A single regression tree
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
  nodes: Vec<Node>,
}

impl RegressionTree {
  pub fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
    let mut index = 0;
    loop {
      match &self.nodes[index] {
        Node::Leaf { value } => return *value,
        Node::Split { feature, threshold, left, right } => {
          index = if row[*feature] <= *threshold { *left } else { *right };
        }
      }
    }
  }

  pub fn n_leaves(&self) -> usize {
    self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
  }

  pub fn depth(&self) -> usize {
    fn walk(nodes: &[Node], index: usize) -> usize {
      match &nodes[index] {
        Node::Leaf { .. } => 0,
        Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
      }
    }
    walk(&self.nodes, 0)
  }
}

struct SplitCandidate {
  feature: usize,
  bin: usize,
  gain: f64,
}

/// Grows one tree over binned features against a residual vector
struct TreeGrower<'a> {
  bins: &'a [Vec<u16>],
  mapper: &'a BinMapper,
  residuals: &'a [f64],
  max_depth: usize,
  min_samples_leaf: usize,
  nodes: Vec<Node>,
  leaf_of: Vec<usize>,
}

impl<'a> TreeGrower<'a> {
  fn grow(&mut self, rows: &mut [usize], depth: usize) -> usize {
    let index = self.nodes.len();
    self.nodes.push(Node::Leaf { value: 0.0 });

    let split = if depth < self.max_depth && rows.len() >= 2 * self.min_samples_leaf.max(1) {
      self.best_split(rows)
    } else {
      None
    };

    match split {
      Some(split) => {
        let mid = partition(rows, |r| usize::from(self.bins[split.feature][r]) <= split.bin);
        let (left_rows, right_rows) = rows.split_at_mut(mid);
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[index] = Node::Split {
          feature: split.feature,
          threshold: self.mapper.threshold(split.feature, split.bin),
          left,
          right,
        };
      }
      None => {
        let value = rows.iter().map(|&r| self.residuals[r]).sum::<f64>() / rows.len() as f64;
        self.nodes[index] = Node::Leaf { value };
        for &r in rows.iter() {
          self.leaf_of[r] = index;
        }
      }
    }

    index
  }

  fn best_split(&self, rows: &[usize]) -> Option<SplitCandidate> {
    let total_sum: f64 = rows.iter().map(|&r| self.residuals[r]).sum();
    let total_count = rows.len();
    let parent_score = total_sum * total_sum / total_count as f64;

    let mut best: Option<SplitCandidate> = None;
    for (feature, column) in self.bins.iter().enumerate() {
      let n_bins = self.mapper.n_bins(feature);
      if n_bins < 2 {
        continue;
      }

      let mut sums = vec![0.0; n_bins];
      let mut counts = vec![0usize; n_bins];
      for &r in rows {
        let b = usize::from(column[r]);
        sums[b] += self.residuals[r];
        counts[b] += 1;
      }

      let mut left_sum = 0.0;
      let mut left_count = 0;
      for bin in 0..n_bins - 1 {
        left_sum += sums[bin];
        left_count += counts[bin];
        let right_count = total_count - left_count;
        if left_count < self.min_samples_leaf || right_count < self.min_samples_leaf {
          continue;
        }

        let right_sum = total_sum - left_sum;
        let gain = left_sum * left_sum / left_count as f64 + right_sum * right_sum / right_count as f64
          - parent_score;
        if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
          best = Some(SplitCandidate { feature, bin, gain });
        }
      }
    }

    best
  }
}

/// In-place partition: rows satisfying `pred` first, returns their count
fn partition<F>(rows: &mut [usize], pred: F) -> usize
where
  F: Fn(usize) -> bool,
{
  let mut mid = 0;
  for i in 0..rows.len() {
    if pred(rows[i]) {
      rows.swap(i, mid);
      mid += 1;
    }
  }
  mid
}

/// Fitted boosting ensemble
#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostedRegressor {
  params: BoostingParams,
  init: f64,
  trees: Vec<RegressionTree>,
}

impl GradientBoostedRegressor {
  pub fn fit(features: ArrayView2<'_, f64>, target: ArrayView1<'_, f64>, params: BoostingParams) -> Result<Self> {
    let n = features.nrows();
    if n == 0 || target.len() != n {
      return Err(TrackerError::EmptyDataset);
    }

    let mapper = BinMapper::fit(features, params.max_bins);
    let bins: Vec<Vec<u16>> = features
      .columns()
      .into_iter()
      .enumerate()
      .map(|(j, column)| column.iter().map(|&v| mapper.bin(j, v)).collect())
      .collect();

    let init = target.sum() / n as f64;
    let mut predictions = vec![init; n];
    let mut residuals = vec![0.0; n];
    let mut trees = Vec::with_capacity(params.n_estimators);

    for stage in 0..params.n_estimators {
      for i in 0..n {
        residuals[i] = target[i] - predictions[i];
      }

      let mut grower = TreeGrower {
        bins: &bins,
        mapper: &mapper,
        residuals: &residuals,
        max_depth: params.max_depth,
        min_samples_leaf: params.min_samples_leaf.max(1),
        nodes: Vec::new(),
        leaf_of: vec![0; n],
      };
      let mut rows: Vec<usize> = (0..n).collect();
      grower.grow(&mut rows, 0);

      let TreeGrower { nodes, leaf_of, .. } = grower;
      for (i, &leaf) in leaf_of.iter().enumerate() {
        if let Node::Leaf { value } = nodes[leaf] {
          predictions[i] += params.learning_rate * value;
        }
      }
      trees.push(RegressionTree { nodes });

      if stage == 0 || (stage + 1) % 100 == 0 {
        let mse = target.iter().zip(&predictions).map(|(y, p)| (y - p).powi(2)).sum::<f64>() / n as f64;
        debug!(stage = stage + 1, mse, "boosting progress");
      }
    }

    Ok(Self { params, init, trees })
  }

  pub fn params(&self) -> &BoostingParams {
    &self.params
  }

  pub fn trees(&self) -> &[RegressionTree] {
    &self.trees
  }

  pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
    self.init + self.params.learning_rate * self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
  }

  pub fn predict(&self, features: ArrayView2<'_, f64>) -> Vec<f64> {
    features.rows().into_iter().map(|row| self.predict_row(row)).collect()
  }
}
