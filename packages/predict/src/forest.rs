//! Bagged ensemble of [`DecisionTree`]s with balanced class weights.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng as _};

use crate::progress::ProgressCallback;
use crate::tree::{DecisionTree, TrainingSet};

/// A fitted random forest.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

/// Weight per class so that every class contributes the same total weight:
/// `n / (k * count_c)`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn balanced_class_weights(labels: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0usize; n_classes];
    for &label in labels {
        counts[label] += 1;
    }
    let n = labels.len() as f64;
    let k = n_classes as f64;
    counts
        .into_iter()
        .map(|c| if c == 0 { 0.0 } else { n / (k * c as f64) })
        .collect()
}

impl RandomForest {
    /// Fits `n_trees` trees, each on a bootstrap sample drawn from `data`.
    ///
    /// Each tree gets its own generator seeded from `seed`, so the forest is
    /// reproducible for a given seed and data set.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn fit(
        data: TrainingSet<'_>,
        n_trees: usize,
        seed: u64,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Self {
        let n_trees = n_trees.max(1);
        let n = data.rows.len();
        let class_weights = balanced_class_weights(data.labels, data.n_classes);
        let max_features = ((data.n_columns as f64).sqrt().floor() as usize).max(1);

        progress.set_total(n_trees as u64);
        progress.set_message(format!(
            "Fitting {n_trees} trees on {n} rows ({} columns)",
            data.n_columns
        ));

        let mut master = StdRng::seed_from_u64(seed);
        let mut trees = Vec::with_capacity(n_trees);
        let mut draws = vec![0u32; n];
        let mut weights = vec![0.0; n];

        for _ in 0..n_trees {
            let mut rng = StdRng::seed_from_u64(master.r#gen::<u64>());

            draws.fill(0);
            for _ in 0..n {
                draws[rng.gen_range(0..n)] += 1;
            }
            for (i, weight) in weights.iter_mut().enumerate() {
                *weight = f64::from(draws[i]) * class_weights[data.labels[i]];
            }

            trees.push(DecisionTree::fit(data, &weights, max_features, &mut rng));
            progress.inc(1);
        }

        let nodes: usize = trees.iter().map(DecisionTree::node_count).sum();
        log::debug!("Fitted {} trees with {nodes} nodes in total", trees.len());
        progress.finish(format!("Fitted {} trees", trees.len()));

        Self {
            trees,
            n_classes: data.n_classes,
        }
    }

    /// Mean of the trees' class distributions for `row`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn predict_proba(&self, row: &[u32]) -> Vec<f64> {
        let mut sum = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (s, p) in sum.iter_mut().zip(tree.predict_proba(row)) {
                *s += p;
            }
        }
        let count = self.trees.len() as f64;
        sum.iter_mut().for_each(|s| *s /= count);
        sum
    }

    /// Number of trees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Returns `true` if the forest has no trees.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
