//! Stratified train/holdout split.

use rand::Rng;
use rand::seq::SliceRandom as _;

/// Row indices assigned to training and to the holdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// Indices of the training rows, ascending.
    pub train: Vec<usize>,
    /// Indices of the holdout rows, ascending.
    pub holdout: Vec<usize>,
}

/// Splits rows so that every class keeps its share in both partitions.
///
/// Each class holds out `round(count * fraction)` of its rows, chosen by a
/// shuffle driven by `rng`, and always keeps at least one training row.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn stratified_split<R: Rng>(
    labels: &[usize],
    n_classes: usize,
    fraction: f64,
    rng: &mut R,
) -> Split {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (index, &label) in labels.iter().enumerate() {
        if let Some(rows) = by_class.get_mut(label) {
            rows.push(index);
        }
    }

    let mut train = Vec::with_capacity(labels.len());
    let mut holdout = Vec::new();

    for mut rows in by_class {
        if rows.is_empty() {
            continue;
        }
        rows.shuffle(rng);
        let held = ((rows.len() as f64 * fraction).round() as usize).min(rows.len() - 1);
        holdout.extend_from_slice(&rows[..held]);
        train.extend_from_slice(&rows[held..]);
    }

    train.sort_unstable();
    holdout.sort_unstable();

    Split { train, holdout }
}
