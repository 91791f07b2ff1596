#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Street-risk prediction.
//!
//! Trains a random-forest classifier that maps (province, month, time
//! bucket, weekday, place type) to a street name, and ranks the most
//! probable streets for a given combination of conditions.
//!
//! Only streets with enough history take part: a street qualifies when it
//! has more than [`ForestParams::min_class_support`] usable rows, and
//! training is refused when fewer than [`ForestParams::min_classes`] streets
//! qualify.

pub mod encoder;
pub mod features;
pub mod forest;
pub mod progress;
pub mod split;
pub mod tree;

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::SeedableRng as _;
use rand::rngs::StdRng;
use sasv_dataset::CleanTable;
use sasv_predict_models::{ForestParams, PredictionInput, RankedStreet, TrainingSummary};
use thiserror::Error;

use crate::encoder::OneHotEncoder;
use crate::features::{FeatureValues, TrainingRow};
use crate::forest::RandomForest;
use crate::progress::ProgressCallback;
use crate::split::stratified_split;
use crate::tree::TrainingSet;

pub use features::derive_features;

/// Reasons a model cannot be trained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrainError {
    /// Too few streets have enough history.
    #[error("Only {qualifying} streets have enough history to train on (at least {required} needed)")]
    InsufficientClasses {
        /// Streets that qualified.
        qualifying: usize,
        /// Streets required.
        required: usize,
    },
}

/// Reasons a prediction request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictError {
    /// The month is not between 1 and 12.
    #[error("Invalid month {0}: expected a value between 1 and 12")]
    InvalidMonth(u32),
}

/// A trained street-risk model.
#[derive(Debug, Clone)]
pub struct Predictor {
    classes: Vec<String>,
    encoder: OneHotEncoder,
    forest: RandomForest,
    top_k: usize,
    summary: TrainingSummary,
}

impl Predictor {
    /// Qualifying streets, sorted.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// What training saw and how the model scored.
    #[must_use]
    pub const fn summary(&self) -> &TrainingSummary {
        &self.summary
    }

    /// Probability of every qualifying street, in [`Self::classes`] order.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::InvalidMonth`] if the month is not 1-12.
    pub fn probabilities(&self, input: &PredictionInput) -> Result<Vec<RankedStreet>, PredictError> {
        if !(1..=12).contains(&input.month) {
            return Err(PredictError::InvalidMonth(input.month));
        }

        let row: FeatureValues = [
            input.province.clone(),
            input.month.to_string(),
            input.time_bucket.to_string(),
            input.weekday.to_string(),
            input.place_type.clone(),
        ];
        let proba = self.forest.predict_proba(&self.encoder.encode(&row));

        Ok(self
            .classes
            .iter()
            .zip(proba)
            .map(|(street, probability)| RankedStreet {
                street: street.clone(),
                probability,
            })
            .collect())
    }

    /// The most probable streets, highest first. Ties keep street order.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::InvalidMonth`] if the month is not 1-12.
    pub fn predict(&self, input: &PredictionInput) -> Result<Vec<RankedStreet>, PredictError> {
        let mut ranked = self.probabilities(input)?;
        ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        ranked.truncate(self.top_k);
        Ok(ranked)
    }
}

fn qualifying_classes(rows: &[TrainingRow], min_support: usize) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.street.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > min_support)
        .map(|(street, _)| street.to_string())
        .collect()
}

/// Trains a predictor on `table`.
///
/// # Errors
///
/// Returns [`TrainError::InsufficientClasses`] if fewer than
/// `params.min_classes` streets (at least one) have more than
/// `params.min_class_support` usable rows.
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
pub fn train(
    table: &CleanTable,
    params: &ForestParams,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Predictor, TrainError> {
    let rows = features::training_rows(table);
    let usable_rows = rows.len();
    let classes = qualifying_classes(&rows, params.min_class_support);

    log::info!(
        "{usable_rows} usable rows, {} streets with more than {} rows",
        classes.len(),
        params.min_class_support
    );

    let min_classes = params.min_classes.max(1);
    if classes.len() < min_classes {
        log::warn!(
            "Refusing to train: {} qualifying streets, {min_classes} required",
            classes.len(),
        );
        return Err(TrainError::InsufficientClasses {
            qualifying: classes.len(),
            required: min_classes,
        });
    }

    let (features, labels): (Vec<FeatureValues>, Vec<usize>) = rows
        .into_iter()
        .filter_map(|row| {
            classes
                .binary_search(&row.street)
                .ok()
                .map(|label| (row.features, label))
        })
        .unzip();
    let qualifying_rows = labels.len();

    let mut rng = StdRng::seed_from_u64(params.seed);
    let split = stratified_split(&labels, classes.len(), params.test_fraction, &mut rng);

    let encoder = OneHotEncoder::fit(split.train.iter().map(|&i| &features[i]));
    let train_rows: Vec<Vec<u32>> = split
        .train
        .iter()
        .map(|&i| encoder.encode(&features[i]))
        .collect();
    let train_labels: Vec<usize> = split.train.iter().map(|&i| labels[i]).collect();

    let data = TrainingSet {
        rows: &train_rows,
        labels: &train_labels,
        n_columns: encoder.width(),
        n_classes: classes.len(),
    };
    let forest = RandomForest::fit(data, params.n_trees, params.seed, progress);

    let top_k = params.top_k.max(1);
    let (mut top_one, mut top_any) = (0usize, 0usize);
    for &i in &split.holdout {
        let proba = forest.predict_proba(&encoder.encode(&features[i]));
        let target = proba[labels[i]];
        let better = proba.iter().filter(|&&p| p > target).count();
        let tied_before = proba[..labels[i]].iter().filter(|&&p| p == target).count();
        let rank = better + tied_before;
        if rank == 0 {
            top_one += 1;
        }
        if rank < top_k {
            top_any += 1;
        }
    }
    let holdout = split.holdout.len();
    let share = |hits: usize| (holdout > 0).then(|| hits as f64 / holdout as f64);

    let summary = TrainingSummary {
        usable_rows,
        qualifying_rows,
        classes: classes.len(),
        train_rows: split.train.len(),
        holdout_rows: holdout,
        encoded_columns: encoder.width(),
        holdout_accuracy: share(top_one),
        holdout_top_k_accuracy: share(top_any),
        trained_at: chrono::Utc::now(),
    };

    log::info!(
        "Trained {} trees on {} rows; holdout top-1 {:?}, top-{top_k} {:?}",
        forest.len(),
        summary.train_rows,
        summary.holdout_accuracy,
        summary.holdout_top_k_accuracy
    );

    Ok(Predictor {
        classes,
        encoder,
        forest,
        top_k,
        summary,
    })
}
