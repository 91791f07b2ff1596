#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Street-risk prediction input, output, and parameter types.

use chrono::{DateTime, Utc};
use sasv_incident_models::{TimeBucket, Weekday};
use serde::{Deserialize, Serialize};

/// Features derived from an incident's raw date and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFeatures {
    /// Segment of the day, if the time parsed.
    pub time_bucket: Option<TimeBucket>,
    /// Day of the week, if the date parsed.
    pub weekday: Option<Weekday>,
}

/// One combination of conditions to rank streets for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionInput {
    /// Province name as spelled in the dataset.
    pub province: String,
    /// Month number (1-12).
    pub month: u32,
    /// Segment of the day.
    pub time_bucket: TimeBucket,
    /// Day of the week.
    pub weekday: Weekday,
    /// Place type as spelled in the dataset.
    pub place_type: String,
}

/// A street and its predicted probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedStreet {
    /// Street name.
    pub street: String,
    /// Probability in `[0, 1]`.
    pub probability: f64,
}

/// Training parameters for the random forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ForestParams {
    /// Number of trees in the forest.
    pub n_trees: usize,
    /// Seed for the split and the bootstrap draws.
    pub seed: u64,
    /// A street qualifies when it has strictly more rows than this.
    pub min_class_support: usize,
    /// Training is refused with fewer qualifying streets than this.
    pub min_classes: usize,
    /// Share of each street's rows held out for evaluation.
    pub test_fraction: f64,
    /// Number of ranked streets returned by a prediction.
    pub top_k: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            min_class_support: 10,
            min_classes: 10,
            test_fraction: 0.2,
            top_k: 5,
        }
    }
}

/// What a training run saw and how the model scored on its holdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSummary {
    /// Rows with every feature and a usable street.
    pub usable_rows: usize,
    /// Rows belonging to qualifying streets.
    pub qualifying_rows: usize,
    /// Number of qualifying streets.
    pub classes: usize,
    /// Rows the forest was fit on.
    pub train_rows: usize,
    /// Rows held out for evaluation.
    pub holdout_rows: usize,
    /// Width of the one-hot encoded feature vector.
    pub encoded_columns: usize,
    /// Share of holdout rows whose street ranked first.
    pub holdout_accuracy: Option<f64>,
    /// Share of holdout rows whose street ranked in the top `top_k`.
    pub holdout_top_k_accuracy: Option<f64>,
    /// When training finished.
    pub trained_at: DateTime<Utc>,
}
