//! Tree training and regression metrics.
//!
//! Training does not search for splits: every tree is a single leaf holding
//! the mean of the target column. Persisted models depend on this, so it is
//! kept as is.

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::ForestError;
use crate::node::Node;

/// One dataset row: feature values followed by the target.
pub type Row = Vec<f64>;

/// Positions `0..FEATURE_COUNT` of a row are features.
pub const FEATURE_COUNT: usize = 3;

/// Position of the target value in a row.
pub const TARGET_INDEX: usize = FEATURE_COUNT;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub mse: f64,
    pub rmse: f64,
    pub r_squared: f64,
}

/// Error metrics reported after training.
///
/// Values are kept exact in memory and rounded to two decimals when
/// serialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    #[serde(serialize_with = "two_decimals")]
    pub mse: f64,
    #[serde(serialize_with = "two_decimals")]
    pub rmse: f64,
    #[serde(serialize_with = "two_decimals")]
    pub r_squared: f64,
    pub features: usize,
    pub samples: usize,
}

impl TrainingReport {
    pub fn zeroed() -> Self {
        Self {
            mse: 0.0,
            rmse: 0.0,
            r_squared: 0.0,
            features: 0,
            samples: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainedTree {
    pub tree: Node,
    pub report: TrainingReport,
}

/// Train a tree on `rows` and return its error metrics.
///
/// Empty or malformed input yields a zeroed report instead of an error.
pub fn train(rows: &[Row]) -> TrainingReport {
    match fit(rows) {
        Ok(trained) => trained.report,
        Err(e) => {
            warn!(error = %e, "training skipped, reporting zeroed metrics");
            TrainingReport::zeroed()
        }
    }
}

/// Train a tree on `rows`.
pub fn fit(rows: &[Row]) -> Result<TrainedTree, ForestError> {
    if rows.is_empty() {
        return Err(ForestError::EmptyDataset);
    }
    validate_rows(rows)?;

    let actual = rows.iter().map(|r| r[TARGET_INDEX]).collect::<Vec<_>>();
    let tree = Node::leaf(mean(&actual));

    let predicted = rows
        .iter()
        .map(|r| tree.predict(&r[..FEATURE_COUNT]))
        .collect::<Result<Vec<_>, _>>()?;

    let metrics = regression_metrics(&actual, &predicted);
    debug!(samples = rows.len(), mse = metrics.mse, "tree fitted");

    Ok(TrainedTree {
        tree,
        report: TrainingReport {
            mse: metrics.mse,
            rmse: metrics.rmse,
            r_squared: metrics.r_squared,
            features: FEATURE_COUNT,
            samples: rows.len(),
        },
    })
}

/// MSE, RMSE and R² of `predicted` against `actual`.
///
/// R² is 0 when the actual values have no variance.
///
/// # Panics
///
/// Panics if `actual` and `predicted` have different lengths.
pub fn regression_metrics(actual: &[f64], predicted: &[f64]) -> Metrics {
    assert_eq!(actual.len(), predicted.len(), "Sequence length mismatch");
    if actual.is_empty() {
        return Metrics {
            mse: 0.0,
            rmse: 0.0,
            r_squared: 0.0,
        };
    }

    let n = actual.len() as f64;
    let actual_mean = mean(actual);

    let ss_res = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>();
    let ss_tot = actual
        .iter()
        .map(|a| (a - actual_mean).powi(2))
        .sum::<f64>();

    let mse = ss_res / n;
    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Metrics {
        mse,
        rmse: mse.sqrt(),
        r_squared,
    }
}

fn validate_rows(rows: &[Row]) -> Result<(), ForestError> {
    for (index, row) in rows.iter().enumerate() {
        if row.len() <= TARGET_INDEX || row.iter().any(|v| !v.is_finite()) {
            return Err(ForestError::MalformedRow {
                index,
                len: row.len(),
                expected: TARGET_INDEX + 1,
            });
        }
    }
    Ok(())
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn two_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 100.0).round() / 100.0)
}
