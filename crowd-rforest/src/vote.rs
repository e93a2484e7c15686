//! Majority-vote classification over a forest.

use heapless::LinearMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::ForestError;
use crate::flat::FlatForest;
use crate::query::WeatherParameters;

/// Maximum number of distinct labels a single vote can involve.
///
/// The tally lives in a fixed-capacity map, so a forest whose trees vote for
/// more distinct labels than this fails with [`ForestError::TooManyLabels`]
/// instead of growing the map. Weather conditions stay far below the limit.
pub const MAX_LABELS: usize = 255;

/// Vote counts per label, kept in the order labels first received a vote.
#[derive(Debug, Clone, Default)]
pub struct VoteTally {
    votes: LinearMap<String, u32, MAX_LABELS>,
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: &str) -> Result<(), ForestError> {
        if let Some(count) = self.votes.get_mut(label) {
            *count += 1;
            return Ok(());
        }
        self.votes
            .insert(label.to_owned(), 1)
            .map_err(|_| ForestError::TooManyLabels {
                capacity: MAX_LABELS,
            })?;
        Ok(())
    }

    pub fn get(&self, label: &str) -> u32 {
        self.votes.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.votes.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.votes.iter().map(|(label, &count)| (label.as_str(), count))
    }

    /// The label with the most votes.
    ///
    /// A later label only wins with strictly more votes, so ties go to the
    /// label that was voted for first.
    pub fn winner(&self) -> Option<(&str, u32)> {
        self.iter().fold(None, |best, (label, count)| match best {
            Some((_, best_count)) if count <= best_count => best,
            _ => Some((label, count)),
        })
    }
}

impl Serialize for VoteTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteDetails {
    pub total_trees: usize,
    pub vote_counts: VoteTally,
    /// The label each tree voted for, in tree order.
    pub predictions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub prediction: String,
    /// Share of trees voting for `prediction`, in percent with one decimal.
    pub confidence: String,
    pub parameters: WeatherParameters,
    pub details: VoteDetails,
}

/// Classify `parameters` by majority vote across every tree of `forest`.
pub fn predict(
    parameters: &WeatherParameters,
    forest: &FlatForest,
) -> Result<PredictionReport, ForestError> {
    if forest.num_trees() == 0 {
        return Err(ForestError::NoTrees);
    }

    let values = forest.tree_values(&parameters.features())?;

    let mut tally = VoteTally::new();
    let mut predictions = Vec::with_capacity(values.len());
    for value in values {
        let label = forest
            .label_encoder()
            .decode(value)
            .ok_or(ForestError::UndecodableLeaf { value })?;
        tally.record(label)?;
        predictions.push(label.to_owned());
    }

    let (winner, votes) = tally.winner().ok_or(ForestError::NoTrees)?;
    let prediction = winner.to_owned();
    let confidence = f64::from(votes) / forest.num_trees() as f64 * 100.0;
    // Halves round up: 9 of 16 trees is "56.3"
    let confidence = (confidence * 10.0).round() / 10.0;

    debug!(%prediction, confidence, "forest vote complete");

    Ok(PredictionReport {
        prediction,
        confidence: format!("{confidence:.1}"),
        parameters: *parameters,
        details: VoteDetails {
            total_trees: forest.num_trees(),
            vote_counts: tally,
            predictions,
        },
    })
}
