//! Combine independently trained trees into one forest.

use tracing::{info, warn};

use crate::ForestError;
use crate::record::{ForestMetadata, ForestModel, ForestModelRecord, TreeModel, TreeModelCandidate};

/// What to do when trees were trained with different label encoders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderPolicy {
    /// Keep the first tree's encoder and log every mismatch.
    #[default]
    FirstWins,
    /// Refuse to build a forest from trees with differing encoders.
    Strict,
}

/// Concatenate the trees of `sources` into a forest, in input order.
///
/// Each source is a `(name, candidate)` pair; the name is used in errors and
/// recorded in the forest metadata. The label encoder of the first source is
/// shared by the whole forest.
pub fn aggregate(
    sources: Vec<(String, TreeModelCandidate)>,
    created_at: impl Into<String>,
    policy: EncoderPolicy,
) -> Result<ForestModelRecord, ForestError> {
    if sources.is_empty() {
        return Err(ForestError::NoTrees);
    }

    let mut trees = Vec::with_capacity(sources.len());
    let mut source_files = Vec::with_capacity(sources.len());
    let mut label_encoder = None;

    for (name, candidate) in sources {
        let record = candidate.validate(&name)?;

        match &label_encoder {
            None => label_encoder = Some((name.clone(), record.label_encoder)),
            Some((reference, encoder)) if *encoder != record.label_encoder => match policy {
                EncoderPolicy::FirstWins => {
                    warn!(
                        source = %name,
                        reference = %reference,
                        "label encoder differs from the first tree, keeping the first"
                    );
                }
                EncoderPolicy::Strict => {
                    return Err(ForestError::EncoderMismatch {
                        artifact: name,
                        reference: reference.clone(),
                    });
                }
            },
            Some(_) => {}
        }

        trees.push(TreeModel {
            tree: record.model.tree,
        });
        source_files.push(name);
    }

    let (_, label_encoder) = label_encoder.ok_or(ForestError::NoTrees)?;

    info!(n_trees = trees.len(), "forest aggregated");

    Ok(ForestModelRecord {
        metadata: ForestMetadata {
            created_at: created_at.into(),
            number_of_trees: trees.len(),
            source_files,
        },
        model: ForestModel { trees },
        label_encoder,
    })
}
