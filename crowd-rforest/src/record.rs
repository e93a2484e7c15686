//! Records exchanged with model storage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ForestError;
use crate::label_encoder::LabelEncoder;
use crate::node::Node;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeModel {
    pub tree: Node,
}

/// A single trained tree together with its label vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeModelRecord {
    pub model: TreeModel,
    pub label_encoder: LabelEncoder,
}

impl TreeModelRecord {
    pub fn new(tree: Node, label_encoder: LabelEncoder) -> Self {
        Self {
            model: TreeModel { tree },
            label_encoder,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateModel {
    pub tree: Option<Node>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateEncoder {
    pub condition: Option<BTreeMap<String, u32>>,
}

/// A tree record as read from storage, before its structure is checked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeModelCandidate {
    #[serde(default)]
    pub model: Option<CandidateModel>,
    #[serde(default)]
    pub label_encoder: Option<CandidateEncoder>,
}

impl TreeModelCandidate {
    /// Check that `model.tree` and `labelEncoder.condition` are present.
    ///
    /// `artifact` names the candidate in the returned error.
    pub fn validate(self, artifact: &str) -> Result<TreeModelRecord, ForestError> {
        let tree = self
            .model
            .and_then(|m| m.tree)
            .ok_or_else(|| ForestError::MissingTree {
                artifact: artifact.to_owned(),
            })?;
        let condition = self
            .label_encoder
            .and_then(|e| e.condition)
            .ok_or_else(|| ForestError::MissingLabelEncoder {
                artifact: artifact.to_owned(),
            })?;

        Ok(TreeModelRecord::new(tree, LabelEncoder::new(condition)))
    }
}

impl From<TreeModelRecord> for TreeModelCandidate {
    fn from(record: TreeModelRecord) -> Self {
        Self {
            model: Some(CandidateModel {
                tree: Some(record.model.tree),
            }),
            label_encoder: Some(CandidateEncoder {
                condition: Some(record.label_encoder.condition),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub trees: Vec<TreeModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForestMetadata {
    pub created_at: String,
    pub number_of_trees: usize,
    pub source_files: Vec<String>,
}

/// An ensemble of trees sharing one label encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForestModelRecord {
    pub model: ForestModel,
    pub label_encoder: LabelEncoder,
    pub metadata: ForestMetadata,
}

impl ForestModelRecord {
    pub fn num_trees(&self) -> usize {
        self.model.trees.len()
    }

    pub fn trees(&self) -> impl Iterator<Item = &Node> {
        self.model.trees.iter().map(|t| &t.tree)
    }
}
