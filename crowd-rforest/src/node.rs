use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ForestError;

/// A node of a regression tree.
///
/// The JSON form is untagged: a leaf is `{"value": v}` and an internal node
/// is `{"feature": i, "threshold": t, "left": {..}, "right": {..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Internal {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        value: f64,
    },
}

impl Node {
    pub fn leaf(value: f64) -> Self {
        Node::Leaf { value }
    }

    pub fn internal(feature: usize, threshold: f64, left: Node, right: Node) -> Self {
        Node::Internal {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Descend from this node to a leaf and return its value.
    ///
    /// Goes left when `features[feature] <= threshold`, right otherwise.
    pub fn predict(&self, features: &[f64]) -> Result<f64, ForestError> {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { value } => return Ok(*value),
                Node::Internal {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let input =
                        features
                            .get(*feature)
                            .ok_or(ForestError::FeatureOutOfRange {
                                feature: *feature,
                                available: features.len(),
                            })?;
                    node = if *input <= *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Total number of nodes in this subtree.
    pub fn count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => 1 + left.count() + right.count(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf { value } => write!(f, "Leaf     | value: {value}"),
            Node::Internal {
                feature, threshold, ..
            } => write!(f, "Internal | feature: {feature}, threshold: {threshold}"),
        }
    }
}
