use std::fmt;

use crate::ForestError;
use crate::label_encoder::LabelEncoder;
use crate::node::Node;
use crate::record::ForestModelRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub(crate) split_with: usize,
    pub(crate) split_at: f64,
    pub(crate) left: usize,
    pub(crate) right: usize,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Branch | split_with: {}, split_at: {}, left: {}, right: {}",
            self.split_with, self.split_at, self.left, self.right
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub(crate) value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlatNode {
    Leaf(Leaf),
    Branch(Branch),
}

impl FlatNode {
    pub fn is_branch(&self) -> bool {
        matches!(self, Self::Branch(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Shift a branch's child pointers from tree-local indices to forest
    /// indices.
    ///
    /// All tree roots are stored at the front of the forest, so every other
    /// node of tree `tree_index` moves by the size of the preceding trees plus
    /// the number of roots that follow it.
    fn offset(self, tree_sizes: &[usize], tree_index: usize) -> Self {
        let offset =
            tree_sizes[..tree_index].iter().sum::<usize>() + tree_sizes.len() - (tree_index + 1);

        if let FlatNode::Branch(mut branch) = self {
            branch.left += offset;
            branch.right += offset;
            FlatNode::Branch(branch)
        } else {
            self
        }
    }
}

impl fmt::Display for FlatNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlatNode::Leaf(leaf) => write!(f, "Leaf   | value: {}", leaf.value),
            FlatNode::Branch(b) => write!(f, "{b}"),
        }
    }
}

/// Lay a tree out in pre-order with the root at index 0.
fn flatten_tree(root: &Node) -> Vec<FlatNode> {
    fn push(node: &Node, nodes: &mut Vec<FlatNode>) -> usize {
        let idx = nodes.len();
        match node {
            Node::Leaf { value } => nodes.push(FlatNode::Leaf(Leaf { value: *value })),
            Node::Internal {
                feature,
                threshold,
                left,
                right,
            } => {
                // Reserve the slot, children are patched in once their indices are known
                nodes.push(FlatNode::Leaf(Leaf { value: 0.0 }));
                let left = push(left, nodes);
                let right = push(right, nodes);
                nodes[idx] = FlatNode::Branch(Branch {
                    split_with: *feature,
                    split_at: *threshold,
                    left,
                    right,
                });
            }
        }
        idx
    }

    let mut nodes = Vec::with_capacity(root.count());
    push(root, &mut nodes);
    nodes
}

/// An array-backed forest, with the root of tree `i` stored at index `i`.
#[derive(Debug, Clone)]
pub struct FlatForest {
    num_trees: usize,
    nodes: Vec<FlatNode>,
    label_encoder: LabelEncoder,
}

impl FlatForest {
    pub fn from_record(record: &ForestModelRecord) -> Self {
        let trees = record.trees().map(flatten_tree).collect::<Vec<_>>();
        let tree_sizes = trees.iter().map(Vec::len).collect::<Vec<_>>();

        let mut nodes = Vec::with_capacity(tree_sizes.iter().sum());

        // Roots first
        for (i, tree) in trees.iter().enumerate() {
            nodes.push(tree[0].clone().offset(&tree_sizes, i));
        }

        // Then the rest of each tree, in order
        for (i, tree) in trees.into_iter().enumerate() {
            for node in tree.into_iter().skip(1) {
                nodes.push(node.offset(&tree_sizes, i));
            }
        }

        debug_assert!(nodes.iter().enumerate().all(|(i, n)| match n {
            FlatNode::Branch(b) => b.left > i && b.right > i,
            FlatNode::Leaf(_) => true,
        }));

        Self {
            num_trees: tree_sizes.len(),
            nodes,
            label_encoder: record.label_encoder.clone(),
        }
    }

    pub fn num_trees(&self) -> usize {
        self.num_trees
    }

    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    pub fn label_encoder(&self) -> &LabelEncoder {
        &self.label_encoder
    }

    /// Descend every tree and collect its leaf value, in tree order.
    pub fn tree_values(&self, features: &[f64]) -> Result<Vec<f64>, ForestError> {
        let mut values = Vec::with_capacity(self.num_trees);

        for tree_id in 0..self.num_trees {
            let mut node = &self.nodes[tree_id];

            let value = loop {
                match node {
                    FlatNode::Branch(b) => {
                        let input = features.get(b.split_with).ok_or(
                            ForestError::FeatureOutOfRange {
                                feature: b.split_with,
                                available: features.len(),
                            },
                        )?;
                        node = if *input <= b.split_at {
                            &self.nodes[b.left]
                        } else {
                            &self.nodes[b.right]
                        };
                    }
                    FlatNode::Leaf(l) => break l.value,
                }
            };

            values.push(value);
        }

        Ok(values)
    }
}

impl fmt::Display for FlatForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Forest: {} trees, size {}, {} labels\n------------",
            self.num_trees,
            self.nodes.len(),
            self.label_encoder.len(),
        )?;
        for (i, node) in self.nodes.iter().enumerate() {
            writeln!(f, "\t{i}: {node}")?;
        }
        writeln!(f, "------------")?;

        let mut labels_ordered = self.label_encoder.condition.iter().collect::<Vec<_>>();
        labels_ordered.sort_by(|a, b| a.1.cmp(b.1));

        writeln!(f, "Labels: ")?;
        for (label, code) in labels_ordered {
            writeln!(f, "\t{code}: {label}")?;
        }
        writeln!(f, "------------")?;

        Ok(())
    }
}
