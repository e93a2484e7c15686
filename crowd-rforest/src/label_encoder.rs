use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};

/// Maps weather condition labels to the numeric codes stored in tree leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub condition: BTreeMap<String, u32>,
}

impl LabelEncoder {
    pub fn new(condition: BTreeMap<String, u32>) -> Self {
        Self { condition }
    }

    /// Build an encoder from a label column, numbering labels in order of
    /// first appearance.
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut condition = BTreeMap::new();
        let mut next_code = 0;

        for label in labels {
            if let Entry::Vacant(e) = condition.entry(label.as_ref().to_owned()) {
                e.insert(next_code);
                next_code += 1;
            }
        }

        Self { condition }
    }

    pub fn len(&self) -> usize {
        self.condition.len()
    }

    pub fn is_empty(&self) -> bool {
        self.condition.is_empty()
    }

    pub fn encode(&self, label: &str) -> Option<u32> {
        self.condition.get(label).copied()
    }

    /// Find the label whose code is nearest to a leaf value.
    ///
    /// Leaves hold the mean of the encoded targets, so values are rarely
    /// exact codes. Equidistant codes resolve to the lower one.
    pub fn decode(&self, value: f64) -> Option<&str> {
        self.condition
            .iter()
            .map(|(label, &code)| (label, code, (f64::from(code) - value).abs()))
            .min_by(|a, b| a.2.total_cmp(&b.2).then(a.1.cmp(&b.1)))
            .map(|(label, _, _)| label.as_str())
    }
}
