/// Errors raised by the training, aggregation and inference core.
///
/// None of these are fatal; callers are expected to surface them to the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForestError {
    /// No rows were given to the trainer.
    #[error("training dataset has no rows")]
    EmptyDataset,

    /// A row is too short or contains a non-numeric value.
    #[error("row {index} is malformed: expected at least {expected} finite numeric fields, got {len}")]
    MalformedRow {
        index: usize,
        len: usize,
        expected: usize,
    },

    /// The ensemble to aggregate or predict with is empty.
    #[error("no models found: at least one tree is required")]
    NoTrees,

    /// A tree artifact does not carry `model.tree`.
    #[error("tree model {artifact} is missing `model.tree`")]
    MissingTree { artifact: String },

    /// A tree artifact does not carry `labelEncoder.condition`.
    #[error("tree model {artifact} is missing `labelEncoder.condition`")]
    MissingLabelEncoder { artifact: String },

    /// A tree artifact was trained with a different label vocabulary.
    #[error("tree model {artifact} has a label encoder that differs from {reference}")]
    EncoderMismatch { artifact: String, reference: String },

    /// The sentence does not follow the accepted query format.
    #[error(
        "could not understand {input:?}: expected \"Today is <number> degree celcuis with <number>% humidity in <month>\""
    )]
    PatternMismatch { input: String },

    /// The month token is not an English month name or abbreviation.
    #[error("unrecognized month {token:?}: use an English month name such as \"march\" or \"mar\"")]
    UnknownMonth { token: String },

    /// An internal node splits on a feature the input does not have.
    #[error("node splits on feature {feature}, but the input only has {available} features")]
    FeatureOutOfRange { feature: usize, available: usize },

    /// A leaf value could not be mapped back to a label.
    #[error("leaf value {value} does not map to any label")]
    UndecodableLeaf { value: f64 },

    /// More distinct labels were voted for than the tally can hold.
    #[error("more than {capacity} distinct labels received votes")]
    TooManyLabels { capacity: usize },
}
