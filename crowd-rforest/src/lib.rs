//! Tree training, forest aggregation and majority-vote weather inference.
//!
//! Everything in this crate is a synchronous computation over in-memory
//! records. Reading and writing model files, clocks and storage belong to the
//! caller (see the `forest-pipeline` crate).

pub mod aggregate;
pub mod error;
pub mod flat;
pub mod label_encoder;
pub mod node;
pub mod query;
pub mod record;
pub mod train;
pub mod vote;

pub use error::ForestError;
