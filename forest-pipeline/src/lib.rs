pub mod config;
pub mod dataset;
pub mod logging;
pub mod model_files;
pub mod pipeline;
pub mod store;
