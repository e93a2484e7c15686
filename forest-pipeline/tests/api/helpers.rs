use std::fs;
use std::path::Path;

use color_eyre::Result;
use crowd_rforest::ForestError;
use forest_pipeline::config::PipelineConfig;
use forest_pipeline::model_files::ModelDir;
use tempfile::TempDir;

/// A config pointing at a fresh, empty model directory.
pub fn empty_model_dir() -> Result<(TempDir, PipelineConfig)> {
    let dir = tempfile::tempdir()?;
    let config = PipelineConfig {
        model_dir: dir.path().to_path_buf(),
        ..PipelineConfig::default()
    };
    Ok((dir, config))
}

/// A model directory whose `trees/` holds a copy of a fixture directory.
pub fn model_dir_with_trees(fixture: impl AsRef<Path>) -> Result<(TempDir, PipelineConfig)> {
    let (dir, config) = empty_model_dir()?;
    let trees = ModelDir::new(&config.model_dir).trees_dir();
    fs::create_dir_all(&trees)?;

    for entry in fs::read_dir(fixture.as_ref())? {
        let path = entry?.path();
        if let Some(name) = path.file_name() {
            fs::copy(&path, trees.join(name))?;
        }
    }

    Ok((dir, config))
}

/// The core error behind a pipeline error, if there is one.
pub fn forest_error(err: &color_eyre::Report) -> Option<&ForestError> {
    err.downcast_ref::<ForestError>()
}

pub fn assert_epsilon(left: f64, right: f64, epsilon: f64) {
    println!(
        "left: {left}, right: {right}, epsilon: {epsilon}, |left - right| = {}",
        (left - right).abs()
    );
    assert!((left - right).abs() <= epsilon.abs());
}
