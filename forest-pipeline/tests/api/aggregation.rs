use std::path::Path;

use color_eyre::Result;
use crowd_rforest::ForestError;
use forest_pipeline::model_files::{ModelDir, read_forest};
use forest_pipeline::pipeline::aggregate_models;
use forest_pipeline::store::{JsonFileStore, StateStore};

use crate::helpers::{empty_model_dir, forest_error, model_dir_with_trees};

#[test]
fn three_tree_files_make_a_three_tree_forest() -> Result<()> {
    let (_dir, config) = model_dir_with_trees("./tests/test-models/valid")?;

    let (path, forest) = aggregate_models(&config)?;

    assert_eq!(forest.num_trees(), 3);
    assert_eq!(forest.metadata.number_of_trees, 3);
    assert_eq!(
        forest.metadata.source_files,
        ["tree-0001.json", "tree-0002.json", "tree-0003.json"]
    );
    assert_eq!(forest.label_encoder.len(), 3);
    assert_eq!(path.file_name().unwrap(), "forest-0001.json");

    let written = read_forest(&path)?;
    assert_eq!(written.num_trees(), 3);
    assert_eq!(written.metadata, forest.metadata);
    assert_eq!(written.label_encoder, forest.label_encoder);

    Ok(())
}

#[test]
fn aggregation_records_the_latest_forest() -> Result<()> {
    let (_dir, config) = model_dir_with_trees("./tests/test-models/valid")?;

    let (first, _) = aggregate_models(&config)?;
    let (second, _) = aggregate_models(&config)?;
    assert_eq!(second.file_name().unwrap(), "forest-0002.json");

    let state = StateStore::new(JsonFileStore::new(config.state_path()));
    assert_eq!(
        state.latest_forest()?,
        Some(Path::new("forests").join("forest-0002.json"))
    );
    assert_eq!(
        ModelDir::new(&config.model_dir).latest_forest()?,
        Some(second)
    );
    assert!(first.exists());

    Ok(())
}

#[test]
fn empty_model_dir_has_no_trees() -> Result<()> {
    let (_dir, config) = empty_model_dir()?;

    let err = aggregate_models(&config).unwrap_err();
    assert_eq!(forest_error(&err), Some(&ForestError::NoTrees));
    assert!(err.to_string().contains("no models found"));

    Ok(())
}

#[test]
fn missing_encoder_names_the_file() -> Result<()> {
    let (_dir, config) = model_dir_with_trees("./tests/test-models/broken")?;

    let err = aggregate_models(&config).unwrap_err();
    assert_eq!(
        forest_error(&err),
        Some(&ForestError::MissingLabelEncoder {
            artifact: "tree-0002.json".into()
        })
    );
    assert!(ModelDir::new(&config.model_dir).latest_forest()?.is_none());

    Ok(())
}
