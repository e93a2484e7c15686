use std::path::Path;

use color_eyre::Result;
use crowd_rforest::query::WeatherQuery;
use crowd_rforest::record::TreeModelRecord;
use crowd_rforest::train::TrainingReport;
use forest_pipeline::dataset::parse_labels;
use forest_pipeline::model_files::{ModelDir, read_json};
use forest_pipeline::pipeline::{aggregate_models, predict_query, train_split};
use forest_pipeline::store::{JsonFileStore, StateStore};

use crate::helpers::{assert_epsilon, empty_model_dir};

const LABELS: &str = "sunny=0,rainy=1,cloudy=2";

#[test]
fn trained_split_is_persisted_as_a_mean_leaf() -> Result<()> {
    let (_dir, config) = empty_model_dir()?;

    let outcome = train_split(
        &config,
        "./tests/test-data/split_a.csv",
        Some(parse_labels(LABELS)?),
    )?;

    // sunny, sunny, rainy => 0, 0, 1
    assert_eq!(outcome.report.samples, 3);
    assert_eq!(outcome.report.features, 3);
    assert_eq!(outcome.report.r_squared, 0.0);
    assert_epsilon(outcome.report.mse, 2.0 / 9.0, 1e-12);

    let path = outcome.tree_path.expect("tree file written");
    let record: TreeModelRecord = read_json(&path)?;
    assert_epsilon(record.model.tree.predict(&[0.0; 3])?, 1.0 / 3.0, 1e-12);
    assert_eq!(record.label_encoder, parse_labels(LABELS)?);

    let state = StateStore::new(JsonFileStore::new(config.state_path()));
    assert_eq!(
        state.trained_trees()?,
        vec![Path::new("trees").join("tree-0001.json")]
    );
    assert_eq!(ModelDir::new(&config.model_dir).tree_files()?, vec![path]);

    Ok(())
}

#[test]
fn malformed_split_reports_zeroes_and_writes_nothing() -> Result<()> {
    let (_dir, config) = empty_model_dir()?;

    let outcome = train_split(&config, "./tests/test-data/malformed.csv", None)?;

    assert_eq!(outcome.report, TrainingReport::zeroed());
    assert!(outcome.tree_path.is_none());
    assert!(ModelDir::new(&config.model_dir).tree_files()?.is_empty());

    Ok(())
}

#[test]
fn splits_train_aggregate_and_vote() -> Result<()> {
    let (_dir, config) = empty_model_dir()?;

    for split in ["split_a", "split_b", "split_c"] {
        train_split(
            &config,
            format!("./tests/test-data/{split}.csv"),
            Some(parse_labels(LABELS)?),
        )?;
    }

    let (_, forest) = aggregate_models(&config)?;
    assert_eq!(forest.num_trees(), 3);

    // Leaves hold 1/3, 4/3 and 2/3, which decode to sunny, rainy, rainy
    let report = predict_query(
        &config,
        &WeatherQuery::Sentence("today is 12 degree celcuis with 75% humidity in feb".into()),
        None,
    )?;
    assert_eq!(report.details.predictions, ["sunny", "rainy", "rainy"]);
    assert_eq!(report.prediction, "rainy");
    assert_eq!(report.confidence, "66.7");

    Ok(())
}
