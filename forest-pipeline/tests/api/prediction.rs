use std::fs;
use std::path::Path;

use color_eyre::Result;
use crowd_rforest::ForestError;
use crowd_rforest::query::{WeatherParameters, WeatherQuery};
use forest_pipeline::config::PipelineConfig;
use forest_pipeline::pipeline::{aggregate_models, locate_forest, predict_query};
use forest_pipeline::store::{JsonFileStore, StateStore};

use crate::helpers::{assert_epsilon, empty_model_dir, forest_error, model_dir_with_trees};

fn sentence(s: &str) -> WeatherQuery {
    WeatherQuery::Sentence(s.to_owned())
}

#[test]
fn sentence_query_is_answered_by_majority() -> Result<()> {
    let (_dir, config) = model_dir_with_trees("./tests/test-models/valid")?;
    aggregate_models(&config)?;

    let report = predict_query(
        &config,
        &sentence("Today is 15 degree celcuis with 60% humidity in june"),
        None,
    )?;

    assert_eq!(report.prediction, "sunny");
    assert_eq!(report.confidence, "66.7");
    assert_eq!(report.details.total_trees, 3);
    assert_eq!(report.details.predictions, ["sunny", "sunny", "rainy"]);
    assert_eq!(
        report.parameters,
        WeatherParameters {
            temperature: 15.0,
            humidity: 60.0,
            month: 6
        }
    );

    Ok(())
}

#[test]
fn deep_tree_takes_the_left_branch_when_cold() -> Result<()> {
    let (_dir, config) = model_dir_with_trees("./tests/test-models/valid")?;
    aggregate_models(&config)?;

    let report = predict_query(
        &config,
        &WeatherQuery::Numeric(WeatherParameters {
            temperature: 10.0,
            humidity: 60.0,
            month: 2,
        }),
        None,
    )?;

    assert_eq!(report.prediction, "rainy");
    assert_eq!(report.details.vote_counts.get("rainy"), 2);
    assert_eq!(report.details.vote_counts.get("sunny"), 1);

    Ok(())
}

#[test]
fn three_way_tie_goes_to_the_first_tree() -> Result<()> {
    let (_dir, config) = model_dir_with_trees("./tests/test-models/valid")?;
    aggregate_models(&config)?;

    let report = predict_query(
        &config,
        &sentence("Today is 20 degree celcuis with 80% humidity in april"),
        None,
    )?;

    assert_eq!(report.details.predictions, ["sunny", "cloudy", "rainy"]);
    assert_eq!(report.prediction, "sunny");
    assert_epsilon(report.confidence.parse()?, 33.3, 1e-9);

    Ok(())
}

#[test]
fn clamped_values_are_reported() -> Result<()> {
    let (_dir, config) = model_dir_with_trees("./tests/test-models/valid")?;
    aggregate_models(&config)?;

    let report = predict_query(
        &config,
        &sentence("Today is 100 degree celcuis with 5% humidity in march"),
        None,
    )?;

    assert_eq!(
        report.parameters,
        WeatherParameters {
            temperature: 22.5,
            humidity: 40.0,
            month: 3
        }
    );

    Ok(())
}

#[test]
fn unknown_month_is_reported_before_loading_models() -> Result<()> {
    let (_dir, config) = empty_model_dir()?;

    let err = predict_query(
        &config,
        &sentence("Today is 15 degree celcuis with 60% humidity in brumaire"),
        None,
    )
    .unwrap_err();

    assert_eq!(
        forest_error(&err),
        Some(&ForestError::UnknownMonth {
            token: "brumaire".into()
        })
    );

    Ok(())
}

#[test]
fn missing_forest_is_an_error() -> Result<()> {
    let (_dir, config) = empty_model_dir()?;

    let err = predict_query(
        &config,
        &sentence("Today is 15 degree celcuis with 60% humidity in june"),
        None,
    )
    .unwrap_err();
    assert!(err.to_string().contains("No forest model found"));

    Ok(())
}

#[test]
fn moved_model_dir_still_finds_its_forest() -> Result<()> {
    let (_dir, config) = model_dir_with_trees("./tests/test-models/valid")?;
    aggregate_models(&config)?;

    let target = tempfile::tempdir()?;
    let moved = PipelineConfig {
        model_dir: target.path().join("models"),
        ..config.clone()
    };
    fs::rename(&config.model_dir, &moved.model_dir)?;

    assert_eq!(
        locate_forest(&moved, None)?,
        moved.model_dir.join("forests").join("forest-0001.json")
    );
    let report = predict_query(
        &moved,
        &sentence("Today is 15 degree celcuis with 60% humidity in june"),
        None,
    )?;
    assert_eq!(report.prediction, "sunny");

    Ok(())
}

#[test]
fn stale_recorded_forest_falls_back_to_the_newest_file() -> Result<()> {
    let (_dir, config) = model_dir_with_trees("./tests/test-models/valid")?;
    let (path, _) = aggregate_models(&config)?;

    let mut state = StateStore::new(JsonFileStore::new(config.state_path()));
    state.set_latest_forest(Path::new("old-models/forests/forest-0001.json"))?;

    assert_eq!(locate_forest(&config, None)?, path);
    let report = predict_query(
        &config,
        &sentence("Today is 15 degree celcuis with 60% humidity in june"),
        None,
    )?;
    assert_eq!(report.confidence, "66.7");

    Ok(())
}
