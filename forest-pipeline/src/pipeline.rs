//! Train, aggregate and predict against a model directory.

use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::{Context, eyre};
use crowd_rforest::aggregate::aggregate;
use crowd_rforest::flat::FlatForest;
use crowd_rforest::label_encoder::LabelEncoder;
use crowd_rforest::query::WeatherQuery;
use crowd_rforest::record::{ForestModelRecord, TreeModelRecord};
use crowd_rforest::train::{TrainingReport, fit};
use crowd_rforest::vote::{PredictionReport, predict};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{info, instrument, warn};

use crate::config::PipelineConfig;
use crate::dataset::Dataset;
use crate::model_files::{self, ModelDir};
use crate::store::{JsonFileStore, StateStore};

#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub report: TrainingReport,
    /// `None` when the split could not be trained and no file was written.
    pub tree_path: Option<PathBuf>,
}

/// Train a tree on one CSV split and persist it.
#[instrument(skip_all, fields(dataset = %dataset.as_ref().display()))]
pub fn train_split(
    config: &PipelineConfig,
    dataset: impl AsRef<Path>,
    labels: Option<LabelEncoder>,
) -> Result<TrainOutcome> {
    let dataset = Dataset::read(dataset, labels)?;

    let trained = match fit(&dataset.rows) {
        Ok(trained) => trained,
        Err(e) => {
            warn!(error = %e, "split not trained, reporting zeroed metrics");
            return Ok(TrainOutcome {
                report: TrainingReport::zeroed(),
                tree_path: None,
            });
        }
    };

    let record = TreeModelRecord::new(trained.tree, dataset.label_encoder);
    let models = ModelDir::new(&config.model_dir);
    let path = models.write_tree(&record)?;

    let mut state = open_state(config);
    state.push_trained_tree(&models.relative(&path))?;

    info!(samples = trained.report.samples, mse = trained.report.mse, "split trained");

    Ok(TrainOutcome {
        report: trained.report,
        tree_path: Some(path),
    })
}

/// Combine every tree file into a new forest file and mark it as the latest.
#[instrument(skip_all, fields(model_dir = %config.model_dir.display()))]
pub fn aggregate_models(config: &PipelineConfig) -> Result<(PathBuf, ForestModelRecord)> {
    let models = ModelDir::new(&config.model_dir);
    let files = models.tree_files()?;
    let candidates = model_files::load_candidates(&files)?;

    let created_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("Could not format forest timestamp")?;
    let forest = aggregate(candidates, created_at, config.encoder_policy)?;

    let path = models.write_forest(&forest)?;
    let mut state = open_state(config);
    state.set_latest_forest(&models.relative(&path))?;

    Ok((path, forest))
}

/// The forest to predict with: `explicit` if given, otherwise the one recorded
/// by the last aggregation, otherwise the newest forest file.
///
/// The recorded forest is resolved against the model directory, so the state
/// survives moving the directory or running from elsewhere.
pub fn locate_forest(config: &PipelineConfig, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let models = ModelDir::new(&config.model_dir);
    if let Some(recorded) = open_state(config).latest_forest()? {
        let path = models.resolve(&recorded);
        if path.is_file() {
            return Ok(path);
        }
        warn!(path = %path.display(), "recorded forest is missing, using the newest forest file");
    }
    models
        .latest_forest()?
        .ok_or_else(|| eyre!("No forest model found, run aggregate_forest first"))
}

/// Answer a weather query by majority vote.
#[instrument(skip_all)]
pub fn predict_query(
    config: &PipelineConfig,
    query: &WeatherQuery,
    forest: Option<&Path>,
) -> Result<PredictionReport> {
    let parameters = query.resolve(&config.clamp)?;

    let path = locate_forest(config, forest)?;
    let record = model_files::read_forest(&path)?;
    let forest = FlatForest::from_record(&record);

    let report = predict(&parameters, &forest)
        .with_context(|| format!("Could not predict with {}", path.display()))?;
    info!(prediction = %report.prediction, confidence = %report.confidence, "query answered");

    Ok(report)
}

fn open_state(config: &PipelineConfig) -> StateStore<JsonFileStore> {
    StateStore::new(JsonFileStore::new(config.state_path()))
}
