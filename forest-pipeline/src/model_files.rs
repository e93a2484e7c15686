//! Versioned tree and forest files under a model directory.
//!
//! ```text
//! <model_dir>/trees/tree-0001.json
//! <model_dir>/forests/forest-0001.json
//! ```
//!
//! Files are never overwritten; every write takes the next free version.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::Context;
use crowd_rforest::record::{ForestModelRecord, TreeModelCandidate, TreeModelRecord};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

const TREE_PREFIX: &str = "tree";
const FOREST_PREFIX: &str = "forest";
const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct ModelDir {
    root: PathBuf,
}

impl ModelDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn trees_dir(&self) -> PathBuf {
        self.root.join("trees")
    }

    pub fn forests_dir(&self) -> PathBuf {
        self.root.join("forests")
    }

    #[instrument(skip_all, fields(dir = %self.trees_dir().display()))]
    pub fn write_tree(&self, record: &TreeModelRecord) -> Result<PathBuf> {
        let path = write_next_version(&self.trees_dir(), TREE_PREFIX, record)?;
        info!(path = %path.display(), "tree model written");
        Ok(path)
    }

    #[instrument(skip_all, fields(dir = %self.forests_dir().display()))]
    pub fn write_forest(&self, record: &ForestModelRecord) -> Result<PathBuf> {
        let path = write_next_version(&self.forests_dir(), FOREST_PREFIX, record)?;
        info!(
            path = %path.display(),
            n_trees = record.num_trees(),
            "forest model written"
        );
        Ok(path)
    }

    /// Tree files in version order.
    pub fn tree_files(&self) -> Result<Vec<PathBuf>> {
        list_versions(&self.trees_dir(), TREE_PREFIX)
    }

    /// `path` relative to the model directory, as recorded in the state file.
    /// Paths outside the directory are kept as they are.
    pub fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    /// Inverse of [`ModelDir::relative`]. Absolute paths are returned unchanged.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// The most recent forest file, if any.
    pub fn latest_forest(&self) -> Result<Option<PathBuf>> {
        Ok(list_versions(&self.forests_dir(), FOREST_PREFIX)?.pop())
    }
}

/// Read every tree file in parallel. The result keeps the order of `paths`
/// and names each candidate by its file name.
#[instrument(skip_all, fields(n_files = paths.len()))]
pub fn load_candidates(paths: &[PathBuf]) -> Result<Vec<(String, TreeModelCandidate)>> {
    let candidates = paths
        .par_iter()
        .map(|path| -> Result<(String, TreeModelCandidate)> {
            let candidate = read_json::<TreeModelCandidate>(path)?;
            Ok((display_name(path), candidate))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(n_loaded = candidates.len(), "tree files loaded");
    Ok(candidates)
}

pub fn read_forest(path: impl AsRef<Path>) -> Result<ForestModelRecord> {
    read_json(path.as_ref()).context("Could not read forest model file.")
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Malformed model file {}", path.display()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn version_of(path: &Path, prefix: &str) -> Option<u32> {
    if path.extension()? != EXTENSION {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .parse()
        .ok()
}

fn list_versions(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("Could not list {}", dir.display())),
    };

    let mut versions = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if let Some(version) = version_of(&path, prefix) {
            versions.push((version, path));
        }
    }
    versions.sort_by(|(a, _), (b, _)| a.cmp(b));

    Ok(versions.into_iter().map(|(_, path)| path).collect())
}

fn write_next_version<T: Serialize>(dir: &Path, prefix: &str, value: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Could not create {}", dir.display()))?;

    let mut version = list_versions(dir, prefix)?
        .last()
        .and_then(|p| version_of(p, prefix))
        .map_or(1, |v| v + 1);

    // Another writer may claim a version between listing and creating
    let (file, path) = loop {
        let path = dir.join(format!("{prefix}-{version:04}.{EXTENSION}"));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => break (file, path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => version += 1,
            Err(e) => {
                return Err(e).with_context(|| format!("Could not create {}", path.display()));
            }
        }
    };

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;

    Ok(path)
}
