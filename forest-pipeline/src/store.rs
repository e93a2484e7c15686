//! Persisted pipeline state behind an injected key-value store.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::{Context, eyre};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

const LATEST_FOREST: &str = "latest_forest";
const TRAINED_TREES: &str = "trained_trees";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn put(&mut self, key: &str, value: Value) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_owned(), value);
        Ok(())
    }
}

/// A store kept as one JSON object on disk.
///
/// Every `put` rewrites the file through a temporary sibling and a rename, so
/// readers never see a partially written file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, Value>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("Malformed state file {}", self.path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => {
                Err(e).with_context(|| format!("Could not read state file {}", self.path.display()))
            }
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.load()?.remove(key))
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        let mut values = self.load()?;
        values.insert(key.to_owned(), value);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
        }

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| eyre!("State path {} has no file name", self.path.display()))?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);

        fs::write(&tmp, serde_json::to_vec_pretty(&values)?)
            .with_context(|| format!("Could not write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Could not replace {}", self.path.display()))?;

        debug!(key, path = %self.path.display(), "state updated");
        Ok(())
    }
}

/// Typed view of the pipeline state.
#[derive(Debug)]
pub struct StateStore<S> {
    store: S,
}

impl<S: KeyValueStore> StateStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.store
            .get(key)?
            .map(|v| serde_json::from_value(v).with_context(|| format!("Malformed state key {key:?}")))
            .transpose()
    }

    fn put_typed<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.store.put(key, serde_json::to_value(value)?)
    }

    /// Path of the forest written by the last aggregation.
    pub fn latest_forest(&self) -> Result<Option<PathBuf>> {
        self.get_typed(LATEST_FOREST)
    }

    pub fn set_latest_forest(&mut self, path: &Path) -> Result<()> {
        self.put_typed(LATEST_FOREST, &path)
    }

    /// Tree files written by this installation, oldest first.
    pub fn trained_trees(&self) -> Result<Vec<PathBuf>> {
        Ok(self.get_typed(TRAINED_TREES)?.unwrap_or_default())
    }

    pub fn push_trained_tree(&mut self, path: &Path) -> Result<()> {
        let mut trees = self.trained_trees()?;
        trees.push(path.to_path_buf());
        self.put_typed(TRAINED_TREES, &trees)
    }
}
