//! JSON file backed store

use super::KeyValueStore;
use anyhow::Context;
use crate::error::{AppError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "stream-readiness-tester";
const STORE_FILE: &str = "store.json";

/// Keeps all keys in one JSON object file, rewritten on every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
    warning: Option<String>,
}

impl FileStore {
    /// Open the store at `path`, or the default location when `None`
    pub fn open(path: Option<PathBuf>) -> Result<Self> {
        let path = path.unwrap_or_else(Self::default_path);
        let mut warning = None;

        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| AppError::store(format!("Failed to read store file '{}': {}", path.display(), e)))?;

            match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(e) => {
                    warning = Some(format!("Ignoring unreadable store file '{}': {}", path.display(), e));
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values, warning })
    }

    /// Default store path following the XDG specification
    pub fn default_path() -> PathBuf {
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config)
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".config")
        } else {
            // No HOME, keep the store next to the working directory
            return PathBuf::from(STORE_FILE);
        };

        config_dir.join(APP_DIR).join(STORE_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Warning raised while opening, once
    pub fn take_warning(&mut self) -> Option<String> {
        self.warning.take()
    }

    fn persist(&self) -> Result<()> {
        self.write_file()
            .map_err(|e| AppError::store(format!("{:#}", e)))
    }

    fn write_file(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create store directory '{}'", parent.display()))?;
            }
        }

        let content = serde_json::to_string_pretty(&self.values)
            .context("Failed to serialize store")?;

        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write store file '{}'", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}
