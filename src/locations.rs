use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{SiteError, SiteResult};

const DEFAULT_KEY: &str = "default";

/// One campus landmark as shown on the location page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationEntry {
    pub key: String,
    pub fields: BTreeMap<String, String>,
}

/// Static lookup table of campus locations, backed by a JSON file of the form
/// `{ "<key>": { "<field>": "<value>", ... }, ... }` with a mandatory
/// `"default"` entry.
#[derive(Debug, Clone)]
pub struct LocationDirectory {
    path: PathBuf,
}

impl LocationDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up `key`, falling back to the `"default"` entry.
    ///
    /// The table is re-read on every call so edits to the file show up
    /// without a restart.
    pub async fn resolve(&self, key: &str) -> SiteResult<LocationEntry> {
        let mut table = self.load().await?;

        if let Some(fields) = table.remove(key) {
            return Ok(LocationEntry {
                key: key.to_string(),
                fields,
            });
        }

        debug!("Unknown location '{}', using default entry", key);
        let fields = table.remove(DEFAULT_KEY).ok_or_else(|| {
            SiteError::Configuration(format!(
                "{} has no \"{}\" entry",
                self.path.display(),
                DEFAULT_KEY
            ))
        })?;
        Ok(LocationEntry {
            key: DEFAULT_KEY.to_string(),
            fields,
        })
    }

    async fn load(&self) -> SiteResult<BTreeMap<String, BTreeMap<String, String>>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SiteError::FileAccess {
                path: self.path.clone(),
                source,
            })?;

        serde_json::from_str(&content).map_err(|e| SiteError::MalformedData {
            origin: self.path.display().to_string(),
            message: e.to_string(),
        })
    }
}
