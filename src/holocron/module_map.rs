//! Module map model and sources.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ModuleMapError;

/// Manifest of loadable application modules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModuleMap {
    /// Changes whenever the map contents change.
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleEntry>,
}

impl ModuleMap {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModuleMapError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<ModuleBundle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<ModuleBundle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_browser: Option<ModuleBundle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModuleBundle {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
}

/// Where the module map comes from.
#[derive(Debug, Clone)]
pub enum ModuleMapSource {
    Remote { url: String, client: reqwest::Client },
    Local(PathBuf),
}

impl ModuleMapSource {
    pub fn remote(url: impl Into<String>, timeout: Duration) -> Result<Self, ModuleMapError> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ModuleMapError::Fetch { url: url.clone(), source })?;
        Ok(Self::Remote { url, client })
    }

    pub fn local(path: impl AsRef<Path>) -> Self {
        Self::Local(path.as_ref().to_path_buf())
    }

    pub fn describe(&self) -> String {
        match self {
            ModuleMapSource::Remote { url, .. } => url.clone(),
            ModuleMapSource::Local(path) => path.display().to_string(),
        }
    }

    pub async fn fetch(&self) -> Result<ModuleMap, ModuleMapError> {
        match self {
            ModuleMapSource::Remote { url, client } => {
                let fetch_err = |source| ModuleMapError::Fetch { url: url.clone(), source };
                let bytes = client
                    .get(url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(fetch_err)?
                    .bytes()
                    .await
                    .map_err(fetch_err)?;
                ModuleMap::from_slice(&bytes)
            }
            ModuleMapSource::Local(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|source| ModuleMapError::Read {
                    path: path.clone(),
                    source,
                })?;
                ModuleMap::from_slice(&bytes)
            }
        }
    }
}
