//! File-backed registry
//!
//! Loads resource controls from a TOML or JSON document:
//!
//! ```toml
//! [[resource_controls]]
//! resource_id = "web"
//! kind = "stack"
//! owner = "alice"
//! access = { type = "teams", teams = ["frontend"] }
//! ```
//!
//! A reload swaps the whole snapshot; requests already holding the previous
//! snapshot keep reading it.

use crate::access_control::{ResourceControl, ResourceControlIndex};
use crate::error::{RegistryError, RegistryResult};
use crate::registry::ResourceControlStore;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

/// Registry document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryFormat {
    Toml,
    Json,
}

impl RegistryFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Some(RegistryFormat::Toml),
            Some("json") => Some(RegistryFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    resource_controls: Vec<ResourceControl>,
}

/// Parse a registry document
pub fn parse_document(
    contents: &str,
    format: RegistryFormat,
    origin: &str,
) -> RegistryResult<Vec<ResourceControl>> {
    let document: RegistryDocument = match format {
        RegistryFormat::Toml => toml::from_str(contents).map_err(|e| RegistryError::Parse {
            path: origin.to_string(),
            reason: e.to_string(),
        })?,
        RegistryFormat::Json => serde_json::from_str(contents).map_err(|e| RegistryError::Parse {
            path: origin.to_string(),
            reason: e.to_string(),
        })?,
    };
    Ok(document.resource_controls)
}

/// Registry loaded from a file on disk
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    format: RegistryFormat,
    index: RwLock<Arc<ResourceControlIndex>>,
}

impl FileStore {
    /// Load the registry file
    pub async fn open(path: impl Into<PathBuf>) -> RegistryResult<Self> {
        let path = path.into();
        let format =
            RegistryFormat::from_path(&path).ok_or_else(|| RegistryError::UnsupportedFormat {
                path: path.display().to_string(),
            })?;
        let index = load_index(&path, format).await?;

        Ok(Self {
            path,
            format,
            index: RwLock::new(Arc::new(index)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file and swap in the new snapshot.
    ///
    /// On error the previous snapshot stays active.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn reload(&self) -> RegistryResult<usize> {
        let index = load_index(&self.path, self.format).await?;
        let count = index.len();
        *self.index.write().await = Arc::new(index);
        Ok(count)
    }
}

async fn load_index(path: &Path, format: RegistryFormat) -> RegistryResult<ResourceControlIndex> {
    let origin = path.display().to_string();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RegistryError::Read {
            path: origin.clone(),
            source,
        })?;

    let controls = parse_document(&contents, format, &origin)?;
    let index = ResourceControlIndex::new(controls)?;
    info!(path = %origin, count = index.len(), "Loaded resource controls");
    Ok(index)
}

#[async_trait]
impl ResourceControlStore for FileStore {
    async fn list_resource_controls(&self) -> RegistryResult<Vec<ResourceControl>> {
        Ok(self.index.read().await.controls().to_vec())
    }

    async fn snapshot(&self) -> RegistryResult<Arc<ResourceControlIndex>> {
        Ok(Arc::clone(&*self.index.read().await))
    }

    fn store_type(&self) -> &'static str {
        "file"
    }
}
