//! Resource control registry
//!
//! The registry owns the resource control entries; the decoration engine only
//! ever reads an immutable [`ResourceControlIndex`] snapshot of it, taken once
//! per request.

pub mod file;

pub use file::{FileStore, RegistryFormat, parse_document};

use crate::access_control::{ResourceControl, ResourceControlIndex};
use crate::config::RegistryConfig;
use crate::error::RegistryResult;
// async_trait required for dyn-compatibility with Arc<dyn ResourceControlStore>
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Source of resource control entries
#[async_trait]
pub trait ResourceControlStore: Send + Sync {
    /// List every entry currently in the registry
    async fn list_resource_controls(&self) -> RegistryResult<Vec<ResourceControl>>;

    /// Get a read-only snapshot for one request
    async fn snapshot(&self) -> RegistryResult<Arc<ResourceControlIndex>>;

    /// Get a description of the store (for logging)
    fn store_type(&self) -> &'static str;
}

/// Shared handle to a store
pub type SharedStore = Arc<dyn ResourceControlStore>;

/// Fixed set of entries held in memory
#[derive(Debug, Clone)]
pub struct MemoryStore {
    index: Arc<ResourceControlIndex>,
}

impl MemoryStore {
    pub fn new(controls: Vec<ResourceControl>) -> RegistryResult<Self> {
        Ok(Self {
            index: Arc::new(ResourceControlIndex::new(controls)?),
        })
    }

    /// A store with no entries: every object is unowned
    pub fn empty() -> Self {
        Self {
            index: Arc::new(ResourceControlIndex::empty()),
        }
    }
}

#[async_trait]
impl ResourceControlStore for MemoryStore {
    async fn list_resource_controls(&self) -> RegistryResult<Vec<ResourceControl>> {
        Ok(self.index.controls().to_vec())
    }

    async fn snapshot(&self) -> RegistryResult<Arc<ResourceControlIndex>> {
        Ok(Arc::clone(&self.index))
    }

    fn store_type(&self) -> &'static str {
        "memory"
    }
}

/// Open the store described by the configuration.
///
/// Without a registry path every object is unowned and therefore visible.
pub async fn open_store(config: &RegistryConfig) -> RegistryResult<SharedStore> {
    match &config.path {
        Some(path) => {
            let expanded = shellexpand::tilde(path);
            Ok(Arc::new(FileStore::open(expanded.as_ref()).await?))
        }
        None => {
            warn!("No resource control registry configured, all objects are unowned");
            Ok(Arc::new(MemoryStore::empty()))
        }
    }
}
