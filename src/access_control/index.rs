//! Resource control index
//!
//! An immutable snapshot of the registry keyed by (kind, identifier). Parent
//! lookups (a stack name read from a label) go through the same keys, so the
//! inherited relation never needs pointers between entries.

use crate::access_control::types::{ResourceControl, ResourceKind};
use crate::error::RegistryError;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::warn;

/// Identifier to position in `controls`, one map per kind
type KindMap = HashMap<ResourceKind, HashMap<String, usize>>;

/// Read-only lookup structure over a set of resource controls
#[derive(Debug, Default)]
pub struct ResourceControlIndex {
    controls: Vec<ResourceControl>,
    /// resource_id keys
    primary: KindMap,
    /// sub_resource_id keys
    secondary: KindMap,
}

impl ResourceControlIndex {
    /// Build an index, rejecting duplicate (kind, resource_id) pairs
    pub fn new(controls: Vec<ResourceControl>) -> Result<Self, RegistryError> {
        let mut primary = KindMap::new();

        for (position, control) in controls.iter().enumerate() {
            if control.resource_id.is_empty() {
                return Err(RegistryError::EmptyIdentifier { kind: control.kind });
            }
            match primary
                .entry(control.kind)
                .or_default()
                .entry(control.resource_id.clone())
            {
                Entry::Occupied(_) => {
                    return Err(RegistryError::Duplicate {
                        kind: control.kind,
                        resource_id: control.resource_id.clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(position);
                }
            }
        }

        let mut secondary = KindMap::new();
        for (position, control) in controls.iter().enumerate() {
            for sub_id in &control.sub_resource_ids {
                if lookup(&primary, control.kind, sub_id).is_some() {
                    warn!(
                        kind = %control.kind,
                        resource_id = %sub_id,
                        "Sub-resource id shadowed by a primary resource control"
                    );
                    continue;
                }
                secondary
                    .entry(control.kind)
                    .or_default()
                    .entry(sub_id.clone())
                    .or_insert(position);
            }
        }

        Ok(Self {
            controls,
            primary,
            secondary,
        })
    }

    /// Create an empty index (nothing is under access control)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Find the entry governing (kind, id), checking primary ids before sub-resource ids
    pub fn get(&self, kind: ResourceKind, resource_id: &str) -> Option<&ResourceControl> {
        lookup(&self.primary, kind, resource_id)
            .or_else(|| lookup(&self.secondary, kind, resource_id))
            .map(|position| &self.controls[position])
    }

    /// All entries, in registry order
    pub fn controls(&self) -> &[ResourceControl] {
        &self.controls
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

fn lookup(map: &KindMap, kind: ResourceKind, resource_id: &str) -> Option<usize> {
    map.get(&kind)?.get(resource_id).copied()
}
