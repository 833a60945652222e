//! Resource control resolution
//!
//! Resolution precedence (highest to lowest):
//! 1. Direct match on the object's own (kind, identifier), including sub-resource ids
//! 2. Inherited match through a parent label (e.g. the stack namespace), in
//!    descriptor order
//!
//! The inherited lookup only runs when the direct lookup misses.

use crate::access_control::extractor::{Labels, ResourceIdentity, descriptor};
use crate::access_control::index::ResourceControlIndex;
use crate::access_control::types::{ResourceControl, ResourceKind};
use tracing::trace;

/// How a resource control was found for an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedControl<'a> {
    /// The entry governs the object itself
    Direct(&'a ResourceControl),
    /// The entry governs a parent resource named by one of the object's labels
    Inherited(&'a ResourceControl),
}

impl<'a> ResolvedControl<'a> {
    pub fn control(&self) -> &'a ResourceControl {
        match self {
            ResolvedControl::Direct(control) | ResolvedControl::Inherited(control) => control,
        }
    }

    pub fn is_inherited(&self) -> bool {
        matches!(self, ResolvedControl::Inherited(_))
    }
}

/// Resolve the resource control governing an object
pub fn resolve<'a>(
    kind: ResourceKind,
    resource_id: Option<&str>,
    labels: &Labels,
    index: &'a ResourceControlIndex,
) -> Option<ResolvedControl<'a>> {
    if let Some(id) = resource_id
        && let Some(control) = index.get(kind, id)
    {
        trace!(kind = %kind, resource_id = id, "Matched direct resource control");
        return Some(ResolvedControl::Direct(control));
    }

    let parents = descriptor(kind).map(|d| d.parents).unwrap_or_default();
    for link in parents {
        let Some(parent_id) = labels.get(link.label).filter(|v| !v.is_empty()) else {
            continue;
        };
        if let Some(control) = index.get(link.kind, parent_id) {
            trace!(
                kind = %kind,
                resource_id = ?resource_id,
                parent_kind = %link.kind,
                parent_id = %parent_id,
                "Matched inherited resource control"
            );
            return Some(ResolvedControl::Inherited(control));
        }
    }

    trace!(kind = %kind, resource_id = ?resource_id, "No resource control");
    None
}

/// Resolve using an already extracted identity
pub fn resolve_identity<'a>(
    kind: ResourceKind,
    identity: &ResourceIdentity,
    index: &'a ResourceControlIndex,
) -> Option<ResolvedControl<'a>> {
    resolve(kind, identity.id.as_deref(), &identity.labels, index)
}
