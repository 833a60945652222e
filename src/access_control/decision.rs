//! Authorization decision
//!
//! Evaluated in order:
//! 1. Administrators see everything
//! 2. Objects without a resource control are visible to every caller
//! 3. Public controls allow everyone
//! 4. User controls allow the listed identities
//! 5. Team controls allow members of any listed team
//! 6. Anything else is denied

use crate::access_control::types::{AccessPolicy, CallerContext, ResourceControl};
use tracing::debug;

/// Result of an authorization decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// The caller may see the object
    Allowed,
    /// The caller may not see the object, with a reason for logging
    Denied(String),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, AccessDecision::Denied(_))
    }
}

/// Decide whether `caller` may see an object governed by `control`
pub fn decide(control: Option<&ResourceControl>, caller: &CallerContext) -> AccessDecision {
    if caller.is_administrator {
        return AccessDecision::Allowed;
    }

    let Some(control) = control else {
        return AccessDecision::Allowed;
    };

    let decision = match &control.access {
        AccessPolicy::Public => AccessDecision::Allowed,
        AccessPolicy::Users { users } if users.contains(&caller.identity) => {
            AccessDecision::Allowed
        }
        AccessPolicy::Users { .. } => AccessDecision::Denied(format!(
            "user '{}' is not authorized on {} '{}'",
            caller.identity, control.kind, control.resource_id
        )),
        AccessPolicy::Teams { teams } if !teams.is_disjoint(&caller.teams) => {
            AccessDecision::Allowed
        }
        AccessPolicy::Teams { .. } => AccessDecision::Denied(format!(
            "no team of user '{}' is authorized on {} '{}'",
            caller.identity, control.kind, control.resource_id
        )),
        AccessPolicy::AdministratorsOnly => AccessDecision::Denied(format!(
            "{} '{}' is restricted to administrators",
            control.kind, control.resource_id
        )),
    };

    if let AccessDecision::Denied(reason) = &decision {
        debug!(reason = %reason, "Resource hidden from caller");
    }

    decision
}
