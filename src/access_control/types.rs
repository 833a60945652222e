//! Access control types
//!
//! Core types used by the decoration engine: resource kinds, resource control
//! entries and the caller context.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Category of an orchestrator object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Secret,
    Config,
    Service,
    Task,
    Volume,
    Network,
    Container,
    Stack,
}

impl ResourceKind {
    /// Get the kind name as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Secret => "secret",
            ResourceKind::Config => "config",
            ResourceKind::Service => "service",
            ResourceKind::Task => "task",
            ResourceKind::Volume => "volume",
            ResourceKind::Network => "network",
            ResourceKind::Container => "container",
            ResourceKind::Stack => "stack",
        }
    }

    /// Try to parse a kind from a string
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "secret" => Some(ResourceKind::Secret),
            "config" => Some(ResourceKind::Config),
            "service" => Some(ResourceKind::Service),
            "task" => Some(ResourceKind::Task),
            "volume" => Some(ResourceKind::Volume),
            "network" => Some(ResourceKind::Network),
            "container" => Some(ResourceKind::Container),
            "stack" => Some(ResourceKind::Stack),
            _ => None,
        }
    }

    /// Get all kinds
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Secret,
            ResourceKind::Config,
            ResourceKind::Service,
            ResourceKind::Task,
            ResourceKind::Volume,
            ResourceKind::Network,
            ResourceKind::Container,
            ResourceKind::Stack,
        ]
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse(s).ok_or_else(|| format!("unknown resource kind '{}'", s))
    }
}

/// Who may see a controlled resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessPolicy {
    /// Visible to every authenticated caller
    Public,
    /// Visible to the listed user identities only
    Users { users: BTreeSet<String> },
    /// Visible to members of the listed teams only
    Teams { teams: BTreeSet<String> },
    /// Visible to administrators only
    AdministratorsOnly,
}

impl AccessPolicy {
    pub fn users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AccessPolicy::Users {
            users: users.into_iter().map(Into::into).collect(),
        }
    }

    pub fn teams<I, S>(teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AccessPolicy::Teams {
            teams: teams.into_iter().map(Into::into).collect(),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            AccessPolicy::Public => "public",
            AccessPolicy::Users { .. } => "users",
            AccessPolicy::Teams { .. } => "teams",
            AccessPolicy::AdministratorsOnly => "administrators_only",
        }
    }
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authorization record governing the visibility of one orchestrator object
///
/// Entries are owned by the registry; the decoration engine only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceControl {
    /// Identifier of the governed object (or parent, e.g. a stack name)
    pub resource_id: String,

    /// Kind of the governed object
    pub kind: ResourceKind,

    /// Additional objects of the same kind governed by this entry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_resource_ids: Vec<String>,

    /// Identity that created the entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    pub access: AccessPolicy,
}

impl ResourceControl {
    pub fn new(kind: ResourceKind, resource_id: impl Into<String>, access: AccessPolicy) -> Self {
        Self {
            resource_id: resource_id.into(),
            kind,
            sub_resource_ids: Vec::new(),
            owner: None,
            access,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_sub_resources<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_resource_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Check whether this entry governs `resource_id` directly
    pub fn governs(&self, kind: ResourceKind, resource_id: &str) -> bool {
        self.kind == kind
            && (self.resource_id == resource_id
                || self.sub_resource_ids.iter().any(|id| id == resource_id))
    }
}

/// The authenticated principal of the current request
///
/// Supplied per request by the authentication layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    pub identity: String,
    pub teams: BTreeSet<String>,
    pub is_administrator: bool,
}

impl CallerContext {
    pub fn user(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            ..Default::default()
        }
    }

    pub fn administrator(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            teams: BTreeSet::new(),
            is_administrator: true,
        }
    }

    pub fn with_teams<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.teams = teams.into_iter().map(Into::into).collect();
        self
    }
}
