//! Route matching for decorated operations
//!
//! Maps a proxied `GET` request path to the resource kind and operation
//! mode whose response must be decorated. Paths may carry an API version
//! prefix (`/v1.41/secrets`) and a configurable mount prefix
//! (e.g. `/api/endpoints/[0-9]+/docker`).

use crate::access_control::ResourceKind;
use crate::error::ConfigError;
use axum::http::Method;
use regex::Regex;
use std::fmt;

/// Shape of the upstream response for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationMode {
    /// A collection of objects; unauthorized entries are dropped
    List,
    /// A single object; unauthorized access is rejected
    Inspect,
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationMode::List => f.write_str("list"),
            OperationMode::Inspect => f.write_str("inspect"),
        }
    }
}

/// A request path resolved to a decorated operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch {
    pub kind: ResourceKind,
    pub mode: OperationMode,
}

#[derive(Debug)]
struct CompiledRoute {
    regex: Regex,
    target: RouteMatch,
}

const API_VERSION: &str = r"(?:/v[0-9]+(?:\.[0-9]+)*)?";

/// (collection path, inspect suffix, kind)
const ROUTES: &[(&str, &str, ResourceKind)] = &[
    ("/secrets", "", ResourceKind::Secret),
    ("/configs", "", ResourceKind::Config),
    ("/services", "", ResourceKind::Service),
    ("/tasks", "", ResourceKind::Task),
    ("/volumes", "", ResourceKind::Volume),
    ("/networks", "", ResourceKind::Network),
    ("/containers", "/json", ResourceKind::Container),
];

/// Compiled table of decorated routes
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Compile the route table under an optional mount prefix (a regex fragment)
    pub fn new(prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.trim_end_matches('/');
        let mut routes = Vec::with_capacity(ROUTES.len() * 2);

        for (collection, inspect_suffix, kind) in ROUTES {
            let list = if inspect_suffix.is_empty() {
                format!("^{prefix}{API_VERSION}{collection}/?$")
            } else {
                format!("^{prefix}{API_VERSION}{collection}{inspect_suffix}/?$")
            };
            let inspect = format!("^{prefix}{API_VERSION}{collection}/[^/]+{inspect_suffix}/?$");

            routes.push(Self::compile(&list, *kind, OperationMode::List)?);
            routes.push(Self::compile(&inspect, *kind, OperationMode::Inspect)?);
        }

        Ok(Self { routes })
    }

    fn compile(
        pattern: &str,
        kind: ResourceKind,
        mode: OperationMode,
    ) -> Result<CompiledRoute, ConfigError> {
        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(CompiledRoute {
            regex,
            target: RouteMatch { kind, mode },
        })
    }

    /// Find the operation for a request, ignoring any query string
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        if *method != Method::GET {
            return None;
        }
        let path = path.split('?').next().unwrap_or(path);

        self.routes
            .iter()
            .find(|route| route.regex.is_match(path))
            .map(|route| route.target)
    }

    /// Get the number of compiled routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
