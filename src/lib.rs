//! Orca Gate
//!
//! Access control decoration for orchestrator API responses.
//!
//! ## Features
//!
//! - **Per-object visibility** for secrets, configs, services, tasks, volumes,
//!   networks and containers, decided against a resource control registry
//! - **Inherited ownership** through stack, compose project and swarm service labels
//! - **List filtering** that drops hidden objects and keeps the upstream order
//! - **Inspect denial** that replaces a hidden object with an access denied response
//! - **Flexible configuration** via TOML files and environment variables
//!
//! ## Access Control Model
//!
//! ```text
//! administrator → unowned (visible) → public / users / teams / administrators only
//! ```
//!
//! An object is governed by the entry registered for its own identifier. When
//! there is none, the entry registered for its parent (taken from the
//! object's labels) applies instead.
//!
//! ## Example Configuration
//!
//! ```toml
//! [registry]
//! path = "/etc/orca-gate/controls.toml"
//!
//! [decoration]
//! enabled = true                  # attach ownership metadata
//! denied_status = 403
//!
//! [routes]
//! path_prefix = "/api/endpoints/[0-9]+/docker"
//! ```

pub mod access_control;
pub mod config;
pub mod error;
pub mod registry;
pub mod response;

// Re-export main types
pub use access_control::{AccessDecision, AccessPolicy, CallerContext, ResourceControl, ResourceKind};
pub use config::{AppConfig, load_config};
pub use error::{ConfigError, RegistryError, ResponseError};
pub use registry::{FileStore, MemoryStore, ResourceControlStore, SharedStore, open_store};
pub use response::{DecorationOptions, ResponseDecorator, RouteTable};
