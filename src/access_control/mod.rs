//! Access control module
//!
//! Decides, per orchestrator object, whether the current caller may see it.
//!
//! ## Pipeline
//!
//! ```text
//! object → extract_identity → resolve (direct, then inherited) → decide
//! ```
//!
//! - The **extractor** reads the object's identifier and labels using a
//!   per-kind descriptor row.
//! - The **resolver** looks the identifier up in a [`ResourceControlIndex`]
//!   snapshot; on a miss it follows parent labels (stack namespace, compose
//!   project, swarm service) to an entry owned by the parent.
//! - The **decision** applies the entry's [`AccessPolicy`] to the
//!   [`CallerContext`]. Administrators always pass; objects that were never
//!   placed under access control are visible to everyone.
//!
//! Every step is a pure function of its inputs.

pub mod decision;
pub mod extractor;
pub mod index;
pub mod resolver;
pub mod types;

pub use decision::{AccessDecision, decide};
pub use extractor::{Labels, ResourceDescriptor, ResourceIdentity, descriptor, extract_identity};
pub use index::ResourceControlIndex;
pub use resolver::{ResolvedControl, resolve, resolve_identity};
pub use types::{AccessPolicy, CallerContext, ResourceControl, ResourceKind};
