//! Resource identity extraction
//!
//! Every supported kind is described by one row of a static table: where its
//! identifier lives, where its labels live, and which labels point at a
//! parent resource. Adding a kind means adding a row.

use crate::access_control::types::ResourceKind;
use crate::response::get_json_object;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Label set by the orchestrator on every object deployed as part of a stack
pub const STACK_NAMESPACE_LABEL: &str = "com.docker.stack.namespace";

/// Label set by compose on objects created for a project
pub const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";

/// Label set on containers spawned for a swarm service
pub const SWARM_SERVICE_ID_LABEL: &str = "com.docker.swarm.service.id";

/// Labels extracted from a resource object
pub type Labels = BTreeMap<String, String>;

/// A label that names a parent resource of the given kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub label: &'static str,
    pub kind: ResourceKind,
}

/// Where to find ownership keys on objects of one kind
#[derive(Debug)]
pub struct ResourceDescriptor {
    pub kind: ResourceKind,
    /// Top-level field holding the primary identifier
    pub id_field: &'static str,
    /// Candidate label locations, tried in order
    pub label_paths: &'static [&'static [&'static str]],
    /// Parent references, tried in order
    pub parents: &'static [ParentLink],
    /// Field wrapping the array in list responses, if the list is not a bare array
    pub list_envelope: Option<&'static str>,
}

const STACK_PARENT: ParentLink = ParentLink {
    label: STACK_NAMESPACE_LABEL,
    kind: ResourceKind::Stack,
};

const COMPOSE_PARENT: ParentLink = ParentLink {
    label: COMPOSE_PROJECT_LABEL,
    kind: ResourceKind::Stack,
};

const SERVICE_PARENT: ParentLink = ParentLink {
    label: SWARM_SERVICE_ID_LABEL,
    kind: ResourceKind::Service,
};

static DESCRIPTORS: &[ResourceDescriptor] = &[
    ResourceDescriptor {
        kind: ResourceKind::Secret,
        id_field: "ID",
        label_paths: &[&["Spec", "Labels"]],
        parents: &[STACK_PARENT],
        list_envelope: None,
    },
    ResourceDescriptor {
        kind: ResourceKind::Config,
        id_field: "ID",
        label_paths: &[&["Spec", "Labels"]],
        parents: &[STACK_PARENT],
        list_envelope: None,
    },
    ResourceDescriptor {
        kind: ResourceKind::Service,
        id_field: "ID",
        label_paths: &[&["Spec", "Labels"]],
        parents: &[STACK_PARENT],
        list_envelope: None,
    },
    ResourceDescriptor {
        kind: ResourceKind::Task,
        id_field: "ID",
        label_paths: &[&["Spec", "ContainerSpec", "Labels"], &["Labels"]],
        parents: &[STACK_PARENT],
        list_envelope: None,
    },
    ResourceDescriptor {
        kind: ResourceKind::Volume,
        id_field: "Name",
        label_paths: &[&["Labels"]],
        parents: &[STACK_PARENT, COMPOSE_PARENT],
        list_envelope: Some("Volumes"),
    },
    ResourceDescriptor {
        kind: ResourceKind::Network,
        id_field: "Id",
        label_paths: &[&["Labels"]],
        parents: &[STACK_PARENT, COMPOSE_PARENT],
        list_envelope: None,
    },
    ResourceDescriptor {
        kind: ResourceKind::Container,
        id_field: "Id",
        label_paths: &[&["Labels"], &["Config", "Labels"]],
        parents: &[SERVICE_PARENT, STACK_PARENT, COMPOSE_PARENT],
        list_envelope: None,
    },
    ResourceDescriptor {
        kind: ResourceKind::Stack,
        id_field: "Name",
        label_paths: &[],
        parents: &[],
        list_envelope: None,
    },
];

/// Look up the descriptor row for a kind
pub fn descriptor(kind: ResourceKind) -> Option<&'static ResourceDescriptor> {
    DESCRIPTORS.iter().find(|d| d.kind == kind)
}

/// Ownership keys recovered from one object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceIdentity {
    /// Primary identifier, absent when the field is missing or not a string
    pub id: Option<String>,
    pub labels: Labels,
}

/// Extract the primary identifier and label set of an object.
///
/// Missing fields are not an error: they produce an identity with no id
/// and/or no labels.
pub fn extract_identity(kind: ResourceKind, object: &Map<String, Value>) -> ResourceIdentity {
    let Some(descriptor) = descriptor(kind) else {
        return ResourceIdentity::default();
    };

    let id = object
        .get(descriptor.id_field)
        .and_then(Value::as_str)
        .map(str::to_string);

    let labels = descriptor
        .label_paths
        .iter()
        .find_map(|path| lookup_path(object, path))
        .map(collect_labels)
        .unwrap_or_default();

    ResourceIdentity { id, labels }
}

fn lookup_path<'a>(object: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Map<String, Value>> {
    path.iter()
        .try_fold(object, |current, field| get_json_object(current, field))
}

fn collect_labels(labels: &Map<String, Value>) -> Labels {
    labels
        .iter()
        .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_every_kind_has_a_descriptor() {
        for kind in ResourceKind::all() {
            assert!(descriptor(*kind).is_some(), "missing descriptor for {}", kind);
        }
    }

    #[test]
    fn test_secret_labels_under_spec() {
        let secret = object(json!({
            "ID": "s1",
            "Spec": {"Name": "db-password", "Labels": {STACK_NAMESPACE_LABEL: "st1"}}
        }));

        let identity = extract_identity(ResourceKind::Secret, &secret);
        assert_eq!(identity.id.as_deref(), Some("s1"));
        assert_eq!(identity.labels.get(STACK_NAMESPACE_LABEL).map(String::as_str), Some("st1"));
    }

    #[test]
    fn test_missing_label_path_yields_empty_labels() {
        let secret = object(json!({"ID": "s1"}));
        let identity = extract_identity(ResourceKind::Secret, &secret);
        assert_eq!(identity.id.as_deref(), Some("s1"));
        assert!(identity.labels.is_empty());

        let secret = object(json!({"ID": "s1", "Spec": {"Labels": null}}));
        assert!(extract_identity(ResourceKind::Secret, &secret).labels.is_empty());
    }

    #[test]
    fn test_missing_identifier() {
        let volume = object(json!({"Labels": {"a": "b"}}));
        let identity = extract_identity(ResourceKind::Volume, &volume);
        assert!(identity.id.is_none());
        assert_eq!(identity.labels.len(), 1);
    }

    #[test]
    fn test_volume_uses_name_and_top_level_labels() {
        let volume = object(json!({"Name": "data", "Labels": {COMPOSE_PROJECT_LABEL: "web"}}));
        let identity = extract_identity(ResourceKind::Volume, &volume);
        assert_eq!(identity.id.as_deref(), Some("data"));
        assert_eq!(identity.labels[COMPOSE_PROJECT_LABEL], "web");
    }

    #[test]
    fn test_container_inspect_falls_back_to_config_labels() {
        let container = object(json!({
            "Id": "c1",
            "Config": {"Labels": {SWARM_SERVICE_ID_LABEL: "svc1"}}
        }));
        let identity = extract_identity(ResourceKind::Container, &container);
        assert_eq!(identity.id.as_deref(), Some("c1"));
        assert_eq!(identity.labels[SWARM_SERVICE_ID_LABEL], "svc1");
    }

    #[test]
    fn test_non_string_label_values_are_ignored() {
        let network = object(json!({"Id": "n1", "Labels": {"a": 1, "b": "two"}}));
        let identity = extract_identity(ResourceKind::Network, &network);
        assert_eq!(identity.labels.len(), 1);
        assert_eq!(identity.labels["b"], "two");
    }
}
