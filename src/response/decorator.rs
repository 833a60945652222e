//! Response decoration
//!
//! Applies access control to upstream responses. List responses are
//! filtered element-wise and always succeed; inspect responses are
//! all-or-nothing and become an access denied response when the caller may
//! not see the object.

use crate::access_control::{
    AccessDecision, CallerContext, ResolvedControl, ResourceControlIndex, ResourceKind, decide,
    descriptor, extract_identity, resolve_identity,
};
use crate::error::{ResponseError, ResponseResult};
use crate::response::routes::{OperationMode, RouteMatch, RouteTable};
use crate::response::utils::{
    JsonObject, ProxyResponse, get_response_as_json_array, get_response_as_json_object,
    into_json_objects, rewrite_access_denied_response, rewrite_response,
};
use axum::http::{Method, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, instrument};

/// Key of the ownership metadata added to decorated objects
pub const DEFAULT_METADATA_KEY: &str = "OrcaGate";

/// Options controlling how allowed objects and denials are rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationOptions {
    /// Attach the resolved resource control to allowed objects
    pub decorate: bool,
    /// Field name used for the attached metadata
    pub metadata_key: String,
    /// Status returned when an inspect is denied
    pub denied_status: StatusCode,
}

impl Default for DecorationOptions {
    fn default() -> Self {
        Self {
            decorate: false,
            metadata_key: DEFAULT_METADATA_KEY.to_string(),
            denied_status: StatusCode::FORBIDDEN,
        }
    }
}

/// Outcome of evaluating one object
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectOutcome {
    /// The caller may see the object; `decorated` is set when ownership
    /// metadata was attached
    Allowed { object: JsonObject, decorated: bool },
    /// The caller may not see the object
    Denied,
}

/// Decorates list and inspect responses for one resource kind at a time
#[derive(Debug)]
pub struct ResponseDecorator {
    options: DecorationOptions,
    routes: RouteTable,
}

impl ResponseDecorator {
    pub fn new(options: DecorationOptions, routes: RouteTable) -> Self {
        Self { options, routes }
    }

    pub fn options(&self) -> &DecorationOptions {
        &self.options
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decorate a response if its request path is a decorated route.
    ///
    /// Returns the matched route, or `None` when the response was left
    /// untouched (unknown route, or an upstream error status).
    #[instrument(skip(self, response, index, caller), fields(caller = %caller.identity))]
    pub fn decorate(
        &self,
        method: &Method,
        path: &str,
        response: &mut ProxyResponse,
        index: &ResourceControlIndex,
        caller: &CallerContext,
    ) -> ResponseResult<Option<RouteMatch>> {
        let Some(route) = self.routes.find(method, path) else {
            return Ok(None);
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "Upstream error passed through undecorated");
            return Ok(None);
        }

        match route.mode {
            OperationMode::List => self.list_operation(route.kind, response, index, caller)?,
            OperationMode::Inspect => self.inspect_operation(route.kind, response, index, caller)?,
        }

        Ok(Some(route))
    }

    /// Filter a list response down to the objects the caller may see
    #[instrument(skip_all, fields(kind = %kind, caller = %caller.identity))]
    pub fn list_operation(
        &self,
        kind: ResourceKind,
        response: &mut ProxyResponse,
        index: &ResourceControlIndex,
        caller: &CallerContext,
    ) -> ResponseResult<()> {
        match descriptor(kind).and_then(|d| d.list_envelope) {
            None => {
                let objects = get_response_as_json_array(response)?;
                let filtered = self.filter_list(kind, objects, index, caller)?;
                rewrite_response(response, &filtered, StatusCode::OK)
            }
            Some(field) => {
                let mut envelope = get_response_as_json_object(response)?;
                let objects = into_json_objects(envelope.remove(field).unwrap_or(Value::Null))?;
                let filtered = self.filter_list(kind, objects, index, caller)?;
                envelope.insert(
                    field.to_string(),
                    Value::Array(filtered.into_iter().map(Value::Object).collect()),
                );
                rewrite_response(response, &envelope, StatusCode::OK)
            }
        }
    }

    /// Pass an inspect response through, or replace it with an access denied response
    #[instrument(skip_all, fields(kind = %kind, caller = %caller.identity))]
    pub fn inspect_operation(
        &self,
        kind: ResourceKind,
        response: &mut ProxyResponse,
        index: &ResourceControlIndex,
        caller: &CallerContext,
    ) -> ResponseResult<()> {
        let object = get_response_as_json_object(response)?;

        match self.filter_object(kind, object, index, caller)? {
            ObjectOutcome::Denied => {
                debug!("Inspect denied");
                rewrite_access_denied_response(response, self.options.denied_status)
            }
            ObjectOutcome::Allowed {
                object,
                decorated: true,
            } => {
                let status = response.status();
                rewrite_response(response, &object, status)
            }
            // Undecorated objects keep the upstream body byte for byte
            ObjectOutcome::Allowed {
                decorated: false, ..
            } => Ok(()),
        }
    }

    /// Keep the allowed objects, in their original order
    pub fn filter_list(
        &self,
        kind: ResourceKind,
        objects: Vec<JsonObject>,
        index: &ResourceControlIndex,
        caller: &CallerContext,
    ) -> ResponseResult<Vec<JsonObject>> {
        let total = objects.len();
        let mut kept = Vec::with_capacity(total);

        for object in objects {
            if let ObjectOutcome::Allowed { object, .. } =
                self.filter_object(kind, object, index, caller)?
            {
                kept.push(object);
            }
        }

        debug!(total, kept = kept.len(), "Filtered list response");
        Ok(kept)
    }

    /// Evaluate a single object against the registry snapshot
    pub fn filter_object(
        &self,
        kind: ResourceKind,
        mut object: JsonObject,
        index: &ResourceControlIndex,
        caller: &CallerContext,
    ) -> ResponseResult<ObjectOutcome> {
        let identity = extract_identity(kind, &object);
        let resolved = resolve_identity(kind, &identity, index);

        match decide(resolved.map(|r| r.control()), caller) {
            AccessDecision::Denied(_) => Ok(ObjectOutcome::Denied),
            AccessDecision::Allowed => {
                let mut decorated = false;
                if self.options.decorate
                    && let Some(resolved) = resolved
                {
                    object.insert(self.options.metadata_key.clone(), ownership_metadata(resolved)?);
                    decorated = true;
                }
                Ok(ObjectOutcome::Allowed { object, decorated })
            }
        }
    }
}

fn ownership_metadata(resolved: ResolvedControl<'_>) -> ResponseResult<Value> {
    let control = serde_json::to_value(resolved.control()).map_err(ResponseError::Serialization)?;
    Ok(json!({
        "ResourceControl": control,
        "Inherited": resolved.is_inherited(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_control::extractor::STACK_NAMESPACE_LABEL;
    use crate::access_control::{AccessPolicy, ResourceControl};
    use axum::body::Bytes;
    use axum::http::Response;

    fn decorator(decorate: bool) -> ResponseDecorator {
        ResponseDecorator::new(
            DecorationOptions {
                decorate,
                ..Default::default()
            },
            RouteTable::new("").unwrap(),
        )
    }

    fn response(body: Value) -> ProxyResponse {
        Response::new(Bytes::from(body.to_string()))
    }

    fn body(response: &ProxyResponse) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    fn stack_index() -> ResourceControlIndex {
        ResourceControlIndex::new(vec![ResourceControl::new(
            ResourceKind::Stack,
            "st1",
            AccessPolicy::teams(["t1"]),
        )])
        .unwrap()
    }

    #[test]
    fn test_list_without_controls_is_unfiltered() {
        let mut resp = response(json!([{"ID": "s1", "Spec": {"Labels": {}}}]));
        decorator(false)
            .list_operation(
                ResourceKind::Secret,
                &mut resp,
                &ResourceControlIndex::empty(),
                &CallerContext::user("alice"),
            )
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body(&resp), json!([{"ID": "s1", "Spec": {"Labels": {}}}]));
    }

    #[test]
    fn test_inspect_denied_through_stack() {
        let original = json!({"ID": "s1", "Spec": {"Labels": {STACK_NAMESPACE_LABEL: "st1"}}});
        let mut resp = response(original);
        decorator(false)
            .inspect_operation(
                ResourceKind::Secret,
                &mut resp,
                &stack_index(),
                &CallerContext::user("bob").with_teams(["t2"]),
            )
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(body(&resp)["message"], "access denied to resource");
    }

    #[test]
    fn test_inspect_allowed_is_untouched_without_decoration() {
        let raw = r#"{"ID": "s1",  "Spec": {"Labels": {}}}"#;
        let mut resp = Response::new(Bytes::from(raw));
        decorator(false)
            .inspect_operation(
                ResourceKind::Secret,
                &mut resp,
                &stack_index(),
                &CallerContext::user("alice"),
            )
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&resp.body()[..], raw.as_bytes());
    }

    #[test]
    fn test_decoration_adds_ownership_metadata() {
        let mut resp = response(json!({"ID": "s1", "Spec": {"Labels": {STACK_NAMESPACE_LABEL: "st1"}}}));
        decorator(true)
            .inspect_operation(
                ResourceKind::Secret,
                &mut resp,
                &stack_index(),
                &CallerContext::user("alice").with_teams(["t1"]),
            )
            .unwrap();

        let body = body(&resp);
        assert_eq!(body[DEFAULT_METADATA_KEY]["Inherited"], true);
        assert_eq!(body[DEFAULT_METADATA_KEY]["ResourceControl"]["resource_id"], "st1");
        assert_eq!(body[DEFAULT_METADATA_KEY]["ResourceControl"]["kind"], "stack");
    }

    #[test]
    fn test_unowned_objects_are_not_decorated() {
        let outcome = decorator(true)
            .filter_object(
                ResourceKind::Network,
                json!({"Id": "n1"}).as_object().cloned().unwrap(),
                &ResourceControlIndex::empty(),
                &CallerContext::user("alice"),
            )
            .unwrap();

        assert_eq!(
            outcome,
            ObjectOutcome::Allowed {
                object: json!({"Id": "n1"}).as_object().cloned().unwrap(),
                decorated: false,
            }
        );
    }

    #[test]
    fn test_volume_list_envelope() {
        let mut resp = response(json!({
            "Volumes": [
                {"Name": "a", "Labels": {STACK_NAMESPACE_LABEL: "st1"}},
                {"Name": "b", "Labels": null}
            ],
            "Warnings": null
        }));
        decorator(false)
            .list_operation(
                ResourceKind::Volume,
                &mut resp,
                &stack_index(),
                &CallerContext::user("bob"),
            )
            .unwrap();

        let body = body(&resp);
        assert_eq!(body["Volumes"], json!([{"Name": "b", "Labels": null}]));
        assert_eq!(body["Warnings"], Value::Null);
    }

    #[test]
    fn test_volume_list_with_null_volumes() {
        let mut resp = response(json!({"Volumes": null, "Warnings": []}));
        decorator(false)
            .list_operation(
                ResourceKind::Volume,
                &mut resp,
                &stack_index(),
                &CallerContext::user("bob"),
            )
            .unwrap();
        assert_eq!(body(&resp)["Volumes"], json!([]));
    }

    #[test]
    fn test_decorate_skips_unknown_routes_and_errors() {
        let index = stack_index();
        let caller = CallerContext::user("bob");

        let mut resp = response(json!({"ID": "x"}));
        let matched = decorator(false)
            .decorate(&Method::GET, "/info", &mut resp, &index, &caller)
            .unwrap();
        assert!(matched.is_none());

        let mut resp = response(json!({"message": "no such secret"}));
        *resp.status_mut() = StatusCode::NOT_FOUND;
        let matched = decorator(false)
            .decorate(&Method::GET, "/secrets/x", &mut resp, &index, &caller)
            .unwrap();
        assert!(matched.is_none());
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_parse_error_is_propagated() {
        let mut resp = Response::new(Bytes::from_static(b"not json"));
        let result = decorator(false).list_operation(
            ResourceKind::Secret,
            &mut resp,
            &ResourceControlIndex::empty(),
            &CallerContext::user("alice"),
        );
        assert!(matches!(result, Err(ResponseError::Parse(_))));
        assert_eq!(&resp.body()[..], b"not json");
    }
}
