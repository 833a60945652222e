//! JSON helpers for proxied responses
//!
//! Reads an upstream body as a JSON array or object and writes a replacement
//! body back, keeping `content-length` in sync.

use crate::error::{ResponseError, ResponseResult};
use axum::body::Bytes;
use axum::http::{HeaderValue, Response, StatusCode, header};
use serde::Serialize;
use serde_json::{Map, Value, json};

/// A buffered upstream response
pub type ProxyResponse = Response<Bytes>;

/// A decoded orchestrator object
pub type JsonObject = Map<String, Value>;

/// Body sent in place of an object the caller may not inspect
pub const ACCESS_DENIED_MESSAGE: &str = "access denied to resource";

/// Parse the response body as an array of objects.
///
/// A `null` body is treated as an empty list.
pub fn get_response_as_json_array(response: &ProxyResponse) -> ResponseResult<Vec<JsonObject>> {
    into_json_objects(serde_json::from_slice(response.body())?)
}

/// Convert a decoded JSON array (or `null`) into its objects
pub fn into_json_objects(value: Value) -> ResponseResult<Vec<JsonObject>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(object) => Ok(object),
                other => Err(ResponseError::UnexpectedShape {
                    expected: "array of objects",
                    actual: value_kind(&other),
                }),
            })
            .collect(),
        other => Err(ResponseError::UnexpectedShape {
            expected: "array",
            actual: value_kind(&other),
        }),
    }
}

/// Parse the response body as a single object
pub fn get_response_as_json_object(response: &ProxyResponse) -> ResponseResult<JsonObject> {
    match serde_json::from_slice::<Value>(response.body())? {
        Value::Object(object) => Ok(object),
        other => Err(ResponseError::UnexpectedShape {
            expected: "object",
            actual: value_kind(&other),
        }),
    }
}

/// Navigate one level into `object`, returning `None` if the field is absent
/// or not an object
pub fn get_json_object<'a>(object: &'a JsonObject, field: &str) -> Option<&'a JsonObject> {
    object.get(field).and_then(Value::as_object)
}

/// Replace the body and status of a response.
///
/// The response is re-framed with a `content-length` matching the new body.
pub fn rewrite_response<T>(
    response: &mut ProxyResponse,
    body: &T,
    status: StatusCode,
) -> ResponseResult<()>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec(body).map_err(ResponseError::Serialization)?;
    let headers = response.headers_mut();
    // The rewritten body is sent whole; upstream chunked framing no longer applies
    headers.remove(header::TRANSFER_ENCODING);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&bytes.len().to_string())?,
    );
    *response.status_mut() = status;
    *response.body_mut() = Bytes::from(bytes);
    Ok(())
}

/// Replace a response with an access denied message
pub fn rewrite_access_denied_response(
    response: &mut ProxyResponse,
    status: StatusCode,
) -> ResponseResult<()> {
    rewrite_response(response, &json!({ "message": ACCESS_DENIED_MESSAGE }), status)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
