//! Response module
//!
//! Reads proxied orchestrator responses, applies access control, and writes
//! the filtered or denied result back onto the response.

pub mod decorator;
pub mod routes;
pub mod utils;

pub use decorator::{DEFAULT_METADATA_KEY, DecorationOptions, ObjectOutcome, ResponseDecorator};
pub use routes::{OperationMode, RouteMatch, RouteTable};
pub use utils::{
    ACCESS_DENIED_MESSAGE, JsonObject, ProxyResponse, get_json_object, get_response_as_json_array,
    get_response_as_json_object, into_json_objects, rewrite_access_denied_response,
    rewrite_response,
};
