//! Request and response envelopes.
//!
//! The core itself does no I/O: callers serialize a [`Request`], carry it
//! over their own transport, deserialize the body into a [`Response`], and
//! hand [`Response::data`] to [`crate::decode_response`].

use crate::variables::Variables;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// The JSON body of a GraphQL request.
#[derive(Debug, Clone, Serialize)]
pub struct Request<'a> {
    /// The operation string produced by one of the construct functions.
    pub query: &'a str,

    /// Variable payloads, keyed by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<&'a Variables>,

    /// Operation name, for documents carrying more than one operation.
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'a str>,
}

impl<'a> Request<'a> {
    /// A request carrying just an operation string.
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            variables: None,
            operation_name: None,
        }
    }

    /// Attach variable payloads.
    pub fn variables(mut self, variables: &'a Variables) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Attach an operation name.
    pub fn operation_name(mut self, name: &'a str) -> Self {
        self.operation_name = Some(name);
        self
    }
}

/// A [response](https://spec.graphql.org/October2021/#sec-Response-Format)
/// body as returned by a GraphQL server.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// The `data` subtree, untouched; feed it to [`crate::decode_response`].
    #[serde(default)]
    pub data: Option<Box<RawValue>>,

    /// Server-reported errors, if any.
    #[serde(default)]
    pub errors: Vec<GraphQLError>,

    /// Implementation-specific extensions.
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

impl Response {
    /// The raw bytes of the `data` subtree, when present and non-null.
    pub fn data_bytes(&self) -> Option<&[u8]> {
        match &self.data {
            Some(raw) if raw.get() != "null" => Some(raw.get().as_bytes()),
            _ => None,
        }
    }
}

/// A server-reported
/// [error](https://spec.graphql.org/October2021/#sec-Errors.Error-result-format),
/// as found in a GraphQL response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    /// The error message.
    pub message: String,

    /// Locations in the operation relevant to the error, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<ErrorLocation>,

    /// For field errors, the path into `data` of the failing field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,

    /// Reserved for any additional information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

/// A 1-indexed line/column position in the operation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}

/// One segment of an error path: a field name in an object or an index in a
/// list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// The relevant key in an object value.
    Field(String),
    /// The index of the relevant item in a list value.
    Index(usize),
}
