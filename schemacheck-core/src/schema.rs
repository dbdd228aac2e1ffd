//! Wire types of the endpoint and the parse step that turns a request body into (data, schema).

use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use serde_json::Value;
use std::io::Read;
use thiserror::Error;

pub const INFO_SUCCESS: &str = "successful validation";

/// Inbound JSON body. Both fields are optional at the serde level; `into_parts` enforces presence.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ValidationRequest {
    pub data: Option<String>,
    pub schema: Option<String>,
}

impl ValidationRequest {
    pub fn new(data: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            schema: Some(schema.into()),
        }
    }

    /// `(data, schema)` when both are present.
    pub fn into_parts(self) -> Option<(String, String)> {
        match (self.data, self.schema) {
            (Some(data), Some(schema)) => Some((data, schema)),
            _ => None,
        }
    }
}

/// Response envelope. Field order is part of the wire format.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub validation: bool,
    pub info: String,
}

impl ValidationOutcome {
    /// Dispatch succeeded; `validation` carries the service verdict.
    pub fn verdict(validation: bool) -> Self {
        Self {
            validation,
            info: INFO_SUCCESS.to_owned(),
        }
    }

    pub fn rejected(err: &RequestError) -> Self {
        Self {
            validation: false,
            info: err.info().to_owned(),
        }
    }
}

/// Why a request was refused. Every kind is answered with 400.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    #[error("content type is not application/json")]
    ContentType,
    #[error("body is not valid json")]
    MalformedJson,
    #[error("body could not be deserialized")]
    Deserialization,
    #[error("body is missing 'data' or 'schema'")]
    MissingFields,
}

impl RequestError {
    /// Message placed in the `info` field of the response.
    pub fn info(&self) -> &'static str {
        match self {
            RequestError::ContentType => "Request content type isn't 'application/json'.",
            RequestError::MalformedJson => "Request body isn't a valid json.",
            RequestError::Deserialization => "Request deserialization problem.",
            RequestError::MissingFields => {
                "Request json body doesn't have 'data' and 'schema' fields."
            }
        }
    }
}

/// Read and decode a JSON body into `(data, schema)`.
///
/// The body is read in full first so a read failure is told apart from a
/// truncated document. An empty body is not a syntax error: there is no
/// document to deserialize, which counts as a deserialization problem.
pub fn parse_request<R: Read>(mut body: R) -> Result<(String, String), RequestError> {
    let mut buf = Vec::new();
    body.read_to_end(&mut buf)
        .map_err(|_| RequestError::Deserialization)?;
    if buf.iter().all(u8::is_ascii_whitespace) {
        return Err(RequestError::Deserialization);
    }
    let value: Value = serde_json::from_slice(&buf).map_err(classify)?;
    // Fields are matched by name only; serde would otherwise accept `["d", "s"]`.
    if !value.is_object() {
        return Err(RequestError::Deserialization);
    }
    let request = ValidationRequest::deserialize(value).map_err(classify)?;
    request.into_parts().ok_or(RequestError::MissingFields)
}

fn classify(err: serde_json::Error) -> RequestError {
    match err.classify() {
        Category::Syntax | Category::Eof => RequestError::MalformedJson,
        Category::Data | Category::Io => RequestError::Deserialization,
    }
}
