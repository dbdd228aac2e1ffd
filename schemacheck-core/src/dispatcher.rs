//! RequestDispatcher: one inbound request in, exactly one JSON response out.
//!
//! Request problems are answered with 400 and a kind-specific `info`; a
//! service verdict is always answered with 200. Only failures while writing
//! the response leave `handle` as an error.

use http::StatusCode;
use std::io::{self, Read, Write};
use std::sync::Arc;
use tracing::debug;

use crate::response::HttpResponse;
use crate::schema::{parse_request, RequestError, ValidationOutcome};
use crate::service::ValidationService;
use crate::APPLICATION_JSON;

/// Inbound request: the content-type header (if any) and a body to read from.
#[derive(Debug)]
pub struct IncomingRequest<R> {
    pub content_type: Option<String>,
    pub body: R,
}

impl<R: Read> IncomingRequest<R> {
    pub fn new(content_type: Option<&str>, body: R) -> Self {
        Self {
            content_type: content_type.map(str::to_owned),
            body,
        }
    }
}

/// Status and envelope chosen for one request, before serialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub status: StatusCode,
    pub outcome: ValidationOutcome,
}

impl Dispatch {
    fn rejected(err: RequestError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            outcome: ValidationOutcome::rejected(&err),
        }
    }
}

/// Stateless apart from the shared service; safe to call from any number of threads at once.
#[derive(Clone)]
pub struct RequestDispatcher {
    service: Arc<dyn ValidationService>,
}

impl RequestDispatcher {
    pub fn new(service: Arc<dyn ValidationService>) -> Self {
        Self { service }
    }

    pub fn from_service(service: impl ValidationService + 'static) -> Self {
        Self::new(Arc::new(service))
    }

    /// Decide status and outcome for a request. Never fails.
    pub fn dispatch<R: Read>(&self, request: IncomingRequest<R>) -> Dispatch {
        let content_type = request.content_type.as_deref().unwrap_or("");
        if content_type != APPLICATION_JSON {
            debug!(content_type, "rejected request: unsupported content type");
            return Dispatch::rejected(RequestError::ContentType);
        }
        let (data, schema) = match parse_request(request.body) {
            Ok(parts) => parts,
            Err(kind) => {
                debug!(%kind, "rejected request");
                return Dispatch::rejected(kind);
            }
        };
        let validation = self.service.validate(&data, &schema);
        debug!(validation, "validation service returned a verdict");
        Dispatch {
            status: StatusCode::OK,
            outcome: ValidationOutcome::verdict(validation),
        }
    }

    /// Dispatch a request and write the result into `response`.
    pub fn handle<R: Read, W: HttpResponse>(
        &self,
        request: IncomingRequest<R>,
        response: &mut W,
    ) -> io::Result<()> {
        let dispatch = self.dispatch(request);
        write_response(response, &dispatch)
    }
}

/// Serialize the outcome and write it with its status and a JSON content type.
/// The body writer is released when this returns, on success and on error alike.
pub fn write_response<W: HttpResponse>(response: &mut W, dispatch: &Dispatch) -> io::Result<()> {
    let body = serde_json::to_vec(&dispatch.outcome)?;
    response.set_content_type(APPLICATION_JSON);
    response.set_status_code(dispatch.status);
    let mut writer = response.writer()?;
    writer.write_all(&body)?;
    writer.flush()
}
