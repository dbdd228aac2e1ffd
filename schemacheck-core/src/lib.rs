//! schemacheck core: content-type negotiation, request shape checking, response contract, HTTP host.

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod http;
pub mod response;
pub mod schema;
pub mod service;

pub use client::{request_validation, ClientError, ValidatorClient};
pub use config::ServerConfig;
pub use dispatcher::{write_response, Dispatch, IncomingRequest, RequestDispatcher};
pub use response::{BufferedResponse, HttpResponse};
pub use schema::{parse_request, RequestError, ValidationOutcome, ValidationRequest};
pub use service::ValidationService;

use thiserror::Error;

/// The only content type the endpoint accepts, and the one it always answers with.
pub const APPLICATION_JSON: &str = "application/json";

/// Host-level failures. Request problems never show up here: they become 400 responses.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("http error: {0}")]
    Http(#[from] hyper::Error),
    #[error("dispatch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
