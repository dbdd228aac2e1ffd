//! schemacheck for Rust: remote validation service on schemacheck-core.

pub mod logging;
pub mod remote;

pub use remote::RemoteValidationService;
pub use schemacheck_core::{
    ClientError, RequestDispatcher, ServerConfig, ValidationOutcome, ValidationService,
};
