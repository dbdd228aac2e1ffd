//! ValidationService that forwards each verdict to another validator endpoint.

use schemacheck_core::{ClientError, ValidationService, ValidatorClient};
use tokio::runtime::Handle;
use tracing::warn;

/// Delegates to a remote validator over HTTP.
///
/// `validate` blocks on the captured runtime, so it must run off the async
/// worker threads (the HTTP host calls the dispatcher on the blocking pool).
/// Client failures are logged and answered with `false`.
pub struct RemoteValidationService {
    url: String,
    client: ValidatorClient,
    handle: Handle,
}

impl RemoteValidationService {
    pub fn new(url: impl Into<String>, handle: Handle) -> Result<Self, ClientError> {
        Ok(Self {
            url: url.into(),
            client: ValidatorClient::new()?,
            handle,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ValidationService for RemoteValidationService {
    fn validate(&self, data: &str, schema: &str) -> bool {
        match self
            .handle
            .block_on(self.client.validate(&self.url, data, schema))
        {
            Ok(valid) => valid,
            Err(e) => {
                warn!(url = %self.url, error = %e, "remote validator failed");
                false
            }
        }
    }
}
