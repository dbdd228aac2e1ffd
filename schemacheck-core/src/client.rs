//! Validator client: calls a remote endpoint that speaks the same `{data, schema}` contract.

use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::schema::{ValidationOutcome, ValidationRequest};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid validator url: {0}")]
    Url(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("error: status code [{0}]")]
    UnexpectedStatus(u16),
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

/// Reusable HTTP(S) client for validator endpoints. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ValidatorClient {
    http: reqwest::Client,
}

impl ValidatorClient {
    pub fn new() -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http })
    }

    /// POST `{data, schema}` to `url` and return the verdict.
    ///
    /// 200 yields the body's `validation`; 400 becomes `BadRequest` carrying the
    /// server's `info`; any other status is `UnexpectedStatus`.
    pub async fn validate(&self, url: &str, data: &str, schema: &str) -> Result<bool, ClientError> {
        let url = parse_url(url)?;
        let resp = self
            .http
            .post(url)
            .json(&ValidationRequest::new(data, schema))
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        match status {
            StatusCode::OK => Ok(serde_json::from_slice::<ValidationOutcome>(&body)?.validation),
            StatusCode::BAD_REQUEST => {
                let outcome: ValidationOutcome = serde_json::from_slice(&body)?;
                Err(ClientError::BadRequest(outcome.info))
            }
            other => Err(ClientError::UnexpectedStatus(other.as_u16())),
        }
    }
}

/// One-shot form of [`ValidatorClient::validate`].
pub async fn request_validation(url: &str, data: &str, schema: &str) -> Result<bool, ClientError> {
    ValidatorClient::new()?.validate(url, data, schema).await
}

fn parse_url(url: &str) -> Result<Url, ClientError> {
    let parsed = Url::parse(url).map_err(|e| ClientError::Url(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ClientError::Url(format!("unsupported scheme {other:?} in {url}"))),
    }
}
