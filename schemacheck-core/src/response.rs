//! Response sink the dispatcher writes into, plus an in-memory implementation for the HTTP host.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use std::io::{self, Write};

/// Outgoing HTTP response as seen by the dispatcher: headers first, then one body writer.
///
/// The writer borrows the response; dropping it releases the body stream.
pub trait HttpResponse {
    type Writer<'a>: Write
    where
        Self: 'a;

    fn set_content_type(&mut self, content_type: &str);

    fn set_status_code(&mut self, status: StatusCode);

    fn writer(&mut self) -> io::Result<Self::Writer<'_>>;
}

/// Collects status, content type and body so the host can build a hyper response afterwards.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Status defaults to 500 when the dispatcher never set one.
    pub fn into_hyper_response(self) -> Result<http::Response<Full<Bytes>>, http::Error> {
        let status = self.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut b = http::Response::builder().status(status);
        if let Some(ct) = &self.content_type {
            b = b.header(http::header::CONTENT_TYPE, ct.as_str());
        }
        b.body(Full::new(Bytes::from(self.body)))
    }
}

impl HttpResponse for BufferedResponse {
    type Writer<'a> = &'a mut Vec<u8>;

    fn set_content_type(&mut self, content_type: &str) {
        self.content_type = Some(content_type.to_owned());
    }

    fn set_status_code(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn writer(&mut self) -> io::Result<Self::Writer<'_>> {
        Ok(&mut self.body)
    }
}
