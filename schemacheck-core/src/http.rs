//! Async HTTP host: tokio + hyper. Every method and path reaches the single validation endpoint.
//! The dispatcher is synchronous and runs on the blocking pool.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::io::{self, Cursor, Read};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::dispatcher::{IncomingRequest, RequestDispatcher};
use crate::response::BufferedResponse;
use crate::{CoreError, ServerConfig, APPLICATION_JSON};

/// Request body that could not be received; reading it reports the transport error.
struct UnreadableBody(Option<io::Error>);

impl Read for UnreadableBody {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(self
            .0
            .take()
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "request body unavailable")))
    }
}

type Body = Box<dyn Read + Send>;

/// Accept connections until `shutdown` resolves. One task per connection.
pub async fn serve<F>(
    listener: TcpListener,
    dispatcher: Arc<RequestDispatcher>,
    shutdown: F,
) -> Result<(), CoreError>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutting down");
                return Ok(());
            }
            accept_result = listener.accept() => {
                let (stream, peer) = match accept_result {
                    Ok(x) => x,
                    Err(e) => {
                        warn!(error = %e, "accept error");
                        continue;
                    }
                };
                let io = TokioIo::new(stream);
                let dispatcher = Arc::clone(&dispatcher);
                tokio::task::spawn(async move {
                    let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                        let dispatcher = Arc::clone(&dispatcher);
                        async move { handle_hyper(dispatcher, req).await }
                    });
                    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                        warn!(%peer, error = %e, "serve_connection error");
                    }
                });
            }
        }
    }
}

/// Bind `config.addr()` and serve until Ctrl-C.
pub async fn run(dispatcher: RequestDispatcher, config: &ServerConfig) -> Result<(), CoreError> {
    let listener = TcpListener::bind(config.addr()).await?;
    info!(addr = %listener.local_addr()?, "listening");
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    serve(listener, Arc::new(dispatcher), shutdown).await
}

/// Turn one hyper request into one hyper response. Dispatcher failures become 500.
pub async fn handle_hyper<B>(
    dispatcher: Arc<RequestDispatcher>,
    req: Request<B>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: hyper::body::Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    let body: Body = match req.into_body().collect().await {
        Ok(collected) => Box::new(Cursor::new(collected.to_bytes())),
        Err(e) => Box::new(UnreadableBody(Some(io::Error::new(io::ErrorKind::Other, e)))),
    };
    let request = IncomingRequest { content_type, body };

    let joined = tokio::task::spawn_blocking(move || {
        let mut response = BufferedResponse::new();
        dispatcher.handle(request, &mut response).map(|()| response)
    })
    .await;

    let result = match joined {
        Ok(Ok(response)) => response.into_hyper_response().map_err(|e| e.to_string()),
        Ok(Err(e)) => Err(CoreError::from(e).to_string()),
        Err(e) => Err(CoreError::from(e).to_string()),
    };
    Ok(result.unwrap_or_else(|msg| {
        warn!(error = %msg, "dispatch failed");
        error_response(&msg)
    }))
}

fn error_response(msg: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": msg });
    let mut resp = Response::new(Full::new(Bytes::from(body.to_string())));
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    resp
}
