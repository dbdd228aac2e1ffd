//! The endpoint over a real socket, driven by the validator client.

use bytes::Bytes;
use http::{Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Frame};
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use schemacheck_core::http::{handle_hyper, serve};
use schemacheck_core::{
    request_validation, ClientError, RequestDispatcher, ValidatorClient, ValidationOutcome,
};

async fn start(dispatcher: RequestDispatcher) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(serve(listener, Arc::new(dispatcher), async move {
        let _ = rx.await;
    }));
    (addr, tx)
}

fn schema_is_int_pair() -> RequestDispatcher {
    RequestDispatcher::from_service(|data: &str, schema: &str| {
        schema == "int,int"
            && data
                .lines()
                .all(|row| row.split(',').all(|cell| cell.trim().parse::<i64>().is_ok()))
    })
}

#[tokio::test]
async fn client_gets_verdicts() {
    let (addr, _stop) = start(schema_is_int_pair()).await;
    let url = format!("http://{addr}/");
    assert!(request_validation(&url, "1,2\n3,4", "int,int").await.unwrap());
    assert!(!request_validation(&url, "1,x\n3,4", "int,int").await.unwrap());
}

#[tokio::test]
async fn any_path_reaches_the_endpoint() {
    let (addr, _stop) = start(schema_is_int_pair()).await;
    let url = format!("http://{addr}/some/other/path?x=1");
    assert!(request_validation(&url, "5,6", "int,int").await.unwrap());
}

#[tokio::test]
async fn wrong_content_type_over_the_wire() {
    let (addr, _stop) = start(schema_is_int_pair()).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(
            b"POST / HTTP/1.1\r\nHost: test\r\nContent-Type: text/plain\r\nContent-Length: 2\r\nConnection: close\r\n\r\nhi",
        )
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();
    assert!(raw.starts_with("HTTP/1.1 400"), "{raw}");
    assert!(raw.to_ascii_lowercase().contains("content-type: application/json"));
    assert!(raw.ends_with(
        r#"{"validation":false,"info":"Request content type isn't 'application/json'."}"#
    ));
}

#[tokio::test]
async fn handle_hyper_maps_missing_fields_to_400() {
    let req = Request::builder()
        .method("PUT")
        .uri("/")
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from_static(br#"{"data":"a"}"#)))
        .unwrap();
    let resp = handle_hyper(Arc::new(schema_is_int_pair()), req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let out: ValidationOutcome = serde_json::from_slice(&body).unwrap();
    assert_eq!(out.info, "Request json body doesn't have 'data' and 'schema' fields.");
}

/// Upstream that answers every connection with the same raw response.
async fn canned_upstream(response: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let _ = stream.write_all(response).await;
        }
    });
    addr
}

#[tokio::test]
async fn client_surfaces_status_codes() {
    let addr = canned_upstream(b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\n\r\n").await;
    let err = request_validation(&format!("http://{addr}/"), "a", "b")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedStatus(503)), "{err}");

    let addr = canned_upstream(
        b"HTTP/1.1 400 Bad Request\r\nContent-Type: application/json\r\nContent-Length: 62\r\n\r\n{\"validation\":false,\"info\":\"Request deserialization problem.\"}",
    )
    .await;
    let err = request_validation(&format!("http://{addr}/"), "a", "b")
        .await
        .unwrap_err();
    match err {
        ClientError::BadRequest(info) => assert_eq!(info, "Request deserialization problem."),
        other => panic!("expected BadRequest, got {other}"),
    }
}

#[tokio::test]
async fn client_rejects_bad_urls() {
    let err = request_validation("ftp://example.com/", "a", "b").await.unwrap_err();
    assert!(matches!(err, ClientError::Url(_)));
    let err = request_validation("/relative", "a", "b").await.unwrap_err();
    assert!(matches!(err, ClientError::Url(_)));
}

#[tokio::test]
async fn client_reaches_ipv6_literal_hosts() {
    // Hosts without an IPv6 loopback have nothing to check.
    let Ok(listener) = TcpListener::bind("[::1]:0").await else {
        return;
    };
    let addr = listener.local_addr().unwrap();
    let (_tx, rx) = oneshot::channel::<()>();
    tokio::spawn(serve(listener, Arc::new(schema_is_int_pair()), async move {
        let _ = rx.await;
    }));
    let client = ValidatorClient::new().unwrap();
    let url = format!("http://[::1]:{}/", addr.port());
    assert!(client.validate(&url, "1,2", "int,int").await.unwrap());
}

/// Request body whose transport fails on the first read.
struct ResetBody;

impl Body for ResetBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, io::Error>>> {
        Poll::Ready(Some(Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        ))))
    }
}

async fn outcome_for_unreadable_body(content_type: &str) -> (StatusCode, ValidationOutcome) {
    let req = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", content_type)
        .body(ResetBody)
        .unwrap();
    let resp = handle_hyper(Arc::new(schema_is_int_pair()), req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn unreadable_body_is_a_deserialization_problem() {
    let (status, out) = outcome_for_unreadable_body("application/json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!out.validation);
    assert_eq!(out.info, "Request deserialization problem.");
}

#[tokio::test]
async fn content_type_is_checked_before_the_body() {
    let (status, out) = outcome_for_unreadable_body("text/plain").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(out.info, "Request content type isn't 'application/json'.");
}

#[tokio::test]
async fn panicking_service_becomes_500() {
    let dispatcher = RequestDispatcher::from_service(|_data: &str, _schema: &str| -> bool {
        panic!("validator crashed")
    });
    let req = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from_static(br#"{"data":"1","schema":"int"}"#)))
        .unwrap();
    let resp = handle_hyper(Arc::new(dispatcher), req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json"
    );
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let error = json["error"].as_str().unwrap();
    assert!(error.starts_with("dispatch task failed"), "{error}");
}
