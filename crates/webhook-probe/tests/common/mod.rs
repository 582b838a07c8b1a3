//! Local webhook stand-ins on 127.0.0.1. Well-behaved servers run on axum in
//! their own thread and runtime, so both sync and `#[tokio::test]` tests can
//! use them. Raw sockets are kept for peers that must misbehave below HTTP.
#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Router;

/// Request as the webhook saw it.
pub struct Captured {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

pub struct Hook {
    pub url: String,
    requests: mpsc::Receiver<Captured>,
}

impl Hook {
    /// Next request received, waiting a few seconds at most.
    pub fn received(&self) -> Captured {
        self.requests
            .recv_timeout(Duration::from_secs(5))
            .expect("webhook received no request")
    }
}

fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    (listener, addr)
}

/// Run `router` on a fresh port in a background thread.
fn spawn_router(router: Router) -> String {
    let (listener, addr) = bind();
    listener.set_nonblocking(true).unwrap();
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, router).await.unwrap();
        });
    });
    format!("http://{addr}/webhook")
}

/// Webhook answering every request with `status`, `content_type` and `body`.
pub fn reply(status: u16, content_type: &str, body: &str) -> Hook {
    let (tx, rx) = mpsc::channel();
    let status = StatusCode::from_u16(status).unwrap();
    let content_type = content_type.to_string();
    let body = body.to_string();

    let router = Router::new().fallback(move |req: Request| {
        let tx = tx.clone();
        let content_type = content_type.clone();
        let body = body.clone();
        async move {
            let (parts, req_body) = req.into_parts();
            let bytes = to_bytes(req_body, usize::MAX).await.unwrap_or_default();
            let _ = tx.send(Captured {
                method: parts.method.to_string(),
                path: parts.uri.path().to_string(),
                content_type: parts
                    .headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
            (
                status,
                [
                    (header::CONTENT_TYPE, content_type),
                    (HeaderName::from_static("x-hook-test"), "yes".to_string()),
                ],
                body,
            )
                .into_response()
        }
    });

    Hook {
        url: spawn_router(router),
        requests: rx,
    }
}

/// Webhook that takes `hold` to answer.
pub fn stall(hold: Duration) -> String {
    let router = Router::new().fallback(move || async move {
        tokio::time::sleep(hold).await;
        Response::new(Body::from("late"))
    });
    spawn_router(router)
}

/// Webhook that redirects back to itself forever.
pub fn redirect_loop() -> String {
    let router = Router::new().fallback(|| async { Redirect::to("/webhook") });
    spawn_router(router)
}

/// Accept one connection, read some of the request, write `reply` raw and
/// close after `linger`.
fn raw_once(reply: &'static [u8], linger: Duration) -> String {
    let (listener, addr) = bind();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            if !reply.is_empty() {
                let _ = stream.write_all(reply);
                let _ = stream.flush();
            }
            thread::sleep(linger);
        }
    });
    addr
}

/// Peer that reads the request and hangs up without answering.
pub fn hang_up() -> String {
    format!("http://{}/webhook", raw_once(b"", Duration::ZERO))
}

/// Peer whose answer is not HTTP at all.
pub fn garbage_reply() -> String {
    let addr = raw_once(b"NOT HTTP AT ALL\r\n\r\n", Duration::from_millis(500));
    format!("http://{addr}/webhook")
}

/// Plain HTTP server behind an https:// URL, so the client handshake fails
/// on the first record it reads.
pub fn plaintext_behind_https() -> String {
    let addr = raw_once(
        b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n",
        Duration::from_millis(500),
    );
    format!("https://{addr}/webhook")
}

/// URL of a port nothing listens on.
pub fn refused_url() -> String {
    let (listener, addr) = bind();
    drop(listener);
    format!("http://{addr}/webhook")
}
