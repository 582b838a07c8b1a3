//! Failure taxonomy for a single probe and the mapping from transport errors
//! into it.

use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Error text in diagnostics is cut to this many characters.
pub const MESSAGE_LIMIT: usize = 200;

const TLS_MARKERS: &[&str] = &["tls", "ssl", "certificate", "handshake", "unknownissuer"];

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProbeError {
    #[error("TLS failure: {message}")]
    Tls { message: String },

    #[error("no response within {secs} seconds")]
    Timeout { secs: u64 },

    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("server answered with HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("{kind} error: {message}")]
    Other { kind: String, message: String },
}

impl ProbeError {
    /// Map a reqwest failure into the taxonomy. TLS is checked before timeout
    /// and connect, since a failed handshake also reports as a connect error.
    /// A peer hanging up before answering counts as a connection failure.
    pub fn classify(err: &reqwest::Error, timeout: Duration) -> Self {
        let message = error_chain_text(err);
        if is_tls_error(err) {
            ProbeError::Tls { message }
        } else if err.is_timeout() {
            ProbeError::Timeout {
                secs: timeout.as_secs(),
            }
        } else if err.is_connect() || (!err.is_body() && !err.is_decode() && is_hang_up(err)) {
            ProbeError::ConnectionFailed { message }
        } else {
            ProbeError::Other {
                kind: reqwest_kind(err).to_string(),
                message,
            }
        }
    }
}

fn reqwest_kind(err: &reqwest::Error) -> &'static str {
    if err.is_builder() {
        "builder"
    } else if err.is_redirect() {
        "redirect"
    } else if err.is_body() {
        "body"
    } else if err.is_decode() {
        "decode"
    } else if err.is_request() {
        "request"
    } else {
        "unknown"
    }
}

/// Every error in the source chain. `io::Error` keeps its payload out of
/// `source()`, and the TLS stack nests one `io::Error` inside another, so
/// payloads are unwrapped in place until a non-io layer is reached.
fn layers<'a>(err: &'a (dyn StdError + 'static)) -> Vec<&'a (dyn StdError + 'static)> {
    let mut out = Vec::new();
    let mut current = Some(err);
    while let Some(e) = current {
        out.push(e);
        let mut layer = e;
        while let Some(inner) = layer.downcast_ref::<io::Error>().and_then(|io| io.get_ref()) {
            let inner: &(dyn StdError + 'static) = inner;
            out.push(inner);
            layer = inner;
        }
        current = e.source();
    }
    out
}

/// The keyword fallback skips the top-level error since its text carries the
/// request URL.
fn is_tls_error(err: &(dyn StdError + 'static)) -> bool {
    let chain = layers(err);
    if chain.iter().any(|e| e.is::<rustls::Error>()) {
        return true;
    }
    chain.iter().skip(1).any(|e| {
        let text = e.to_string().to_ascii_lowercase();
        TLS_MARKERS.iter().any(|m| text.contains(m))
    })
}

fn is_hang_up(err: &(dyn StdError + 'static)) -> bool {
    layers(err).into_iter().any(|e| {
        if let Some(h) = e.downcast_ref::<hyper::Error>() {
            return h.is_incomplete_message() || h.is_closed();
        }
        matches!(
            e.downcast_ref::<io::Error>().map(io::Error::kind),
            Some(
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::BrokenPipe
            )
        )
    })
}

/// Join every message in the chain, skipping ones already contained in the
/// previous message.
pub fn error_chain_text(err: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        let text = e.to_string();
        if let Some(last) = parts.last() {
            if !last.contains(&text) {
                parts.push(text);
            }
        }
        current = e.source();
    }
    parts.join(": ")
}

/// Cut `text` to at most `limit` characters (not bytes).
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
