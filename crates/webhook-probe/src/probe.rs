use std::io::{self, Write};
use std::time::Instant;

use log::{debug, info, warn};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::payload::Payload;
use crate::report::{ResponseReport, Reporter};

/// Terminal state of a probe. Every probe reaches exactly one of these after
/// sending; there is no retry or recovery path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeState {
    Succeeded,
    HttpError,
    SslFailed,
    TimedOut,
    ConnectionFailed,
    UnknownError,
}

impl ProbeState {
    fn from_error(error: Option<&ProbeError>) -> Self {
        match error {
            None => ProbeState::Succeeded,
            Some(ProbeError::HttpStatus { .. }) => ProbeState::HttpError,
            Some(ProbeError::Tls { .. }) => ProbeState::SslFailed,
            Some(ProbeError::Timeout { .. }) => ProbeState::TimedOut,
            Some(ProbeError::ConnectionFailed { .. }) => ProbeState::ConnectionFailed,
            Some(ProbeError::Other { .. }) => ProbeState::UnknownError,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    pub conversation_id: String,
    pub state: ProbeState,
    pub status: Option<u16>,
    pub elapsed_ms: Option<u128>,
    pub error: Option<ProbeError>,
}

impl ProbeOutcome {
    fn new(
        payload: &Payload,
        report: Option<&ResponseReport>,
        error: Option<ProbeError>,
    ) -> Self {
        Self {
            conversation_id: payload.conversation_id.clone(),
            state: ProbeState::from_error(error.as_ref()),
            status: report.map(|r| r.status),
            elapsed_ms: report.map(|r| r.elapsed.as_millis()),
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Send one test POST carrying `message` and write the report to `out`.
///
/// Transport failures and non-2xx answers never surface as `Err`; they are
/// printed and recorded in the outcome. `Err` only means writing to `out`
/// failed.
pub async fn probe<W: Write>(
    config: &ProbeConfig,
    message: &str,
    out: W,
) -> io::Result<ProbeOutcome> {
    let payload = Payload::new(message);
    let mut reporter = Reporter::new(out, config.color);

    if config.accept_invalid_certs {
        warn!(
            "TLS certificate validation is disabled for {}; any server certificate is accepted",
            config.url
        );
    }
    reporter.banner(&config.url, &payload, config.accept_invalid_certs)?;

    let outcome = match send(config, &payload).await {
        Ok(report) => {
            reporter.response(&report)?;
            let error = (!report.is_success()).then_some(ProbeError::HttpStatus {
                status: report.status,
            });
            match &error {
                None => reporter.passed()?,
                Some(err) => reporter.failure(err)?,
            }
            ProbeOutcome::new(&payload, Some(&report), error)
        }
        Err(err) => {
            reporter.failure(&err)?;
            ProbeOutcome::new(&payload, None, Some(err))
        }
    };

    info!(
        "probe {} finished: {:?}",
        outcome.conversation_id, outcome.state
    );
    Ok(outcome)
}

async fn send(config: &ProbeConfig, payload: &Payload) -> Result<ResponseReport, ProbeError> {
    let classify = |e: reqwest::Error| ProbeError::classify(&e, config.timeout);

    // Proxy variables are ignored; the probe only talks to `config.url`.
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(config.timeout)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()
        .map_err(classify)?;

    debug!("POST {} (timeout {:?})", config.url, config.timeout);
    let start = Instant::now();
    let response = client
        .post(&config.url)
        .header(CONTENT_TYPE, "application/json")
        .json(payload)
        .send()
        .await
        .map_err(classify)?;
    let elapsed = start.elapsed();

    let status = response.status().as_u16();
    let headers = response.headers().clone();
    debug!("HTTP {} after {:?}", status, elapsed);

    let raw = response.text().await.map_err(classify)?;
    Ok(ResponseReport::new(status, elapsed, &headers, raw))
}
