use std::io::{self, Write};
use std::time::Duration;

use owo_colors::{OwoColorize, Style as Paint};
use reqwest::header::HeaderMap;
use serde_json::Value;
use tabled::settings::{object::Rows, Modify, Padding, Style};
use tabled::{Table, Tabled};

use crate::error::{truncate_chars, ProbeError, MESSAGE_LIMIT};
use crate::payload::Payload;

pub const OUTPUT_FIELD: &str = "output";
pub const OUTPUT_PREVIEW_LIMIT: usize = 100;
/// Checked in order when `output` is missing.
pub const REPLY_FIELDS: &[&str] = &["response", "text", "message"];

pub const TLS_HINT: &str = "Disable HTTPS/SSL scanning in antivirus or intercepting proxy software";
pub const TLS_HINT_DETAIL: &str =
    "or run without --verify-tls so certificate validation is skipped";
pub const NOT_ACTIVE_HINT: &str =
    "Webhook is not active (404): start or activate the workflow behind this URL";
pub const CONNECTION_CAUSES: &[&str] = &[
    "Webhook URL is wrong",
    "Webhook server is down",
    "No network connection",
];

const RULE_WIDTH: usize = 60;

/// Response body, parsed when it is valid JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    pub fn parse(raw: String) -> Self {
        match serde_json::from_str::<Value>(&raw) {
            Ok(v) => Body::Json(v),
            Err(_) => Body::Text(raw),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResponseReport {
    pub status: u16,
    /// Send until response headers arrived
    pub elapsed: Duration,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl ResponseReport {
    pub fn new(status: u16, elapsed: Duration, headers: &HeaderMap, raw_body: String) -> Self {
        let headers = headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        Self {
            status,
            elapsed,
            headers,
            body: Body::parse(raw_body),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// First characters of the top-level `output` field, if the body is an
/// object carrying one. Non-string values are previewed by their JSON text.
pub fn output_preview(body: &Value) -> Option<String> {
    let field = body.as_object()?.get(OUTPUT_FIELD)?;
    let text = match field {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Some(preview(&text))
}

fn preview(text: &str) -> String {
    truncate_chars(text, OUTPUT_PREVIEW_LIMIT).to_string()
}

/// Text of a reply field; empty strings, `null` and `false` count as absent.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn object_reply(fields: &serde_json::Map<String, Value>) -> Option<(&'static str, String)> {
    REPLY_FIELDS.iter().find_map(|&name| {
        let value = fields.get(name)?;
        // `message` echoes are only taken when they are plain text.
        if name == "message" && !value.is_string() {
            return None;
        }
        field_text(value).map(|text| (name, text))
    })
}

/// Reply text found somewhere other than `output`, with a label naming where:
/// one of [`REPLY_FIELDS`], a bare JSON string, or the last element of an
/// array of messages.
pub fn fallback_reply(body: &Value) -> Option<(String, String)> {
    match body {
        Value::Object(fields) => {
            object_reply(fields).map(|(name, text)| (name.to_string(), preview(&text)))
        }
        Value::String(s) if !s.is_empty() => Some(("body".to_string(), preview(s))),
        Value::Array(items) => {
            let last = items.last()?;
            let text = match last {
                Value::Object(fields) => match fields.get(OUTPUT_FIELD).and_then(field_text) {
                    Some(text) => text,
                    None => object_reply(fields)
                        .map(|(_, text)| text)
                        .unwrap_or_else(|| last.to_string()),
                },
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(("last array element".to_string(), preview(&text)))
        }
        _ => None,
    }
}

#[derive(Tabled)]
struct HeaderRow {
    #[tabled(rename = "header")]
    name: String,
    #[tabled(rename = "value")]
    value: String,
}

/// Console renderer for the probe report.
pub struct Reporter<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    fn heading(&mut self, title: &str, paint: Paint) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.out, "{rule}")?;
        if self.color {
            writeln!(self.out, "{}", title.style(paint))?;
        } else {
            writeln!(self.out, "{title}")?;
        }
        writeln!(self.out, "{rule}")
    }

    fn json(&mut self, value: &impl serde::Serialize) -> io::Result<()> {
        writeln!(self.out, "{}", serde_json::to_string_pretty(value)?)
    }

    pub fn banner(&mut self, url: &str, payload: &Payload, tls_bypass: bool) -> io::Result<()> {
        self.heading("🚀 WEBHOOK PROBE STARTING", Paint::new().cyan().bold())?;
        writeln!(self.out, "\n📡 URL: {url}")?;
        writeln!(self.out, "📤 Method: POST")?;
        if tls_bypass {
            let label = "🔓 TLS certificate validation: DISABLED (insecure, diagnostics only)";
            if self.color {
                writeln!(self.out, "{}", label.yellow())?;
            } else {
                writeln!(self.out, "{label}")?;
            }
        }
        writeln!(self.out, "\n📦 Payload:")?;
        self.json(payload)?;
        writeln!(self.out)
    }

    pub fn response(&mut self, report: &ResponseReport) -> io::Result<()> {
        self.heading("✅ RESPONSE RECEIVED", Paint::new().green().bold())?;
        writeln!(self.out, "\n📊 HTTP Status: {}", report.status)?;
        writeln!(
            self.out,
            "⏱️ Response Time: {:.2}s",
            report.elapsed.as_secs_f64()
        )?;

        writeln!(self.out, "\n📥 Response Headers:")?;
        if report.headers.is_empty() {
            writeln!(self.out, "   (none)")?;
        } else {
            let rows: Vec<HeaderRow> = report
                .headers
                .iter()
                .map(|(name, value)| HeaderRow {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect();
            let mut table = Table::new(rows);
            table
                .with(Style::modern())
                .with(Modify::new(Rows::new(0..)).with(Padding::new(1, 1, 0, 0)));
            writeln!(self.out, "{table}")?;
        }

        writeln!(self.out, "\n📥 Response Body:")?;
        match &report.body {
            Body::Json(value) => {
                self.json(value)?;
                writeln!(self.out, "\n🔍 Expected Field Check:")?;
                match output_preview(value) {
                    Some(preview) => writeln!(self.out, "   ✅ {OUTPUT_FIELD}: {preview}...")?,
                    None => {
                        writeln!(self.out, "   ❌ {OUTPUT_FIELD}: not found")?;
                        match fallback_reply(value) {
                            Some((source, preview)) => {
                                writeln!(self.out, "   ↪ {source}: {preview}...")?
                            }
                            None => writeln!(
                                self.out,
                                "   ❌ {}: not found",
                                REPLY_FIELDS.join(", ")
                            )?,
                        }
                    }
                }
            }
            Body::Text(raw) => writeln!(self.out, "{raw}")?,
        }
        Ok(())
    }

    pub fn passed(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.heading("✅ TEST PASSED", Paint::new().green().bold())
    }

    /// Closing diagnostic block for any unsuccessful probe, whether or not a
    /// response arrived.
    pub fn failure(&mut self, err: &ProbeError) -> io::Result<()> {
        writeln!(self.out)?;
        let red = Paint::new().red().bold();
        match err {
            ProbeError::Tls { message } => {
                self.heading("❌ TLS ERROR", red)?;
                writeln!(self.out, "\n🚨 Error: {}", truncate_chars(message, MESSAGE_LIMIT))?;
                writeln!(self.out, "\n💡 Fix: {TLS_HINT}")?;
                writeln!(self.out, "   {TLS_HINT_DETAIL}")?;
            }
            ProbeError::Timeout { secs } => {
                self.heading("❌ TIMEOUT", red)?;
                writeln!(self.out, "\n⏱️ The request got no response within {secs} seconds")?;
            }
            ProbeError::ConnectionFailed { message } => {
                self.heading("❌ CONNECTION ERROR", red)?;
                writeln!(self.out, "\n🚨 Error: {}", truncate_chars(message, MESSAGE_LIMIT))?;
                writeln!(self.out, "\n💡 Likely causes:")?;
                for cause in CONNECTION_CAUSES {
                    writeln!(self.out, "   • {cause}")?;
                }
            }
            ProbeError::HttpStatus { status } => {
                self.heading("⚠️ HTTP ERROR STATUS", Paint::new().yellow().bold())?;
                if *status == 404 {
                    writeln!(self.out, "\n💡 {NOT_ACTIVE_HINT}")?;
                }
            }
            ProbeError::Other { kind, message } => {
                self.heading("❌ UNKNOWN ERROR", red)?;
                writeln!(self.out, "\n🚨 Error kind: {kind}")?;
                writeln!(self.out, "🚨 Error message: {message}")?;
            }
        }
        Ok(())
    }
}
