use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use serde::Serialize;

pub const CONVERSATION_PREFIX: &str = "test_";

#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    pub message: String,
    pub conversation_id: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// ISO-8601, local offset, microsecond precision
    pub timestamp: String,
    pub test_mode: bool,
}

impl Payload {
    pub fn new(message: impl Into<String>) -> Self {
        Self::at(message, Local::now())
    }

    /// Build the payload as if sent at `now`.
    pub fn at<Tz>(message: impl Into<String>, now: DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            message: message.into(),
            conversation_id: format!("{CONVERSATION_PREFIX}{}", now.timestamp()),
            metadata: Metadata {
                timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, false),
                test_mode: true,
            },
        }
    }
}
