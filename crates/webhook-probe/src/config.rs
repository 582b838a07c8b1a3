use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;

use crate::cli::Cli;

pub const DEFAULT_WEBHOOK_URL: &str =
    "https://n8n.botfusions.com/webhook/a5015f1b-85e2-417f-8c95-d4b91698ec6e";
pub const DEFAULT_MESSAGE: &str = "Hello! This is a webhook probe test message.";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub url: String,
    /// Whole-request deadline. Not exposed on the command line.
    pub timeout: Duration,
    /// Skip server certificate validation. Accepts self-signed and mismatched
    /// certificates, so only meant for local diagnostics.
    pub accept_invalid_certs: bool,
    pub color: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WEBHOOK_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: true,
            color: true,
        }
    }
}

impl ProbeConfig {
    /// Build a config from an explicit URL, keeping every other default.
    pub fn for_url(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).with_context(|| format!("Invalid webhook URL '{}'", url))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => anyhow::bail!("Unsupported URL scheme '{}' (expected http or https)", other),
        }
        Ok(Self {
            url: url.to_string(),
            ..Self::default()
        })
    }

    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut cfg = Self::for_url(&cli.url)?;
        cfg.accept_invalid_certs = !cli.verify_tls;
        cfg.color = !cli.no_color;
        Ok(cfg)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }
}
