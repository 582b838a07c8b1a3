use clap::Parser;

use crate::config::{DEFAULT_MESSAGE, DEFAULT_WEBHOOK_URL};

/// Webhook-probe – send one test POST to a webhook and print what came back
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Message text placed in the payload
    #[arg(value_name = "MESSAGE", default_value = DEFAULT_MESSAGE)]
    pub message: String,

    /// Activate verbose output (-v, -vv, etc.)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Webhook endpoint to probe
    #[arg(long, value_name = "URL", default_value = DEFAULT_WEBHOOK_URL)]
    pub url: String,

    /// Validate the server certificate (disabled by default for local diagnostics)
    #[arg(long)]
    pub verify_tls: bool,

    /// Print a JSON summary of the outcome after the report
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
