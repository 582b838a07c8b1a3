pub mod cli;
pub mod config;
pub mod error;
pub mod payload;
pub mod probe;
pub mod report;

pub use config::ProbeConfig;
pub use error::ProbeError;
pub use probe::{probe, ProbeOutcome, ProbeState};
