use clap::Parser;
use tokio::runtime::Runtime;

use webhook_probe::cli::Cli;
use webhook_probe::config::ProbeConfig;
use webhook_probe::probe::probe;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ProbeConfig::from_cli(&cli)?;

    let rt = Runtime::new()?;
    let outcome = rt.block_on(async {
        let stdout = std::io::stdout();
        probe(&config, &cli.message, stdout.lock()).await
    })?;

    if cli.json {
        let summary = serde_json::json!({
            "conversation_id": outcome.conversation_id,
            "state": outcome.state,
            "success": outcome.is_success(),
            "status": outcome.status,
            "elapsed_ms": outcome.elapsed_ms,
            "error": outcome.error,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    // Exit code: 0 = 2xx answer, 1 = anything else
    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
