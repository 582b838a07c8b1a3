use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_mangen::Man;
use webhook_probe::cli::Cli;
use webhook_probe::report::CONNECTION_CAUSES;

/// clap has no notion of exit codes or environment, so those sections are
/// written as raw roff after the generated page.
fn render_page(out: &mut dyn Write) -> io::Result<()> {
    Man::new(Cli::command())
        .manual("webhook-probe manual")
        .section("1")
        .render(out)?;

    writeln!(out, ".SH \"EXIT STATUS\"")?;
    writeln!(out, ".TP\n\\fB0\\fR\nThe webhook answered with a 2xx status.")?;
    writeln!(
        out,
        ".TP\n\\fB1\\fR\nAnything else: a non-2xx status, TLS failure, timeout, \
         connection failure or unclassified error."
    )?;
    writeln!(out, ".TP\n\\fB2\\fR\nInvalid command line.")?;

    writeln!(out, ".SH \"CONNECTION FAILURES\"")?;
    writeln!(out, "Reported with these likely causes:")?;
    for cause in CONNECTION_CAUSES {
        writeln!(out, ".IP \\(bu 2\n{cause}")?;
    }

    writeln!(out, ".SH ENVIRONMENT")?;
    writeln!(
        out,
        ".TP\n\\fBRUST_LOG\\fR\nLog filter for stderr output; overrides the level chosen with \\fB-v\\fR."
    )
}

fn main() -> anyhow::Result<()> {
    let out_path = std::env::args().nth(1).unwrap_or_else(|| "webhook-probe.1".to_string());
    let path = Path::new(&out_path);
    let mut file = File::create(path)?;
    render_page(&mut file)?;
    eprintln!("Generated man page at {}", path.display());
    Ok(())
}
