//! CLI entry point for the algoscope step sequencer.
//!
//! Parses arguments with clap, builds the requested graph or tree, prints the
//! computed step sequence to stdout, optionally plays it back frame by frame,
//! and maps failures to exit codes. Logging is initialised first so every
//! later operation can emit structured diagnostics via `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use algoscope_cli::{
    cli::{Cli, CliError, animate_summary, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

/// Parse CLI arguments, execute the command, render the summary, play the
/// animation when requested, and flush the output stream.
fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(cli).context("failed to execute command")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).context("failed to render summary")?;
    writer.flush().context("failed to flush output")?;
    animate_summary(&summary, &mut writer).context("failed to play animation")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let (code, detail_code) = err
            .downcast_ref::<CliError>()
            .and_then(|cli_error| match cli_error {
                CliError::Workbench(inner) => Some((
                    Some(inner.code().as_str()),
                    inner
                        .validation_code()
                        .map(|code| code.as_str())
                        .or_else(|| inner.precondition_code().map(|code| code.as_str())),
                )),
                _ => None,
            })
            .unwrap_or((None, None));

        error!(
            error = %err,
            code = code.map(field::display),
            detail_code = detail_code.map(field::display),
            "command execution failed"
        );
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
