//! The main entry point for the `umafix` command-line application.
//!
//! Parses arguments, sets up logging and runs the patch pass. The exit status
//! is zero whenever the run completes, including when targets are missing.

use tracing_subscriber::EnvFilter;
use umafix::cli;
use umafix::errors::Result;
use umafix::output_formatter::OutputFormat;
use umafix::replacer;

fn main() -> Result<()> {
    let args = cli::parse_args();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    replacer::run_patch(
        args.root,
        args.config,
        args.dry_run,
        OutputFormat::from(args.format.as_str()),
    )?;

    Ok(())
}
