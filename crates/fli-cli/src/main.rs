#![deny(clippy::all, warnings)]

use std::sync::Arc;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use fli_core::{CommandContext, GlobalOptions, SharedEffects, SystemEffects};

mod cli;
mod dispatch;
mod output;
mod style;

use cli::FliDockerCli;
use dispatch::dispatch_command;
use output::{emit_output, OutputOptions};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = FliDockerCli::parse();
    init_tracing(cli.trace, cli.verbose, cli.quiet);

    let global = GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
        json: cli.json,
    };
    let effects: SharedEffects = Arc::new(SystemEffects::new());
    let ctx = CommandContext::new(&global, effects).map_err(|err| eyre!("{err:?}"))?;

    let (info, outcome) = dispatch_command(&ctx, &cli.command)?;
    let opts = OutputOptions {
        quiet: cli.quiet,
        json: cli.json,
        no_color: cli.no_color,
    };
    let code = emit_output(&opts, info, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(trace: bool, verbose: u8, quiet: bool) {
    let level = if trace {
        "trace"
    } else if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("fli_docker={level},fli_core={level},fli_domain={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
