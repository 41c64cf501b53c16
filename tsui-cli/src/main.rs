//! `TimeseriesUI` CLI - terminal front-end for the connection registry
//!
//! Provides commands for listing, adding, editing, removing and activating
//! backend connections, merging host-supplied connections, detecting the
//! host mode and watching connection health.

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use cli::Cli;
use tsui_core::tracing::span_names;
use tsui_core::{TracingConfig, TracingLevel, init_tracing};

fn main() {
    let cli = Cli::parse();
    let globals = cli.globals();

    if !cli.quiet {
        let base = util::configured_log_level(globals.config_path.as_deref());
        let level = TracingLevel::from_verbosity(base, cli.verbose);
        if let Err(e) = init_tracing(&TracingConfig::new().with_level(level)) {
            eprintln!("Warning: {e}");
        }
    }

    let result = {
        let _span =
            tsui_core::trace_operation!(span_names::CLI_COMMAND, command = cli.command.name())
                .entered();
        commands::dispatch(&globals, cli.command)
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
