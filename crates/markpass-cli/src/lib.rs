#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Operator CLI for the markpass ticketing kiosk.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `commands/`: command handlers grouped by concern
//! - `client.rs`: shared errors and bridge construction
//! - `logging.rs`: tracing subscriber installation
//! - `output.rs`: renderers for status, assignments, and verdicts
//! - `main.rs`: thin entrypoint delegating to [`run()`]

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod logging;
pub(crate) mod output;

use clap::Parser;
use uuid::Uuid;

use crate::cli::{Cli, command_label};
use crate::client::CliResult;

/// Parse CLI arguments, execute the requested command, and return the
/// process exit code (0 success, 2 validation error, 3 operational
/// failure).
pub async fn run() -> i32 {
    if let Err(err) = logging::init() {
        eprintln!("error: {err:#}");
        return 3;
    }

    let cli = Cli::parse();
    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();

    match dispatch(cli, &trace_id).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            tracing::debug!(command = command_name, %trace_id, "command failed");
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, trace_id: &str) -> CliResult<()> {
    let mut bridge = client::build_bridge(&cli, trace_id).await?;

    match cli.command {
        cli::Command::Enroll(args) => commands::enroll::handle_enroll(&mut bridge, args).await,
        cli::Command::Status => {
            commands::kiosk::handle_status(&bridge);
            Ok(())
        }
        cli::Command::Assignment(args) => {
            commands::kiosk::handle_assignment(&mut bridge, args).await
        }
        cli::Command::Verify(args) => commands::scan::handle_verify(&mut bridge, args).await,
        cli::Command::Mark(args) => commands::scan::handle_mark(&mut bridge, &args.token).await,
        cli::Command::Reset => {
            commands::kiosk::handle_reset(&mut bridge);
            Ok(())
        }
    }
}
