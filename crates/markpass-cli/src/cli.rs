//! Argument parsing for the operator CLI.

use clap::{Args, Parser, Subcommand};
use markpass_bridge::secrets::SERVICE_NAME;
use url::Url;

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub(crate) const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

/// Operator CLI for the markpass ticketing kiosk.
#[derive(Parser)]
#[command(name = "markpass", version, about)]
pub(crate) struct Cli {
    /// HTTP timeout applied to every server call, in seconds.
    #[arg(
        long,
        global = true,
        env = "MARKPASS_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    /// Keyring service name the credentials are stored under.
    #[arg(
        long,
        global = true,
        env = "MARKPASS_KEYRING_SERVICE",
        default_value = SERVICE_NAME,
        hide = true
    )]
    pub(crate) keyring_service: String,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Enroll this kiosk with a ticketing server.
    Enroll(EnrollArgs),
    /// Show enrollment and assignment state.
    Status,
    /// Fetch the current assignment, optionally polling until one exists.
    Assignment(AssignmentArgs),
    /// Verify a scanned pass token against the current assignment.
    Verify(VerifyArgs),
    /// Mark attendance for a pass token.
    Mark(MarkArgs),
    /// Clear stored credentials; the kiosk will need re-enrollment.
    Reset,
}

#[derive(Args)]
pub(crate) struct EnrollArgs {
    /// Base URL of the ticketing server, e.g. `http://10.0.0.2:5000`
    #[arg(long, value_parser = parse_url)]
    pub(crate) server: Url,
    /// Enrollment code issued by the organizer.
    #[arg(long)]
    pub(crate) code: String,
    /// Human-readable name for this kiosk.
    #[arg(long)]
    pub(crate) name: String,
}

#[derive(Args)]
pub(crate) struct AssignmentArgs {
    /// Keep polling until an assignment is held or credentials reset.
    #[arg(long)]
    pub(crate) watch: bool,
    /// Poll interval in seconds when watching.
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub(crate) interval: u64,
}

#[derive(Args)]
pub(crate) struct VerifyArgs {
    /// Decoded pass token from the QR scanner.
    pub(crate) token: String,
    /// Also mark attendance when the verdict allows it.
    #[arg(long)]
    pub(crate) mark: bool,
}

#[derive(Args)]
pub(crate) struct MarkArgs {
    /// Decoded pass token from the QR scanner.
    pub(crate) token: String,
}

/// Stable command label used in logs.
pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Enroll(_) => "enroll",
        Command::Status => "status",
        Command::Assignment(_) => "assignment",
        Command::Verify(_) => "verify",
        Command::Mark(_) => "mark",
        Command::Reset => "reset",
    }
}

/// Parse the server URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}
