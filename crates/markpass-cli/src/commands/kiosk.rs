//! Kiosk state commands: status, assignment polling, credential reset.

use std::time::Duration;

use markpass_bridge::ServerBridge;
use tokio::time::sleep;
use tracing::warn;

use crate::cli::AssignmentArgs;
use crate::client::{CliError, CliResult};
use crate::output::{render_assignment, render_status};

pub(crate) fn handle_status(bridge: &ServerBridge) {
    render_status(bridge);
}

pub(crate) fn handle_reset(bridge: &mut ServerBridge) {
    if bridge.need_init() {
        println!("no credentials stored");
        return;
    }
    bridge.clear_creds();
    println!("credentials cleared; re-enroll with 'markpass enroll'");
}

pub(crate) async fn handle_assignment(
    bridge: &mut ServerBridge,
    args: AssignmentArgs,
) -> CliResult<()> {
    if bridge.need_init() {
        return Err(CliError::validation(
            "kiosk is not enrolled; run 'markpass enroll' first",
        ));
    }

    if args.watch {
        watch_assignment(bridge, args.interval.max(1)).await
    } else {
        fetch_assignment_once(bridge).await
    }
}

async fn fetch_assignment_once(bridge: &mut ServerBridge) -> CliResult<()> {
    bridge.get_assignment().await.map_err(CliError::failure)?;

    if let Some(assignment) = bridge.assignment() {
        render_assignment(assignment);
        return Ok(());
    }

    if bridge.need_init() {
        return Err(CliError::validation(
            "server no longer recognizes this kiosk; credentials were cleared, re-enroll",
        ));
    }

    println!("no assignment currently; ask your organizer or use --watch");
    Ok(())
}

/// Caller-driven polling loop: the bridge has no internal timer, so the
/// CLI owns the interval. Transport blips are logged and retried; a
/// credential teardown ends the loop.
async fn watch_assignment(bridge: &mut ServerBridge, interval: u64) -> CliResult<()> {
    loop {
        match bridge.get_assignment().await {
            Ok(true) => {
                if let Some(assignment) = bridge.assignment() {
                    render_assignment(assignment);
                }
                return Ok(());
            }
            Ok(false) => {
                if bridge.need_init() {
                    return Err(CliError::validation(
                        "server no longer recognizes this kiosk; credentials were cleared, re-enroll",
                    ));
                }
            }
            Err(err) => {
                warn!(error = %err, "assignment poll failed; retrying");
            }
        }
        sleep(Duration::from_secs(interval)).await;
    }
}
