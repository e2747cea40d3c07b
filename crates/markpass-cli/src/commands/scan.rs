//! Scan commands: verify a pass token and mark attendance.

use markpass_bridge::{PassPayload, ScanSession, ServerBridge};

use crate::cli::VerifyArgs;
use crate::client::{CliError, CliResult};
use crate::output::{render_holder, render_verdict};

pub(crate) async fn handle_verify(bridge: &mut ServerBridge, args: VerifyArgs) -> CliResult<()> {
    if bridge.need_init() {
        return Err(CliError::validation(
            "kiosk is not enrolled; run 'markpass enroll' first",
        ));
    }

    let Some(verification) = bridge
        .verify(&args.token)
        .await
        .map_err(CliError::failure)?
    else {
        return Err(CliError::validation(
            "no assignment held; fetch one with 'markpass assignment'",
        ));
    };

    // Holder details travel inside the token itself; tokens that do not
    // carry them are still verified, just rendered without the holder.
    if let Some(payload) = PassPayload::decode(&args.token) {
        render_holder(&payload);
    }

    let mut session = ScanSession::new();
    session.observe(&args.token);
    render_verdict(session.apply(&verification));

    if args.mark {
        if session.can_mark(bridge.assignment()) {
            mark(bridge, &args.token).await?;
        } else {
            println!("marking not offered for this result");
        }
    }
    Ok(())
}

pub(crate) async fn handle_mark(bridge: &mut ServerBridge, token: &str) -> CliResult<()> {
    if bridge.assignment().is_none() {
        return Err(CliError::validation(
            "no assignment held; fetch one with 'markpass assignment'",
        ));
    }
    mark(bridge, token).await
}

async fn mark(bridge: &mut ServerBridge, token: &str) -> CliResult<()> {
    let marked = bridge
        .mark_attendance(token)
        .await
        .map_err(CliError::failure)?;

    if marked {
        println!("attendance marked");
        Ok(())
    } else {
        Err(CliError::validation(
            "attendance was not recorded (the assignment may have changed; re-check status)",
        ))
    }
}
