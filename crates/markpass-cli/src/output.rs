//! Output renderers for kiosk state and scan verdicts.

use markpass_bridge::{Assignment, PassPayload, ScanVerdict, ServerBridge};

/// Render the enrollment/assignment summary for `status`.
pub(crate) fn render_status(bridge: &ServerBridge) {
    if bridge.need_init() {
        println!("state: not enrolled");
        println!("run 'markpass enroll' with the code from your organizer");
        return;
    }

    println!("state: enrolled");
    if let Some(identity) = bridge.identity() {
        println!("kiosk: {}", identity.kiosk_name);
        println!("server: {}", identity.server_address);
    }
    match bridge.assignment() {
        Some(assignment) => render_assignment(assignment),
        None => println!("assignment: none (poll with 'markpass assignment --watch')"),
    }
}

/// Render a held assignment.
pub(crate) fn render_assignment(assignment: &Assignment) {
    println!("assignment: {} ({})", assignment.name, assignment.id);
    if assignment.is_passive() {
        println!("note: passive assignment; verification only, no attendance marking");
    }
}

/// Render the holder details decoded out of a scanned token.
pub(crate) fn render_holder(payload: &PassPayload) {
    println!("holder: {} (id {})", payload.name, payload.id);
    println!("phone: {}", payload.phone);
    println!("pass type: {}", payload.type_label());
}

/// Render the three-tier scan verdict.
pub(crate) fn render_verdict(verdict: &ScanVerdict) {
    match verdict {
        ScanVerdict::Valid => println!("VALID"),
        ScanVerdict::Staff => println!("VERIFIED STAFF: allow to proceed, do not mark"),
        ScanVerdict::Rejected {
            status,
            text,
            subtext,
        } => {
            println!("REJECTED ({status}): {}", text.trim());
            if !subtext.is_empty() {
                println!("reason: {subtext}");
            }
        }
    }
}
