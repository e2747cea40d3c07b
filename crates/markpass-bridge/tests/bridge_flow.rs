//! End-to-end operator flow against a mock ticketing server: enroll,
//! pick up an assignment, verify passes, mark attendance, and recover
//! from a mid-session conflict.

use httpmock::prelude::*;
use markpass_bridge::secrets::{KEY_KIOSK_NAME, KEY_SERVER};
use markpass_bridge::{MemoryStore, ScanSession, ScanVerdict, SecretStore, ServerBridge};
use reqwest::Client;
use serde_json::json;

#[tokio::test]
async fn full_kiosk_lifecycle() {
    let server = MockServer::start_async().await;

    let enroll_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/enroll")
            .json_body(json!({"code": "4242", "name": "Gate A"}));
        then.status(200).body("TOK123");
    });
    let mut no_assignment_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/assignment")
            .query_param("kioskToken", "TOK123");
        then.status(204);
    });

    // Fresh kiosk: nothing stored, enrollment required.
    let mut bridge = ServerBridge::restore(Box::new(MemoryStore::new()), Client::new()).await;
    assert!(bridge.need_init());

    assert!(
        bridge
            .enroll(&server.base_url(), "4242", "Gate A")
            .await
            .expect("enroll")
    );
    enroll_mock.assert();
    assert!(!bridge.need_init());

    // The caller-driven poll sees no assignment yet.
    assert!(!bridge.get_assignment().await.expect("poll"));
    assert_eq!(bridge.assignment(), None);

    // The organizer assigns an event; the next poll picks it up.
    no_assignment_mock.delete();
    server.mock(|when, then| {
        when.method(GET).path("/assignment");
        then.status(200).body("Finals+evt42");
    });
    assert!(bridge.get_assignment().await.expect("poll"));
    let assignment = bridge.assignment().expect("assignment").clone();
    assert_eq!(assignment.name, "Finals");

    // A scan comes in: verify, render the verdict, mark attendance.
    let mut verify_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/verify")
            .query_param("token", "PASS-1")
            .query_param("event", "evt42");
        then.status(200).body("ok");
    });
    let mark_mock = server.mock(|when, then| {
        when.method(PUT).path("/mark").json_body(json!({
            "kioskToken": "TOK123",
            "event": "evt42",
            "token": "PASS-1",
        }));
        then.status(200);
    });

    let mut session = ScanSession::new();
    assert!(session.observe("PASS-1"));

    let verification = bridge
        .verify("PASS-1")
        .await
        .expect("verify")
        .expect("verification");
    assert_eq!(*session.apply(&verification), ScanVerdict::Valid);
    assert!(session.can_mark(bridge.assignment()));

    assert!(bridge.mark_attendance("PASS-1").await.expect("mark"));
    mark_mock.assert();

    // The camera keeps re-reading the same code; the session ignores it.
    assert!(!session.observe("PASS-1"));

    // A staff pass is acknowledged but never marked.
    verify_mock.delete();
    server.mock(|when, then| {
        when.method(GET).path("/verify");
        then.status(200).body("staff");
    });
    assert!(session.observe("PASS-2"));
    let staff = bridge
        .verify("PASS-2")
        .await
        .expect("verify")
        .expect("verification");
    assert_eq!(*session.apply(&staff), ScanVerdict::Staff);
    assert!(!session.can_mark(bridge.assignment()));
}

#[tokio::test]
async fn kiosk_reset_after_server_side_revocation() {
    let server = MockServer::start_async().await;
    let mut assignment_mock = server.mock(|when, then| {
        when.method(GET).path("/assignment");
        then.status(200).body("Finals+evt42");
    });
    server.mock(|when, then| {
        when.method(PUT).path("/mark");
        then.status(409);
    });

    let address = server.base_url();
    let store = MemoryStore::with_entries([
        (KEY_SERVER.to_string(), address.clone()),
        (address.clone(), "TOK123".to_string()),
        (KEY_KIOSK_NAME.to_string(), "Gate A".to_string()),
    ]);
    let mut bridge = ServerBridge::restore(Box::new(store), Client::new()).await;
    assert!(!bridge.need_init());

    // The kiosk is deleted server-side mid-session: the mark conflicts,
    // the re-sync answers 409, and the kiosk resets itself.
    assignment_mock.delete();
    server.mock(|when, then| {
        when.method(GET).path("/assignment");
        then.status(409);
    });

    assert!(!bridge.mark_attendance("PASS-1").await.expect("mark"));
    assert!(bridge.need_init());
    assert_eq!(bridge.assignment(), None);

    // Re-enrollment works straight away on the wiped store.
    let enroll_mock = server.mock(|when, then| {
        when.method(POST).path("/enroll");
        then.status(200).body("TOK456");
    });
    assert!(
        bridge
            .enroll(&address, "9000", "Gate A")
            .await
            .expect("enroll")
    );
    assert!(!bridge.need_init());
    enroll_mock.assert();
}

#[tokio::test]
async fn passive_assignment_verifies_but_never_marks() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/assignment");
        then.status(200).body("Everything+!ALL!");
    });
    server.mock(|when, then| {
        when.method(GET).path("/verify").query_param("event", "!ALL!");
        then.status(200).body("ok");
    });

    let address = server.base_url();
    let store = MemoryStore::new();
    store.set(KEY_SERVER, &address).expect("seed");
    store.set(&address, "TOK123").expect("seed");
    store.set(KEY_KIOSK_NAME, "Lobby").expect("seed");

    let bridge = ServerBridge::restore(Box::new(store), Client::new()).await;
    let assignment = bridge.assignment().expect("assignment");
    assert!(assignment.is_passive());

    // Verification still succeeds against the passive assignment.
    let verification = bridge
        .verify("PASS-1")
        .await
        .expect("verify")
        .expect("verification");
    assert!(verification.allows_marking());

    // But the session never offers the mark control for it.
    let mut session = ScanSession::new();
    session.apply(&verification);
    assert!(!session.can_mark(bridge.assignment()));
}
