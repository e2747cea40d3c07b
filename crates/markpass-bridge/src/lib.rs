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

//! Kiosk-side bridge to the ticketing/attendance server.
//!
//! The bridge owns the kiosk identity (restored from the OS keyring),
//! tracks the current event assignment, and performs every outbound call
//! to the server: enrollment, assignment fetch, pass verification, and
//! attendance marking. Presentation layers consume its state read-only.
//!
//! Layout:
//! - `bridge.rs`: the `ServerBridge` state machine and status dispatch
//! - `model.rs`: typed identity/assignment/verification records and
//!   scanned-token payload decoding
//! - `secrets.rs`: the secret-store seam (keyring-backed and in-memory)
//! - `session.rs`: per-scan presentation state for the operator UI
//! - `error.rs`: bridge error taxonomy

pub mod bridge;
pub mod error;
pub mod model;
pub mod secrets;
pub mod session;

pub use bridge::ServerBridge;
pub use error::{BridgeError, BridgeResult};
pub use model::{Assignment, KioskIdentity, PASSIVE_ASSIGNMENT_ID, PassPayload, Verification};
pub use secrets::{KeyringStore, MemoryStore, SecretStore};
pub use session::{ScanSession, ScanVerdict};
