//! The server bridge: kiosk identity, assignment state, and every
//! outbound call to the ticketing server.
//!
//! The server's contract is status-code driven: bodies are plain text and
//! the status decides the state transition. Credential-invalidating
//! statuses (401/404/409 on the assignment fetch) tear down local
//! credentials autonomously; the kiosk never disagrees with the server
//! about its own identity validity. Transport failures are the opposite:
//! they surface as [`BridgeError::Transport`] and never mutate state.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{BridgeError, BridgeResult};
use crate::model::{Assignment, DEFAULT_KIOSK_NAME, KioskIdentity, KioskState, Verification};
use crate::secrets::{KEY_KIOSK_NAME, KEY_SERVER, SecretStore};

#[derive(Serialize)]
struct EnrollRequest<'a> {
    code: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct MarkRequest<'a> {
    #[serde(rename = "kioskToken")]
    kiosk_token: &'a str,
    event: &'a str,
    token: &'a str,
}

/// Client-side session and enrollment state machine.
///
/// Construction restores the identity triple from the secret store; from
/// then on the bridge is driven by blocking (awaited) calls, one logical
/// session at a time. Callers must serialize operations themselves; the
/// bridge provides no internal locking or timers. Polling for an
/// assignment is the caller's loop.
pub struct ServerBridge {
    store: Box<dyn SecretStore>,
    client: Client,
    state: KioskState,
    assignment: Option<Assignment>,
}

impl ServerBridge {
    /// Restore a bridge from the secret store.
    ///
    /// A full credential triple (address, address-keyed token, name) makes
    /// the bridge initialized and immediately attempts an assignment
    /// fetch; a fetch failure is logged and swallowed so construction
    /// itself never fails. A partial triple (address without token) is
    /// treated as corrupt and proactively deleted; a store read error is
    /// not, and leaves every entry in place.
    pub async fn restore(store: Box<dyn SecretStore>, client: Client) -> Self {
        let state = Self::restore_identity(store.as_ref());
        let mut bridge = Self {
            store,
            client,
            state,
            assignment: None,
        };

        if !bridge.need_init() {
            if let Err(err) = bridge.get_assignment().await {
                warn!(error = %err, "assignment fetch during restore failed");
            }
        }

        bridge
    }

    fn restore_identity(store: &dyn SecretStore) -> KioskState {
        let address = match store.get(KEY_SERVER) {
            Ok(address) => address,
            Err(err) => {
                warn!(error = %err, "secret store unreadable; starting uninitialized");
                return KioskState::Uninitialized;
            }
        };

        let Some(address) = address else {
            return KioskState::Uninitialized;
        };

        let token = match store.get(&address) {
            Ok(token) => token,
            Err(err) => {
                // Unreadable is not missing: the entries may be fine, so
                // leave them in place and just start uninitialized.
                warn!(error = %err, "token entry unreadable; starting uninitialized");
                return KioskState::Uninitialized;
            }
        };
        let Some(token) = token else {
            // Partial state: the store may have been wiped mid-write or
            // edited out of band. Remove the leftovers and re-enroll.
            warn!("stored server address has no matching token; clearing partial state");
            for key in [KEY_SERVER, KEY_KIOSK_NAME] {
                if let Err(err) = store.delete(key) {
                    warn!(key, error = %err, "failed to delete stale entry");
                }
            }
            return KioskState::Uninitialized;
        };

        let name = store
            .get(KEY_KIOSK_NAME)
            .ok()
            .flatten()
            .unwrap_or_else(|| DEFAULT_KIOSK_NAME.to_string());

        debug!(kiosk = %name, "restored kiosk identity");
        KioskState::Initialized(KioskIdentity {
            server_address: address,
            kiosk_token: token,
            kiosk_name: name,
        })
    }

    /// Whether enrollment is required before passes can be scanned.
    #[must_use]
    pub const fn need_init(&self) -> bool {
        self.state.identity().is_none()
    }

    /// Credentials currently held, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&KioskIdentity> {
        self.state.identity()
    }

    /// Assignment currently held, if any.
    #[must_use]
    pub const fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    /// Human-readable kiosk name, when enrolled.
    #[must_use]
    pub fn kiosk_name(&self) -> Option<&str> {
        self.identity().map(|identity| identity.kiosk_name.as_str())
    }

    /// Delete all stored credentials and reset to the uninitialized state.
    ///
    /// Idempotent and never fails visibly: the store may already be
    /// cleared, so deletion errors are logged and swallowed. The held
    /// assignment is always cleared in the same step.
    pub fn clear_creds(&mut self) {
        let Some(identity) = self.state.identity() else {
            return;
        };
        let address = identity.server_address.clone();

        for key in [address.as_str(), KEY_SERVER, KEY_KIOSK_NAME] {
            if let Err(err) = self.store.delete(key) {
                warn!(key, error = %err, "failed to delete credential entry");
            }
        }

        self.state = KioskState::Uninitialized;
        self.assignment = None;
        debug!("credentials cleared; enrollment required");
    }

    /// Exchange a human-entered code for a durable kiosk token.
    ///
    /// When already enrolled the existing credentials are cleared first so
    /// re-enrollment is always possible. On a 200 the response body is the
    /// verbatim token; it is persisted together with the address and name,
    /// and the bridge becomes initialized. Any other status leaves the
    /// bridge uninitialized and returns `false`.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Transport`] when the server is unreachable;
    /// [`BridgeError::Secrets`] when the token cannot be persisted (the
    /// bridge then stays uninitialized rather than holding credentials it
    /// cannot restore later).
    pub async fn enroll(&mut self, address: &str, code: &str, name: &str) -> BridgeResult<bool> {
        if !self.need_init() {
            debug!("re-enrolling; clearing existing credentials first");
            self.clear_creds();
        }

        let response = self
            .client
            .post(format!("{address}/enroll"))
            .json(&EnrollRequest { code, name })
            .send()
            .await
            .map_err(|source| BridgeError::Transport {
                operation: "enroll",
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(status = status.as_u16(), "enrollment rejected");
            return Ok(false);
        }

        let token = response
            .text()
            .await
            .map_err(|source| BridgeError::Transport {
                operation: "enroll",
                source,
            })?;

        self.store.set(KEY_SERVER, address)?;
        self.store.set(address, &token)?;
        self.store.set(KEY_KIOSK_NAME, name)?;

        self.state = KioskState::Initialized(KioskIdentity {
            server_address: address.to_string(),
            kiosk_token: token,
            kiosk_name: name.to_string(),
        });
        debug!(kiosk = name, "enrollment complete");
        Ok(true)
    }

    /// Fetch the current assignment from the server.
    ///
    /// This is the recovery primitive: a 401, 404, or 409 here means the
    /// server no longer recognizes this kiosk, and all local credentials
    /// are torn down so the operator lands back at enrollment. A 204
    /// clears the assignment only. Statuses outside the contract change
    /// nothing and return `false`, as does a body missing the `+`
    /// separator.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Transport`] when the server is unreachable; identity
    /// and assignment are left untouched in that case.
    pub async fn get_assignment(&mut self) -> BridgeResult<bool> {
        let Some(identity) = self.state.identity() else {
            return Ok(false);
        };
        let url = format!("{}/assignment", identity.server_address);
        let token = identity.kiosk_token.clone();

        let response = self
            .client
            .get(url)
            .query(&[("kioskToken", token.as_str())])
            .send()
            .await
            .map_err(|source| BridgeError::Transport {
                operation: "get_assignment",
                source,
            })?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let body = response
                    .text()
                    .await
                    .map_err(|source| BridgeError::Transport {
                        operation: "get_assignment",
                        source,
                    })?;

                let Some(assignment) = Assignment::parse(&body) else {
                    warn!("assignment body missing separator; treating as no assignment");
                    self.assignment = None;
                    return Ok(false);
                };
                debug!(event = %assignment.id, name = %assignment.name, "assignment updated");
                self.assignment = Some(assignment);
                Ok(true)
            }
            StatusCode::NO_CONTENT => {
                self.assignment = None;
                Ok(false)
            }
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND | StatusCode::CONFLICT => {
                warn!(
                    status = status.as_u16(),
                    "server rejected kiosk credentials; resetting"
                );
                self.assignment = None;
                self.clear_creds();
                Ok(false)
            }
            other => {
                warn!(status = other.as_u16(), "assignment status outside contract");
                Ok(false)
            }
        }
    }

    /// Verify a scanned pass token against the current assignment.
    ///
    /// Returns `None` without touching the network when no assignment is
    /// held; the kiosk cannot verify without knowing which event to check
    /// against. A 200 yields a valid (or staff) result; any other status
    /// yields a rejection carrying the upper-cased body split on the
    /// `REASON:` marker.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Transport`] when the server is unreachable.
    pub async fn verify(&self, token: &str) -> BridgeResult<Option<Verification>> {
        let Some(assignment) = self.assignment.as_ref() else {
            return Ok(None);
        };
        let Some(identity) = self.state.identity() else {
            return Ok(None);
        };

        let response = self
            .client
            .get(format!("{}/verify", identity.server_address))
            .query(&[("token", token), ("event", assignment.id.as_str())])
            .send()
            .await
            .map_err(|source| BridgeError::Transport {
                operation: "verify",
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| BridgeError::Transport {
                operation: "verify",
                source,
            })?;

        let verification = if status == StatusCode::OK {
            Verification::valid(&body)
        } else {
            Verification::rejected(status.as_u16(), &body)
        };
        debug!(
            status = verification.status,
            staff = verification.is_staff(),
            "pass verified"
        );
        Ok(Some(verification))
    }

    /// Mark attendance for a verified pass token.
    ///
    /// A 409 conflict signals the assignment changed server-side (revoked
    /// mid-session, or a mark against the passive assignment); the bridge
    /// re-fetches the assignment (which may itself tear down credentials)
    /// and reports `false` regardless of what the refetch yields. The
    /// refetch's own transport failure is logged and swallowed because
    /// this call's contract is to answer `false` for any unmarked pass.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Transport`] when the mark request itself cannot
    /// reach the server.
    pub async fn mark_attendance(&mut self, token: &str) -> BridgeResult<bool> {
        let Some(assignment) = self.assignment.as_ref() else {
            return Ok(false);
        };
        let Some(identity) = self.state.identity() else {
            return Ok(false);
        };

        let request = MarkRequest {
            kiosk_token: &identity.kiosk_token,
            event: &assignment.id,
            token,
        };
        let response = self
            .client
            .put(format!("{}/mark", identity.server_address))
            .json(&request)
            .send()
            .await
            .map_err(|source| BridgeError::Transport {
                operation: "mark_attendance",
                source,
            })?;

        match response.status() {
            StatusCode::OK => {
                debug!("attendance marked");
                Ok(true)
            }
            StatusCode::CONFLICT => {
                warn!("mark conflict; re-syncing assignment");
                if let Err(err) = self.get_assignment().await {
                    warn!(error = %err, "assignment re-sync failed");
                }
                Ok(false)
            }
            other => {
                debug!(status = other.as_u16(), "mark rejected");
                Ok(false)
            }
        }
    }
}
