//! Typed records for kiosk identity, assignments, and verification results.
//!
//! The server speaks a deliberately plain contract: plain-text bodies with
//! positional separators rather than JSON. The parsing helpers here keep
//! that contract in one place so the bridge dispatch stays a pure state
//! machine.

use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;

/// Assignment id that marks a passive, verification-only assignment.
///
/// A kiosk holding this assignment may verify passes against every event
/// but must never offer attendance marking; the server enforces this by
/// answering any mark attempt with a 409 conflict.
pub const PASSIVE_ASSIGNMENT_ID: &str = "!ALL!";

/// Marker separating the headline from the detail in a rejection body.
const REASON_MARKER: &str = "REASON:";

/// Kiosk name used when the store holds credentials but no display name.
pub(crate) const DEFAULT_KIOSK_NAME: &str = "Unnamed";

/// Credentials identifying this kiosk to the ticketing server.
///
/// Exactly one identity exists per device; its presence is the sole source
/// of truth for the initialized state. It is created by enrollment,
/// restored from the secret store at startup, and destroyed atomically by
/// a credential reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KioskIdentity {
    /// Base address of the ticketing server, e.g. `http://10.0.0.2:5000`.
    pub server_address: String,
    /// Opaque token issued by the server during enrollment.
    pub kiosk_token: String,
    /// Human-readable kiosk name shown to operators.
    pub kiosk_name: String,
}

/// Tagged enrollment state of the bridge.
///
/// Keeping this explicit (instead of a separately tracked boolean) means
/// "needs enrollment" is always a derived read that cannot drift out of
/// sync with the credentials themselves.
#[derive(Debug, Clone)]
pub(crate) enum KioskState {
    /// No credentials held; enrollment is required.
    Uninitialized,
    /// Enrolled with a full credential triple.
    Initialized(KioskIdentity),
}

impl KioskState {
    pub(crate) const fn identity(&self) -> Option<&KioskIdentity> {
        match self {
            Self::Uninitialized => None,
            Self::Initialized(identity) => Some(identity),
        }
    }
}

/// Event assignment the kiosk is currently authorized to check against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Display name of the event.
    pub name: String,
    /// Server-side event identifier.
    pub id: String,
}

impl Assignment {
    /// Parse the `name+id` body returned by the assignment endpoint.
    ///
    /// Splits on the first `+` only; event names may not contain `+` but
    /// ids may. Returns `None` when the separator is absent, so a
    /// malformed body degrades to "no assignment" instead of a panic.
    #[must_use]
    pub fn parse(body: &str) -> Option<Self> {
        let (name, id) = body.split_once('+')?;
        Some(Self {
            name: name.to_string(),
            id: id.to_string(),
        })
    }

    /// Whether this is the passive, verification-only assignment.
    #[must_use]
    pub fn is_passive(&self) -> bool {
        self.id == PASSIVE_ASSIGNMENT_ID
    }
}

/// Holder details embedded in a scanned pass token.
///
/// Tokens carry three dot-separated segments; the middle one is
/// base64-encoded JSON describing the pass holder. The outer segments are
/// opaque to the kiosk and the whole token is sent to the server verbatim
/// for verification. Decoding here only feeds the operator display.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PassPayload {
    /// Server-side pass identifier.
    #[serde(rename = "_id")]
    pub id: u64,
    /// Holder display name.
    pub name: String,
    /// Holder phone number.
    pub phone: u64,
    /// Pass type; `!STAFF!` and `!ALL!` are special markers.
    #[serde(rename = "type")]
    pub pass_type: String,
}

impl PassPayload {
    /// Decode the holder details out of a scanned token.
    ///
    /// Returns `None` when the token does not have exactly three
    /// segments, or the middle segment is not base64, or the decoded
    /// bytes are not the expected JSON shape. The kiosk then simply has
    /// nothing to display about the holder; verification is unaffected.
    #[must_use]
    pub fn decode(token: &str) -> Option<Self> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return None;
        }

        // Issued tokens omit base64 padding; accept padded ones too.
        let claims = segments[1].trim_end_matches('=');
        let raw = general_purpose::STANDARD_NO_PAD.decode(claims).ok()?;
        serde_json::from_slice(&raw).ok()
    }

    /// Display label for the pass type.
    ///
    /// The special markers read as `STAFF` and `ALL`; any other type is
    /// shown verbatim.
    #[must_use]
    pub fn type_label(&self) -> &str {
        match self.pass_type.as_str() {
            "!STAFF!" => "STAFF",
            PASSIVE_ASSIGNMENT_ID => "ALL",
            other => other,
        }
    }
}

/// Outcome of verifying a single scanned pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// HTTP status returned by the verify endpoint.
    pub status: u16,
    /// Headline shown front and center to the operator.
    pub text: String,
    /// Secondary line; the rejection reason, or `STAFF` for staff passes.
    pub subtext: String,
}

impl Verification {
    /// Build the result for a 200 response.
    ///
    /// The body is only inspected for the staff marker; matching is
    /// case-insensitive since server variants disagree on casing.
    #[must_use]
    pub fn valid(body: &str) -> Self {
        let subtext = if body.to_ascii_lowercase().contains("staff") {
            "STAFF".to_string()
        } else {
            String::new()
        };

        Self {
            status: 200,
            text: "valid".to_string(),
            subtext,
        }
    }

    /// Build the result for a non-200 response.
    ///
    /// The body is upper-cased and split on the first `REASON:` marker;
    /// everything before it becomes the headline, everything after it the
    /// detail. Bodies without the marker produce an empty detail.
    #[must_use]
    pub fn rejected(status: u16, body: &str) -> Self {
        let upper = body.to_uppercase();
        let (text, subtext) = upper
            .split_once(REASON_MARKER)
            .map_or_else(|| (upper.clone(), ""), |(head, tail)| (head.to_string(), tail));

        Self {
            status,
            text,
            subtext: subtext.trim_start().to_string(),
        }
    }

    /// Whether this result represents a verified staff pass.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.status == 200 && self.subtext == "STAFF"
    }

    /// Whether the UI may offer the attendance-marking control.
    ///
    /// Only a plain valid pass qualifies; staff passes are acknowledged
    /// but never marked, and every rejection disables the control.
    #[must_use]
    pub fn allows_marking(&self) -> bool {
        self.status == 200 && !self.is_staff()
    }
}
