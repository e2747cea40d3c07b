//! Presentation state for a scanning session.
//!
//! The operator UI needs a small amount of mutable state per scan: the
//! camera-preview inversion toggle, a debounce on the last decoded payload
//! (cameras re-read the same code dozens of times per second), and the
//! verdict currently on screen. Each session owns its state outright so
//! independent kiosk instances and tests never share globals.

use crate::model::{Assignment, Verification};

/// Three-tier visual verdict shown after a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanVerdict {
    /// Pass verified; attendance marking may be offered.
    Valid,
    /// Verified staff pass; acknowledge and let through, never mark.
    Staff,
    /// Pass rejected or verification failed.
    Rejected {
        /// HTTP status behind the rejection.
        status: u16,
        /// Headline to display.
        text: String,
        /// Rejection reason, empty when the server gave none.
        subtext: String,
    },
}

/// Mutable per-session presentation state.
#[derive(Debug, Default)]
pub struct ScanSession {
    invert_colors: bool,
    last_payload: Option<String>,
    verdict: Option<ScanVerdict>,
}

impl ScanSession {
    /// Start a fresh session with nothing scanned.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            invert_colors: false,
            last_payload: None,
            verdict: None,
        }
    }

    /// Whether the camera preview should be color-inverted.
    #[must_use]
    pub const fn invert_colors(&self) -> bool {
        self.invert_colors
    }

    /// Flip the camera-preview inversion toggle.
    pub const fn toggle_invert(&mut self) {
        self.invert_colors = !self.invert_colors;
    }

    /// Verdict currently on screen, if any.
    #[must_use]
    pub const fn verdict(&self) -> Option<&ScanVerdict> {
        self.verdict.as_ref()
    }

    /// Record a decoded payload, debouncing consecutive re-reads.
    ///
    /// Returns `true` when the payload differs from the previous one and
    /// should be verified; `false` when it is the same code still in front
    /// of the camera.
    pub fn observe(&mut self, payload: &str) -> bool {
        if self.last_payload.as_deref() == Some(payload) {
            return false;
        }
        self.last_payload = Some(payload.to_string());
        true
    }

    /// Fold a verification result into the on-screen verdict.
    pub fn apply(&mut self, verification: &Verification) -> &ScanVerdict {
        let verdict = if verification.is_staff() {
            ScanVerdict::Staff
        } else if verification.allows_marking() {
            ScanVerdict::Valid
        } else {
            ScanVerdict::Rejected {
                status: verification.status,
                text: verification.text.clone(),
                subtext: verification.subtext.clone(),
            }
        };
        self.verdict.insert(verdict)
    }

    /// Whether the mark-attendance control may be enabled right now.
    ///
    /// Requires a `Valid` verdict on screen and a non-passive assignment;
    /// the server independently rejects marks against passive assignments,
    /// this merely keeps the affordance honest.
    #[must_use]
    pub fn can_mark(&self, assignment: Option<&Assignment>) -> bool {
        matches!(self.verdict, Some(ScanVerdict::Valid))
            && assignment.is_some_and(|assignment| !assignment.is_passive())
    }

    /// Clear the verdict and debounce state.
    ///
    /// Called when the assignment or identity changes so a stale verdict
    /// never gates actions against a different event.
    pub fn reset(&mut self) {
        self.last_payload = None;
        self.verdict = None;
    }
}
