//! Error types for bridge operations.

use thiserror::Error;

/// Primary error type for bridge operations.
///
/// Expected server responses (including rejections such as 401 or 409) are
/// never surfaced through this type; they are folded into the return values
/// of the individual operations. An `Err` therefore always means the
/// operation could not be carried out at all, and the bridge state is
/// guaranteed to be unchanged.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The HTTP request never produced a server response (DNS failure,
    /// refused connection, timeout, or a broken body stream).
    #[error("request to the ticketing server failed")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Source transport error.
        source: reqwest::Error,
    },
    /// A secret-store operation failed.
    #[error("secret store operation failed")]
    Secrets {
        /// Operation identifier.
        operation: &'static str,
        /// Store-specific failure detail.
        detail: String,
    },
}

/// Convenience alias for bridge results.
pub type BridgeResult<T> = Result<T, BridgeError>;
