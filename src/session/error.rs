//! Session error taxonomy
//!
//! Every terminal outcome of the protocol is classified into one of these
//! values. Nothing is thrown across the session boundary uncaught: the
//! response handlers convert every parsing and crypto failure locally and
//! return it, leaving the session in a consistent state.

use thiserror::Error;

use crate::codec::CodecError;
use crate::crypto::CryptoError;

/// Errors that can occur while driving a wallet session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A base58 query parameter contained an invalid character
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The peer's public key was unusable for key agreement
    #[error("Key agreement with the wallet failed")]
    KeyAgreementFailed(#[source] CryptoError),

    /// A request URL could not be constructed from the configured fields
    ///
    /// Should not happen with well-formed configuration; surfaced as an
    /// error rather than a panic.
    #[error("Could not construct the request URL")]
    UrlConstructionFailed,

    /// The response URL was unparseable or missing a required parameter
    #[error("Malformed response: {0}")]
    MalformedResponse(&'static str),

    /// The decrypted payload was missing a required field
    #[error("Malformed payload: {0}")]
    MalformedPayload(&'static str),

    /// The wallet rejected the request
    ///
    /// Carries the peer's code and message verbatim for the UI to surface.
    #[error("Wallet rejected the request: {code} {message}")]
    PeerRejected {
        /// The peer's error code, verbatim
        code: String,
        /// The peer's error message, verbatim
        message: String,
    },

    /// The operation requires a connected session
    #[error("Not connected to the wallet")]
    NotConnected,

    /// The handshake response could not be decrypted
    ///
    /// Usually means the response was produced for a keypair that has
    /// since been discarded.
    #[error("Handshake failed")]
    HandshakeFailed,

    /// A session-phase response could not be decrypted
    #[error("Response decryption failed")]
    DecryptionFailed,
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
