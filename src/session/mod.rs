//! Wallet session management
//!
//! This module owns the protocol state machine: it holds the ephemeral
//! keypair and the derived session key, builds outgoing request URLs,
//! parses incoming response URLs, and drives the
//! connect -> sign -> disconnect lifecycle.
//!
//! # State machine
//!
//! ```text
//! Disconnected ──begin_connect──▶ Connecting ──handle_connect_response──▶ Connected
//!      ▲                              │                                      │ ▲
//!      │◀──────── failure ────────────┘                                      │ │
//!      │                                         begin_sign ─────────────────┘ │
//!      │◀─── disconnect (any state) ──── Signing ──handle_sign_response────────┘
//! ```
//!
//! Every operation takes `&mut self`, so the borrow checker serializes
//! them; callers sharing a session across threads wrap it in a `Mutex`.
//! No operation blocks - the wait for the wallet's response URL belongs to
//! the surrounding app, which also enforces its own timeout policy by
//! calling [`Session::disconnect`].

mod deeplink;
mod error;
mod payload;

pub use deeplink::{Cluster, LinkConfig, OutgoingRequest, RequestKind, DEFAULT_WALLET_BASE};
pub use error::{SessionError, SessionResult};

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::codec;
use crate::crypto::{EphemeralKeypair, ExchangePublicKey, Secretbox, SecretboxKey};
use crate::session::payload::{ConnectPayload, SignMessagePayload, SignaturePayload};

/// Opaque session identifier issued by the wallet on a successful handshake
///
/// Echoed back on every signed request. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionToken(String);

impl SessionToken {
    /// The token as the wallet issued it
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionToken(..)")
    }
}

/// Where the session currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No key material held
    Disconnected,
    /// A connect request is out; waiting for the handshake response
    Connecting,
    /// Handshake complete; session key and token held
    Connected,
    /// A sign request is out; waiting for the signed response
    Signing,
}

/// A single wallet session
///
/// Explicitly constructed and owned by the caller - multiple sessions can
/// coexist (useful in tests); nothing here is process-global.
pub struct Session {
    config: LinkConfig,
    state: SessionState,
    keypair: Option<EphemeralKeypair>,
    session_key: Option<SecretboxKey>,
    session_token: Option<SessionToken>,
}

impl Session {
    /// Create a disconnected session with the given configuration
    pub fn new(config: LinkConfig) -> Self {
        Session {
            config,
            state: SessionState::Disconnected,
            keypair: None,
            session_key: None,
            session_token: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a handshake has completed and the session key is live
    pub fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Connected | SessionState::Signing)
    }

    /// The token issued by the wallet, if connected
    pub fn session_token(&self) -> Option<&SessionToken> {
        self.session_token.as_ref()
    }

    /// Start a new handshake
    ///
    /// Any existing session state is discarded first - only the most
    /// recent attempt's keys are ever valid, so a response to an older
    /// discarded keypair fails authentication instead of confusing the
    /// handshake. Returns the `/connect` URL for the OS to open.
    pub fn begin_connect(&mut self) -> SessionResult<OutgoingRequest> {
        self.reset();

        let keypair = EphemeralKeypair::generate();
        let request = deeplink::build_connect_url(&self.config, keypair.public_key())?;

        self.keypair = Some(keypair);
        self.state = SessionState::Connecting;
        tracing::debug!("wallet handshake initiated");
        Ok(request)
    }

    /// Complete the handshake from the wallet's response URL
    ///
    /// On success the session transitions to Connected and the wallet's
    /// address is returned. Every failure resets the session to
    /// Disconnected with all key material erased; a response arriving
    /// after [`Session::disconnect`] fails with
    /// [`SessionError::NotConnected`] before any decryption is attempted.
    pub fn handle_connect_response(&mut self, url: &str) -> SessionResult<String> {
        if self.keypair.is_none() {
            return Err(SessionError::NotConnected);
        }

        match self.connect_response_inner(url) {
            Ok(address) => {
                tracing::debug!("wallet session established");
                Ok(address)
            }
            Err(err) => {
                tracing::warn!(error = %err, "wallet handshake failed");
                self.reset();
                Err(err)
            }
        }
    }

    fn connect_response_inner(&mut self, url: &str) -> SessionResult<String> {
        let params = deeplink::response_params(url)?;
        if let Some(rejection) = deeplink::peer_rejection(&params) {
            return Err(rejection);
        }

        let wallet_key_b58 = params
            .get("phantom_encryption_public_key")
            .ok_or(SessionError::MalformedResponse("phantom_encryption_public_key"))?;
        let nonce_b58 = params
            .get("nonce")
            .ok_or(SessionError::MalformedResponse("nonce"))?;
        let data_b58 = params
            .get("data")
            .ok_or(SessionError::MalformedResponse("data"))?;

        let wallet_key_bytes = codec::decode(wallet_key_b58)?;
        let nonce = codec::decode(nonce_b58)?;
        let ciphertext = codec::decode(data_b58)?;

        let wallet_public = ExchangePublicKey::from_bytes(&wallet_key_bytes)
            .map_err(SessionError::KeyAgreementFailed)?;

        // The derived pairwise key both opens the handshake box and keys
        // the session phase; the raw shared point is never stored.
        let keypair = self.keypair.as_ref().ok_or(SessionError::NotConnected)?;
        let session_key = keypair
            .diffie_hellman(&wallet_public)
            .map_err(SessionError::KeyAgreementFailed)?
            .derive_secretbox_key();

        let plaintext = Secretbox::open(&session_key, &nonce, &ciphertext)
            .map_err(|_| SessionError::HandshakeFailed)?;

        let payload: ConnectPayload = serde_json::from_slice(&plaintext)
            .map_err(|_| SessionError::MalformedPayload("public_key and session required"))?;
        if payload.session.is_empty() {
            return Err(SessionError::MalformedPayload("session must be non-empty"));
        }

        self.session_key = Some(session_key);
        self.session_token = Some(SessionToken(payload.session));
        self.state = SessionState::Connected;
        Ok(payload.public_key)
    }

    /// Build an encrypted `/signMessage` request for a UTF-8 message
    ///
    /// Requires a connected session. The message is base58-encoded,
    /// wrapped with the session token, sealed under the session key and
    /// placed on the URL together with the fresh nonce.
    pub fn begin_sign(&mut self, message: &str) -> SessionResult<OutgoingRequest> {
        let (keypair, session_key, token) =
            match (&self.keypair, &self.session_key, &self.session_token) {
                (Some(keypair), Some(key), Some(token)) => (keypair, key, token),
                _ => return Err(SessionError::NotConnected),
            };

        let payload = SignMessagePayload {
            message: codec::encode(message.as_bytes()),
            session: token.as_str(),
            display: "utf8",
        };
        let plaintext =
            serde_json::to_vec(&payload).map_err(|_| SessionError::UrlConstructionFailed)?;
        let envelope = Secretbox::seal(session_key, &plaintext);

        let request = deeplink::build_sign_url(&self.config, keypair.public_key(), &envelope)?;
        self.state = SessionState::Signing;
        tracing::debug!("sign request prepared");
        Ok(request)
    }

    /// Decode the wallet's response to a sign request
    ///
    /// Returns the signature string on success. A signing failure never
    /// ends the session: `PeerRejected` and every other sign-phase error
    /// revert to Connected with the key material intact.
    pub fn handle_sign_response(&mut self, url: &str) -> SessionResult<String> {
        if self.session_key.is_none() {
            return Err(SessionError::NotConnected);
        }

        let result = self.sign_response_inner(url);
        self.state = SessionState::Connected;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "sign request failed");
        }
        result
    }

    fn sign_response_inner(&self, url: &str) -> SessionResult<String> {
        let params = deeplink::response_params(url)?;
        if let Some(rejection) = deeplink::peer_rejection(&params) {
            return Err(rejection);
        }

        let nonce_b58 = params
            .get("nonce")
            .ok_or(SessionError::MalformedResponse("nonce"))?;
        let data_b58 = params
            .get("data")
            .ok_or(SessionError::MalformedResponse("data"))?;

        let nonce = codec::decode(nonce_b58)?;
        let ciphertext = codec::decode(data_b58)?;

        let session_key = self.session_key.as_ref().ok_or(SessionError::NotConnected)?;
        let plaintext = Secretbox::open(session_key, &nonce, &ciphertext)
            .map_err(|_| SessionError::DecryptionFailed)?;

        let payload: SignaturePayload = serde_json::from_slice(&plaintext)
            .map_err(|_| SessionError::MalformedPayload("signature required"))?;
        Ok(payload.signature)
    }

    /// Tear down the session
    ///
    /// Erases the keypair, session key and token (zeroized on drop) and
    /// returns to Disconnected regardless of the current state.
    /// Idempotent; also the caller's cancellation lever - any in-flight
    /// handshake or sign request is aborted because the key material it
    /// would need no longer exists.
    pub fn disconnect(&mut self) {
        self.reset();
        tracing::debug!("wallet session disconnected");
    }

    fn reset(&mut self) {
        // Dropping the options zeroizes secrets (ZeroizeOnDrop)
        self.keypair = None;
        self.session_key = None;
        self.session_token = None;
        self.state = SessionState::Disconnected;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
