//! Decrypted JSON wire payloads
//!
//! These are the plaintexts that travel inside the sealed envelopes. Field
//! names are fixed by the wallet's protocol and must not be renamed.

use serde::{Deserialize, Serialize};

/// Connect response plaintext: the wallet's address and the session token
#[derive(Deserialize)]
pub(crate) struct ConnectPayload {
    /// The wallet's address (base58)
    pub public_key: String,
    /// The opaque session token, echoed back on every signed request
    pub session: String,
}

/// Sign request plaintext sent to the wallet
#[derive(Serialize)]
pub(crate) struct SignMessagePayload<'a> {
    /// The message to sign, base58-encoded UTF-8
    pub message: String,
    /// The session token issued at connect time
    pub session: &'a str,
    /// How the wallet should render the message to the user
    pub display: &'static str,
}

/// Sign response plaintext: the signature over the requested message
#[derive(Deserialize)]
pub(crate) struct SignaturePayload {
    /// The signature (base58)
    pub signature: String,
}
