//! Cryptographic primitives for the wallet protocol
//!
//! This module provides all the cryptographic building blocks:
//! - `exchange`: X25519 ECDH for the ephemeral handshake
//! - `sealed`: XSalsa20-Poly1305 `box`/`secretbox` authenticated encryption
//! - `error`: the crypto error taxonomy
//!
//! Everything here is stateless - each call takes its inputs explicitly.
//! Session state (which key is live, which phase we are in) belongs to
//! [`crate::session`].

pub mod error;
pub mod exchange;
pub mod sealed;

// Re-export commonly used types
pub use error::{CryptoError, CryptoResult};
pub use exchange::{EphemeralKeypair, ExchangePublicKey, SharedSecret};
pub use sealed::{SealedBox, SealedEnvelope, Secretbox, SecretboxKey, NONCE_SIZE};

/// Generate cryptographically secure random bytes
pub fn random_bytes<const N: usize>() -> [u8; N] {
    use rand::RngCore;
    let mut bytes = [0u8; N];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}
