//! NaCl-style authenticated encryption
//!
//! XSalsa20-Poly1305 in both flavors the protocol needs:
//! [`SealedBox`] for the handshake phase (asymmetric, keyed by an X25519
//! exchange) and [`Secretbox`] for the session phase (symmetric, keyed by
//! the derived [`SecretboxKey`]). The two are the same cipher underneath -
//! NaCl `box` is `secretbox` under the precomputed pairwise key.

use crypto_secretbox::aead::{Aead, KeyInit};
use crypto_secretbox::{Key, Nonce, XSalsa20Poly1305};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::error::{CryptoError, CryptoResult};
use crate::crypto::exchange::{EphemeralKeypair, ExchangePublicKey};

/// Size of a secretbox key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of a nonce in bytes
pub const NONCE_SIZE: usize = 24;

/// Size of the authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// A symmetric session key
///
/// Produced by [`SharedSecret::derive_secretbox_key`] after a successful
/// handshake. Zeroized on drop.
///
/// [`SharedSecret::derive_secretbox_key`]: crate::crypto::SharedSecret::derive_secretbox_key
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretboxKey([u8; KEY_SIZE]);

impl SecretboxKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(SecretboxKey(arr))
    }

    /// Get the raw bytes (be careful with this!)
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl From<[u8; KEY_SIZE]> for SecretboxKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        SecretboxKey(bytes)
    }
}

impl std::fmt::Debug for SecretboxKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretboxKey(..)")
    }
}

/// Ciphertext plus the nonce it was sealed under
///
/// The nonce is not secret and is transmitted alongside the ciphertext;
/// it must never be reused with the same key, so every seal generates a
/// fresh one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedEnvelope {
    /// The authenticated ciphertext (includes the Poly1305 tag)
    pub ciphertext: Vec<u8>,
    /// The single-use nonce
    pub nonce: [u8; NONCE_SIZE],
}

/// Symmetric authenticated encryption under a session key
pub struct Secretbox;

impl Secretbox {
    /// Encrypt under a fresh random nonce
    ///
    /// Returns the ciphertext together with the nonce it was sealed under.
    pub fn seal(key: &SecretboxKey, plaintext: &[u8]) -> SealedEnvelope {
        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);

        SealedEnvelope {
            ciphertext: Self::seal_with_nonce(key, &nonce, plaintext),
            nonce,
        }
    }

    /// Encrypt under a caller-supplied nonce
    ///
    /// WARNING: reusing a nonce with the same key is catastrophic. Only
    /// use this when the nonce comes from a source that guarantees
    /// uniqueness.
    pub fn seal_with_nonce(
        key: &SecretboxKey,
        nonce: &[u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> Vec<u8> {
        let cipher = XSalsa20Poly1305::new(Key::from_slice(&key.0));
        cipher
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .expect("encryption should never fail with valid inputs")
    }

    /// Decrypt and authenticate
    ///
    /// The nonce length is validated before any decryption is attempted.
    /// Fails closed: no partial plaintext is ever returned.
    pub fn open(key: &SecretboxKey, nonce: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        if nonce.len() != NONCE_SIZE {
            return Err(CryptoError::InvalidNonceLength {
                expected: NONCE_SIZE,
                actual: nonce.len(),
            });
        }

        let cipher = XSalsa20Poly1305::new(Key::from_slice(&key.0));
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::AuthenticationFailed)
    }
}

/// Asymmetric authenticated encryption between two exchange keypairs
///
/// The handshake response is sealed this way by the wallet. The app only
/// ever opens in production; sealing exists so both directions can be
/// exercised (and so tests can play the wallet side).
pub struct SealedBox;

impl SealedBox {
    /// Encrypt a message to `peer_public` from `own_keypair`
    pub fn seal(
        plaintext: &[u8],
        nonce: &[u8; NONCE_SIZE],
        peer_public: &ExchangePublicKey,
        own_keypair: &EphemeralKeypair,
    ) -> CryptoResult<Vec<u8>> {
        let key = own_keypair
            .diffie_hellman(peer_public)?
            .derive_secretbox_key();
        Ok(Secretbox::seal_with_nonce(&key, nonce, plaintext))
    }

    /// Decrypt and authenticate a message from `peer_public`
    pub fn open(
        ciphertext: &[u8],
        nonce: &[u8],
        peer_public: &ExchangePublicKey,
        own_keypair: &EphemeralKeypair,
    ) -> CryptoResult<Vec<u8>> {
        let key = own_keypair
            .diffie_hellman(peer_public)?
            .derive_secretbox_key();
        Secretbox::open(&key, nonce, ciphertext)
    }
}
