//! X25519 Key Exchange
//!
//! Provides Elliptic Curve Diffie-Hellman (ECDH) key exchange for
//! establishing a shared secret with the wallet. Every connection attempt
//! uses a fresh ephemeral keypair; the secret half never leaves process
//! memory and is zeroized on drop.

use rand::rngs::OsRng;
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};
use zeroize::ZeroizeOnDrop;

use crate::codec;
use crate::crypto::error::{CryptoError, CryptoResult};
use crate::crypto::sealed::SecretboxKey;

/// Size of a public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of a shared secret in bytes
pub const SHARED_SECRET_SIZE: usize = 32;

/// A public key for key exchange (X25519)
///
/// Per curve convention any 32-byte string is accepted as a public key;
/// degenerate points are caught at agreement time instead.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ExchangePublicKey(pub [u8; PUBLIC_KEY_SIZE]);

impl ExchangePublicKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; PUBLIC_KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(ExchangePublicKey(arr))
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// Convert to base58 (the protocol's wire encoding)
    pub fn to_base58(&self) -> String {
        codec::encode(&self.0)
    }

    /// Create from a base58 string
    pub fn from_base58(s: &str) -> CryptoResult<Self> {
        let bytes = codec::decode(s).map_err(|_| CryptoError::KeyAgreementFailed)?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for ExchangePublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExchangePublicKey({}...)", &self.to_base58()[..8])
    }
}

impl std::fmt::Display for ExchangePublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl serde::Serialize for ExchangePublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> serde::Deserialize<'de> for ExchangePublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_base58(&s).map_err(serde::de::Error::custom)
    }
}

/// Shared secret derived from key exchange
///
/// This is the raw X25519 shared point. It is never used directly as an
/// encryption key; [`SharedSecret::derive_secretbox_key`] produces the
/// pairwise key both sides actually encrypt under.
#[derive(ZeroizeOnDrop)]
pub struct SharedSecret {
    secret: [u8; SHARED_SECRET_SIZE],
}

impl SharedSecret {
    /// Get the raw bytes (be careful with this!)
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        &self.secret
    }

    /// Derive the pairwise secretbox key from this shared secret
    ///
    /// HSalsa20 of the raw point with a zero block - NaCl's
    /// `crypto_box_beforenm`. The wallet computes the identical key with
    /// `nacl.box.before`, so this one derivation serves both the handshake
    /// `box` and all later `secretbox` traffic.
    pub fn derive_secretbox_key(&self) -> SecretboxKey {
        use crypto_secretbox::aead::generic_array::GenericArray;
        use salsa20::cipher::consts::U10;

        let key = salsa20::hsalsa::<U10>(
            GenericArray::from_slice(&self.secret),
            &GenericArray::default(),
        );
        let mut key_bytes = [0u8; 32];
        key_bytes.copy_from_slice(&key);
        SecretboxKey::from(key_bytes)
    }
}

/// An ephemeral keypair for key exchange
///
/// Generated fresh for every connection attempt and discarded on
/// disconnect (forward secrecy).
#[derive(ZeroizeOnDrop)]
pub struct EphemeralKeypair {
    #[zeroize(skip)]
    public_key: ExchangePublicKey,
    secret_key: [u8; 32],
}

impl EphemeralKeypair {
    /// Generate a new ephemeral keypair
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519Public::from(&secret);

        EphemeralKeypair {
            public_key: ExchangePublicKey(public.to_bytes()),
            secret_key: secret.to_bytes(),
        }
    }

    /// Get the public key to share with the wallet
    pub fn public_key(&self) -> &ExchangePublicKey {
        &self.public_key
    }

    /// Compute the shared secret with a peer's public key
    ///
    /// Fails with [`CryptoError::KeyAgreementFailed`] if the exchange is
    /// non-contributory (the peer supplied a degenerate point).
    pub fn diffie_hellman(&self, peer_public: &ExchangePublicKey) -> CryptoResult<SharedSecret> {
        let secret = StaticSecret::from(self.secret_key);
        let peer = X25519Public::from(peer_public.0);
        let shared = secret.diffie_hellman(&peer);

        if !shared.was_contributory() {
            return Err(CryptoError::KeyAgreementFailed);
        }

        Ok(SharedSecret {
            secret: shared.to_bytes(),
        })
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedSecret(..)")
    }
}

impl std::fmt::Debug for EphemeralKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EphemeralKeypair({}...)", &self.public_key.to_base58()[..8])
    }
}
