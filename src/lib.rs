//! # Phantom-Link
//!
//! Encrypted deeplink sessions with the Phantom wallet.
//!
//! A mobile dapp cannot call the wallet app directly; the OS URL-scheme
//! mechanism is the only transport. This crate implements the secure
//! session protocol that rides on it:
//!
//! - **Ephemeral X25519 handshake** with a fresh keypair per attempt
//! - **NaCl `box`/`secretbox` encryption** of every request and response
//! - **Base58 wire format** for all binary query parameters
//! - **A strict session state machine** with a closed error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use phantom_link::{LinkConfig, Session, SessionError};
//!
//! # fn main() -> Result<(), SessionError> {
//! let mut session = Session::new(LinkConfig::new("https://mydapp.example", "mydapp://"));
//!
//! // Hand this URL to the OS; the wallet app opens and asks the user
//! let request = session.begin_connect()?;
//! println!("open: {}", request.url());
//!
//! // Later the OS delivers the wallet's response URL back to the app
//! let address = session.handle_connect_response("mydapp://connected?...")?;
//! println!("connected to {address}");
//!
//! // Request a signature over a message
//! let request = session.begin_sign("hello wallet")?;
//! println!("open: {}", request.url());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            SURROUNDING APP (not here)       │
//! │   UI | URL dispatch | timeouts | storage    │
//! └─────────────────────┬───────────────────────┘
//!                       │ URLs in / URLs out
//! ┌─────────────────────▼───────────────────────┐
//! │              SESSION LAYER                  │
//! │  State machine | deeplinks | payloads       │
//! └─────────────────────┬───────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────┐
//! │               CRYPTO LAYER                  │
//! │  X25519 | HSalsa20 | XSalsa20-Poly1305      │
//! └─────────────────────┬───────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────┐
//! │                  CODEC                      │
//! │              base58 encode/decode           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The session's entry points are synchronous: they fire a request URL
//! and return. The matching response arrives later as an independent
//! call, delivered by the surrounding app's URL handler.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod crypto;
pub mod session;

// Re-export main types at crate root
pub use codec::CodecError;
pub use crypto::{CryptoError, CryptoResult};
pub use session::{
    Cluster, LinkConfig, OutgoingRequest, RequestKind, Session, SessionError, SessionResult,
    SessionState, SessionToken,
};
