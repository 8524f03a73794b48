//! Deeplink construction and parsing
//!
//! The OS URL-scheme mechanism is the protocol's only transport. Outgoing
//! requests are `https` universal links on the wallet's host; responses
//! come back on the app's own custom scheme with the host (`connected`,
//! `signed`) naming the response type. Binary fields travel base58-encoded
//! in percent-encoded query parameters.

use std::collections::HashMap;

use url::Url;

use crate::crypto::{ExchangePublicKey, SealedEnvelope};
use crate::session::error::{SessionError, SessionResult};

/// Default universal-link base of the peer wallet
pub const DEFAULT_WALLET_BASE: &str = "https://phantom.app/ul/v1/";

/// The network the wallet should connect to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cluster {
    /// Solana mainnet-beta
    #[default]
    MainnetBeta,
    /// Solana testnet
    Testnet,
    /// Solana devnet
    Devnet,
}

impl Cluster {
    /// The cluster identifier as the wallet expects it on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Testnet => "testnet",
            Cluster::Devnet => "devnet",
        }
    }
}

impl std::fmt::Display for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static configuration for a wallet session
///
/// Captured once at session construction; everything here is public
/// information that appears in outgoing URLs.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Base universal link of the wallet (default [`DEFAULT_WALLET_BASE`])
    pub wallet_base: Url,
    /// The dapp's own URL, shown by the wallet during approval
    pub app_url: String,
    /// Base of the app's custom scheme, e.g. `mydapp://`; the response
    /// host (`connected`, `signed`) is appended to form redirect links
    pub redirect_base: String,
    /// Network identifier sent with connect requests
    pub cluster: Cluster,
}

impl LinkConfig {
    /// Create a configuration with the default wallet base and cluster
    pub fn new(app_url: impl Into<String>, redirect_base: impl Into<String>) -> Self {
        LinkConfig {
            wallet_base: Url::parse(DEFAULT_WALLET_BASE)
                .expect("default wallet base URL is valid"),
            app_url: app_url.into(),
            redirect_base: redirect_base.into(),
            cluster: Cluster::default(),
        }
    }

    /// Set the cluster
    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.cluster = cluster;
        self
    }

    /// Point at a different wallet base URL
    pub fn with_wallet_base(mut self, wallet_base: Url) -> Self {
        self.wallet_base = wallet_base;
        self
    }

    fn redirect_link(&self, destination: &str) -> String {
        format!("{}{destination}", self.redirect_base)
    }
}

/// The kind of outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Session-establishment handshake
    Connect,
    /// Encrypted message-signing request
    SignMessage,
}

impl RequestKind {
    fn path(&self) -> &'static str {
        match self {
            RequestKind::Connect => "connect",
            RequestKind::SignMessage => "signMessage",
        }
    }
}

/// A fully built request URL, ready to be opened by the OS
///
/// The core never opens URLs itself; the surrounding app hands this to the
/// platform's URL-open facility.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    kind: RequestKind,
    url: Url,
}

impl OutgoingRequest {
    /// The kind of request this URL carries
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// The URL to open
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Consume the request, yielding the URL
    pub fn into_url(self) -> Url {
        self.url
    }
}

impl std::fmt::Display for OutgoingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

fn wallet_url(config: &LinkConfig, kind: RequestKind) -> SessionResult<Url> {
    let mut url = config.wallet_base.clone();
    url.path_segments_mut()
        .map_err(|_| SessionError::UrlConstructionFailed)?
        .pop_if_empty()
        .push(kind.path());
    Ok(url)
}

/// Build the `/connect` request URL
pub(crate) fn build_connect_url(
    config: &LinkConfig,
    dapp_public: &ExchangePublicKey,
) -> SessionResult<OutgoingRequest> {
    let mut url = wallet_url(config, RequestKind::Connect)?;
    url.query_pairs_mut()
        .append_pair("app_url", &config.app_url)
        .append_pair("dapp_encryption_public_key", &dapp_public.to_base58())
        .append_pair("redirect_link", &config.redirect_link("connected"))
        .append_pair("cluster", config.cluster.as_str());

    Ok(OutgoingRequest {
        kind: RequestKind::Connect,
        url,
    })
}

/// Build the `/signMessage` request URL carrying a sealed payload
pub(crate) fn build_sign_url(
    config: &LinkConfig,
    dapp_public: &ExchangePublicKey,
    envelope: &SealedEnvelope,
) -> SessionResult<OutgoingRequest> {
    let mut url = wallet_url(config, RequestKind::SignMessage)?;
    url.query_pairs_mut()
        .append_pair("dapp_encryption_public_key", &dapp_public.to_base58())
        .append_pair("nonce", &crate::codec::encode(&envelope.nonce))
        .append_pair("redirect_link", &config.redirect_link("signed"))
        .append_pair("payload", &crate::codec::encode(&envelope.ciphertext));

    Ok(OutgoingRequest {
        kind: RequestKind::SignMessage,
        url,
    })
}

/// Parse a response URL's query parameters into a map
pub(crate) fn response_params(url: &str) -> SessionResult<HashMap<String, String>> {
    let url = Url::parse(url).map_err(|_| SessionError::MalformedResponse("unparseable URL"))?;
    Ok(url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}

/// Extract a peer rejection, if the response carries one
pub(crate) fn peer_rejection(params: &HashMap<String, String>) -> Option<SessionError> {
    params.get("errorCode").map(|code| SessionError::PeerRejected {
        code: code.clone(),
        message: params.get("errorMessage").cloned().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EphemeralKeypair;

    fn config() -> LinkConfig {
        LinkConfig::new("https://dapp.example", "mydapp://")
    }

    #[test]
    fn test_connect_url_shape() {
        let keypair = EphemeralKeypair::generate();
        let request = build_connect_url(&config(), keypair.public_key()).unwrap();

        assert_eq!(request.kind(), RequestKind::Connect);
        let url = request.url();
        assert_eq!(url.host_str(), Some("phantom.app"));
        assert_eq!(url.path(), "/ul/v1/connect");

        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["app_url"], "https://dapp.example");
        assert_eq!(
            params["dapp_encryption_public_key"],
            keypair.public_key().to_base58()
        );
        assert_eq!(params["redirect_link"], "mydapp://connected");
        assert_eq!(params["cluster"], "mainnet-beta");
    }

    #[test]
    fn test_connect_url_percent_encodes_values() {
        let keypair = EphemeralKeypair::generate();
        let request = build_connect_url(&config(), keypair.public_key()).unwrap();

        // ':' and '/' in the embedded URLs must not appear raw in the query
        let query = request.url().query().unwrap();
        assert!(query.contains("redirect_link=mydapp%3A%2F%2Fconnected"));
    }

    #[test]
    fn test_sign_url_shape() {
        let keypair = EphemeralKeypair::generate();
        let envelope = crate::crypto::SealedEnvelope {
            ciphertext: vec![1, 2, 3, 4],
            nonce: [5u8; crate::crypto::NONCE_SIZE],
        };
        let request = build_sign_url(&config(), keypair.public_key(), &envelope).unwrap();

        assert_eq!(request.kind(), RequestKind::SignMessage);
        assert_eq!(request.url().path(), "/ul/v1/signMessage");

        let params: HashMap<_, _> = request.url().query_pairs().into_owned().collect();
        assert_eq!(params["nonce"], crate::codec::encode(&envelope.nonce));
        assert_eq!(params["payload"], crate::codec::encode(&envelope.ciphertext));
        assert_eq!(params["redirect_link"], "mydapp://signed");
    }

    #[test]
    fn test_custom_wallet_base_without_trailing_slash() {
        let base = Url::parse("https://wallet.test/deeplink").unwrap();
        let cfg = config().with_wallet_base(base);
        let keypair = EphemeralKeypair::generate();

        let request = build_connect_url(&cfg, keypair.public_key()).unwrap();
        assert_eq!(request.url().path(), "/deeplink/connect");
    }

    #[test]
    fn test_cluster_override() {
        let cfg = config().with_cluster(Cluster::Devnet);
        let keypair = EphemeralKeypair::generate();

        let request = build_connect_url(&cfg, keypair.public_key()).unwrap();
        let params: HashMap<_, _> = request.url().query_pairs().into_owned().collect();
        assert_eq!(params["cluster"], "devnet");
    }

    #[test]
    fn test_response_params_custom_scheme() {
        let params = response_params("mydapp://connected?nonce=abc&data=def").unwrap();
        assert_eq!(params["nonce"], "abc");
        assert_eq!(params["data"], "def");
    }

    #[test]
    fn test_response_params_decodes_percent_encoding() {
        let params =
            response_params("mydapp://connected?errorMessage=User%20rejected").unwrap();
        assert_eq!(params["errorMessage"], "User rejected");
    }

    #[test]
    fn test_response_params_rejects_garbage() {
        assert_eq!(
            response_params("not a url").unwrap_err(),
            SessionError::MalformedResponse("unparseable URL")
        );
    }

    #[test]
    fn test_peer_rejection_extraction() {
        let params =
            response_params("mydapp://connected?errorCode=4001&errorMessage=User%20rejected")
                .unwrap();
        assert_eq!(
            peer_rejection(&params),
            Some(SessionError::PeerRejected {
                code: "4001".into(),
                message: "User rejected".into(),
            })
        );

        let clean = response_params("mydapp://connected?nonce=abc").unwrap();
        assert_eq!(peer_rejection(&clean), None);
    }
}
