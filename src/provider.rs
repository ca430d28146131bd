//! # Provider
//!
//! Traits at the seams between the wallet core and the outside world. An
//! application supplies implementations backed by an identity library, a
//! device keychain and an HTTP client; tests supply mocks.
//!
//! All identity-library calls are asynchronous and may suspend on network
//! round-trips. Implementations report failures as `anyhow` errors, which the
//! [`IdentityService`](crate::service::IdentityService) propagates unchanged.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use crate::keychain::Keychain;
use crate::model::KeyPair;
use crate::schema::RandomUserResults;

/// A DID document as exchanged with the identity library.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Document {
    /// The DID the document describes.
    pub id: String,

    /// Remaining document properties (verification methods, proof, ...).
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl Document {
    /// Whether the document carries a proof.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.properties.contains_key("proof")
    }
}

/// Key material and verification method used to sign a credential or
/// presentation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SigningMethod {
    /// Verification method identifier (`<did>#<fragment>`).
    pub method: String,

    /// Encoded public key.
    pub public: String,

    /// Encoded secret key.
    pub secret: String,
}

/// The external identity library: DID creation, publishing, resolution,
/// signing and verification.
pub trait IdentityClient: Send + Sync {
    /// Initialize the library runtime and select `network`, resolving
    /// through `permanode` when one is configured.
    fn init(
        &self, network: &str, permanode: Option<&str>,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Generate a new keypair.
    fn generate_keypair(&self) -> impl Future<Output = anyhow::Result<KeyPair>> + Send;

    /// Build an unsigned DID document controlled by `key`.
    fn create_document(
        &self, key: &KeyPair,
    ) -> impl Future<Output = anyhow::Result<Document>> + Send;

    /// Self-sign `document` with `key`.
    fn sign_document(
        &self, document: Document, key: &KeyPair,
    ) -> impl Future<Output = anyhow::Result<Document>> + Send;

    /// Publish a signed document to the network. Resolves to the message id.
    fn publish(&self, document: &Document) -> impl Future<Output = anyhow::Result<String>> + Send;

    /// Resolve a DID to its current document.
    fn resolve(&self, did: &str) -> impl Future<Output = anyhow::Result<Document>> + Send;

    /// Sign an unsigned credential on behalf of `issuer`.
    fn sign_credential(
        &self, issuer: &Document, credential: Value, signer: &SigningMethod,
    ) -> impl Future<Output = anyhow::Result<Value>> + Send;

    /// Check a signed credential against the network.
    fn verify_credential(
        &self, credential: &Value,
    ) -> impl Future<Output = anyhow::Result<bool>> + Send;

    /// Sign an unsigned presentation on behalf of `holder`.
    fn sign_presentation(
        &self, holder: &Document, presentation: Value, signer: &SigningMethod,
    ) -> impl Future<Output = anyhow::Result<Value>> + Send;

    /// Check a signed presentation against the network.
    fn verify_presentation(
        &self, presentation: &Value,
    ) -> impl Future<Output = anyhow::Result<bool>> + Send;
}

/// Source of demo user data.
pub trait UserDataSource: Send + Sync {
    /// Fetch `{results: [...]}` from `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = anyhow::Result<RandomUserResults>> + Send;
}
