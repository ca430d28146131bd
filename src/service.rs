//! # Identity/Credential Service
//!
//! Orchestrates the identity library ([`IdentityClient`]) and the device
//! [`Keychain`] to create a DID, issue and present verifiable credentials,
//! and writes results into the shared [`AppState`].
//!
//! Library failures are propagated to the caller unchanged and never retried.
//! Keychain reads that fail resolve to `None`.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use chrono::Utc;
use futures::future::{Aborted, abortable};
use serde_json::{Value, json};

use crate::config::Config;
use crate::credential::{VerifiableCredential, VerifiablePresentation};
use crate::crypto;
use crate::mapping::prepare_random_user;
use crate::model::{CredentialType, Identity, ModalType, QrLink};
use crate::provider::{Document, IdentityClient, Keychain, SigningMethod, UserDataSource};
use crate::schema::UserData;
use crate::state::AppState;

/// Keychain key the user's own identity is stored under.
pub const IDENTITY_KEY: &str = "did";

/// Fragment of the verification method used for signing.
const SIGNING_FRAGMENT: &str = "key";

/// Wallet operations over an identity library and a keychain.
#[derive(Debug)]
pub struct IdentityService<C, K> {
    client: C,
    keychain: K,
    state: Arc<AppState>,
    config: Config,
}

impl<C, K> IdentityService<C, K>
where
    C: IdentityClient,
    K: Keychain,
{
    /// Create a service writing into `state`.
    pub const fn new(client: C, keychain: K, state: Arc<AppState>, config: Config) -> Self {
        Self {
            client,
            keychain,
            state,
            config,
        }
    }

    /// The application state this service writes to.
    #[must_use]
    pub const fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    //--- Identity -------------------------------------------------------------

    /// Create and publish a new DID.
    ///
    /// # Errors
    ///
    /// Returns an error if initialization, key generation, signing or
    /// publishing fails.
    pub async fn create_identity(&self) -> anyhow::Result<Identity> {
        self.client
            .init(&self.config.network, self.config.permanode_url.as_deref())
            .await
            .with_context(|| format!("initializing identity library for {}", self.config.network))?;
        let key = self.client.generate_keypair().await.context("generating keypair")?;
        let document = self.client.create_document(&key).await.context("creating DID document")?;
        let document =
            self.client.sign_document(document, &key).await.context("signing DID document")?;
        let message_id = self.client.publish(&document).await.context("publishing DID document")?;
        tracing::debug!("published {} in message {message_id}", document.id);

        Ok(Identity {
            did: document.id,
            key,
        })
    }

    /// Save `identity` to the keychain under `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity cannot be serialized or written.
    pub async fn store_identity(&self, id: &str, identity: &Identity) -> anyhow::Result<bool> {
        let value = serde_json::to_string(identity).context("serializing identity")?;
        Ok(self.keychain.set(id, &value).await?)
    }

    /// Load the identity stored under `id` (usually [`IDENTITY_KEY`]).
    /// Resolves to `None` if it is missing or cannot be parsed.
    pub async fn retrieve_identity(&self, id: &str) -> Option<Identity> {
        self.retrieve(id).await
    }

    /// Log out: reset the onboarding flag, data version and credential table,
    /// and purge the keychain.
    ///
    /// Every step is attempted even if an earlier one fails, and completed
    /// steps are not rolled back.
    ///
    /// # Errors
    ///
    /// Returns the first failure after all steps have been attempted.
    pub async fn clear_identity(&self) -> anyhow::Result<()> {
        let mut failures = Vec::new();

        if let Err(e) = self.state.has_setup_account.set(false) {
            tracing::error!("unable to reset onboarding flag: {e}");
            failures.push(e);
        }
        if let Err(e) = self.state.data_version.set(None) {
            tracing::error!("unable to clear data version: {e}");
            failures.push(e);
        }
        self.state.reset_credentials();
        match self.keychain.clear().await {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!("keychain was not cleared");
                failures.push(anyhow!("keychain was not cleared"));
            }
            Err(e) => {
                tracing::error!("unable to clear keychain: {e}");
                failures.push(e.into());
            }
        }

        match failures.into_iter().next() {
            Some(e) => Err(e.context("clearing identity")),
            None => Ok(()),
        }
    }

    //--- Credentials ----------------------------------------------------------

    /// Issue a verifiable credential of type `schema_name` about `data`,
    /// signed by `issuer`. Resolves to the signed credential's JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the issuer cannot be resolved, signing fails or the
    /// signed credential does not verify.
    pub async fn create_credential(
        &self, issuer: &Identity, schema_name: &str, data: Value,
    ) -> anyhow::Result<Value> {
        let document = self.resolve(&issuer.did).await?;
        let unsigned = VerifiableCredential::new(
            &document.id,
            &issuer.did,
            schema_name,
            data,
            Utc::now(),
        )?;
        let unsigned = serde_json::to_value(unsigned).context("serializing credential")?;

        let signed = self
            .client
            .sign_credential(&document, unsigned, &signing_method(issuer))
            .await
            .context("signing credential")?;
        if !self.client.verify_credential(&signed).await.context("verifying credential")? {
            bail!("credential {schema_name} failed verification");
        }
        Ok(signed)
    }

    /// Bundle `credentials` (keyed by schema) into a presentation signed by
    /// `issuer`. Resolves to the signed presentation's JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no credentials, the issuer cannot be
    /// resolved, signing fails or the presentation does not verify.
    pub async fn create_verifiable_presentations(
        &self, issuer: &Identity, credentials: &BTreeMap<String, Value>,
    ) -> anyhow::Result<Value> {
        self.create_presentation(issuer, credentials, None).await
    }

    async fn create_presentation(
        &self, issuer: &Identity, credentials: &BTreeMap<String, Value>, challenge: Option<String>,
    ) -> anyhow::Result<Value> {
        let document = self.resolve(&issuer.did).await?;
        let unsigned = VerifiablePresentation::new(
            &document.id,
            credentials.values().cloned().collect(),
            challenge,
        )?;
        let unsigned = serde_json::to_value(unsigned).context("serializing presentation")?;

        let signed = self
            .client
            .sign_presentation(&document, unsigned, &signing_method(issuer))
            .await
            .context("signing presentation")?;
        if !self.client.verify_presentation(&signed).await.context("verifying presentation")? {
            bail!("presentation failed verification");
        }
        Ok(signed)
    }

    /// Save a credential to the keychain under `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential cannot be serialized or written.
    pub async fn store_credential(&self, id: &str, credential: &Value) -> anyhow::Result<bool> {
        let value = serde_json::to_string(credential).context("serializing credential")?;
        Ok(self.keychain.set(id, &value).await?)
    }

    /// Load the credential stored under `id`. Resolves to `None` if it is
    /// missing or cannot be parsed.
    pub async fn retrieve_credential(&self, id: &str) -> Option<Value> {
        self.retrieve(id).await
    }

    //--- Wallet flows ---------------------------------------------------------

    /// Self-issue a credential of `kind` with the stored identity, keep it in
    /// the keychain and show it in the credential table.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no stored identity or issuance fails.
    pub async fn issue_credential(
        &self, kind: CredentialType, data: Value,
    ) -> anyhow::Result<Value> {
        let Some(identity) = self.retrieve_identity(IDENTITY_KEY).await else {
            bail!("no identity to issue {kind} credential with");
        };
        let credential = self.create_credential(&identity, kind.as_str(), data).await?;
        self.store_credential(kind.as_str(), &credential).await?;
        self.state.set_credential(kind, credential.clone(), None, None);
        Ok(credential)
    }

    /// Parse a scanned QR link into state and open the matching modal: a
    /// link requesting credentials opens the share modal, one that requests
    /// nothing offers a credential and opens the accept modal.
    ///
    /// # Errors
    ///
    /// Returns an error if the link is not valid JSON of the expected shape.
    pub fn scan(&self, raw: &str) -> anyhow::Result<QrLink> {
        let link: QrLink = raw.parse().context("parsing QR link")?;
        let modal = if link.requested_credentials.is_empty() {
            ModalType::Accept
        } else {
            ModalType::Share
        };
        self.state.qr_link.set(Some(link.clone()));
        self.state.open_modal(modal, json!({ "shareWith": link.share_with }));
        Ok(link)
    }

    /// Present the credentials `link` asks for and encrypt the presentation
    /// with the link password, ready to send over the link's channel.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no identity, a requested credential is
    /// unknown or not held, or presentation or encryption fails.
    pub async fn share_credentials(&self, link: &QrLink) -> anyhow::Result<String> {
        let Some(identity) = self.retrieve_identity(IDENTITY_KEY).await else {
            bail!("no identity to share credentials with");
        };

        let mut credentials = BTreeMap::new();
        for name in &link.requested_credentials {
            let kind: CredentialType = name.parse()?;
            let credential = match self.retrieve_credential(kind.as_str()).await {
                Some(credential) => credential,
                None => self
                    .state
                    .credentials
                    .with(|table| table.get(kind).data.clone())
                    .ok_or_else(|| anyhow!("no {kind} credential to share"))?,
            };
            credentials.insert(kind.to_string(), credential);
        }

        let presentation =
            self.create_presentation(&identity, &credentials, Some(link.challenge.clone())).await?;
        Ok(crypto::encrypt(&link.password, &presentation.to_string())?)
    }

    /// Decrypt a credential received over `link`'s channel, verify it, keep it
    /// in the keychain and show it in the credential table. The credential's
    /// schema name must be a credential type.
    ///
    /// # Errors
    ///
    /// Returns an error if decryption, parsing or verification fails.
    pub async fn accept_credential(
        &self, link: &QrLink, payload: &str,
    ) -> anyhow::Result<CredentialType> {
        let plaintext = crypto::decrypt(&link.password, payload)?;
        let credential: Value = serde_json::from_str(&plaintext).context("parsing credential")?;
        let parsed: VerifiableCredential =
            serde_json::from_value(credential.clone()).context("reading credential")?;
        let Some(schema_name) = parsed.schema_name() else {
            bail!("credential has no schema type");
        };
        let kind: CredentialType = schema_name.parse()?;

        if !self.client.verify_credential(&credential).await.context("verifying credential")? {
            bail!("received {kind} credential failed verification");
        }
        self.store_credential(kind.as_str(), &credential).await?;
        self.state.set_credential(
            kind,
            credential,
            Some(link.channel_id.clone()),
            Some(link.password.clone()),
        );
        Ok(kind)
    }

    /// Fetch a demo user from the configured endpoint and reshape it into a
    /// government user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails, no user is returned, or the user
    /// is missing required fields.
    pub async fn load_demo_user(&self, source: &impl UserDataSource) -> anyhow::Result<UserData> {
        let response =
            source.fetch(&self.config.demo_data_url).await.context("fetching demo user")?;
        let Some(user) = response.results.first() else {
            bail!("demo user endpoint returned no users");
        };
        Ok(prepare_random_user(user)?)
    }

    //--- Task control ---------------------------------------------------------

    /// Wrap `operation` so it can be aborted with
    /// [`AppState::cancel_pending`], e.g. when the user navigates away.
    /// An aborted operation resolves to `Err(Aborted)`. The operation is
    /// unregistered once it completes or is dropped.
    pub fn cancellable<F: Future>(
        &self, operation: F,
    ) -> impl Future<Output = Result<F::Output, Aborted>> {
        let (task, handle) = abortable(operation);
        let guard = self.state.track(handle);
        async move {
            let _guard = guard;
            task.await
        }
    }

    /// Surface a failure through the error cell. Passes successes through.
    pub fn report<T>(&self, result: anyhow::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("{e:#}");
                self.state.error.set(e.to_string());
                None
            }
        }
    }

    //--- Helpers --------------------------------------------------------------

    async fn resolve(&self, did: &str) -> anyhow::Result<Document> {
        self.client.resolve(did).await.with_context(|| format!("resolving {did}"))
    }

    async fn retrieve<T: serde::de::DeserializeOwned>(&self, id: &str) -> Option<T> {
        let raw = match self.keychain.get(id).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("keychain miss for {id}: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("unable to parse keychain entry {id}: {e}");
                None
            }
        }
    }
}

fn signing_method(identity: &Identity) -> SigningMethod {
    SigningMethod {
        method: format!("{}#{SIGNING_FRAGMENT}", identity.did),
        public: identity.key.public.clone(),
        secret: identity.key.secret.clone(),
    }
}
