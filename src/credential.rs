//! Unsigned W3C verifiable credentials and presentations.
//!
//! The wallet assembles credential and presentation bodies itself; proofs are
//! added by the [`IdentityClient`](crate::provider::IdentityClient).

use anyhow::bail;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Base context of the VC data model.
pub const CREDENTIALS_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

const CREDENTIAL_TYPE: &str = "VerifiableCredential";
const PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// A verifiable credential body.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    /// JSON-LD context.
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// Credential identifier.
    pub id: String,

    /// Credential types, `VerifiableCredential` first.
    #[serde(rename = "type")]
    pub types: Vec<String>,

    /// Issuer DID.
    pub issuer: String,

    /// Issuance time, RFC 3339.
    pub issuance_date: String,

    /// Claims about the subject. Always an object carrying the subject `id`.
    pub credential_subject: Value,

    /// Proof added on signing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Value>,
}

impl VerifiableCredential {
    /// Build an unsigned credential of type `schema_name` issued by `issuer`
    /// about `subject_did`. An `id` already present in `claims` is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if `claims` is not a JSON object.
    pub fn new(
        issuer: &str, subject_did: &str, schema_name: &str, claims: Value,
        issued_at: DateTime<Utc>,
    ) -> anyhow::Result<Self> {
        let Value::Object(mut subject) = claims else {
            bail!("credential subject must be a JSON object");
        };
        subject.entry("id").or_insert_with(|| Value::String(subject_did.into()));

        Ok(Self {
            context: vec![CREDENTIALS_CONTEXT.into()],
            id: format!("urn:uuid:{}", uuid::Uuid::new_v4()),
            types: vec![CREDENTIAL_TYPE.into(), schema_name.into()],
            issuer: issuer.into(),
            issuance_date: issued_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            credential_subject: Value::Object(subject),
            proof: None,
        })
    }

    /// The schema name (second type entry), if any.
    #[must_use]
    pub fn schema_name(&self) -> Option<&str> {
        self.types.get(1).map(String::as_str)
    }
}

/// A verifiable presentation body.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifiablePresentation {
    /// JSON-LD context.
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// Presentation identifier.
    pub id: String,

    /// Presentation types.
    #[serde(rename = "type")]
    pub types: Vec<String>,

    /// Holder DID.
    pub holder: String,

    /// Bundled signed credentials.
    pub verifiable_credential: Vec<Value>,

    /// Challenge from the verifier, if one was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,

    /// Proof added on signing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Value>,
}

impl VerifiablePresentation {
    /// Build an unsigned presentation of `credentials` held by `holder`.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no credentials to present.
    pub fn new(
        holder: &str, credentials: Vec<Value>, challenge: Option<String>,
    ) -> anyhow::Result<Self> {
        if credentials.is_empty() {
            bail!("a presentation needs at least one credential");
        }
        Ok(Self {
            context: vec![CREDENTIALS_CONTEXT.into()],
            id: format!("urn:uuid:{}", uuid::Uuid::new_v4()),
            types: vec![PRESENTATION_TYPE.into()],
            holder: holder.into(),
            verifiable_credential: credentials,
            challenge,
            proof: None,
        })
    }
}
