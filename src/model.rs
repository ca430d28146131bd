//! Data model shared by the application state and the identity service.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key material held by a DID controller.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct KeyPair {
    /// Encoded public key.
    pub public: String,

    /// Encoded secret key.
    pub secret: String,

    /// Key type, e.g. `ed25519`.
    #[serde(rename = "type")]
    pub key_type: String,
}

/// A user's decentralized identifier together with its controlling key.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Identity {
    /// The DID string.
    pub did: String,

    /// Controlling key material.
    pub key: KeyPair,
}

/// The fixed set of credential kinds the wallet displays.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CredentialType {
    /// Personal identity data.
    Personal,
    /// Health test result.
    Immunity,
    /// Visa application.
    Visa,
    /// Registered company.
    Company,
    /// Bank account.
    Bank,
    /// Insurance policy.
    Insurance,
    /// Commitments for the future.
    FutureCommitment,
    /// Commitments already in effect.
    PresentCommitment,
}

impl CredentialType {
    /// Every credential kind, in table order.
    pub const ALL: [Self; 8] = [
        Self::Personal,
        Self::Immunity,
        Self::Visa,
        Self::Company,
        Self::Bank,
        Self::Insurance,
        Self::FutureCommitment,
        Self::PresentCommitment,
    ];

    /// Wire name of the credential kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Immunity => "immunity",
            Self::Visa => "visa",
            Self::Company => "company",
            Self::Bank => "bank",
            Self::Insurance => "insurance",
            Self::FutureCommitment => "futureCommitment",
            Self::PresentCommitment => "presentCommitment",
        }
    }

    const fn heading(self) -> (&'static str, &'static str) {
        match self {
            Self::Personal => ("Personal information", "Government ID"),
            Self::Immunity => ("Health certificate", "Test result"),
            Self::Visa => ("Visa", "Immigration office"),
            Self::Company => ("Company", "Company registry"),
            Self::Bank => ("Bank account", "Bank"),
            Self::Insurance => ("Insurance", "Insurance provider"),
            Self::FutureCommitment => ("Future commitments", "Commitment registry"),
            Self::PresentCommitment => ("Present commitments", "Commitment registry"),
        }
    }
}

impl Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| anyhow!("unknown credential type: {s}"))
    }
}

/// Display information and (once issued) data for one credential kind.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialEntry {
    /// Card heading.
    pub heading: String,

    /// Card subheading.
    pub subheading: String,

    /// Credential data, `None` until a credential exchange succeeds.
    pub data: Option<Value>,

    /// Channel the credential was received over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,

    /// Password of the channel the credential was received over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

static EMPTY_ENTRY: CredentialEntry = CredentialEntry {
    heading: String::new(),
    subheading: String::new(),
    data: None,
    channel_id: None,
    password: None,
};

/// Credential entries keyed by credential kind.
///
/// The table always holds exactly one entry per [`CredentialType`]; entries
/// can be modified but not added or removed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(from = "BTreeMap<CredentialType, CredentialEntry>")]
pub struct CredentialTable(BTreeMap<CredentialType, CredentialEntry>);

impl Default for CredentialTable {
    fn default() -> Self {
        let entries = CredentialType::ALL
            .into_iter()
            .map(|kind| {
                let (heading, subheading) = kind.heading();
                let entry = CredentialEntry {
                    heading: heading.into(),
                    subheading: subheading.into(),
                    ..CredentialEntry::default()
                };
                (kind, entry)
            })
            .collect();
        Self(entries)
    }
}

impl From<BTreeMap<CredentialType, CredentialEntry>> for CredentialTable {
    fn from(entries: BTreeMap<CredentialType, CredentialEntry>) -> Self {
        let mut table = Self::default();
        table.0.extend(entries);
        table
    }
}

impl CredentialTable {
    /// Entry for `kind`.
    ///
    /// Every kind is present once the table is built, so this is always the
    /// table's own entry. A table missing `kind` yields an empty entry.
    #[must_use]
    pub fn get(&self, kind: CredentialType) -> &CredentialEntry {
        self.0.get(&kind).unwrap_or(&EMPTY_ENTRY)
    }

    /// Mutable entry for `kind`.
    pub fn get_mut(&mut self, kind: CredentialType) -> &mut CredentialEntry {
        self.0.entry(kind).or_default()
    }

    /// Iterate over entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (CredentialType, &CredentialEntry)> {
        self.0.iter().map(|(kind, entry)| (*kind, entry))
    }

    /// Kinds with populated data.
    #[must_use]
    pub fn issued(&self) -> Vec<CredentialType> {
        self.iter().filter(|(_, entry)| entry.data.is_some()).map(|(kind, _)| kind).collect()
    }
}

/// Party a QR link asks the holder to share credentials with.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShareWith {
    /// Public health authority.
    HealthAuthority,
    /// Prospective employer.
    Employer,
    /// Government agency.
    Agency,
    /// Company registry.
    CompanyHouse,
    /// Bank.
    Bank,
    /// Insurance provider.
    Insurance,
}

/// Payload scanned from a QR code to start a share or accept handshake.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QrLink {
    /// Identifier of the real-time channel.
    pub channel_id: String,

    /// Channel password, used as the symmetric key for payloads.
    pub password: String,

    /// Challenge to embed in presentations.
    pub challenge: String,

    /// Credential kinds the counterparty asks for.
    pub requested_credentials: Vec<String>,

    /// Counterparty.
    pub share_with: ShareWith,
}

impl FromStr for QrLink {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

/// Kind of modal dialog.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModalType {
    /// Share credentials with a counterparty.
    Share,
    /// Accept a credential from a counterparty.
    Accept,
    /// Generate a new identity.
    Generate,
}

/// The single active modal, if any.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ModalStatus {
    /// Whether a modal is showing.
    pub active: bool,

    /// Which modal is showing.
    #[serde(rename = "type")]
    pub modal_type: Option<ModalType>,

    /// Properties passed to the modal.
    pub props: Value,
}

/// Last known state of the real-time channel.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum SocketState {
    /// Connected.
    #[serde(rename = "connected")]
    Connected,
    /// Not connected.
    #[default]
    #[serde(rename = "disconnected")]
    Disconnected,
    /// Mobile client registration in progress.
    #[serde(rename = "registerMobileClient")]
    RegisterMobileClient,
}

/// Socket state together with the payload of the last event.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SocketConnectionState {
    /// Connection state.
    pub state: SocketState,

    /// Payload of the last event.
    pub payload: Option<Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn table_has_every_kind() {
        let table = CredentialTable::default();
        assert_eq!(table.iter().count(), CredentialType::ALL.len());
        assert!(table.issued().is_empty());
        assert_eq!(table.get(CredentialType::Bank).heading, "Bank account");
    }

    #[test]
    fn partial_table_fills_defaults() {
        let table: CredentialTable = serde_json::from_value(json!({
            "bank": {"heading": "Bank", "subheading": "Acme", "data": {"bankName": "Acme"}}
        }))
        .expect("should deserialize");
        assert_eq!(table.iter().count(), CredentialType::ALL.len());
        assert_eq!(table.issued(), vec![CredentialType::Bank]);
    }

    #[test]
    fn missing_kind_reads_empty() {
        let table = CredentialTable(BTreeMap::new());
        let entry = table.get(CredentialType::Visa);
        assert_eq!(entry.heading, "");
        assert!(entry.data.is_none());
    }

    #[test]
    fn credential_type_names() {
        for kind in CredentialType::ALL {
            let json = serde_json::to_value(kind).expect("should serialize");
            assert_eq!(json, json!(kind.as_str()));
            assert_eq!(kind.as_str().parse::<CredentialType>().expect("should parse"), kind);
        }
        assert!("passport".parse::<CredentialType>().is_err());
    }

    #[test]
    fn qr_link_wire_format() {
        let link: QrLink = r#"{
            "channelId": "c1",
            "password": "0123456789abcdef0123456789abcdef",
            "challenge": "nonce",
            "requestedCredentials": ["personal", "immunity"],
            "shareWith": "health_authority"
        }"#
        .parse()
        .expect("should parse");
        assert_eq!(link.share_with, ShareWith::HealthAuthority);
        assert_eq!(link.requested_credentials.len(), 2);
    }

    #[test]
    fn socket_state_names() {
        let state = SocketConnectionState {
            state: SocketState::RegisterMobileClient,
            payload: None,
        };
        assert_eq!(
            serde_json::to_value(state).expect("should serialize"),
            json!({"state": "registerMobileClient", "payload": null})
        );
    }
}
