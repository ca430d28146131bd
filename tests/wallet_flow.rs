//! End-to-end tests of the wallet: onboarding, self-issuing credentials,
//! sharing and accepting them over a QR link, and logging out.
mod provider;

use std::collections::BTreeMap;
use std::sync::Arc;

use credibil_wallet::crypto;
use credibil_wallet::keychain::{Keychain, MemoryKeychain};
use credibil_wallet::mapping::{
    prepare_address_information, prepare_bank_information, prepare_personal_information,
};
use credibil_wallet::model::{CredentialTable, ModalType, ShareWith};
use credibil_wallet::schema::BankData;
use credibil_wallet::service::IDENTITY_KEY;
use credibil_wallet::storage::MemoryStorage;
use credibil_wallet::{AppState, Config, CredentialType, IdentityService, QrLink};
use serde_json::{Value, json};

use crate::provider::{DemoUsers, Provider};

const PASSWORD: &str = "0123456789abcdef0123456789abcdef";

fn wallet(
    provider: Provider, keychain: MemoryKeychain, storage: &MemoryStorage,
) -> IdentityService<Provider, MemoryKeychain> {
    let config = Config::default();
    let state = Arc::new(AppState::new(Arc::new(storage.clone()), &config));
    IdentityService::new(provider, keychain, state, config)
}

fn bank_data() -> Value {
    let bank = BankData {
        bank_name: Some("Acme".into()),
        account_type: Some("Checking".into()),
        account_number: Some("123".into()),
        account_iban: Some("X".into()),
    };
    serde_json::to_value(prepare_bank_information(&bank).expect("should map"))
        .expect("should serialize")
}

// Test the full lifecycle of a wallet from onboarding to logout.
#[tokio::test]
async fn wallet_lifecycle() {
    let storage = MemoryStorage::new();
    let keychain = MemoryKeychain::new();
    let wallet = wallet(Provider::new(), keychain.clone(), &storage);

    //--------------------------------------------------------------------------
    // Onboard: create and publish a DID, keep it in the keychain.
    //--------------------------------------------------------------------------
    let identity = wallet.create_identity().await.expect("should create identity");
    assert!(identity.did.starts_with("did:iota:"));
    assert!(wallet.store_identity(IDENTITY_KEY, &identity).await.expect("should store"));
    wallet.state().has_setup_account.set(true).expect("should persist");

    let retrieved = wallet.retrieve_identity(IDENTITY_KEY).await.expect("should retrieve");
    assert_eq!(retrieved, identity);
    assert!(wallet.retrieve_identity("missing-key").await.is_none());

    //--------------------------------------------------------------------------
    // Self-issue a bank credential.
    //--------------------------------------------------------------------------
    let credential = wallet
        .issue_credential(CredentialType::Bank, bank_data())
        .await
        .expect("should issue credential");
    assert_eq!(credential["credentialSubject"]["bankName"], "Acme");
    assert_eq!(credential["credentialSubject"]["id"], identity.did.as_str());
    assert!(credential["credentialSubject"].get("accountIBAN").is_none());
    assert_eq!(credential["proof"]["verificationMethod"], format!("{}#key", identity.did));

    let table = wallet.state().credentials.get();
    assert_eq!(table.issued(), vec![CredentialType::Bank]);
    assert_eq!(wallet.retrieve_credential("bank").await, Some(credential.clone()));

    //--------------------------------------------------------------------------
    // Scan a share request and send an encrypted presentation.
    //--------------------------------------------------------------------------
    let raw_link = json!({
        "channelId": "channel-1",
        "password": PASSWORD,
        "challenge": "challenge-1",
        "requestedCredentials": ["bank"],
        "shareWith": "bank"
    })
    .to_string();
    let link = wallet.scan(&raw_link).expect("should parse link");
    assert_eq!(link.share_with, ShareWith::Bank);
    assert_eq!(wallet.state().qr_link.get(), Some(link.clone()));
    assert_eq!(wallet.state().modal_status.get().modal_type, Some(ModalType::Share));

    let payload = wallet.share_credentials(&link).await.expect("should share");
    let presentation: Value =
        serde_json::from_str(&crypto::decrypt(PASSWORD, &payload).expect("should decrypt"))
            .expect("should parse presentation");
    assert_eq!(presentation["holder"], identity.did.as_str());
    assert_eq!(presentation["challenge"], "challenge-1");
    assert_eq!(presentation["verifiableCredential"][0], credential);
    assert!(presentation.get("proof").is_some());

    //--------------------------------------------------------------------------
    // Log out.
    //--------------------------------------------------------------------------
    let before = wallet.state().credentials.get();
    wallet.clear_identity().await.expect("should clear identity");

    let after = wallet.state().credentials.get();
    assert_eq!(after, CredentialTable::default());
    assert_ne!(after, before);
    assert!(!wallet.state().has_setup_account.get());
    assert_eq!(wallet.state().data_version.get(), None);
    assert!(keychain.is_empty());
    assert!(wallet.retrieve_identity(IDENTITY_KEY).await.is_none());

    // persisted cells come back reset after a restart
    let restarted = AppState::new(Arc::new(storage), &Config::default());
    assert!(!restarted.has_setup_account.get());
}

// Test accepting a credential issued by another party over a channel.
#[tokio::test]
async fn accept_credential() {
    let network = Provider::new();
    let storage = MemoryStorage::new();
    let issuer = wallet(network.clone(), MemoryKeychain::new(), &MemoryStorage::new());
    let holder = wallet(network, MemoryKeychain::new(), &storage);

    let issuer_identity = issuer.create_identity().await.expect("should create issuer");
    let credential = issuer
        .create_credential(
            &issuer_identity,
            "immunity",
            json!({"testId": "T-1", "testResult": "negative"}),
        )
        .await
        .expect("should create credential");

    let link = QrLink {
        channel_id: "channel-2".into(),
        password: PASSWORD.into(),
        challenge: "challenge-2".into(),
        requested_credentials: vec![],
        share_with: ShareWith::HealthAuthority,
    };
    holder.scan(&serde_json::to_string(&link).expect("should serialize")).expect("should scan");
    assert_eq!(holder.state().modal_status.get().modal_type, Some(ModalType::Accept));

    let payload = crypto::encrypt(PASSWORD, &credential.to_string()).expect("should encrypt");
    let kind = holder.accept_credential(&link, &payload).await.expect("should accept");
    assert_eq!(kind, CredentialType::Immunity);

    let table = holder.state().credentials.get();
    let entry = table.get(CredentialType::Immunity);
    assert_eq!(entry.data.as_ref(), Some(&credential));
    assert_eq!(entry.channel_id.as_deref(), Some("channel-2"));
    assert_eq!(holder.retrieve_credential("immunity").await, Some(credential));

    // the wrong password never yields the credential
    let wrong = QrLink {
        password: "fedcba9876543210fedcba9876543210".into(),
        ..link
    };
    assert!(holder.accept_credential(&wrong, &payload).await.is_err());
}

// Presentations bundle every supplied credential and fail all-or-nothing.
#[tokio::test]
async fn presentations() {
    let network = Provider::new();
    let wallet = wallet(network.clone(), MemoryKeychain::new(), &MemoryStorage::new());
    let identity = wallet.create_identity().await.expect("should create identity");

    let bank = wallet
        .create_credential(&identity, "bank", bank_data())
        .await
        .expect("should create credential");
    let visa = wallet
        .create_credential(&identity, "visa", json!({"visaCountry": "Germany"}))
        .await
        .expect("should create credential");
    let credentials = BTreeMap::from([("bank".to_string(), bank), ("visa".to_string(), visa)]);

    let presentation = wallet
        .create_verifiable_presentations(&identity, &credentials)
        .await
        .expect("should create presentation");
    assert_eq!(presentation["verifiableCredential"].as_array().map(Vec::len), Some(2));
    assert!(presentation.get("challenge").is_none());

    // verification failure yields no presentation
    let rejecting = self::wallet(
        network.rejecting_proofs(),
        MemoryKeychain::new(),
        &MemoryStorage::new(),
    );
    assert!(rejecting.create_verifiable_presentations(&identity, &credentials).await.is_err());
    assert!(rejecting.create_credential(&identity, "bank", bank_data()).await.is_err());

    // an unknown issuer cannot be resolved
    let mut stranger = identity.clone();
    stranger.did = "did:iota:unknown".into();
    let err = wallet.create_credential(&stranger, "bank", bank_data()).await.expect_err("fails");
    assert!(format!("{err:#}").contains("did:iota:unknown"));
}

// Library failures propagate and can be surfaced through the error cell.
#[tokio::test]
async fn publish_failure() {
    let wallet = wallet(Provider::failing_publish(), MemoryKeychain::new(), &MemoryStorage::new());

    let result = wallet.create_identity().await;
    let err = result.as_ref().expect_err("should fail to publish");
    assert!(format!("{err:#}").contains("node unavailable"));

    assert!(wallet.report(result).is_none());
    assert!(wallet.state().error.get().contains("publishing DID document"));
}

// Sharing fails when a requested credential is not held.
#[tokio::test]
async fn share_missing_credential() {
    let wallet = wallet(Provider::new(), MemoryKeychain::new(), &MemoryStorage::new());
    let identity = wallet.create_identity().await.expect("should create identity");
    wallet.store_identity(IDENTITY_KEY, &identity).await.expect("should store");

    let link = QrLink {
        channel_id: "channel-3".into(),
        password: PASSWORD.into(),
        challenge: "challenge-3".into(),
        requested_credentials: vec!["insurance".into()],
        share_with: ShareWith::Insurance,
    };
    let err = wallet.share_credentials(&link).await.expect_err("should fail");
    assert!(err.to_string().contains("insurance"));

    let unknown = QrLink {
        requested_credentials: vec!["passport".into()],
        ..link
    };
    assert!(wallet.share_credentials(&unknown).await.is_err());
}

// A corrupt keychain entry resolves to `None`.
#[tokio::test]
async fn corrupt_keychain_entry() {
    let keychain = MemoryKeychain::new();
    keychain.set(IDENTITY_KEY, "{not json").await.expect("should set");
    let wallet = wallet(Provider::new(), keychain, &MemoryStorage::new());
    assert!(wallet.retrieve_identity(IDENTITY_KEY).await.is_none());
}

// In-flight operations are aborted when the user navigates away.
#[tokio::test]
async fn cancel_in_flight() {
    let wallet = wallet(Provider::new(), MemoryKeychain::new(), &MemoryStorage::new());
    let task = wallet.cancellable(futures::future::pending::<()>());
    assert_eq!(wallet.state().cancel_pending(), 1);
    assert!(task.await.is_err());

    let task = wallet.cancellable(wallet.create_identity());
    let identity = task.await.expect("not aborted").expect("should create identity");
    assert!(identity.did.starts_with("did:iota:"));

    // completed operations are no longer pending
    for _ in 0..3 {
        wallet.cancellable(async {}).await.expect("not aborted");
    }
    assert_eq!(wallet.state().cancel_pending(), 0);
}

// Demo users are reshaped into government user records and can be issued as
// a personal credential.
#[tokio::test]
async fn demo_user() {
    let wallet = wallet(Provider::new(), MemoryKeychain::new(), &MemoryStorage::new());
    let identity = wallet.create_identity().await.expect("should create identity");
    wallet.store_identity(IDENTITY_KEY, &identity).await.expect("should store");

    let user = wallet.load_demo_user(&DemoUsers).await.expect("should load demo user");
    let user_address = user.user_address.as_ref().expect("has address");
    let address = prepare_address_information(user_address).expect("should map");
    assert_eq!(address.postcode, "SW1Y 4JH");
    assert_eq!(address.house_number, "12");

    let personal = prepare_personal_information(
        user.user_personal_data.as_ref().expect("has personal data"),
        user.user_contacts.as_ref().expect("has contacts"),
    )
    .expect("should map");
    assert_eq!(personal.identity_card_number, "QQ 12 34 56 C");
    assert_eq!(personal.passport_number, "P333344445");

    let data = serde_json::to_value(&personal).expect("should serialize");
    let credential = wallet
        .issue_credential(CredentialType::Personal, data)
        .await
        .expect("should issue credential");
    assert_eq!(credential["credentialSubject"]["firstName"], "Ada");
    assert_eq!(wallet.state().credentials.get().issued(), vec![CredentialType::Personal]);
}
