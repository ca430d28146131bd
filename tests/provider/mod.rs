//! Mock providers standing in for the identity library and the demo user
//! endpoint.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail};
use credibil_wallet::KeyPair;
use credibil_wallet::provider::{Document, IdentityClient, SigningMethod, UserDataSource};
use credibil_wallet::schema::RandomUserResults;
use serde_json::{Map, Value, json};

/// In-memory identity network.
#[derive(Clone, Default)]
pub struct Provider {
    published: Arc<Mutex<HashMap<String, Document>>>,
    fail_publish: bool,
    reject_proofs: bool,
}

impl Provider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A network that refuses to publish documents.
    pub fn failing_publish() -> Self {
        Self {
            fail_publish: true,
            ..Self::default()
        }
    }

    /// A network on which no proof verifies.
    pub fn rejecting_proofs(&self) -> Self {
        Self {
            published: Arc::clone(&self.published),
            fail_publish: false,
            reject_proofs: true,
        }
    }

    fn is_published(&self, did: &str) -> bool {
        self.published.lock().expect("lock").contains_key(did)
    }

    fn check_proof(&self, signed: &Value) -> bool {
        let Some(method) = signed["proof"]["verificationMethod"].as_str() else {
            return false;
        };
        let did = method.split('#').next().unwrap_or_default();
        !self.reject_proofs && self.is_published(did)
    }
}

fn add_proof(mut value: Value, signer: &SigningMethod) -> anyhow::Result<Value> {
    let Some(object) = value.as_object_mut() else {
        bail!("only objects can be signed");
    };
    object.insert(
        "proof".into(),
        json!({
            "type": "JcsEd25519Signature2020",
            "verificationMethod": signer.method,
            "signatureValue": format!("sig-{}", signer.secret),
        }),
    );
    Ok(value)
}

impl IdentityClient for Provider {
    async fn init(&self, network: &str, permanode: Option<&str>) -> anyhow::Result<()> {
        if network.is_empty() {
            bail!("no network selected");
        }
        if let Some(url) = permanode {
            url::Url::parse(url)?;
        }
        Ok(())
    }

    async fn generate_keypair(&self) -> anyhow::Result<KeyPair> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        Ok(KeyPair {
            public: format!("pub{id}"),
            secret: format!("sec{id}"),
            key_type: "ed25519".into(),
        })
    }

    async fn create_document(&self, key: &KeyPair) -> anyhow::Result<Document> {
        let mut properties = Map::new();
        properties.insert(
            "verificationMethod".into(),
            json!([{"id": "#key", "publicKeyMultibase": key.public}]),
        );
        Ok(Document {
            id: format!("did:iota:{}", &key.public[3..19]),
            properties,
        })
    }

    async fn sign_document(
        &self, mut document: Document, key: &KeyPair,
    ) -> anyhow::Result<Document> {
        document.properties.insert("proof".into(), json!({"signatureValue": key.secret}));
        Ok(document)
    }

    async fn publish(&self, document: &Document) -> anyhow::Result<String> {
        if self.fail_publish {
            bail!("node unavailable");
        }
        if !document.is_signed() {
            bail!("document is not signed");
        }
        self.published.lock().expect("lock").insert(document.id.clone(), document.clone());
        Ok(format!("msg-{}", document.id))
    }

    async fn resolve(&self, did: &str) -> anyhow::Result<Document> {
        let published = self.published.lock().expect("lock");
        published.get(did).cloned().ok_or_else(|| anyhow!("{did} not found"))
    }

    async fn sign_credential(
        &self, _issuer: &Document, credential: Value, signer: &SigningMethod,
    ) -> anyhow::Result<Value> {
        add_proof(credential, signer)
    }

    async fn verify_credential(&self, credential: &Value) -> anyhow::Result<bool> {
        Ok(self.check_proof(credential))
    }

    async fn sign_presentation(
        &self, _holder: &Document, presentation: Value, signer: &SigningMethod,
    ) -> anyhow::Result<Value> {
        add_proof(presentation, signer)
    }

    async fn verify_presentation(&self, presentation: &Value) -> anyhow::Result<bool> {
        Ok(self.check_proof(presentation))
    }
}

/// Demo user endpoint returning a fixed user.
pub struct DemoUsers;

impl UserDataSource for DemoUsers {
    async fn fetch(&self, url: &str) -> anyhow::Result<RandomUserResults> {
        if !url.starts_with("https://") {
            bail!("unexpected url {url}");
        }
        let results = serde_json::from_value(json!({
            "results": [{
                "gender": "female",
                "name": {"title": "Ms", "first": "Ada", "last": "Lovelace"},
                "location": {
                    "street": {"number": 12, "name": "St James's Square"},
                    "city": "London",
                    "state": "Greater London",
                    "country": "United Kingdom",
                    "postcode": "SW1Y 4JH"
                },
                "email": "ada@example.com",
                "dob": {"date": "1815-12-10T00:00:00.000Z", "age": 36},
                "phone": "020 7946 0000",
                "cell": "07700 900000",
                "id": {"name": "NINO", "value": "QQ 12 34 56 C"},
                "login": {"uuid": "5a5b6c7d-1111-2222-3333-444455556666"},
                "nat": "GB"
            }]
        }))?;
        Ok(results)
    }
}
