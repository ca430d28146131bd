//! # Credibil Wallet
//!
//! Client-side core for a mobile identity wallet. It manages the user's
//! decentralized identifier (DID), issues, stores and presents verifiable
//! credentials, and exposes the reactive state (modals, onboarding flags,
//! socket connection status, credential table) that a user interface renders.
//!
//! The crate does not provide a user interface, nor does it implement DID
//! methods or signature schemes. Those are the job of the application and
//! its identity library respectively.
//!
//! # Design
//!
//! ** Application State **
//!
//! [`state::AppState`] is an explicit context object holding one observable
//! cell per state item. UI components subscribe to the cells they render.
//! Onboarding status and data version are mirrored to durable local storage
//! and rehydrated on startup.
//!
//! ** Provider **
//!
//! In a similar style to `credibil-holder`, implementors supply 'Provider'
//! traits responsible for the identity library (DID creation, resolution,
//! signing and verification), the device keychain, and fetching demo data.
//! See the [`provider`] module.
//!
//! ** Service **
//!
//! [`service::IdentityService`] orchestrates providers to create a DID and to
//! issue, share and accept credentials, writing the results into the
//! application state. Long-running operations can be wrapped so they are
//! aborted when the user navigates away.
//!
//! ** Mapping **
//!
//! The [`mapping`] module reshapes loosely-typed payloads from demo services
//! into the credential information the wallet displays.
//!
//! # Example
//!
//! See the `tests` directory for an end-to-end flow against mock providers.

pub mod config;
pub mod credential;
pub mod crypto;
pub mod error;
pub mod keychain;
pub mod mapping;
pub mod model;
pub mod observable;
pub mod provider;
pub mod schema;
pub mod service;
pub mod state;
pub mod storage;

pub use config::Config;
pub use error::{ConfigError, CryptoError, KeychainError, MappingError};
pub use model::{CredentialTable, CredentialType, Identity, KeyPair, QrLink};
pub use service::IdentityService;
pub use state::AppState;
