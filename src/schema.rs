//! Externally-sourced schema payloads.
//!
//! These mirror the JSON the demo services send. Every field is optional so
//! that a payload missing a field still deserializes; the mapping functions in
//! [`crate::mapping`] report what is missing.

// field names follow the wire format
#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// First and last name.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct UserName {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Date of birth.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct UserDob {
    pub date: Option<String>,
}

/// Personal data of a user.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct UserPersonalData {
    pub user_name: Option<UserName>,
    #[serde(rename = "UserDOB")]
    pub user_dob: Option<UserDob>,
    pub birthplace: Option<String>,
    pub nationality: Option<String>,
    pub identity_card_number: Option<String>,
    pub passport_number: Option<String>,
}

/// Contact details of a user.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct UserContacts {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cell: Option<String>,
}

/// Postal address of a user.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct UserAddress {
    pub street: Option<String>,
    pub house: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
}

/// A full user record as supplied by the government demo service.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct UserData {
    pub user_personal_data: Option<UserPersonalData>,
    pub user_contacts: Option<UserContacts>,
    pub user_address: Option<UserAddress>,
}

/// Health test result.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TestResult {
    #[serde(rename = "TestID")]
    pub test_id: Option<String>,
    pub test_by: Option<String>,
    pub test_timestamp: Option<String>,
    pub test_kit: Option<String>,
    pub test_result: Option<String>,
}

/// Visa application.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct VisaApplication {
    pub country_code: Option<String>,
    pub visa_country: Option<String>,
    pub visa_application_number: Option<String>,
}

/// Registered company.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CompanyData {
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub company_type: Option<String>,
    pub company_business: Option<String>,
    pub company_number: Option<String>,
    pub company_owner: Option<String>,
    pub company_start_date: Option<String>,
    pub company_creation_date: Option<String>,
    pub company_status: Option<String>,
}

/// Bank account.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct BankData {
    pub bank_name: Option<String>,
    pub account_type: Option<String>,
    pub account_number: Option<String>,
    #[serde(rename = "AccountIBAN")]
    pub account_iban: Option<String>,
}

/// Insurance policy.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InsuranceData {
    pub name: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "PolicyID")]
    pub policy_id: Option<String>,
    pub policy_type: Option<String>,
}

/// A single commitment.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Commitment {
    pub commitment_id: Option<u32>,
    pub commitment_label: Option<String>,
    pub commitment_percentage: Option<f64>,
}

/// A list of commitments.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CommitmentData {
    pub commitments: Option<Vec<Commitment>>,
}

/// Response of the demo user endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct RandomUserResults {
    /// Generated users.
    #[serde(default)]
    pub results: Vec<RandomUserData>,
}

/// A generated demo user.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RandomUserData {
    pub gender: Option<String>,
    pub name: Option<RandomUserName>,
    pub location: Option<RandomUserLocation>,
    pub email: Option<String>,
    pub dob: Option<RandomUserDob>,
    pub phone: Option<String>,
    pub cell: Option<String>,
    pub id: Option<RandomUserId>,
    pub login: Option<RandomUserLogin>,
    pub nat: Option<String>,
}

/// National identifier of a generated user. `value` is null for some
/// nationalities.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RandomUserId {
    pub name: Option<String>,
    pub value: Option<String>,
}

/// Login details of a generated user.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RandomUserLogin {
    pub uuid: Option<String>,
}

/// Name of a generated user.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RandomUserName {
    pub title: Option<String>,
    pub first: Option<String>,
    pub last: Option<String>,
}

/// Street of a generated user.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RandomUserStreet {
    pub number: Option<u32>,
    pub name: Option<String>,
}

/// Location of a generated user.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RandomUserLocation {
    pub street: Option<RandomUserStreet>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    /// Sent as a number for some nationalities and a string for others.
    pub postcode: Option<Value>,
}

/// Date of birth of a generated user.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RandomUserDob {
    pub date: Option<String>,
    pub age: Option<u32>,
}
