//! # Data Mapping
//!
//! Pure functions reshaping external schema payloads ([`crate::schema`]) into
//! the credential information the wallet displays and issues. Each function
//! is a fixed field-by-field rename. A missing field is reported as a
//! [`MappingError`] naming its path in the source payload.

// field names follow the credential wire format
#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MappingError;
use crate::schema::{
    BankData, CommitmentData, CompanyData, InsuranceData, RandomUserData, TestResult, UserAddress,
    UserContacts, UserData, UserDob, UserName, UserPersonalData, VisaApplication,
};

/// Personal credential information.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInformation {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub birthplace: String,
    pub nationality: String,
    pub identity_card_number: String,
    pub passport_number: String,
    pub email: String,
    pub phone_number: String,
}

/// Address credential information.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddressInformation {
    pub street: String,
    pub house_number: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postcode: String,
}

/// Health test result information.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImmunityInformation {
    pub test_id: String,
    pub test_by: String,
    pub test_timestamp: String,
    pub test_kit: String,
    pub test_result: String,
}

/// Visa information.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VisaInformation {
    pub visa_application_number: String,
    pub visa_country: String,
    pub country_code: String,
}

/// Company information.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInformation {
    pub company_name: String,
    pub company_address: String,
    pub company_type: String,
    pub company_business: String,
    pub company_number: String,
    pub company_owner: String,
    pub company_start_date: String,
    pub company_creation_date: String,
    pub company_status: String,
}

/// Bank account information. The IBAN is not carried over.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BankInformation {
    pub bank_name: String,
    pub account_type: String,
    pub account_number: String,
}

/// Insurance information.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceInformation {
    pub name: String,
    pub address: String,
    pub policy_id: String,
    pub policy_type: String,
}

/// One commitment.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentInformation {
    pub commitment_id: u32,
    pub commitment_label: String,
    pub commitment_percentage: f64,
}

fn required<'a, T>(value: Option<&'a T>, path: &str) -> Result<&'a T, MappingError> {
    value.ok_or_else(|| MappingError::MissingField(path.into()))
}

fn text(value: Option<&String>, path: &str) -> Result<String, MappingError> {
    required(value, path).cloned()
}

/// Map personal data and contact details to personal information.
///
/// # Errors
///
/// Returns [`MappingError::MissingField`] for the first missing field.
pub fn prepare_personal_information(
    personal: &UserPersonalData, contacts: &UserContacts,
) -> Result<PersonalInformation, MappingError> {
    let name = required(personal.user_name.as_ref(), "UserPersonalData.UserName")?;
    let dob = required(personal.user_dob.as_ref(), "UserPersonalData.UserDOB")?;

    Ok(PersonalInformation {
        first_name: text(name.first_name.as_ref(), "UserPersonalData.UserName.FirstName")?,
        last_name: text(name.last_name.as_ref(), "UserPersonalData.UserName.LastName")?,
        date_of_birth: text(dob.date.as_ref(), "UserPersonalData.UserDOB.Date")?,
        birthplace: text(personal.birthplace.as_ref(), "UserPersonalData.Birthplace")?,
        nationality: text(personal.nationality.as_ref(), "UserPersonalData.Nationality")?,
        identity_card_number: text(
            personal.identity_card_number.as_ref(),
            "UserPersonalData.IdentityCardNumber",
        )?,
        passport_number: text(
            personal.passport_number.as_ref(),
            "UserPersonalData.PassportNumber",
        )?,
        email: text(contacts.email.as_ref(), "UserContacts.Email")?,
        phone_number: text(contacts.phone.as_ref(), "UserContacts.Phone")?,
    })
}

/// Map a postal address.
///
/// # Errors
///
/// Returns [`MappingError::MissingField`] for the first missing field.
pub fn prepare_address_information(
    address: &UserAddress,
) -> Result<AddressInformation, MappingError> {
    Ok(AddressInformation {
        street: text(address.street.as_ref(), "UserAddress.Street")?,
        house_number: text(address.house.as_ref(), "UserAddress.House")?,
        city: text(address.city.as_ref(), "UserAddress.City")?,
        state: text(address.state.as_ref(), "UserAddress.State")?,
        country: text(address.country.as_ref(), "UserAddress.Country")?,
        postcode: text(address.postcode.as_ref(), "UserAddress.Postcode")?,
    })
}

/// Map a health test result.
///
/// # Errors
///
/// Returns [`MappingError::MissingField`] for the first missing field.
pub fn prepare_immunity_information(
    result: &TestResult,
) -> Result<ImmunityInformation, MappingError> {
    Ok(ImmunityInformation {
        test_id: text(result.test_id.as_ref(), "TestResult.TestID")?,
        test_by: text(result.test_by.as_ref(), "TestResult.TestBy")?,
        test_timestamp: text(result.test_timestamp.as_ref(), "TestResult.TestTimestamp")?,
        test_kit: text(result.test_kit.as_ref(), "TestResult.TestKit")?,
        test_result: text(result.test_result.as_ref(), "TestResult.TestResult")?,
    })
}

/// Map a visa application.
///
/// # Errors
///
/// Returns [`MappingError::MissingField`] for the first missing field.
pub fn prepare_visa_information(
    visa: &VisaApplication,
) -> Result<VisaInformation, MappingError> {
    Ok(VisaInformation {
        visa_application_number: text(
            visa.visa_application_number.as_ref(),
            "VisaApplication.VisaApplicationNumber",
        )?,
        visa_country: text(visa.visa_country.as_ref(), "VisaApplication.VisaCountry")?,
        country_code: text(visa.country_code.as_ref(), "VisaApplication.CountryCode")?,
    })
}

/// Map company data.
///
/// # Errors
///
/// Returns [`MappingError::MissingField`] for the first missing field.
pub fn prepare_company_information(
    company: &CompanyData,
) -> Result<CompanyInformation, MappingError> {
    Ok(CompanyInformation {
        company_name: text(company.company_name.as_ref(), "CompanyData.CompanyName")?,
        company_address: text(company.company_address.as_ref(), "CompanyData.CompanyAddress")?,
        company_type: text(company.company_type.as_ref(), "CompanyData.CompanyType")?,
        company_business: text(
            company.company_business.as_ref(),
            "CompanyData.CompanyBusiness",
        )?,
        company_number: text(company.company_number.as_ref(), "CompanyData.CompanyNumber")?,
        company_owner: text(company.company_owner.as_ref(), "CompanyData.CompanyOwner")?,
        company_start_date: text(
            company.company_start_date.as_ref(),
            "CompanyData.CompanyStartDate",
        )?,
        company_creation_date: text(
            company.company_creation_date.as_ref(),
            "CompanyData.CompanyCreationDate",
        )?,
        company_status: text(company.company_status.as_ref(), "CompanyData.CompanyStatus")?,
    })
}

/// Map a bank account.
///
/// # Errors
///
/// Returns [`MappingError::MissingField`] for the first missing field.
pub fn prepare_bank_information(bank: &BankData) -> Result<BankInformation, MappingError> {
    Ok(BankInformation {
        bank_name: text(bank.bank_name.as_ref(), "BankData.BankName")?,
        account_type: text(bank.account_type.as_ref(), "BankData.AccountType")?,
        account_number: text(bank.account_number.as_ref(), "BankData.AccountNumber")?,
    })
}

/// Map an insurance policy.
///
/// # Errors
///
/// Returns [`MappingError::MissingField`] for the first missing field.
pub fn prepare_insurance_information(
    insurance: &InsuranceData,
) -> Result<InsuranceInformation, MappingError> {
    Ok(InsuranceInformation {
        name: text(insurance.name.as_ref(), "InsuranceData.Name")?,
        address: text(insurance.address.as_ref(), "InsuranceData.Address")?,
        policy_id: text(insurance.policy_id.as_ref(), "InsuranceData.PolicyID")?,
        policy_type: text(insurance.policy_type.as_ref(), "InsuranceData.PolicyType")?,
    })
}

/// Map a list of commitments element-wise, preserving order.
///
/// # Errors
///
/// Returns [`MappingError::MissingField`] for the first missing field.
pub fn prepare_commitment_information(
    data: &CommitmentData,
) -> Result<Vec<CommitmentInformation>, MappingError> {
    let commitments = required(data.commitments.as_ref(), "CommitmentData.Commitments")?;
    commitments
        .iter()
        .enumerate()
        .map(|(i, commitment)| -> Result<CommitmentInformation, MappingError> {
            let path = |field: &str| format!("CommitmentData.Commitments[{i}].{field}");
            Ok(CommitmentInformation {
                commitment_id: *required(
                    commitment.commitment_id.as_ref(),
                    &path("CommitmentId"),
                )?,
                commitment_label: text(
                    commitment.commitment_label.as_ref(),
                    &path("CommitmentLabel"),
                )?,
                commitment_percentage: *required(
                    commitment.commitment_percentage.as_ref(),
                    &path("CommitmentPercentage"),
                )?,
            })
        })
        .collect()
}

/// Reshape a generated demo user into a government user record.
///
/// The demo service has no birthplace or passport. Birthplace falls back to
/// the user's city. The identity card number is the user's national id when
/// one is sent; otherwise it, like the passport number, is derived from the
/// user's login uuid (or a fresh uuid when there is none).
///
/// # Errors
///
/// Returns [`MappingError::MissingField`] if the name, location or date of
/// birth is missing.
pub fn prepare_random_user(user: &RandomUserData) -> Result<UserData, MappingError> {
    let name = required(user.name.as_ref(), "RandomUserData.name")?;
    let location = required(user.location.as_ref(), "RandomUserData.location")?;
    let dob = required(user.dob.as_ref(), "RandomUserData.dob")?;
    let street = location.street.as_ref();

    let seed = user
        .login
        .as_ref()
        .and_then(|login| login.uuid.clone())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let serial: String =
        seed.chars().filter(char::is_ascii_hexdigit).map(|c| c.to_ascii_uppercase()).collect();
    let identity_card_number = user
        .id
        .as_ref()
        .and_then(|id| id.value.clone())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| format!("ID{}", serial.chars().take(10).collect::<String>()));
    let passport_number = format!("P{}", serial.chars().skip(16).take(9).collect::<String>());

    let postcode = location.postcode.as_ref().map(|postcode| match postcode {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });

    Ok(UserData {
        user_personal_data: Some(UserPersonalData {
            user_name: Some(UserName {
                first_name: name.first.clone(),
                last_name: name.last.clone(),
            }),
            user_dob: Some(UserDob {
                date: dob.date.clone(),
            }),
            birthplace: location.city.clone(),
            nationality: user.nat.clone(),
            identity_card_number: Some(identity_card_number),
            passport_number: Some(passport_number),
        }),
        user_contacts: Some(UserContacts {
            email: user.email.clone(),
            phone: user.phone.clone(),
            cell: user.cell.clone(),
        }),
        user_address: Some(UserAddress {
            street: street.and_then(|s| s.name.clone()),
            house: street.and_then(|s| s.number).map(|n| n.to_string()),
            city: location.city.clone(),
            state: location.state.clone(),
            country: location.country.clone(),
            postcode,
        }),
    })
}
