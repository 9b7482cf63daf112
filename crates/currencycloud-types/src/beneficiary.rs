//! Beneficiaries: payee bank account profiles used for payment routing.
//!
//! [`Beneficiary`] is what the API returns. The request side is split by
//! operation: [`BeneficiaryDetails`] for validation, [`NewBeneficiary`] for
//! creation, [`BeneficiaryUpdate`] for partial updates and
//! [`BeneficiaryFilter`] for searches.

use crate::pagination::{Paginated, Pagination};
use crate::serde_ext::{date_opt, date_patch, flag_opt, null_as_default, timestamp_opt};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Payment rails a beneficiary can receive on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Regular,
    Priority,
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentType::Regular => write!(f, "regular"),
            PaymentType::Priority => write!(f, "priority"),
        }
    }
}

impl std::str::FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "regular" => Ok(PaymentType::Regular),
            "priority" => Ok(PaymentType::Priority),
            other => Err(format!("unknown payment type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankAccountType {
    Checking,
    Savings,
}

impl std::str::FromStr for BankAccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "checking" => Ok(BankAccountType::Checking),
            "savings" => Ok(BankAccountType::Savings),
            other => Err(format!("unknown bank account type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Individual,
    Company,
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "individual" => Ok(EntityType::Individual),
            "company" => Ok(EntityType::Company),
            other => Err(format!("unknown entity type: {}", other)),
        }
    }
}

/// A beneficiary as returned by the API.
///
/// `id` and the timestamps are absent on the result of a validation call,
/// which never persists anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beneficiary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub bank_account_holder_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_types: Vec<PaymentType>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub beneficiary_address: Vec<String>,
    #[serde(default)]
    pub beneficiary_country: Option<String>,
    #[serde(default)]
    pub beneficiary_entity_type: Option<EntityType>,
    #[serde(default)]
    pub beneficiary_company_name: Option<String>,
    #[serde(default)]
    pub beneficiary_first_name: Option<String>,
    #[serde(default)]
    pub beneficiary_last_name: Option<String>,
    #[serde(default)]
    pub beneficiary_city: Option<String>,
    #[serde(default)]
    pub beneficiary_postcode: Option<String>,
    #[serde(default)]
    pub beneficiary_state_or_province: Option<String>,
    #[serde(default, with = "date_opt")]
    pub beneficiary_date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub beneficiary_identification_type: Option<String>,
    #[serde(default)]
    pub beneficiary_identification_value: Option<String>,
    pub bank_country: String,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub bank_account_type: Option<BankAccountType>,
    pub currency: String,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub routing_code_type_1: Option<String>,
    #[serde(default)]
    pub routing_code_value_1: Option<String>,
    #[serde(default)]
    pub routing_code_type_2: Option<String>,
    #[serde(default)]
    pub routing_code_value_2: Option<String>,
    #[serde(default)]
    pub bic_swift: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default, with = "flag_opt")]
    pub default_beneficiary: Option<bool>,
    #[serde(default)]
    pub creator_contact_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bank_address: Vec<String>,
    #[serde(default, with = "timestamp_opt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp_opt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Beneficiary {
    /// Whether the server has assigned this beneficiary an id
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn accepts(&self, payment_type: PaymentType) -> bool {
        self.payment_types.contains(&payment_type)
    }
}

/// One page of beneficiaries from a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beneficiaries {
    pub beneficiaries: Vec<Beneficiary>,
    pub pagination: Pagination,
}

impl Paginated for Beneficiaries {
    fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    fn item_count(&self) -> usize {
        self.beneficiaries.len()
    }
}

/// Bank details to validate, and the shared core of [`NewBeneficiary`].
///
/// Build with [`BeneficiaryDetails::new`] and struct-update syntax. Unset
/// fields and empty lists are left out of the request entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BeneficiaryDetails {
    pub bank_country: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_country: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub beneficiary_address: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_code_type_1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_code_value_1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_code_type_2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_code_value_2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic_swift: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bank_address: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account_type: Option<BankAccountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_entity_type: Option<EntityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_postcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_state_or_province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "date_opt")]
    pub beneficiary_date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_identification_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_identification_value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payment_types: Vec<PaymentType>,
}

impl BeneficiaryDetails {
    pub fn new(bank_country: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            bank_country: bank_country.into(),
            currency: currency.into(),
            ..Default::default()
        }
    }
}

/// A beneficiary to create: who holds the account plus its bank details
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewBeneficiary {
    pub bank_account_holder_name: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_beneficiary: Option<bool>,
    #[serde(flatten)]
    pub details: BeneficiaryDetails,
}

impl NewBeneficiary {
    pub fn new(
        bank_account_holder_name: impl Into<String>,
        bank_country: impl Into<String>,
        currency: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            bank_account_holder_name: bank_account_holder_name.into(),
            name: name.into(),
            email: None,
            default_beneficiary: None,
            details: BeneficiaryDetails::new(bank_country, currency),
        }
    }

    pub fn with_details(mut self, f: impl FnOnce(&mut BeneficiaryDetails)) -> Self {
        f(&mut self.details);
        self
    }
}

/// A partial update.
///
/// `None` leaves a field alone and is never sent. Fields the API lets you
/// clear are `Option<Option<_>>`: `Some(None)` sends an explicit `null`.
/// The identity fields (holder name, bank country, currency, name) can be
/// changed but not cleared. Lists are replaced wholesale; `Some(vec![])`
/// empties them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BeneficiaryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account_holder_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_address: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_country: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_code_type_1: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_code_value_1: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_code_type_2: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_code_value_2: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic_swift: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_beneficiary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_address: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account_type: Option<Option<BankAccountType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_entity_type: Option<Option<EntityType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_company_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_first_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_last_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_city: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_postcode: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_state_or_province: Option<Option<String>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "date_patch::serialize"
    )]
    pub beneficiary_date_of_birth: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_identification_type: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_identification_value: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_types: Option<Vec<PaymentType>>,
}

impl BeneficiaryUpdate {
    /// True when the update would not change anything
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Search criteria for beneficiaries. Every field is optional; unset ones are
/// not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BeneficiaryFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account_holder_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_code_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_code_value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payment_types: Vec<PaymentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic_swift: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_beneficiary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account_type: Option<BankAccountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_entity_type: Option<EntityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_postcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_state_or_province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "date_opt")]
    pub beneficiary_date_of_birth: Option<NaiveDate>,
}

impl BeneficiaryFilter {
    pub fn holder_name(name: impl Into<String>) -> Self {
        Self {
            bank_account_holder_name: Some(name.into()),
            ..Default::default()
        }
    }
}
