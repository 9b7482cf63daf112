//! Resource models for the Currencycloud v2 API
//!
//! Typed beneficiaries, accounts, balances and pagination, plus the serde
//! helpers for the API's wire conventions (offset timestamps, string decimals,
//! `-1` page sentinels). This crate does no I/O; the `currencycloud` crate
//! sends these types over HTTP.
//!
//! # Example
//!
//! ```
//! use currencycloud_types::{BeneficiaryDetails, PaymentType};
//!
//! let details = BeneficiaryDetails {
//!     account_number: Some("12345678".to_string()),
//!     routing_code_type_1: Some("sort_code".to_string()),
//!     routing_code_value_1: Some("123456".to_string()),
//!     payment_types: vec![PaymentType::Regular],
//!     ..BeneficiaryDetails::new("GB", "GBP")
//! };
//!
//! let json = serde_json::to_value(&details)?;
//! assert_eq!(json["payment_types"][0], "regular");
//! assert!(json.get("iban").is_none());
//! # Ok::<(), serde_json::Error>(())
//! ```

pub mod account;
pub mod balance;
pub mod beneficiary;
pub mod pagination;
pub mod serde_ext;

pub use account::Account;
pub use balance::{Balance, BalanceFilter, Balances};
pub use beneficiary::{
    BankAccountType, Beneficiaries, Beneficiary, BeneficiaryDetails, BeneficiaryFilter,
    BeneficiaryUpdate, EntityType, NewBeneficiary, PaymentType,
};
pub use pagination::{PageRequest, Paginated, Pagination, PaginationError, SortOrder};
