//! Currencycloud - async client for the Currencycloud v2 API
//!
//! Covers the session calls plus beneficiaries, the current account and
//! balances. Requests and responses are typed with the models from
//! [`currencycloud_types`], re-exported here as [`types`].
//!
//! # Architecture
//!
//! - **client**: HTTP client, one method per remote operation
//! - **config**: YAML configuration and its validation
//! - **error**: Error type and API error body decoding
//! - **logging**: tracing subscriber setup
//!
//! ```no_run
//! use currencycloud::{CurrencyCloudClient, Environment};
//!
//! # async fn run() -> currencycloud::Result<()> {
//! let client = CurrencyCloudClient::new(Environment::Demonstration.base_url())?;
//! client.authenticate("development@currencycloud.com", "deadbeef").await?;
//!
//! let balance = client.find_balance("GBP").await?;
//! println!("{} {}", balance.amount, balance.currency.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;

// Re-exports
pub use client::retry::{with_retry, RetryConfig};
pub use client::{cancellable, CurrencyCloudClient};
pub use config::{ClientConfig, Environment};
pub use currencycloud_types as types;
pub use currencycloud_types::{
    Account, Balance, BalanceFilter, Balances, Beneficiaries, Beneficiary, BeneficiaryDetails,
    BeneficiaryFilter, BeneficiaryUpdate, NewBeneficiary, PageRequest, Pagination, SortOrder,
};
pub use error::{ApiErrorDetails, Error, ErrorMessage, Result};
