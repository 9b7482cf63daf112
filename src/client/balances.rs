//! Balance lookups.

use super::query::to_query_pairs;
use super::CurrencyCloudClient;
use crate::error::{ApiErrorDetails, Error, Result};
use currencycloud_types::{Balance, BalanceFilter, Balances, PageRequest};
use tracing::debug;

/// Upper-case a currency code, rejecting anything that is not three letters
fn currency_code(currency: &str) -> Result<String> {
    let code = currency.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::Validation(ApiErrorDetails::local(
            "currency_is_in_invalid_format",
            "currency",
            format!("currency must be a three-letter ISO 4217 code, got {:?}", currency),
        )));
    }
    Ok(code)
}

impl CurrencyCloudClient {
    /// Balance held in `currency`. Fails with `NotFound` when the account
    /// holds no balance in that currency.
    pub async fn find_balance(&self, currency: &str) -> Result<Balance> {
        let code = currency_code(currency)?;
        debug!(currency = %code, "Fetching balance");
        self.get(&format!("balances/{}", code), &[]).await
    }

    /// One page of balances matching `filter`
    pub async fn find_balances(&self, filter: &BalanceFilter, page: &PageRequest) -> Result<Balances> {
        let mut query = to_query_pairs(filter)?;
        query.extend(to_query_pairs(page)?);
        self.get_page("balances/find", &query).await
    }
}
