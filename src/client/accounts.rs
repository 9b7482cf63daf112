//! Account lookups.

use super::CurrencyCloudClient;
use crate::error::Result;
use currencycloud_types::Account;
use tracing::debug;

impl CurrencyCloudClient {
    /// The account that owns the current auth token
    pub async fn current_account(&self) -> Result<Account> {
        let account: Account = self.get("accounts/current", &[]).await?;
        debug!(account_id = %account.id, "Fetched current account");
        Ok(account)
    }
}
