//! Per-currency balances.

use crate::pagination::{Paginated, Pagination};
use crate::serde_ext::{decimal, decimal_opt, timestamp, timestamp_opt};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The balance held in one currency. `amount` is exact; it is never routed
/// through a float on the way in or out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub id: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(with = "decimal")]
    pub amount: Decimal,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// One page of balances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    pub balances: Vec<Balance>,
    pub pagination: Pagination,
}

impl Paginated for Balances {
    fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    fn item_count(&self) -> usize {
        self.balances.len()
    }
}

/// Search criteria for balances
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BalanceFilter {
    #[serde(skip_serializing_if = "Option::is_none", with = "decimal_opt")]
    pub amount_from: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none", with = "decimal_opt")]
    pub amount_to: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none", with = "timestamp_opt")]
    pub as_at_date: Option<DateTime<Utc>>,
}
