//! The account that owns the current authentication context.

use crate::serde_ext::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Currencycloud account. Read-only from the client's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub your_reference: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state_or_province: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub spread_table: Option<String>,
    #[serde(default)]
    pub legal_entity_type: Option<String>,
    #[serde(default)]
    pub identification_type: Option<String>,
    #[serde(default)]
    pub identification_value: Option<String>,
    #[serde(default)]
    pub short_reference: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}
