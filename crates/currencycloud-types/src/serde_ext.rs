//! Serde helpers for the Currencycloud wire formats.
//!
//! The API writes timestamps as ISO-8601 with an explicit offset
//! (`2015-04-25T09:21:00+00:00`), decimal amounts as strings, page links with a
//! `-1` sentinel, and a few flags as `"true"`/`"false"` strings. Each helper is
//! a `#[serde(with = "...")]` module.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;

/// Timestamp format written on the wire (offset always present).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Calendar date format (dates of birth).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `DateTime<Utc>` as `yyyy-MM-ddTHH:mm:ss+00:00`.
pub mod timestamp {
    use super::*;
    use chrono::{DateTime, Utc};

    /// Render a timestamp the way the API expects it.
    pub fn to_wire(value: &DateTime<Utc>) -> String {
        value.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Parse an RFC 3339 timestamp, tolerating offsets without minutes (`+00`).
    pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s)
            .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%#z"))
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_wire(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(|e| de::Error::custom(format!("invalid timestamp {:?}: {}", s, e)))
    }
}

/// `Option<DateTime<Utc>>`; use together with `#[serde(default)]`.
pub mod timestamp_opt {
    use super::*;
    use chrono::{DateTime, Utc};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&timestamp::to_wire(v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.filter(|s| !s.is_empty())
            .map(|s| {
                timestamp::parse(&s)
                    .map_err(|e| de::Error::custom(format!("invalid timestamp {:?}: {}", s, e)))
            })
            .transpose()
    }
}

/// `Option<NaiveDate>` as `yyyy-MM-dd`. Full timestamps are accepted on input
/// and truncated to their date.
pub mod date_opt {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn parse(s: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .or_else(|_| timestamp::parse(s).map(|dt| dt.date_naive()))
    }

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_some(&d.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.filter(|s| !s.is_empty())
            .map(|s| parse(&s).map_err(|e| de::Error::custom(format!("invalid date {:?}: {}", s, e))))
            .transpose()
    }
}

/// Patch form of a date: outer `None` is skipped by the caller's
/// `skip_serializing_if`, `Some(None)` is written as an explicit `null`.
pub mod date_patch {
    use super::*;
    use chrono::NaiveDate;

    pub fn serialize<S>(value: &Option<Option<NaiveDate>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(Some(d)) => serializer.serialize_some(&d.format(DATE_FORMAT).to_string()),
            _ => serializer.serialize_none(),
        }
    }
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = rust_decimal::Decimal;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal amount as a string or integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        rust_decimal::Decimal::from_str_exact(v.trim()).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(rust_decimal::Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(rust_decimal::Decimal::from(v))
    }

    // serde_json has already rounded a fractional number to f64 by now
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Err(E::custom(format!(
            "fractional amount {} arrived as a JSON number; send it as a string",
            v
        )))
    }
}

/// Exact decimal amounts. Written as strings so no float ever touches the value.
pub mod decimal {
    use super::*;
    use rust_decimal::Decimal;

    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DecimalVisitor)
    }
}

/// `Option<Decimal>` counterpart of [`decimal`]; use with `#[serde(default)]`.
pub mod decimal_opt {
    use super::*;
    use rust_decimal::Decimal;

    pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_some(&d.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OptVisitor;

        impl<'de> Visitor<'de> for OptVisitor {
            type Value = Option<Decimal>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an optional decimal amount")
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
                d.deserialize_any(DecimalVisitor).map(Some)
            }
        }

        deserializer.deserialize_option(OptVisitor)
    }
}

/// Page links: `-1` (or `null`) on the wire means "no such page".
pub mod page_sentinel {
    use super::*;

    pub fn serialize<S>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(value.map(i64::from).unwrap_or(-1))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<i64>::deserialize(deserializer)? {
            None => Ok(None),
            Some(n) if n < 0 => Ok(None),
            Some(n) => u32::try_from(n).map(Some).map_err(de::Error::custom),
        }
    }
}

/// Flags the API sends either as JSON booleans or as `"true"`/`"false"`.
pub mod flag_opt {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<serde_json::Value>::deserialize(deserializer)? {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::Bool(b)) => Ok(Some(b)),
            Some(serde_json::Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                "" => Ok(None),
                other => Err(de::Error::custom(format!("invalid flag: {:?}", other))),
            },
            Some(other) => Err(de::Error::custom(format!("invalid flag: {}", other))),
        }
    }

    pub fn serialize<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(b) => serializer.serialize_some(b),
            None => serializer.serialize_none(),
        }
    }
}

/// Treat an explicit `null` like a missing field and fall back to `Default`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
