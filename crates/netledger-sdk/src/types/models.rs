/*
[INPUT]:  Ledger JSON payloads (PascalCase, loosely typed, optional fields)
[OUTPUT]: Typed ledger entities with serde decoding
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new entities are added
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::EntryType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "GUID")]
    pub guid: Uuid,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Notes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        rename = "CreatedUtc",
        default,
        deserialize_with = "serde_helpers::deserialize_utc_option"
    )]
    pub created_utc: Option<DateTime<Utc>>,
}

/// A single credit, debit or balance-snapshot record.
///
/// Once `is_committed` is set the entry is immutable; cancelling it is
/// rejected by the server with 409.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "GUID")]
    pub guid: Uuid,
    #[serde(rename = "AccountGUID")]
    pub account_guid: Uuid,
    #[serde(rename = "Type", default)]
    pub entry_type: EntryType,
    #[serde(
        rename = "Amount",
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero"
    )]
    pub amount: Decimal,
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Replaces", default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<Uuid>,
    #[serde(rename = "IsCommitted", default)]
    pub is_committed: bool,
    #[serde(rename = "CommittedByGUID", default, skip_serializing_if = "Option::is_none")]
    pub committed_by_guid: Option<Uuid>,
    #[serde(
        rename = "CommittedUtc",
        default,
        deserialize_with = "serde_helpers::deserialize_utc_option"
    )]
    pub committed_utc: Option<DateTime<Utc>>,
    #[serde(
        rename = "CreatedUtc",
        default,
        deserialize_with = "serde_helpers::deserialize_utc_option"
    )]
    pub created_utc: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn is_pending(&self) -> bool {
        !self.is_committed
    }
}

/// Aggregate of the pending credits or debits of one account.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PendingTransactionSummary {
    #[serde(rename = "Count", default)]
    pub count: u64,
    #[serde(
        rename = "Total",
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero"
    )]
    pub total: Decimal,
    #[serde(rename = "Entries", default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<Entry>>,
}

impl PendingTransactionSummary {
    /// `count` agrees with the attached entries, when entries were sent.
    pub fn is_consistent(&self) -> bool {
        match &self.entries {
            Some(entries) => entries.len() as u64 == self.count,
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(rename = "AccountGUID", default)]
    pub account_guid: Uuid,
    #[serde(
        rename = "CommittedBalance",
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero"
    )]
    pub committed_balance: Decimal,
    #[serde(
        rename = "PendingBalance",
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero"
    )]
    pub pending_balance: Decimal,
    #[serde(rename = "PendingCredits", default, skip_serializing_if = "Option::is_none")]
    pub pending_credits: Option<PendingTransactionSummary>,
    #[serde(rename = "PendingDebits", default, skip_serializing_if = "Option::is_none")]
    pub pending_debits: Option<PendingTransactionSummary>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommitResult {
    #[serde(rename = "EntriesCommitted", default)]
    pub entries_committed: u64,
    #[serde(rename = "BalanceEntry", default, skip_serializing_if = "Option::is_none")]
    pub balance_entry: Option<Entry>,
    #[serde(rename = "Balance", default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Balance>,
}

/// API key metadata. `key` is only populated in the creation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyInfo {
    #[serde(rename = "GUID")]
    pub guid: Uuid,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "Active", default = "serde_helpers::default_true")]
    pub active: bool,
    #[serde(rename = "IsAdmin", default)]
    pub is_admin: bool,
    #[serde(
        rename = "CreatedUtc",
        default,
        deserialize_with = "serde_helpers::deserialize_utc_option"
    )]
    pub created_utc: Option<DateTime<Utc>>,
}

/// Service banner returned by `GET /`. Accepts PascalCase and camelCase keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    #[serde(rename = "Version", alias = "version", default)]
    pub version: String,
    #[serde(
        rename = "StartTimeUtc",
        alias = "startTimeUtc",
        default,
        deserialize_with = "serde_helpers::deserialize_utc_option"
    )]
    pub start_time_utc: Option<DateTime<Utc>>,
    #[serde(rename = "UptimeSeconds", alias = "uptimeSeconds", default)]
    pub uptime_seconds: u64,
    #[serde(rename = "UptimeFormatted", alias = "uptimeFormatted", default)]
    pub uptime_formatted: String,
}

pub(crate) mod serde_helpers {
    use super::Decimal;
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn default_true() -> bool {
        true
    }

    pub fn deserialize_decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(Decimal::ZERO);
        }

        if let Some(raw) = value.as_str() {
            if raw.trim().is_empty() {
                return Ok(Decimal::ZERO);
            }
            return Decimal::from_str(raw.trim()).map_err(serde::de::Error::custom);
        }

        if value.is_number() {
            let raw = value.to_string();
            return Decimal::from_str(&raw)
                .or_else(|_| Decimal::from_scientific(&raw))
                .map_err(serde::de::Error::custom);
        }

        Err(serde::de::Error::custom("invalid decimal value"))
    }

    /// RFC 3339, or a naive ISO-8601 timestamp taken as UTC.
    pub fn parse_utc(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        let raw = raw.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|n| n.and_utc())
            })
    }

    pub fn deserialize_utc_option<'de, D>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(raw) if !raw.trim().is_empty() => parse_utc(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
