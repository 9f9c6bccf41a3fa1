/*
[INPUT]:  Caller-supplied values for writes and enumeration queries
[OUTPUT]: Typed request payloads with serialization support and local validation
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new request types added
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::EnumerationOrder;
use crate::http::{LedgerError, Result};

const DEFAULT_MAX_RESULTS: u32 = 100;

/// One credit or debit to create. Serialized as `{Amount, Notes?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryInput {
    #[serde(rename = "Amount", with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "Notes", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EntryInput {
    pub fn new(amount: impl Into<Decimal>) -> Self {
        Self {
            amount: amount.into(),
            description: None,
        }
    }

    pub fn with_description(amount: impl Into<Decimal>, description: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            description: Some(description.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntriesRequest<'a> {
    #[serde(rename = "Entries")]
    pub entries: &'a [EntryInput],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateAccountRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRequest<'a> {
    #[serde(rename = "EntryGuids")]
    pub entry_guids: &'a [Uuid],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateApiKeyRequest<'a> {
    pub name: &'a str,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

/// Paging for `GET /v1/accounts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEnumerationQuery {
    pub max_results: u32,
    pub skip: u32,
    pub search_term: Option<String>,
}

impl Default for AccountEnumerationQuery {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            skip: 0,
            search_term: None,
        }
    }
}

impl AccountEnumerationQuery {
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_page_size(self.max_results)
    }

    /// Query pairs in wire order; an empty search term is omitted.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("maxResults", self.max_results.to_string()),
            ("skip", self.skip.to_string()),
        ];
        if let Some(term) = self.search_term.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(("searchTerm", term.to_string()));
        }
        pairs
    }
}

/// Paging for `GET /v1/apikeys`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyEnumerationQuery {
    pub max_results: u32,
    pub skip: u32,
}

impl Default for ApiKeyEnumerationQuery {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            skip: 0,
        }
    }
}

impl ApiKeyEnumerationQuery {
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = skip;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_page_size(self.max_results)
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("maxResults", self.max_results.to_string()),
            ("skip", self.skip.to_string()),
        ]
    }
}

/// Filter, ordering and cursor for `POST .../entries/enumerate`.
///
/// Keep every field except `continuation_token` unchanged between pages of
/// one enumeration; the server only guarantees stable ordering under the
/// same query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryEnumerationQuery {
    #[serde(rename = "MaxResults")]
    pub max_results: u32,
    #[serde(rename = "Ordering", default)]
    pub ordering: EnumerationOrder,
    #[serde(rename = "ContinuationToken", default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
    #[serde(rename = "CreatedAfterUtc", default, skip_serializing_if = "Option::is_none")]
    pub created_after_utc: Option<DateTime<Utc>>,
    #[serde(rename = "CreatedBeforeUtc", default, skip_serializing_if = "Option::is_none")]
    pub created_before_utc: Option<DateTime<Utc>>,
    #[serde(
        rename = "AmountMinimum",
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount_min: Option<Decimal>,
    #[serde(
        rename = "AmountMaximum",
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount_max: Option<Decimal>,
}

impl Default for EntryEnumerationQuery {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            ordering: EnumerationOrder::default(),
            continuation_token: None,
            created_after_utc: None,
            created_before_utc: None,
            amount_min: None,
            amount_max: None,
        }
    }
}

impl EntryEnumerationQuery {
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_ordering(mut self, ordering: EnumerationOrder) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_continuation_token(mut self, token: impl Into<String>) -> Self {
        self.continuation_token = Some(token.into());
        self
    }

    pub fn with_created_after(mut self, after: DateTime<Utc>) -> Self {
        self.created_after_utc = Some(after);
        self
    }

    pub fn with_created_before(mut self, before: DateTime<Utc>) -> Self {
        self.created_before_utc = Some(before);
        self
    }

    pub fn with_amount_min(mut self, min: impl Into<Decimal>) -> Self {
        self.amount_min = Some(min.into());
        self
    }

    pub fn with_amount_max(mut self, max: impl Into<Decimal>) -> Self {
        self.amount_max = Some(max.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_page_size(self.max_results)?;
        if let (Some(min), Some(max)) = (self.amount_min, self.amount_max) {
            if min > max {
                return Err(LedgerError::validation(
                    "Minimum amount cannot exceed maximum amount",
                    "amount_min",
                ));
            }
        }
        if let (Some(after), Some(before)) = (self.created_after_utc, self.created_before_utc) {
            if after > before {
                return Err(LedgerError::validation(
                    "Created-after bound cannot be later than created-before bound",
                    "created_after_utc",
                ));
            }
        }
        Ok(())
    }

    /// Same query positioned at the page after `token`.
    pub fn next_page(&self, token: impl Into<String>) -> Self {
        self.clone().with_continuation_token(token)
    }
}

fn ensure_page_size(max_results: u32) -> Result<()> {
    if max_results == 0 {
        return Err(LedgerError::validation(
            "Max results must be greater than zero",
            "max_results",
        ));
    }
    Ok(())
}
