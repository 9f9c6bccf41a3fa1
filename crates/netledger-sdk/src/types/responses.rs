/*
[INPUT]:  Ledger response envelopes (enumeration pages, created guids, as-of balance)
[OUTPUT]: Typed response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new envelopes added
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::serde_helpers;

/// One page of an enumeration.
///
/// `total_records` counts every match of the query; `records_remaining` counts
/// the matches after this page. `continuation_token` is opaque and must be
/// passed back verbatim to fetch the next page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct EnumerationResult<T> {
    #[serde(rename = "TotalRecords", default)]
    pub total_records: u64,
    #[serde(rename = "RecordsRemaining", default)]
    pub records_remaining: u64,
    #[serde(rename = "EndOfResults", default = "serde_helpers::default_true")]
    pub end_of_results: bool,
    #[serde(rename = "ContinuationToken", default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
    #[serde(rename = "Objects", default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<Vec<T>>,
}

impl<T> Default for EnumerationResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> EnumerationResult<T> {
    /// The result for an absent response body: nothing matched.
    pub fn empty() -> Self {
        Self {
            total_records: 0,
            records_remaining: 0,
            end_of_results: true,
            continuation_token: None,
            objects: None,
        }
    }

    /// Number of objects on this page.
    pub fn len(&self) -> usize {
        self.objects.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn objects(&self) -> &[T] {
        self.objects.as_deref().unwrap_or(&[])
    }

    pub fn into_objects(self) -> Vec<T> {
        self.objects.unwrap_or_default()
    }

    /// Another page can be requested with the returned token.
    pub fn has_more(&self) -> bool {
        !self.end_of_results
            && self
                .continuation_token
                .as_deref()
                .is_some_and(|token| !token.is_empty())
    }

    /// Re-type the page, keeping the pagination metadata.
    pub fn map<U, F>(self, f: F) -> EnumerationResult<U>
    where
        F: FnMut(T) -> U,
    {
        EnumerationResult {
            total_records: self.total_records,
            records_remaining: self.records_remaining,
            end_of_results: self.end_of_results,
            continuation_token: self.continuation_token,
            objects: self.objects.map(|objects| objects.into_iter().map(f).collect()),
        }
    }
}

/// `{EntryGuids: [...]}` returned by credit/debit creation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntryGuidsResponse {
    #[serde(rename = "EntryGuids", alias = "entryGuids", default)]
    pub entry_guids: Vec<Uuid>,
}

/// Historical balance returned by `GET .../balance/asof`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceAsOf {
    #[serde(rename = "accountGuid", alias = "AccountGUID", default)]
    pub account_guid: Uuid,
    #[serde(
        rename = "asOfUtc",
        alias = "AsOfUtc",
        default,
        deserialize_with = "serde_helpers::deserialize_utc_option"
    )]
    pub as_of_utc: Option<DateTime<Utc>>,
    #[serde(
        rename = "balance",
        alias = "Balance",
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero"
    )]
    pub balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enumeration_result_decodes_page_metadata() {
        let page: EnumerationResult<serde_json::Value> = serde_json::from_value(json!({
            "TotalRecords": 15,
            "RecordsRemaining": 10,
            "EndOfResults": false,
            "ContinuationToken": "c2tpcD01",
            "Objects": [{}, {}, {}, {}, {}]
        }))
        .unwrap();

        assert_eq!(page.total_records, 15);
        assert_eq!(page.records_remaining, 10);
        assert_eq!(page.len(), 5);
        assert!(page.has_more());
    }

    #[test]
    fn enumeration_result_defaults_to_end_of_results() {
        let page: EnumerationResult<serde_json::Value> =
            serde_json::from_value(json!({})).unwrap();
        assert!(page.end_of_results);
        assert!(page.is_empty());
        assert!(!page.has_more());
        assert_eq!(page, EnumerationResult::empty());
    }

    #[test]
    fn enumeration_result_decodes_objects_without_default() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Named {
            #[serde(rename = "Name")]
            name: String,
        }

        let page: EnumerationResult<Named> = serde_json::from_value(json!({
            "TotalRecords": 1,
            "Objects": [{"Name": "Petty Cash"}]
        }))
        .unwrap();
        assert_eq!(page.objects()[0].name, "Petty Cash");

        let empty: EnumerationResult<Named> = serde_json::from_value(json!({})).unwrap();
        assert!(empty.objects.is_none());
    }

    #[test]
    fn enumeration_result_map_keeps_metadata() {
        let page = EnumerationResult {
            total_records: 3,
            records_remaining: 1,
            end_of_results: false,
            continuation_token: Some("next".to_string()),
            objects: Some(vec![1, 2]),
        };

        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.objects(), &[10, 20]);
        assert_eq!(mapped.records_remaining, 1);
        assert_eq!(mapped.continuation_token.as_deref(), Some("next"));
    }

    #[test]
    fn balance_as_of_decodes_lower_camel_case() {
        let as_of: BalanceAsOf = serde_json::from_value(json!({
            "accountGuid": "0f8fad5b-d9cb-469f-a165-70867728950e",
            "asOfUtc": "2024-03-01T00:00:00Z",
            "balance": 87.25
        }))
        .unwrap();
        assert_eq!(as_of.balance, Decimal::new(8725, 2));
        assert!(as_of.as_of_utc.is_some());
    }
}
