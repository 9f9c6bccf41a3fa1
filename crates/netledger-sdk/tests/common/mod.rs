/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for netledger-sdk tests

#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use netledger_sdk::{EntryEnumerationQuery, EnumerationOrder, LedgerClient};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use uuid::Uuid;
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

/// Amounts used by the pagination scenarios, in creation order
pub const SCENARIO_AMOUNTS: [i64; 15] = [10, 50, 25, 75, 5, 100, 30, 15, 60, 45, 80, 20, 90, 35, 55];

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn client_for(server: &MockServer) -> LedgerClient {
    LedgerClient::new(&server.uri(), "test-key").expect("client init")
}

/// A stored entry of the fake ledger
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub guid: Uuid,
    pub amount: Decimal,
    pub created_minute: i64,
}

impl StoredEntry {
    fn to_wire(&self, account_guid: Uuid) -> Value {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
            + Duration::minutes(self.created_minute);
        json!({
            "GUID": self.guid,
            "AccountGUID": account_guid,
            "Type": "Credit",
            "Amount": self.amount.to_string(),
            "Description": format!("Entry {}", self.created_minute),
            "IsCommitted": false,
            "CreatedUtc": created.to_rfc3339(),
        })
    }
}

/// Responder for `POST .../entries/enumerate` that filters, orders and pages
/// a fixed set of pending credits the way the ledger service does. The
/// continuation token is the offset of the next page.
#[derive(Debug, Clone)]
pub struct PagedEntries {
    pub account_guid: Uuid,
    pub entries: Vec<StoredEntry>,
}

impl PagedEntries {
    pub fn new(account_guid: Uuid, amounts: &[i64]) -> Self {
        let entries = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| StoredEntry {
                guid: Uuid::new_v4(),
                amount: Decimal::from(*amount),
                created_minute: i as i64,
            })
            .collect();
        Self {
            account_guid,
            entries,
        }
    }

    pub fn scenario(account_guid: Uuid) -> Self {
        Self::new(account_guid, &SCENARIO_AMOUNTS)
    }

    fn matching(&self, query: &EntryEnumerationQuery) -> Vec<StoredEntry> {
        let mut matches: Vec<StoredEntry> = self
            .entries
            .iter()
            .filter(|e| query.amount_min.is_none_or(|min| e.amount >= min))
            .filter(|e| query.amount_max.is_none_or(|max| e.amount <= max))
            .cloned()
            .collect();
        match query.ordering {
            EnumerationOrder::CreatedAscending => matches.sort_by_key(|e| e.created_minute),
            EnumerationOrder::CreatedDescending => {
                matches.sort_by_key(|e| std::cmp::Reverse(e.created_minute))
            }
            EnumerationOrder::AmountAscending => matches.sort_by_key(|e| e.amount),
            EnumerationOrder::AmountDescending => {
                matches.sort_by_key(|e| std::cmp::Reverse(e.amount))
            }
        }
        matches
    }
}

impl Respond for PagedEntries {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let query: EntryEnumerationQuery = match serde_json::from_slice(&request.body) {
            Ok(query) => query,
            Err(_) => return ResponseTemplate::new(400),
        };
        let matches = self.matching(&query);
        let offset = query
            .continuation_token
            .as_deref()
            .and_then(|token| token.parse::<usize>().ok())
            .unwrap_or(0)
            .min(matches.len());
        let page: Vec<Value> = matches
            .iter()
            .skip(offset)
            .take(query.max_results as usize)
            .map(|e| e.to_wire(self.account_guid))
            .collect();
        let next = offset + page.len();
        let remaining = matches.len() - next;

        let mut body = json!({
            "TotalRecords": matches.len(),
            "RecordsRemaining": remaining,
            "EndOfResults": remaining == 0,
            "Objects": page,
        });
        if remaining > 0 {
            body["ContinuationToken"] = json!(next.to_string());
        }
        ResponseTemplate::new(200).set_body_json(body)
    }
}
