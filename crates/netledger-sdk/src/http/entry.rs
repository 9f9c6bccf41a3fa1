/*
[INPUT]:  Account GUIDs, amounts, entry batches and enumeration queries
[OUTPUT]: Created entry GUIDs, entry listings and paged enumerations
[POS]:    HTTP layer - entry endpoints (credits, debits, pending, cancel)
[UPDATE]: When adding entry endpoints or changing pagination handling
*/

use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::http::{LedgerError, Result, Transport, ensure_positive};
use crate::types::{
    BatchEntriesRequest, Entry, EntryEnumerationQuery, EntryGuidsResponse, EntryInput,
    EnumerationResult,
};

const CREDITS: &str = "credits";
const DEBITS: &str = "debits";

/// Entry operations
#[derive(Debug, Clone, Copy)]
pub struct EntryMethods<'a> {
    transport: &'a Transport,
}

impl<'a> EntryMethods<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// Add one pending credit and return its GUID
    ///
    /// PUT /v1/accounts/{guid}/credits
    pub async fn add_credit(
        &self,
        account_guid: Uuid,
        amount: impl Into<Decimal>,
        description: Option<&str>,
    ) -> Result<Uuid> {
        self.add_single(account_guid, CREDITS, amount.into(), description)
            .await
    }

    /// Add one pending debit and return its GUID
    ///
    /// PUT /v1/accounts/{guid}/debits
    pub async fn add_debit(
        &self,
        account_guid: Uuid,
        amount: impl Into<Decimal>,
        description: Option<&str>,
    ) -> Result<Uuid> {
        self.add_single(account_guid, DEBITS, amount.into(), description)
            .await
    }

    /// Add several credits in one request; GUIDs come back in input order
    pub async fn add_credits(&self, account_guid: Uuid, entries: &[EntryInput]) -> Result<Vec<Uuid>> {
        self.add_batch(account_guid, CREDITS, entries).await
    }

    /// Add several debits in one request; GUIDs come back in input order
    pub async fn add_debits(&self, account_guid: Uuid, entries: &[EntryInput]) -> Result<Vec<Uuid>> {
        self.add_batch(account_guid, DEBITS, entries).await
    }

    /// Every entry of the account, unwrapped from the enumeration envelope
    ///
    /// GET /v1/accounts/{guid}/entries
    pub async fn get_all(&self, account_guid: Uuid) -> Result<Vec<Entry>> {
        let guid = account_guid.to_string();
        let url = self
            .transport
            .endpoint(&["v1", "accounts", &guid, "entries"])?;
        let page: Option<EnumerationResult<Entry>> = self.transport.get(url).await?.decode()?;
        Ok(page.map(EnumerationResult::into_objects).unwrap_or_default())
    }

    /// Fetch one page of entries
    ///
    /// POST /v1/accounts/{guid}/entries/enumerate
    pub async fn enumerate(
        &self,
        account_guid: Uuid,
        query: &EntryEnumerationQuery,
    ) -> Result<EnumerationResult<Entry>> {
        query.validate()?;

        let guid = account_guid.to_string();
        let url = self
            .transport
            .endpoint(&["v1", "accounts", &guid, "entries", "enumerate"])?;
        Ok(self
            .transport
            .post(url, Some(query))
            .await?
            .decode()?
            .unwrap_or_default())
    }

    /// Follow continuation tokens from `query` to the last page and return
    /// every entry in server order.
    ///
    /// When `query` already carries a continuation token the walk resumes
    /// there, and only the entries from that page on are returned.
    ///
    /// Each page is checked against the ones before it; a server that breaks
    /// the pagination contract yields `LedgerError::InvalidResponse`.
    pub async fn enumerate_all(
        &self,
        account_guid: Uuid,
        query: &EntryEnumerationQuery,
    ) -> Result<Vec<Entry>> {
        let mut query = query.clone();
        let mut tracker = PageTracker::new(query.continuation_token.is_some());
        let mut entries = Vec::new();

        loop {
            let page = self.enumerate(account_guid, &query).await?;
            tracker.accept(&page)?;
            debug!(
                account = %account_guid,
                delivered = tracker.delivered,
                remaining = page.records_remaining,
                "entry page received"
            );

            if page.end_of_results {
                entries.extend(page.into_objects());
                return Ok(entries);
            }

            let token = page
                .continuation_token
                .clone()
                .filter(|token| !token.is_empty())
                .ok_or_else(|| {
                    LedgerError::InvalidResponse(
                        "Page is not the last but carries no continuation token".to_string(),
                    )
                })?;
            entries.extend(page.into_objects());
            query = query.next_page(token);
        }
    }

    /// GET /v1/accounts/{guid}/entries/pending
    pub async fn get_pending(&self, account_guid: Uuid) -> Result<Vec<Entry>> {
        self.get_pending_list(account_guid, None).await
    }

    /// GET /v1/accounts/{guid}/entries/pending/credits
    pub async fn get_pending_credits(&self, account_guid: Uuid) -> Result<Vec<Entry>> {
        self.get_pending_list(account_guid, Some(CREDITS)).await
    }

    /// GET /v1/accounts/{guid}/entries/pending/debits
    pub async fn get_pending_debits(&self, account_guid: Uuid) -> Result<Vec<Entry>> {
        self.get_pending_list(account_guid, Some(DEBITS)).await
    }

    /// Cancel a pending entry. The server answers 404 for an unknown entry
    /// and 409 for a committed one; both come back as API errors.
    ///
    /// DELETE /v1/accounts/{guid}/entries/{entryGuid}
    pub async fn cancel(&self, account_guid: Uuid, entry_guid: Uuid) -> Result<()> {
        let guid = account_guid.to_string();
        let entry = entry_guid.to_string();
        let url = self
            .transport
            .endpoint(&["v1", "accounts", &guid, "entries", &entry])?;
        self.transport.delete(url).await
    }

    async fn add_single(
        &self,
        account_guid: Uuid,
        kind: &str,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<Uuid> {
        ensure_positive(amount, "Amount must be greater than zero", "amount")?;

        let body = EntryInput {
            amount,
            description: description.filter(|d| !d.is_empty()).map(str::to_string),
        };
        let guid = account_guid.to_string();
        let url = self.transport.endpoint(&["v1", "accounts", &guid, kind])?;
        let created: EntryGuidsResponse = self.transport.put(url, &body).await?.decode_required()?;
        created.entry_guids.into_iter().next().ok_or_else(|| {
            LedgerError::InvalidResponse("No entry GUID returned from server".to_string())
        })
    }

    async fn add_batch(
        &self,
        account_guid: Uuid,
        kind: &str,
        entries: &[EntryInput],
    ) -> Result<Vec<Uuid>> {
        if entries.is_empty() {
            return Err(LedgerError::validation("Entries list cannot be empty", "entries"));
        }
        for entry in entries {
            ensure_positive(entry.amount, "All amounts must be greater than zero", "entries")?;
        }

        let guid = account_guid.to_string();
        let url = self.transport.endpoint(&["v1", "accounts", &guid, kind])?;
        let created: Option<EntryGuidsResponse> = self
            .transport
            .put(url, &BatchEntriesRequest { entries })
            .await?
            .decode()?;
        Ok(created.map(|c| c.entry_guids).unwrap_or_default())
    }

    async fn get_pending_list(&self, account_guid: Uuid, kind: Option<&str>) -> Result<Vec<Entry>> {
        let guid = account_guid.to_string();
        let mut segments = vec!["v1", "accounts", guid.as_str(), "entries", "pending"];
        segments.extend(kind);
        let url = self.transport.endpoint(&segments)?;
        Ok(self.transport.get(url).await?.decode()?.unwrap_or_default())
    }
}

/// Running check of the pagination contract across the pages of one query
#[derive(Debug, Default)]
struct PageTracker {
    total: Option<u64>,
    remaining: Option<u64>,
    delivered: u64,
    seen: HashSet<Uuid>,
    resumed: bool,
}

impl PageTracker {
    /// `resumed` marks a walk that starts mid-enumeration, where the entries
    /// before the first page were delivered to an earlier caller.
    fn new(resumed: bool) -> Self {
        Self {
            resumed,
            ..Self::default()
        }
    }

    fn accept(&mut self, page: &EnumerationResult<Entry>) -> Result<()> {
        if self.resumed && self.total.is_none() {
            let accounted = page.records_remaining + page.len() as u64;
            self.delivered = page.total_records.checked_sub(accounted).ok_or_else(|| {
                pagination_error(format!(
                    "{} on page + {} remaining exceeds {} total",
                    page.len(),
                    page.records_remaining,
                    page.total_records
                ))
            })?;
        }
        if let Some(total) = self.total {
            if page.total_records != total {
                return Err(pagination_error(format!(
                    "total_records changed from {total} to {}",
                    page.total_records
                )));
            }
        }
        if let Some(previous) = self.remaining {
            if page.records_remaining >= previous {
                return Err(pagination_error(format!(
                    "records_remaining did not decrease ({previous} -> {})",
                    page.records_remaining
                )));
            }
        }
        if page.end_of_results != (page.records_remaining == 0) {
            return Err(pagination_error(format!(
                "end_of_results is {} with {} records remaining",
                page.end_of_results, page.records_remaining
            )));
        }
        for entry in page.objects() {
            if !self.seen.insert(entry.guid) {
                return Err(pagination_error(format!(
                    "entry {} delivered twice",
                    entry.guid
                )));
            }
        }

        self.delivered += page.len() as u64;
        if self.delivered + page.records_remaining != page.total_records {
            return Err(pagination_error(format!(
                "{} delivered + {} remaining != {} total",
                self.delivered, page.records_remaining, page.total_records
            )));
        }

        self.total = Some(page.total_records);
        self.remaining = Some(page.records_remaining);
        Ok(())
    }
}

fn pagination_error(detail: String) -> LedgerError {
    LedgerError::InvalidResponse(format!("Inconsistent enumeration: {detail}"))
}
