/*
[INPUT]:  Account GUIDs, as-of timestamps, entry GUIDs to commit
[OUTPUT]: Balances, historical balances, commit results, chain verification
[POS]:    HTTP layer - balance endpoints (two-phase commit surface)
[UPDATE]: When adding balance endpoints or changing commit semantics
*/

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::http::{Result, Transport};
use crate::types::{Balance, BalanceAsOf, CommitRequest};

/// Wire format of the `asOf` query parameter
const AS_OF_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Balance operations
#[derive(Debug, Clone, Copy)]
pub struct BalanceMethods<'a> {
    transport: &'a Transport,
}

impl<'a> BalanceMethods<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// Current committed and pending balance
    ///
    /// GET /v1/accounts/{guid}/balance
    pub async fn get(&self, account_guid: Uuid) -> Result<Balance> {
        let guid = account_guid.to_string();
        let url = self
            .transport
            .endpoint(&["v1", "accounts", &guid, "balance"])?;
        self.transport.get(url).await?.decode_required()
    }

    /// Committed balance at a point in time
    pub async fn get_as_of(&self, account_guid: Uuid, as_of: DateTime<Utc>) -> Result<Decimal> {
        Ok(self.get_as_of_record(account_guid, as_of).await?.balance)
    }

    /// GET /v1/accounts/{guid}/balance/asof?asOf={UTC}
    pub async fn get_as_of_record(
        &self,
        account_guid: Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<BalanceAsOf> {
        let guid = account_guid.to_string();
        let stamp = as_of.format(AS_OF_FORMAT).to_string();
        let url = self.transport.endpoint_with_query(
            &["v1", "accounts", &guid, "balance", "asof"],
            &[("asOf", stamp)],
        )?;
        self.transport.get(url).await?.decode_required()
    }

    /// Balances of every account. The server sends a map keyed by account
    /// GUID; no ordering of the result is promised.
    ///
    /// GET /v1/balances
    pub async fn get_all(&self) -> Result<Vec<Balance>> {
        let url = self.transport.endpoint(&["v1", "balances"])?;
        let by_account: Option<BTreeMap<String, Balance>> =
            self.transport.get(url).await?.decode()?;

        Ok(by_account
            .unwrap_or_default()
            .into_iter()
            .map(|(key, mut balance)| {
                if balance.account_guid.is_nil() {
                    if let Ok(guid) = Uuid::parse_str(&key) {
                        balance.account_guid = guid;
                    }
                }
                balance
            })
            .collect())
    }

    /// Fold pending entries into the committed balance. `None` or an empty
    /// slice commits everything pending; otherwise only the listed entries.
    ///
    /// POST /v1/accounts/{guid}/commit
    pub async fn commit(&self, account_guid: Uuid, entry_guids: Option<&[Uuid]>) -> Result<Balance> {
        let guid = account_guid.to_string();
        let url = self
            .transport
            .endpoint(&["v1", "accounts", &guid, "commit"])?;
        let body = entry_guids
            .filter(|guids| !guids.is_empty())
            .map(|entry_guids| CommitRequest { entry_guids });
        self.transport
            .post(url, body.as_ref())
            .await?
            .decode_required()
    }

    /// Check the account's balance chain. 200 means intact and 409 means
    /// broken; any other failure is returned as an error.
    ///
    /// GET /v1/accounts/{guid}/verify
    pub async fn verify(&self, account_guid: Uuid) -> Result<bool> {
        let guid = account_guid.to_string();
        let url = self
            .transport
            .endpoint(&["v1", "accounts", &guid, "verify"])?;
        match self.transport.get(url).await {
            Ok(response) => Ok(response.status_code == 200),
            Err(err) if err.is_conflict() => {
                debug!(account = %account_guid, "balance chain verification failed");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::LedgerClient;
    use crate::http::LedgerError;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    const ACCOUNT_GUID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";

    fn account() -> Uuid {
        Uuid::parse_str(ACCOUNT_GUID).unwrap()
    }

    fn client_for(server: &MockServer) -> LedgerClient {
        LedgerClient::new(&server.uri(), "test-key").expect("client init")
    }

    #[tokio::test]
    async fn test_get_balance_with_pending_summaries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/accounts/{ACCOUNT_GUID}/balance")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "AccountGUID": ACCOUNT_GUID,
                "CommittedBalance": 150.0,
                "PendingBalance": 125.5,
                "PendingCredits": {"Count": 1, "Total": "10.5"},
                "PendingDebits": {"Count": 1, "Total": 35.0}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let balance = client.balance().get(account()).await.expect("get failed");
        assert_eq!(balance.account_guid, account());
        assert_eq!(balance.committed_balance, Decimal::from(150));
        assert_eq!(balance.pending_balance, Decimal::new(1255, 1));
        let credits = balance.pending_credits.expect("pending credits");
        assert_eq!(credits.count, 1);
        assert_eq!(credits.total, Decimal::new(105, 1));
    }

    #[tokio::test]
    async fn test_get_as_of_formats_timestamp() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/accounts/{ACCOUNT_GUID}/balance/asof")))
            .and(query_param("asOf", "2024-03-01T10:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accountGuid": ACCOUNT_GUID,
                "asOfUtc": "2024-03-01T10:00:00Z",
                "balance": 75.25
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let as_of = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let balance = client
            .balance()
            .get_as_of(account(), as_of)
            .await
            .expect("get_as_of failed");
        assert_eq!(balance, Decimal::new(7525, 2));
    }

    #[tokio::test]
    async fn test_get_all_fills_guid_from_map_key() {
        let server = MockServer::start().await;
        let other = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path("/v1/balances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                ACCOUNT_GUID: {"AccountGUID": ACCOUNT_GUID, "CommittedBalance": 10, "PendingBalance": 10},
                other.to_string(): {"CommittedBalance": 0, "PendingBalance": 5}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let balances = client.balance().get_all().await.expect("get_all failed");
        assert_eq!(balances.len(), 2);
        assert!(balances.iter().any(|b| b.account_guid == account()));
        assert!(
            balances
                .iter()
                .any(|b| b.account_guid == other && b.pending_balance == Decimal::from(5))
        );
    }

    #[tokio::test]
    async fn test_commit_all_sends_no_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/v1/accounts/{ACCOUNT_GUID}/commit")))
            .and(|request: &Request| request.body.is_empty())
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "AccountGUID": ACCOUNT_GUID,
                "CommittedBalance": 125.5,
                "PendingBalance": 125.5
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let balances = client.balance();
        let all = balances.commit(account(), None).await.expect("commit failed");
        let empty = balances
            .commit(account(), Some(&[] as &[Uuid]))
            .await
            .expect("commit failed");
        assert_eq!(all.committed_balance, all.pending_balance);
        assert_eq!(all, empty);
    }

    #[tokio::test]
    async fn test_commit_selected_entries() {
        let server = MockServer::start().await;
        let selected = [Uuid::new_v4(), Uuid::new_v4()];
        Mock::given(method("POST"))
            .and(path(format!("/v1/accounts/{ACCOUNT_GUID}/commit")))
            .and(body_json(json!({"EntryGuids": selected})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "AccountGUID": ACCOUNT_GUID,
                "CommittedBalance": 300,
                "PendingBalance": 250
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let balance = client
            .balance()
            .commit(account(), Some(&selected[..]))
            .await
            .expect("commit failed");
        assert_eq!(balance.committed_balance, Decimal::from(300));
    }

    #[tokio::test]
    async fn test_verify_maps_conflict_to_false() {
        let server = MockServer::start().await;
        let tampered = Uuid::new_v4();
        let failing = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path(format!("/v1/accounts/{ACCOUNT_GUID}/verify")))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/accounts/{tampered}/verify")))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "Balance chain is broken"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/accounts/{failing}/verify")))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let balances = client.balance();
        assert!(balances.verify(account()).await.expect("verify failed"));
        assert!(!balances.verify(tampered).await.expect("verify failed"));
        match balances.verify(failing).await {
            Err(LedgerError::Api { status, .. }) => assert_eq!(status, 500),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
