/*
[INPUT]:  Account names, GUIDs and enumeration queries
[OUTPUT]: Account records and paged account listings
[POS]:    HTTP layer - account endpoints
[UPDATE]: When adding account endpoints or changing query parameters
*/

use uuid::Uuid;

use crate::http::{LedgerError, Result, Transport, ensure_not_blank};
use crate::types::{Account, AccountEnumerationQuery, CreateAccountRequest, EnumerationResult};

/// Account management operations
#[derive(Debug, Clone, Copy)]
pub struct AccountMethods<'a> {
    transport: &'a Transport,
}

impl<'a> AccountMethods<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// Create an account
    ///
    /// PUT /v1/accounts
    pub async fn create(&self, name: &str, notes: Option<&str>) -> Result<Account> {
        ensure_not_blank(name, "Account name cannot be empty", "name")?;

        let body = CreateAccountRequest {
            name,
            notes: notes.filter(|n| !n.is_empty()),
        };
        let url = self.transport.endpoint(&["v1", "accounts"])?;
        self.transport.put(url, &body).await?.decode_required()
    }

    /// Fetch an account; an unknown GUID surfaces as a 404 API error
    ///
    /// GET /v1/accounts/{guid}
    pub async fn get(&self, account_guid: Uuid) -> Result<Account> {
        let guid = account_guid.to_string();
        let url = self.transport.endpoint(&["v1", "accounts", &guid])?;
        self.transport.get(url).await?.decode_required()
    }

    /// GET /v1/accounts/byname/{name}
    ///
    /// `.` and `..` cannot travel as a path segment and are rejected locally.
    pub async fn get_by_name(&self, name: &str) -> Result<Account> {
        ensure_not_blank(name, "Account name cannot be empty", "name")?;
        if matches!(name, "." | "..") {
            return Err(LedgerError::validation(
                "Account name cannot be a relative path segment",
                "name",
            ));
        }

        let url = self.transport.endpoint(&["v1", "accounts", "byname", name])?;
        self.transport.get(url).await?.decode_required()
    }

    /// HEAD /v1/accounts/{guid}; `false` for any non-2xx status
    pub async fn exists(&self, account_guid: Uuid) -> Result<bool> {
        let guid = account_guid.to_string();
        let url = self.transport.endpoint(&["v1", "accounts", &guid])?;
        self.transport.head(url).await
    }

    /// DELETE /v1/accounts/{guid}
    pub async fn delete(&self, account_guid: Uuid) -> Result<()> {
        let guid = account_guid.to_string();
        let url = self.transport.endpoint(&["v1", "accounts", &guid])?;
        self.transport.delete(url).await
    }

    /// List accounts a page at a time
    ///
    /// GET /v1/accounts?maxResults={n}&skip={n}&searchTerm={term}
    pub async fn enumerate(
        &self,
        query: &AccountEnumerationQuery,
    ) -> Result<EnumerationResult<Account>> {
        query.validate()?;

        let url = self
            .transport
            .endpoint_with_query(&["v1", "accounts"], &query.query_pairs())?;
        Ok(self.transport.get(url).await?.decode()?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use crate::LedgerClient;
    use crate::http::LedgerError;
    use crate::types::AccountEnumerationQuery;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ACCOUNT_GUID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";

    fn client_for(server: &MockServer) -> LedgerClient {
        LedgerClient::new(&server.uri(), "test-key").expect("client init")
    }

    fn account_body(name: &str) -> serde_json::Value {
        json!({
            "GUID": ACCOUNT_GUID,
            "Name": name,
            "Notes": "Test notes",
            "CreatedUtc": "2024-03-01T10:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_create_account() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/accounts"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_json(json!({"name": "Operating", "notes": "Test notes"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(account_body("Operating")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = client
            .account()
            .create("Operating", Some("Test notes"))
            .await
            .expect("create failed");

        assert_eq!(account.guid, Uuid::parse_str(ACCOUNT_GUID).unwrap());
        assert_eq!(account.name, "Operating");
        assert_eq!(account.notes.as_deref(), Some("Test notes"));
    }

    #[tokio::test]
    async fn test_create_account_rejects_blank_name_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.account().create("   ", None).await.unwrap_err();
        match err {
            LedgerError::Validation { parameter, .. } => {
                assert_eq!(parameter.as_deref(), Some("name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_account_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/accounts/{ACCOUNT_GUID}")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Account not found"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .account()
            .get(Uuid::parse_str(ACCOUNT_GUID).unwrap())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "API error (status 404): Account not found");
    }

    #[tokio::test]
    async fn test_get_by_name_escapes_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/accounts/byname/Petty%20Cash"))
            .respond_with(ResponseTemplate::new(200).set_body_json(account_body("Petty Cash")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = client
            .account()
            .get_by_name("Petty Cash")
            .await
            .expect("get_by_name failed");
        assert_eq!(account.name, "Petty Cash");
    }

    #[tokio::test]
    async fn test_get_by_name_rejects_dot_segments_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(account_body("byname")))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        for name in [".", ".."] {
            match client.account().get_by_name(name).await.unwrap_err() {
                LedgerError::Validation { parameter, .. } => {
                    assert_eq!(parameter.as_deref(), Some("name"));
                }
                other => panic!("unexpected error for {name:?}: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_exists_maps_status_to_bool() {
        let server = MockServer::start().await;
        let missing = Uuid::new_v4();
        Mock::given(method("HEAD"))
            .and(path(format!("/v1/accounts/{ACCOUNT_GUID}")))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path(format!("/v1/accounts/{missing}")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let accounts = client.account();
        assert!(accounts.exists(Uuid::parse_str(ACCOUNT_GUID).unwrap()).await.unwrap());
        assert!(!accounts.exists(missing).await.unwrap());
    }

    #[tokio::test]
    async fn test_enumerate_accounts_with_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/accounts"))
            .and(query_param("maxResults", "10"))
            .and(query_param("skip", "0"))
            .and(query_param("searchTerm", "Test Account"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "TotalRecords": 1,
                "RecordsRemaining": 0,
                "EndOfResults": true,
                "Objects": [account_body("Test Account")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let page = client
            .account()
            .enumerate(
                &AccountEnumerationQuery::default()
                    .with_max_results(10)
                    .with_search_term("Test Account"),
            )
            .await
            .expect("enumerate failed");

        assert_eq!(page.total_records, 1);
        assert!(page.end_of_results);
        assert_eq!(page.objects()[0].name, "Test Account");
    }

    #[tokio::test]
    async fn test_enumerate_accounts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/accounts"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let page = client
            .account()
            .enumerate(&AccountEnumerationQuery::default())
            .await
            .expect("enumerate failed");
        assert_eq!(page.total_records, 0);
        assert!(page.end_of_results);
        assert!(page.is_empty());
    }
}
