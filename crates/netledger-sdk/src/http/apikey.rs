/*
[INPUT]:  API key names, admin flag, key GUIDs, paging
[OUTPUT]: Created keys (with one-time secret) and key listings
[POS]:    HTTP layer - API key administration endpoints
[UPDATE]: When adding API key endpoints
*/

use uuid::Uuid;

use crate::http::{Result, Transport, ensure_not_blank};
use crate::types::{ApiKeyEnumerationQuery, ApiKeyInfo, CreateApiKeyRequest, EnumerationResult};

/// API key operations
#[derive(Debug, Clone, Copy)]
pub struct ApiKeyMethods<'a> {
    transport: &'a Transport,
}

impl<'a> ApiKeyMethods<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// Create a key. The returned `key` is the only time the secret is shown.
    ///
    /// PUT /v1/apikeys
    pub async fn create(&self, name: &str, is_admin: bool) -> Result<ApiKeyInfo> {
        ensure_not_blank(name, "API key name cannot be empty", "name")?;

        let url = self.transport.endpoint(&["v1", "apikeys"])?;
        self.transport
            .put(url, &CreateApiKeyRequest { name, is_admin })
            .await?
            .decode_required()
    }

    /// GET /v1/apikeys?maxResults={n}&skip={n}
    pub async fn enumerate(
        &self,
        query: &ApiKeyEnumerationQuery,
    ) -> Result<EnumerationResult<ApiKeyInfo>> {
        query.validate()?;

        let url = self
            .transport
            .endpoint_with_query(&["v1", "apikeys"], &query.query_pairs())?;
        Ok(self.transport.get(url).await?.decode()?.unwrap_or_default())
    }

    /// DELETE /v1/apikeys/{guid}
    pub async fn revoke(&self, key_guid: Uuid) -> Result<()> {
        let guid = key_guid.to_string();
        let url = self.transport.endpoint(&["v1", "apikeys", &guid])?;
        self.transport.delete(url).await
    }
}
