/*
[INPUT]:  Base URL, API key, optional client configuration
[OUTPUT]: LedgerClient facade exposing one handle per resource family
[POS]:    Client layer - entry point for library users
[UPDATE]: When adding operation groups or changing client lifecycle
*/

use reqwest::Url;
use tracing::debug;

use crate::http::{
    AccountMethods, ApiKeyMethods, BalanceMethods, ClientConfig, EntryMethods, Result,
    ServiceMethods, Transport,
};

/// Client for one ledger service with one API key.
///
/// Operation groups borrow the client, so `close` can only be called once
/// every group handle has gone out of scope.
#[derive(Debug)]
pub struct LedgerClient {
    transport: Transport,
}

impl LedgerClient {
    /// Create a client with default timeouts
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Self::with_config(base_url, api_key, ClientConfig::default())
    }

    pub fn with_config(base_url: &str, api_key: &str, config: ClientConfig) -> Result<Self> {
        let transport = Transport::new(base_url, api_key, config)?;
        debug!(base_url = %transport.base_url(), "ledger client created");
        Ok(Self { transport })
    }

    /// Normalized base URL. A bare host keeps the root `/`; a path prefix has
    /// no trailing slash.
    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    pub fn service(&self) -> ServiceMethods<'_> {
        ServiceMethods::new(&self.transport)
    }

    pub fn account(&self) -> AccountMethods<'_> {
        AccountMethods::new(&self.transport)
    }

    pub fn entry(&self) -> EntryMethods<'_> {
        EntryMethods::new(&self.transport)
    }

    pub fn balance(&self) -> BalanceMethods<'_> {
        BalanceMethods::new(&self.transport)
    }

    pub fn api_key(&self) -> ApiKeyMethods<'_> {
        ApiKeyMethods::new(&self.transport)
    }

    /// Release the connection pool. Consuming `self` makes use after close a
    /// compile error.
    pub fn close(self) {
        debug!(base_url = %self.transport.base_url(), "ledger client closed");
    }
}
