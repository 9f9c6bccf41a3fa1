/*
[INPUT]:  None (root path of the ledger service)
[OUTPUT]: Liveness flag and service banner
[POS]:    HTTP layer - service endpoints
[UPDATE]: When the service root contract changes
*/

use tracing::debug;

use crate::http::{Result, Transport};
use crate::types::ServiceInfo;

/// Service-level operations
#[derive(Debug, Clone, Copy)]
pub struct ServiceMethods<'a> {
    transport: &'a Transport,
}

impl<'a> ServiceMethods<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// HEAD /. Never fails: any error reads as `false`.
    pub async fn health_check(&self) -> bool {
        let url = match self.transport.endpoint(&[]) {
            Ok(url) => url,
            Err(err) => {
                debug!(error = %err, "health check failed");
                return false;
            }
        };
        match self.transport.head(url).await {
            Ok(healthy) => healthy,
            Err(err) => {
                debug!(error = %err, "health check failed");
                false
            }
        }
    }

    /// GET /
    pub async fn get_info(&self) -> Result<ServiceInfo> {
        let url = self.transport.endpoint(&[])?;
        self.transport.get(url).await?.decode_required()
    }
}
