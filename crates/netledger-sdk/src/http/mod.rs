/*
[INPUT]:  Transport configuration and ledger REST endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod account;
pub mod apikey;
pub mod balance;
pub mod entry;
pub mod error;
pub mod service;
pub mod transport;

use rust_decimal::Decimal;

pub use error::{LedgerError, Result};
pub use transport::{ApiResponse, ClientConfig, Transport};

pub use account::AccountMethods;
pub use apikey::ApiKeyMethods;
pub use balance::BalanceMethods;
pub use entry::EntryMethods;
pub use service::ServiceMethods;

pub(crate) fn ensure_not_blank(value: &str, message: &str, parameter: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::validation(message, parameter));
    }
    Ok(())
}

pub(crate) fn ensure_positive(amount: Decimal, message: &str, parameter: &str) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation(message, parameter));
    }
    Ok(())
}
