/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public NetLedger SDK crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod client;
pub mod http;
pub mod types;

pub use client::LedgerClient;

// Re-export commonly used types from http
pub use http::{
    AccountMethods,
    ApiKeyMethods,
    ApiResponse,
    BalanceMethods,
    ClientConfig,
    EntryMethods,
    LedgerError,
    Result,
    ServiceMethods,
    Transport,
};

// Re-export all types
pub use types::*;
