/*
[INPUT]:  Harness modules
[OUTPUT]: Public harness crate surface used by the binary and tests
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod config;
pub mod report;
pub mod runner;

pub use config::{ConfigFile, HarnessConfig};
pub use report::{CheckOutcome, Report};
pub use runner::{run, run_with_client};
