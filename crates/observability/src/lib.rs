//! Logging setup for the ledger service binary and tests.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide logging from `RUST_LOG` and `STOCKLEDGER_LOG_FORMAT`.
pub fn init() {
    crate::tracing::init();
}
