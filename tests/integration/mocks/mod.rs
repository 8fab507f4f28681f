//! Mock implementations shared across the integration tests.

mod clients;

pub use clients::{block_hash, tx_hash, MockLedgerClient};
