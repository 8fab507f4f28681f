//! Ledger wire-client boundary and implementations.
//!
//! The [`LedgerClient`] trait is the contract the engines rely on; the
//! `clients` module maps it onto concrete node APIs and the `transports`
//! module carries the bytes.

mod client;
mod clients;
mod transports;

pub use client::LedgerClient;
pub use clients::EvmRpcClient;
pub use transports::HttpTransport;
