//! Transport implementations for ledger communication.

mod http;

pub use http::HttpTransport;
