//! Concrete ledger client implementations.

mod evm;

pub use evm::EvmRpcClient;
