//! Core engine services.
//!
//! This module contains the confirmation and event-subscription engine
//! and its supporting services:
//!
//! - `blockchain`: Ledger wire-client boundary and implementations
//! - `codec`: Parameter model to/from native ABI values
//! - `confidence`: Confidence-to-depth translation
//! - `filter`: Filter expressions over decoded event parameters
//! - `invocation`: Smart-contract invocation pipeline
//! - `monitor`: Per-transaction state watches
//! - `subscription`: Smart-contract event subscriptions

pub mod blockchain;
pub mod codec;
pub mod confidence;
pub mod filter;
pub mod invocation;
pub mod monitor;
pub mod subscription;
