//! # Adapters
//!
//! - `memory_host`: in-memory [`crate::ports::ChainHost`] for tests
//! - `payload`: pipe-delimited payload parser

pub mod memory_host;
pub mod payload;

pub use memory_host::{CallRecord, InMemoryHost, TransferRecord, CONTRACT_ADDRESS};
