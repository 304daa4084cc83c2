//! # Driven Ports (SPI - Outbound)
//!
//! The chain host the engine runs inside. The host supplies the KV store,
//! caller identity, the block clock, asset movement, inter-contract calls and
//! the event sink. All primitives are synchronous: a handler never yields.

use crate::domain::value_objects::{Address, Amount, Asset};
use crate::errors::HostError;
use std::collections::BTreeMap;

/// Intent type granting the contract a draw allowance.
pub const TRANSFER_ALLOW: &str = "transfer.allow";

// =============================================================================
// TRANSACTION ENVIRONMENT
// =============================================================================

/// A host intent attached to the call (`transfer.allow` with `token`/`limit`).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Intent {
    pub kind: String,
    pub args: BTreeMap<String, String>,
}

impl Intent {
    /// A `transfer.allow` intent for `limit` of `asset`.
    #[must_use]
    pub fn transfer_allow(asset: Asset, limit: Amount) -> Self {
        let mut args = BTreeMap::new();
        args.insert("token".to_string(), asset.as_str().to_string());
        args.insert("limit".to_string(), limit.to_string());
        Self {
            kind: TRANSFER_ALLOW.to_string(),
            args,
        }
    }
}

/// Per-call environment snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TxEnv {
    /// Changes on every transaction; drives cache invalidation.
    pub tx_id: String,
    pub sender: Address,
    /// Block time in unix seconds.
    pub timestamp: u64,
    pub intents: Vec<Intent>,
}

// =============================================================================
// CHAIN HOST
// =============================================================================

/// Host primitives.
pub trait ChainHost {
    /// Environment of the current call.
    fn env(&self) -> TxEnv;

    /// Id of the current transaction.
    fn tx_id(&self) -> String {
        self.env().tx_id
    }

    /// Reads a value.
    fn state_get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError>;

    /// Writes a value.
    fn state_set(&mut self, key: &[u8], value: &[u8]) -> Result<(), HostError>;

    /// Deletes a value; missing keys are not an error.
    fn state_delete(&mut self, key: &[u8]) -> Result<(), HostError>;

    /// Balance of `address` in `asset`.
    fn balance_of(&self, address: &Address, asset: Asset) -> Result<Amount, HostError>;

    /// Pulls `amount` from the caller into the contract under an intent.
    fn draw(&mut self, amount: Amount, asset: Asset) -> Result<(), HostError>;

    /// Sends `amount` from the contract to `to`.
    fn transfer(&mut self, to: &Address, amount: Amount, asset: Asset) -> Result<(), HostError>;

    /// Calls `function` on `contract`, passing `intents` for any assets the
    /// callee may draw. Returns the callee's response.
    fn contract_call(
        &mut self,
        contract: &str,
        function: &str,
        payload: &str,
        intents: &[Intent],
    ) -> Result<String, HostError>;

    /// Appends a line to the event log.
    fn log(&mut self, line: &str);

    /// Reverts every effect of the current transaction.
    fn abort(&mut self, message: &str);
}
