//! # In-Memory Host
//!
//! A [`ChainHost`] for tests and local simulation. Keeps the KV store in a
//! `BTreeMap` so iteration (and therefore [`InMemoryHost::state_digest`]) is
//! ordered, and snapshots state at [`InMemoryHost::begin_transaction`] so
//! [`ChainHost::abort`] can roll everything back.

use crate::domain::value_objects::{Address, Amount, Asset};
use crate::errors::HostError;
use crate::ports::outbound::{ChainHost, Intent, TxEnv};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Address the contract itself holds funds under.
pub const CONTRACT_ADDRESS: &str = "contract:dao";

/// Handler registered for `(contract, function)`.
pub type Responder = Box<dyn FnMut(&str, &[Intent]) -> Result<String, String>>;

/// One movement of funds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    pub asset: Asset,
}

/// One inter-contract call as the host saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRecord {
    pub contract: String,
    pub function: String,
    pub payload: String,
    pub intents: Vec<Intent>,
}

#[derive(Clone, Default)]
struct Snapshot {
    kv: BTreeMap<Vec<u8>, Vec<u8>>,
    balances: BTreeMap<(Address, Asset), Amount>,
    transfers: usize,
    calls: usize,
    logs: usize,
}

/// In-memory chain host.
pub struct InMemoryHost {
    env: TxEnv,
    contract: Address,
    kv: BTreeMap<Vec<u8>, Vec<u8>>,
    balances: BTreeMap<(Address, Asset), Amount>,
    transfers: Vec<TransferRecord>,
    calls: Vec<CallRecord>,
    logs: Vec<String>,
    aborts: Vec<String>,
    responders: BTreeMap<(String, String), Responder>,
    snapshot: Option<Snapshot>,
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHost {
    /// Empty host with no balances.
    #[must_use]
    pub fn new() -> Self {
        Self {
            env: TxEnv::default(),
            contract: Address::from_stored(CONTRACT_ADDRESS.to_string()),
            kv: BTreeMap::new(),
            balances: BTreeMap::new(),
            transfers: Vec::new(),
            calls: Vec::new(),
            logs: Vec::new(),
            aborts: Vec::new(),
            responders: BTreeMap::new(),
            snapshot: None,
        }
    }

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    /// Installs `env` for the next call and snapshots state for rollback.
    pub fn begin_transaction(&mut self, env: TxEnv) {
        self.env = env;
        self.snapshot = Some(Snapshot {
            kv: self.kv.clone(),
            balances: self.balances.clone(),
            transfers: self.transfers.len(),
            calls: self.calls.len(),
            logs: self.logs.len(),
        });
    }

    /// Keeps every effect of the current transaction.
    pub fn commit(&mut self) {
        self.snapshot = None;
    }

    // =========================================================================
    // SETUP
    // =========================================================================

    /// Sets the balance of `address`.
    pub fn set_balance(&mut self, address: &Address, asset: Asset, amount: Amount) {
        self.balances.insert((address.clone(), asset), amount);
    }

    /// Registers the response of `contract.function`.
    pub fn register_contract(
        &mut self,
        contract: &str,
        function: &str,
        responder: impl FnMut(&str, &[Intent]) -> Result<String, String> + 'static,
    ) {
        self.responders
            .insert((contract.to_string(), function.to_string()), Box::new(responder));
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    #[must_use]
    pub fn contract_address(&self) -> &Address {
        &self.contract
    }

    #[must_use]
    pub fn balance(&self, address: &Address, asset: Asset) -> Amount {
        self.balances
            .get(&(address.clone(), asset))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    #[must_use]
    pub fn transfers(&self) -> &[TransferRecord] {
        &self.transfers
    }

    #[must_use]
    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    #[must_use]
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Log lines for events named `name`.
    #[must_use]
    pub fn events(&self, name: &str) -> Vec<&str> {
        self.logs
            .iter()
            .map(String::as_str)
            .filter(|line| line.split('|').next() == Some(name))
            .collect()
    }

    #[must_use]
    pub fn aborts(&self) -> &[String] {
        &self.aborts
    }

    #[must_use]
    pub fn kv_len(&self) -> usize {
        self.kv.len()
    }

    /// Entries whose key starts with `prefix`, in key order.
    #[must_use]
    pub fn scan_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.kv
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// SHA-256 over every length-prefixed key and value in key order.
    #[must_use]
    pub fn state_digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (key, value) in &self.kv {
            hasher.update((key.len() as u64).to_be_bytes());
            hasher.update(key);
            hasher.update((value.len() as u64).to_be_bytes());
            hasher.update(value);
        }
        hex::encode(hasher.finalize())
    }

    fn move_funds(&mut self, from: &Address, to: &Address, amount: Amount, asset: Asset) -> Result<(), HostError> {
        let available = self.balance(from, asset);
        let remaining = available
            .checked_sub(amount)
            .filter(|left| *left >= Amount::ZERO)
            .ok_or_else(|| {
                HostError::Transfer(format!("{from} holds {available} {asset}, needs {amount}"))
            })?;
        let credited = self
            .balance(to, asset)
            .checked_add(amount)
            .ok_or_else(|| HostError::Transfer(format!("balance overflow for {to}")))?;
        self.balances.insert((from.clone(), asset), remaining);
        self.balances.insert((to.clone(), asset), credited);
        self.transfers.push(TransferRecord {
            from: from.clone(),
            to: to.clone(),
            amount,
            asset,
        });
        Ok(())
    }
}

impl ChainHost for InMemoryHost {
    fn env(&self) -> TxEnv {
        self.env.clone()
    }

    fn tx_id(&self) -> String {
        self.env.tx_id.clone()
    }

    fn state_get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        Ok(self.kv.get(key).cloned())
    }

    fn state_set(&mut self, key: &[u8], value: &[u8]) -> Result<(), HostError> {
        self.kv.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn state_delete(&mut self, key: &[u8]) -> Result<(), HostError> {
        self.kv.remove(key);
        Ok(())
    }

    fn balance_of(&self, address: &Address, asset: Asset) -> Result<Amount, HostError> {
        Ok(self.balance(address, asset))
    }

    fn draw(&mut self, amount: Amount, asset: Asset) -> Result<(), HostError> {
        let sender = self.env.sender.clone();
        let contract = self.contract.clone();
        self.move_funds(&sender, &contract, amount, asset)
    }

    fn transfer(&mut self, to: &Address, amount: Amount, asset: Asset) -> Result<(), HostError> {
        let contract = self.contract.clone();
        self.move_funds(&contract, to, amount, asset)
    }

    fn contract_call(
        &mut self,
        contract: &str,
        function: &str,
        payload: &str,
        intents: &[Intent],
    ) -> Result<String, HostError> {
        self.calls.push(CallRecord {
            contract: contract.to_string(),
            function: function.to_string(),
            payload: payload.to_string(),
            intents: intents.to_vec(),
        });
        let key = (contract.to_string(), function.to_string());
        let responder = self
            .responders
            .get_mut(&key)
            .ok_or_else(|| HostError::ContractCall {
                contract: contract.to_string(),
                function: function.to_string(),
                reason: "no such contract".to_string(),
            })?;
        responder(payload, intents).map_err(|reason| HostError::ContractCall {
            contract: contract.to_string(),
            function: function.to_string(),
            reason,
        })
    }

    fn log(&mut self, line: &str) {
        debug!(target: "dao_governance::host", "{line}");
        self.logs.push(line.to_string());
    }

    fn abort(&mut self, message: &str) {
        warn!(tx = %self.env.tx_id, "transaction aborted: {message}");
        if let Some(snapshot) = self.snapshot.take() {
            self.kv = snapshot.kv;
            self.balances = snapshot.balances;
            self.transfers.truncate(snapshot.transfers);
            self.calls.truncate(snapshot.calls);
            self.logs.truncate(snapshot.logs);
        }
        self.aborts.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn env(sender: &str) -> TxEnv {
        TxEnv {
            tx_id: "tx-1".into(),
            sender: addr(sender),
            timestamp: 1,
            intents: Vec::new(),
        }
    }

    #[test]
    fn test_abort_restores_snapshot() {
        let mut host = InMemoryHost::new();
        host.set_balance(&addr("hive:alice"), Asset::Hive, Amount::from_units(5));
        host.state_set(b"a", b"1").unwrap();

        host.begin_transaction(env("hive:alice"));
        host.state_set(b"b", b"2").unwrap();
        host.draw(Amount::from_units(2), Asset::Hive).unwrap();
        host.log("Event|x:1");
        host.abort("boom");

        assert_eq!(host.state_get(b"b").unwrap(), None);
        assert_eq!(host.state_get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(host.balance(&addr("hive:alice"), Asset::Hive), Amount::from_units(5));
        assert!(host.transfers().is_empty());
        assert!(host.logs().is_empty());
        assert_eq!(host.aborts(), ["boom".to_string()]);
    }

    #[test]
    fn test_draw_requires_balance() {
        let mut host = InMemoryHost::new();
        host.begin_transaction(env("hive:bob"));
        assert!(matches!(
            host.draw(Amount::from_units(1), Asset::Hbd),
            Err(HostError::Transfer(_))
        ));
    }

    #[test]
    fn test_digest_is_order_independent() {
        let mut a = InMemoryHost::new();
        let mut b = InMemoryHost::new();
        a.state_set(b"k1", b"v1").unwrap();
        a.state_set(b"k2", b"v2").unwrap();
        b.state_set(b"k2", b"v2").unwrap();
        b.state_set(b"k1", b"v1").unwrap();
        assert_eq!(a.state_digest(), b.state_digest());

        b.state_set(b"k1", b"v3").unwrap();
        assert_ne!(a.state_digest(), b.state_digest());
    }

    #[test]
    fn test_contract_responders() {
        let mut host = InMemoryHost::new();
        host.register_contract("contract:nft", "owns", |payload, _| {
            Ok(if payload.ends_with("hive:alice") { "true" } else { "false" }.to_string())
        });
        assert_eq!(
            host.contract_call("contract:nft", "owns", "7|hive:alice", &[]).unwrap(),
            "true"
        );
        assert!(host.contract_call("contract:nft", "burn", "", &[]).is_err());
        assert_eq!(host.calls().len(), 2);
        assert_eq!(host.scan_prefix(b"x"), Vec::new());
    }
}
