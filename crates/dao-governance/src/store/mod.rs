//! # State Store Adapters
//!
//! Typed reads and writes over the host KV, plus the per-transaction cache.
//! Treasury and member operations live in their own modules as further
//! `impl StateStore` blocks.

pub mod cache;
pub mod members;
pub mod treasury;

use crate::codec::{Decode, Encode};
use crate::config::EngineConfig;
use crate::domain::entities::{
    ContractConfig, ProjectConfig, ProjectFinance, ProjectMeta, Project, Proposal, ProposalOption,
    VoteReceipt,
};
use crate::domain::value_objects::{Address, Amount, Asset};
use crate::errors::DaoError;
use crate::events::Event;
use crate::keyspace::{self, Counter};
use crate::ports::outbound::{ChainHost, TxEnv, TRANSFER_ALLOW};
use tracing::{debug, trace};

pub use cache::{IntentBudget, TxCache};

/// Typed access to persisted governance state.
pub struct StateStore<H: ChainHost> {
    host: H,
    cache: TxCache,
}

impl<H: ChainHost> StateStore<H> {
    /// Wraps `host` with a member cache of `member_cache_capacity` entries.
    pub fn new(host: H, member_cache_capacity: usize) -> Self {
        Self {
            host,
            cache: TxCache::new(member_cache_capacity),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn cache(&self) -> &TxCache {
        &self.cache
    }

    // =========================================================================
    // TRANSACTION SCOPE
    // =========================================================================

    /// Flushes every cache when the host has moved to another transaction.
    fn sync(&mut self) {
        let tx_id = self.host.tx_id();
        if self.cache.observe(&tx_id) {
            trace!(tx = %tx_id, "new transaction, caches flushed");
        }
    }

    /// Loads the env for the current call, flushing caches on a new tx id.
    pub fn begin(&mut self) -> TxEnv {
        self.env()
    }

    /// Memoized env, valid only for the host's current transaction.
    pub fn env(&mut self) -> TxEnv {
        self.sync();
        if let Some(env) = self.cache.env() {
            return env.clone();
        }
        let env = self.host.env();
        self.cache.set_env(env.clone());
        env
    }

    /// Drops cached state, e.g. after the host rolled the transaction back.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// Appends an event to the host log.
    pub fn emit(&mut self, event: &Event) {
        self.host.log(&event.to_string());
    }

    // =========================================================================
    // RAW ACCESS
    // =========================================================================

    pub fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, DaoError> {
        Ok(self.host.state_get(key)?)
    }

    pub fn put_raw(&mut self, key: &[u8], value: &[u8]) -> Result<(), DaoError> {
        debug!(key = %keyspace::display(key), len = value.len(), "state write");
        Ok(self.host.state_set(key, value)?)
    }

    pub fn delete_raw(&mut self, key: &[u8]) -> Result<(), DaoError> {
        debug!(key = %keyspace::display(key), "state delete");
        Ok(self.host.state_delete(key)?)
    }

    /// Writes only when the stored bytes differ. Returns true on write.
    pub fn set_if_changed(&mut self, key: &[u8], value: &[u8]) -> Result<bool, DaoError> {
        if self.get_raw(key)?.as_deref() == Some(value) {
            return Ok(false);
        }
        self.put_raw(key, value)?;
        Ok(true)
    }

    pub fn load<T: Decode>(&self, key: &[u8]) -> Result<Option<T>, DaoError> {
        match self.get_raw(key)? {
            Some(bytes) => Ok(Some(T::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn save<T: Encode>(&mut self, key: &[u8], value: &T) -> Result<(), DaoError> {
        self.set_if_changed(key, &value.to_bytes()).map(|_| ())
    }

    // =========================================================================
    // CONTRACT / COUNTERS
    // =========================================================================

    pub fn contract_config(&self) -> Result<Option<ContractConfig>, DaoError> {
        self.load(&keyspace::contract_config())
    }

    pub fn save_contract_config(&mut self, config: &ContractConfig) -> Result<(), DaoError> {
        self.save(&keyspace::contract_config(), config)
    }

    /// Issues the next id from `counter`, starting at zero.
    pub fn next_id(&mut self, counter: Counter) -> Result<u64, DaoError> {
        let key = keyspace::counter(counter);
        let current: u64 = self.load(&key)?.unwrap_or(0);
        self.save(&key, &(current + 1))?;
        Ok(current)
    }

    // =========================================================================
    // PROJECTS
    // =========================================================================

    pub fn project_meta(&self, id: u64) -> Result<ProjectMeta, DaoError> {
        self.load(&keyspace::project_meta(id))?
            .ok_or(DaoError::ProjectNotFound(id))
    }

    pub fn project_config(&self, id: u64) -> Result<ProjectConfig, DaoError> {
        self.load(&keyspace::project_config(id))?
            .ok_or(DaoError::ProjectNotFound(id))
    }

    pub fn project_finance(&self, id: u64) -> Result<ProjectFinance, DaoError> {
        self.load(&keyspace::project_finance(id))?
            .ok_or(DaoError::ProjectNotFound(id))
    }

    /// All three project records.
    pub fn project(&self, id: u64) -> Result<Project, DaoError> {
        Ok(Project {
            id,
            meta: self.project_meta(id)?,
            config: self.project_config(id)?,
            finance: self.project_finance(id)?,
        })
    }

    pub fn save_project_meta(&mut self, id: u64, meta: &ProjectMeta) -> Result<(), DaoError> {
        self.save(&keyspace::project_meta(id), meta)
    }

    pub fn save_project_config(&mut self, id: u64, config: &ProjectConfig) -> Result<(), DaoError> {
        self.save(&keyspace::project_config(id), config)
    }

    pub fn save_project_finance(
        &mut self,
        id: u64,
        finance: &ProjectFinance,
    ) -> Result<(), DaoError> {
        self.save(&keyspace::project_finance(id), finance)
    }

    // =========================================================================
    // PROPOSALS
    // =========================================================================

    pub fn proposal(&self, id: u64) -> Result<Proposal, DaoError> {
        self.load(&keyspace::proposal(id))?
            .ok_or(DaoError::ProposalNotFound(id))
    }

    pub fn save_proposal(&mut self, proposal: &Proposal) -> Result<(), DaoError> {
        self.save(&keyspace::proposal(proposal.id), proposal)
    }

    pub fn proposal_option(&self, proposal: u64, index: u32) -> Result<ProposalOption, DaoError> {
        self.load(&keyspace::proposal_option(proposal, index))?
            .ok_or(DaoError::ProposalNotFound(proposal))
    }

    pub fn save_proposal_option(
        &mut self,
        proposal: u64,
        index: u32,
        option: &ProposalOption,
    ) -> Result<(), DaoError> {
        self.save(&keyspace::proposal_option(proposal, index), option)
    }

    /// Options 0..option_count in index order.
    pub fn proposal_options(&self, proposal: &Proposal) -> Result<Vec<ProposalOption>, DaoError> {
        (0..proposal.option_count)
            .map(|i| self.proposal_option(proposal.id, i))
            .collect()
    }

    pub fn vote_receipt(&self, proposal: u64, voter: &Address) -> Result<Option<VoteReceipt>, DaoError> {
        self.load(&keyspace::vote_receipt(proposal, voter))
    }

    pub fn save_vote_receipt(
        &mut self,
        proposal: u64,
        voter: &Address,
        receipt: &VoteReceipt,
    ) -> Result<(), DaoError> {
        self.save(&keyspace::vote_receipt(proposal, voter), receipt)
    }

    // =========================================================================
    // WHITELIST
    // =========================================================================

    pub fn is_whitelisted(&self, project: u64, address: &Address) -> Result<bool, DaoError> {
        Ok(self.get_raw(&keyspace::whitelist(project, address))?.is_some())
    }

    pub fn whitelist_insert(&mut self, project: u64, address: &Address) -> Result<(), DaoError> {
        self.put_raw(&keyspace::whitelist(project, address), &[1])
    }

    pub fn whitelist_delete(&mut self, project: u64, address: &Address) -> Result<(), DaoError> {
        self.delete_raw(&keyspace::whitelist(project, address))
    }

    // =========================================================================
    // TRANSFER INTENTS
    // =========================================================================

    /// Resolves the first `transfer.allow` intent of the current call.
    ///
    /// # Errors
    ///
    /// [`DaoError::InvalidAsset`] or [`DaoError::InvalidAmount`] when the
    /// intent names an unaccepted asset or a malformed limit.
    pub fn transfer_intent(&mut self, config: &EngineConfig) -> Result<Option<IntentBudget>, DaoError> {
        self.sync();
        if let Some(resolved) = self.cache.intent() {
            return Ok(resolved);
        }
        let env = self.env();
        let resolved = match env.intents.iter().find(|i| i.kind == TRANSFER_ALLOW) {
            Some(intent) => {
                let token = intent.args.get("token").map_or("", String::as_str);
                let asset: Asset = token.parse()?;
                if !config.accepts(asset) {
                    return Err(DaoError::InvalidAsset(token.to_string()));
                }
                let limit = Amount::parse(intent.args.get("limit").map_or("", String::as_str))?;
                Some(IntentBudget {
                    asset,
                    limit,
                    drawn: Amount::ZERO,
                })
            }
            None => None,
        };
        self.cache.set_intent(resolved);
        Ok(resolved)
    }

    /// Draws `amount` of `asset` from the caller against the intent.
    pub fn draw_from_intent(
        &mut self,
        config: &EngineConfig,
        asset: Asset,
        amount: Amount,
    ) -> Result<(), DaoError> {
        let mut budget = self
            .transfer_intent(config)?
            .ok_or_else(|| DaoError::MissingIntent {
                asset: asset.to_string(),
            })?;
        if budget.asset != asset {
            return Err(DaoError::IntentAssetMismatch {
                expected: asset.to_string(),
                found: budget.asset.to_string(),
            });
        }
        if amount > budget.remaining() {
            return Err(DaoError::InsufficientIntent {
                required: amount.to_string(),
                available: budget.remaining().to_string(),
            });
        }
        self.host.draw(amount, asset)?;
        budget.drawn = budget
            .drawn
            .checked_add(amount)
            .ok_or_else(|| DaoError::InvalidAmount(amount.to_string()))?;
        self.cache.set_intent(Some(budget));
        Ok(())
    }
}
