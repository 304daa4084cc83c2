//! # Governance Service
//!
//! Orchestrates the entry points: loads the transaction env, parses the
//! payload, runs the typed handler and persists through [`StateStore`].
//!
//! ## Failure Handling
//!
//! Every handler error is fatal to the transaction. [`GovernanceApi::invoke`]
//! hands the error's display string to [`ChainHost::abort`] and flushes the
//! per-transaction caches, so the next call starts from committed state.

mod contract;
mod directives;
mod membership;
mod projects;
mod proposals;
mod validation;
mod voting;

pub use membership::is_truthy;
pub use validation::{
    validate_create_project, validate_nft_payload, validate_option_text, validate_percent,
    validate_text, validate_url,
};

use crate::adapters::payload;
use crate::config::EngineConfig;
use crate::errors::DaoError;
use crate::ports::inbound::{Action, GovernanceApi};
use crate::ports::outbound::ChainHost;
use crate::store::StateStore;
use tracing::{field, info, instrument, warn, Span};

/// Call counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Calls routed to a handler, including unknown actions.
    pub calls: u64,
    pub succeeded: u64,
    /// Calls that ended in a host abort.
    pub aborted: u64,
}

/// The governance engine bound to a host.
pub struct GovernanceService<H: ChainHost> {
    store: StateStore<H>,
    config: EngineConfig,
    stats: ServiceStats,
}

impl<H: ChainHost> GovernanceService<H> {
    /// Creates a service over `host`.
    pub fn new(host: H, config: EngineConfig) -> Self {
        let capacity = config.member_cache_capacity;
        Self {
            store: StateStore::new(host, capacity),
            config,
            stats: ServiceStats::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> &ServiceStats {
        &self.stats
    }

    pub fn store(&self) -> &StateStore<H> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StateStore<H> {
        &mut self.store
    }

    pub fn host(&self) -> &H {
        self.store.host()
    }

    pub fn host_mut(&mut self) -> &mut H {
        self.store.host_mut()
    }

    pub fn into_host(self) -> H {
        self.store.into_host()
    }

    /// Runs one action against the payload without the abort wrapper.
    fn dispatch(&mut self, action: Action, raw: &str) -> Result<String, DaoError> {
        if action.requires_init() && self.store.contract_config()?.is_none() {
            return Err(DaoError::NotInitialized);
        }
        match action {
            Action::ContractInit => self.contract_init(payload::parse_contract_init(raw)?),
            Action::ProjectCreate => {
                let args = payload::parse_create_project(raw, &self.config)?;
                self.project_create(args)
            }
            Action::ProjectJoin => self.project_join(payload::parse_id_payload(raw, "project id")?),
            Action::ProjectLeave => self.project_leave(payload::parse_id_payload(raw, "project id")?),
            Action::ProjectFunds => {
                let (project_id, to_stake) = payload::parse_funds(raw)?;
                self.project_funds(project_id, to_stake)
            }
            Action::ProjectWhitelistAdd => self.project_whitelist_add(payload::parse_whitelist(raw)?),
            Action::ProjectWhitelistRemove => {
                self.project_whitelist_remove(payload::parse_whitelist(raw)?)
            }
            Action::ProjectPause => self.project_pause(payload::parse_pause(raw)?),
            Action::ProjectTransfer => self.project_transfer(payload::parse_transfer(raw)?),
            Action::ProposalCreate => self.proposal_create(payload::parse_create_proposal(raw)?),
            Action::ProposalsVote => self.proposals_vote(payload::parse_vote(raw)?),
            Action::ProposalTally => {
                self.proposal_tally(payload::parse_id_payload(raw, "proposal id")?)
            }
            Action::ProposalExecute => {
                self.proposal_execute(payload::parse_id_payload(raw, "proposal id")?)
            }
            Action::ProposalCancel => {
                self.proposal_cancel(payload::parse_id_payload(raw, "proposal id")?)
            }
        }
    }
}

impl<H: ChainHost> GovernanceApi for GovernanceService<H> {
    #[instrument(
        name = "dao_invoke",
        skip(self, payload),
        fields(action = %action, tx = field::Empty, sender = field::Empty)
    )]
    fn invoke(&mut self, action: &str, payload: &str) -> Result<String, DaoError> {
        let env = self.store.begin();
        let span = Span::current();
        span.record("tx", env.tx_id.as_str());
        span.record("sender", env.sender.as_str());
        self.stats.calls += 1;

        let result = action
            .parse::<Action>()
            .and_then(|action| self.dispatch(action, payload));

        match result {
            Ok(message) => {
                self.stats.succeeded += 1;
                info!(%message, "call succeeded");
                Ok(message)
            }
            Err(err) => {
                self.stats.aborted += 1;
                warn!(kind = ?err.kind(), error = %err, "call rejected");
                self.store.host_mut().abort(&err.to_string());
                self.store.invalidate();
                Err(err)
            }
        }
    }
}
