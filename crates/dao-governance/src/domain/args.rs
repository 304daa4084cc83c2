//! # Typed Arguments
//!
//! Entry-point arguments after the textual payload has been parsed and the
//! empty-field fallbacks applied.

use crate::domain::entities::ProposalOutcome;
use crate::domain::value_objects::{Address, Amount, Asset, VotingSystem};

/// `contract_init`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContractInitArgs {
    pub public_project_creation: bool,
}

/// `project_create`.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateProjectArgs {
    pub name: String,
    pub description: String,
    pub metadata: String,
    pub url: String,
    pub voting_system: VotingSystem,
    pub threshold_percent: f64,
    pub quorum_percent: f64,
    pub proposal_duration_hours: u64,
    pub execution_delay_hours: u64,
    pub leave_cooldown_hours: u64,
    pub proposal_cost: Amount,
    pub minimum_stake: Amount,
    pub membership_nft_contract: Option<String>,
    pub membership_nft_function: Option<String>,
    pub membership_nft_id: Option<String>,
    pub membership_nft_payload: String,
    pub proposals_members_only: bool,
    pub whitelist_only: bool,
}

/// One option as supplied by the proposer.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ProposalOptionArg {
    pub text: String,
    pub url: String,
}

/// `proposal_create`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CreateProposalArgs {
    pub project_id: u64,
    pub name: String,
    pub description: String,
    /// `None` takes the project duration.
    pub duration_hours: Option<u64>,
    /// Empty means the default `no`/`yes` pair.
    pub options: Vec<ProposalOptionArg>,
    /// `None` applies the default poll rule.
    pub force_poll: Option<bool>,
    pub url: String,
    pub metadata: String,
    pub outcome: ProposalOutcome,
}

/// `proposals_vote`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteProposalArgs {
    pub proposal_id: u64,
    /// Deduplicated option indices.
    pub choices: Vec<u32>,
}

/// `project_funds`, completed with the resolved intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddFundsArgs {
    pub project_id: u64,
    pub amount: Amount,
    pub asset: Asset,
    pub to_stake: bool,
}

/// `project_whitelist_add` / `project_whitelist_remove`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhitelistArgs {
    pub project_id: u64,
    pub addresses: Vec<Address>,
}

/// `project_pause`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PauseArgs {
    pub project_id: u64,
    pub paused: bool,
}

/// `project_transfer`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferOwnershipArgs {
    pub project_id: u64,
    pub new_owner: Address,
}
