//! # Core Domain Entities
//!
//! Records persisted in the host key-value store. Each type maps to one key
//! family in [`crate::keyspace`] and one encoding in [`crate::codec`].

use crate::domain::value_objects::{
    Address, Amount, Asset, ProposalState, VotingSystem, SECONDS_PER_HOUR,
};
use std::collections::BTreeMap;

/// Outcome meta keys that may pass a paused project.
pub const PAUSE_OVERRIDE_DIRECTIVES: [&str; 2] = ["toggle_pause", "update_owner"];

/// Placeholder substituted with the configured NFT id.
pub const NFT_PLACEHOLDER: &str = "{nft}";

/// Placeholder substituted with the caller address.
pub const CALLER_PLACEHOLDER: &str = "{caller}";

/// Result option id meaning "no winner recorded".
pub const NO_RESULT: i64 = -1;

// =============================================================================
// CONTRACT
// =============================================================================

/// Contract-wide singleton written by `contract_init`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractConfig {
    /// Address that initialized the contract.
    pub owner: Address,
    /// Whether anyone may create projects.
    pub public_project_creation: bool,
}

// =============================================================================
// PROJECT
// =============================================================================

/// Descriptive half of a project.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ProjectMeta {
    pub owner: Address,
    pub name: String,
    pub description: String,
    pub paused: bool,
    pub creation_tx: String,
    pub metadata: String,
    /// Appended field.
    pub url: String,
}

/// Governance parameters of a project.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectConfig {
    pub voting_system: VotingSystem,
    /// Percent of the snapshot denominator the winning option needs.
    pub threshold_percent: f64,
    /// Percent of the member snapshot that must vote.
    pub quorum_percent: f64,
    pub proposal_duration_hours: u64,
    pub execution_delay_hours: u64,
    pub leave_cooldown_hours: u64,
    pub proposal_cost: Amount,
    pub minimum_stake: Amount,
    pub membership_nft_contract: Option<String>,
    pub membership_nft_function: Option<String>,
    pub membership_nft_id: Option<String>,
    /// Call payload template with `{nft}` and `{caller}`.
    pub membership_nft_payload: String,
    pub proposals_members_only: bool,
    /// Appended field.
    pub whitelist_only: bool,
}

impl ProjectConfig {
    /// True when join must pass the NFT oracle.
    #[must_use]
    pub fn has_nft_gate(&self) -> bool {
        self.membership_nft_contract
            .as_deref()
            .is_some_and(|c| !c.is_empty())
    }

    /// Renders the NFT oracle payload for `caller`.
    #[must_use]
    pub fn nft_payload_for(&self, caller: &Address) -> String {
        self.membership_nft_payload
            .replace(NFT_PLACEHOLDER, self.membership_nft_id.as_deref().unwrap_or(""))
            .replace(CALLER_PLACEHOLDER, caller.as_str())
    }
}

/// Balances that change with membership.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectFinance {
    /// Asset used for proposal cost, stakes and legacy payouts.
    pub funds_asset: Asset,
    pub stake_total: Amount,
    pub member_count: u64,
}

/// A project loaded as all three co-keyed records.
#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    pub id: u64,
    pub meta: ProjectMeta,
    pub config: ProjectConfig,
    pub finance: ProjectFinance,
}

// =============================================================================
// MEMBER
// =============================================================================

/// A project member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub address: Address,
    pub stake: Amount,
    pub joined_at: u64,
    pub last_action_at: u64,
    /// Zero when no exit is pending.
    pub exit_requested: u64,
    pub reputation: i64,
    /// Highest stake-history increment. Appended field.
    pub stake_increment: u64,
}

impl Member {
    /// A fresh member at increment zero.
    #[must_use]
    pub fn new(address: Address, stake: Amount, now: u64) -> Self {
        Self {
            address,
            stake,
            joined_at: now,
            last_action_at: now,
            exit_requested: 0,
            reputation: 0,
            stake_increment: 0,
        }
    }
}

/// Stake value that became current at `timestamp`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakeHistoryEntry {
    pub stake: Amount,
    pub timestamp: u64,
}

// =============================================================================
// PROPOSAL
// =============================================================================

/// One payout made on execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayoutEntry {
    pub address: Address,
    pub amount: Amount,
    /// `None` falls back to the project funds-asset.
    pub asset: Option<Asset>,
}

/// One host-mediated call made on execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterContractCall {
    pub contract: String,
    pub function: String,
    /// Opaque to the engine.
    pub payload: String,
    pub assets: BTreeMap<Asset, Amount>,
}

/// Effects applied when a proposal executes.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ProposalOutcome {
    /// Directive name to value; iterated in key order.
    pub meta: BTreeMap<String, String>,
    pub payouts: Vec<PayoutEntry>,
    /// Appended field.
    pub calls: Vec<InterContractCall>,
}

impl ProposalOutcome {
    /// True when the outcome is a single pause-override directive.
    #[must_use]
    pub fn is_pause_override(&self) -> bool {
        self.meta.len() == 1
            && self
                .meta
                .keys()
                .all(|k| PAUSE_OVERRIDE_DIRECTIVES.contains(&k.as_str()))
    }

    /// Payout addresses with duplicates removed, in first-seen order.
    #[must_use]
    pub fn distinct_payout_addresses(&self) -> Vec<Address> {
        let mut seen: Vec<Address> = Vec::new();
        for payout in &self.payouts {
            if !seen.contains(&payout.address) {
                seen.push(payout.address.clone());
            }
        }
        seen
    }

    /// True when nothing would happen on execution.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meta.is_empty() && self.payouts.is_empty() && self.calls.is_empty()
    }
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proposal {
    pub id: u64,
    pub project_id: u64,
    pub creator: Address,
    pub name: String,
    pub description: String,
    pub option_count: u32,
    pub duration_hours: u64,
    pub created_at: u64,
    pub state: ProposalState,
    pub outcome: Option<ProposalOutcome>,
    pub tx: String,
    pub stake_snapshot: Amount,
    pub member_count_snapshot: u64,
    pub metadata: String,
    // Appended fields, in order.
    pub url: String,
    pub is_poll: bool,
    /// [`NO_RESULT`] when no winner is recorded.
    pub result_option_id: i64,
    pub executable_at: u64,
    /// Cost drawn from the creator at creation.
    pub cost_paid: Amount,
    /// Number of vote receipts.
    pub voter_count: u64,
}

impl Proposal {
    /// End of the voting window.
    #[must_use]
    pub fn voting_ends_at(&self) -> u64 {
        self.created_at
            .saturating_add(self.duration_hours.saturating_mul(SECONDS_PER_HOUR))
    }

    /// Outcome, or an empty one.
    #[must_use]
    pub fn outcome_or_default(&self) -> ProposalOutcome {
        self.outcome.clone().unwrap_or_default()
    }

    /// True when the outcome is a pause override.
    #[must_use]
    pub fn is_pause_override(&self) -> bool {
        self.outcome
            .as_ref()
            .is_some_and(ProposalOutcome::is_pause_override)
    }
}

/// A choice on a proposal with its running totals.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ProposalOption {
    pub text: String,
    pub url: String,
    pub weight_total: i64,
    pub voter_count: u64,
}

impl ProposalOption {
    /// An option with no votes.
    #[must_use]
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
            weight_total: 0,
            voter_count: 0,
        }
    }
}

/// Proof that a voter has voted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteReceipt {
    pub vote_id: u64,
    pub choices: Vec<u32>,
    pub weight: i64,
    /// Appended field.
    pub timestamp: u64,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    #[test]
    fn test_pause_override_detection() {
        let mut outcome = ProposalOutcome::default();
        assert!(!outcome.is_pause_override());

        outcome.meta.insert("toggle_pause".into(), String::new());
        assert!(outcome.is_pause_override());

        outcome.meta.insert("update_quorum".into(), "60".into());
        assert!(!outcome.is_pause_override());

        let mut owner_only = ProposalOutcome::default();
        owner_only
            .meta
            .insert("update_owner".into(), "hive:bob".into());
        assert!(owner_only.is_pause_override());
    }

    #[test]
    fn test_distinct_payout_addresses() {
        let outcome = ProposalOutcome {
            payouts: vec![
                PayoutEntry {
                    address: addr("hive:alice"),
                    amount: Amount::from_units(1),
                    asset: Some(Asset::Hive),
                },
                PayoutEntry {
                    address: addr("hive:bob"),
                    amount: Amount::from_units(1),
                    asset: None,
                },
                PayoutEntry {
                    address: addr("hive:alice"),
                    amount: Amount::from_units(2),
                    asset: Some(Asset::Hbd),
                },
            ],
            ..ProposalOutcome::default()
        };
        assert_eq!(
            outcome.distinct_payout_addresses(),
            vec![addr("hive:alice"), addr("hive:bob")]
        );
    }

    #[test]
    fn test_nft_payload_rendering() {
        let config = ProjectConfig {
            voting_system: VotingSystem::Democratic,
            threshold_percent: 50.0,
            quorum_percent: 50.0,
            proposal_duration_hours: 1,
            execution_delay_hours: 1,
            leave_cooldown_hours: 1,
            proposal_cost: Amount::ZERO,
            minimum_stake: Amount::ZERO,
            membership_nft_contract: Some("contract:nft".into()),
            membership_nft_function: Some("owns".into()),
            membership_nft_id: Some("42".into()),
            membership_nft_payload: "{nft}|{caller}".into(),
            proposals_members_only: true,
            whitelist_only: false,
        };
        assert!(config.has_nft_gate());
        assert_eq!(config.nft_payload_for(&addr("hive:carol")), "42|hive:carol");
    }
}
