//! # Tally
//!
//! Pure pass/fail computation over a proposal's option totals. No storage
//! access; the proposal service feeds it loaded records.

use crate::domain::entities::ProposalOption;
use crate::domain::value_objects::{ProposalState, VotingSystem};
use serde::{Deserialize, Serialize};

// =============================================================================
// POLICIES
// =============================================================================

/// How the quorum numerator is counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumPolicy {
    /// Each vote receipt counts once.
    #[default]
    DistinctVoters,
    /// Sum of per-option voter counts; a multi-choice voter counts per option.
    OptionVoterSum,
}

/// What happens when several options share the top weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// First option in index order wins.
    #[default]
    LowestIndex,
    /// A tie at the top fails the proposal.
    Fail,
}

// =============================================================================
// INPUT / OUTPUT
// =============================================================================

/// Everything the tally needs.
#[derive(Clone, Debug)]
pub struct TallyInput<'a> {
    pub options: &'a [ProposalOption],
    /// Number of vote receipts on the proposal.
    pub receipt_count: u64,
    pub member_count_snapshot: u64,
    /// Scaled stake total at creation.
    pub stake_snapshot: i64,
    pub voting_system: VotingSystem,
    pub threshold_percent: f64,
    pub quorum_percent: f64,
    pub is_poll: bool,
    pub quorum_policy: QuorumPolicy,
    pub tie_policy: TiePolicy,
}

/// Result of a tally.
#[derive(Clone, Debug, PartialEq)]
pub struct TallyOutcome {
    pub state: ProposalState,
    /// Index of the winning option, if any option has weight.
    pub winning_option: Option<u32>,
    pub winning_weight: i64,
    pub total_weight: i64,
    pub voters: u64,
    pub quorum_required: u64,
    pub quorum_met: bool,
    pub threshold_met: bool,
    pub tied: bool,
}

// =============================================================================
// COMPUTATION
// =============================================================================

/// Minimum voter count for `quorum_percent` of `members`.
#[must_use]
pub fn quorum_required(members: u64, quorum_percent: f64) -> u64 {
    let required = (members as f64 * quorum_percent / 100.0).ceil();
    if required <= 0.0 {
        0
    } else {
        required as u64
    }
}

/// Runs the tally.
///
/// The winner is the first option whose weight strictly exceeds the running
/// best, so equal weights resolve to the lowest index. The threshold
/// denominator is the stake snapshot for stake voting and the member snapshot
/// for democratic voting.
#[must_use]
pub fn compute_tally(input: &TallyInput<'_>) -> TallyOutcome {
    let mut total_weight: i64 = 0;
    let mut best: Option<(u32, i64)> = None;
    let mut tied = false;

    for (index, option) in input.options.iter().enumerate() {
        total_weight = total_weight.saturating_add(option.weight_total);
        if option.weight_total <= 0 {
            continue;
        }
        match best {
            Some((_, weight)) if option.weight_total > weight => {
                best = Some((index as u32, option.weight_total));
                tied = false;
            }
            Some((_, weight)) if option.weight_total == weight => tied = true,
            Some(_) => {}
            None => best = Some((index as u32, option.weight_total)),
        }
    }

    let voters = match input.quorum_policy {
        QuorumPolicy::DistinctVoters => input.receipt_count,
        QuorumPolicy::OptionVoterSum => input.options.iter().map(|o| o.voter_count).sum(),
    };
    let required = quorum_required(input.member_count_snapshot, input.quorum_percent);
    let quorum_met = input.member_count_snapshot > 0 && voters >= required;

    let denominator = match input.voting_system {
        VotingSystem::Stake => input.stake_snapshot,
        VotingSystem::Democratic => i64::try_from(input.member_count_snapshot).unwrap_or(i64::MAX),
    };
    let winning_weight = best.map_or(0, |(_, w)| w);
    let threshold_met = denominator > 0
        && winning_weight > 0
        && (winning_weight as f64) * 100.0 >= input.threshold_percent * denominator as f64;

    let tie_blocks = tied && input.tie_policy == TiePolicy::Fail;
    let state = if quorum_met && threshold_met && !tie_blocks {
        if input.is_poll {
            ProposalState::Closed
        } else {
            ProposalState::Passed
        }
    } else {
        ProposalState::Failed
    };

    TallyOutcome {
        state,
        winning_option: best.map(|(i, _)| i),
        winning_weight,
        total_weight,
        voters,
        quorum_required: required,
        quorum_met,
        threshold_met,
        tied,
    }
}

// =============================================================================
// TESTS
// =============================================================================
