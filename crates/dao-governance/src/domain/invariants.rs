//! # Domain Invariants
//!
//! Checks over loaded records. The service enforces these on the write path;
//! the functions here let callers audit a project after the fact.

use crate::domain::entities::{Member, Proposal, ProjectFinance, StakeHistoryEntry};
use crate::domain::value_objects::{Amount, ProposalState, SECONDS_PER_HOUR};
use std::fmt;

/// A broken invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Finance member count differs from the member records.
    MemberCountMismatch { recorded: u64, actual: u64 },
    /// Finance stake total differs from the sum of member stakes.
    StakeTotalMismatch { recorded: Amount, actual: Amount },
    /// Highest history increment differs from the member counter.
    StakeIncrementMismatch { member: String, increment: u64, history_len: u64 },
    /// History timestamps go backwards.
    StakeHistoryNotMonotonic { member: String, increment: u64 },
    /// Last history entry differs from the current stake.
    StakeHistoryStale { member: String },
    /// Treasury went negative.
    NegativeTreasury { asset: String, balance: Amount },
    /// Passed proposal executable too early.
    ExecutableTooEarly { proposal: u64, executable_at: u64, minimum: u64 },
    /// More receipts than members at creation.
    TooManyVoters { proposal: u64, voters: u64, members: u64 },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MemberCountMismatch { recorded, actual } => {
                write!(f, "member count {recorded} != {actual} member records")
            }
            Self::StakeTotalMismatch { recorded, actual } => {
                write!(f, "stake total {recorded} != member stake sum {actual}")
            }
            Self::StakeIncrementMismatch {
                member,
                increment,
                history_len,
            } => write!(
                f,
                "{member}: stake increment {increment} but {history_len} history entries"
            ),
            Self::StakeHistoryNotMonotonic { member, increment } => {
                write!(f, "{member}: history timestamp decreases at {increment}")
            }
            Self::StakeHistoryStale { member } => {
                write!(f, "{member}: latest history entry differs from stake")
            }
            Self::NegativeTreasury { asset, balance } => {
                write!(f, "treasury {asset} negative: {balance}")
            }
            Self::ExecutableTooEarly {
                proposal,
                executable_at,
                minimum,
            } => write!(
                f,
                "proposal {proposal} executable at {executable_at} < {minimum}"
            ),
            Self::TooManyVoters {
                proposal,
                voters,
                members,
            } => write!(f, "proposal {proposal}: {voters} voters > {members} members"),
        }
    }
}

/// Member count and stake total agree with the member records.
#[must_use]
pub fn check_project_totals(finance: &ProjectFinance, members: &[Member]) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let actual_count = members.len() as u64;
    if finance.member_count != actual_count {
        violations.push(InvariantViolation::MemberCountMismatch {
            recorded: finance.member_count,
            actual: actual_count,
        });
    }
    let actual_stake = Amount::from_scaled(members.iter().map(|m| m.stake.scaled()).sum());
    if finance.stake_total != actual_stake {
        violations.push(InvariantViolation::StakeTotalMismatch {
            recorded: finance.stake_total,
            actual: actual_stake,
        });
    }
    violations
}

/// History covers 0..=increment, is monotonic, and ends at the current stake.
#[must_use]
pub fn check_stake_history(member: &Member, history: &[StakeHistoryEntry]) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let name = member.address.to_string();
    if history.len() as u64 != member.stake_increment + 1 {
        violations.push(InvariantViolation::StakeIncrementMismatch {
            member: name.clone(),
            increment: member.stake_increment,
            history_len: history.len() as u64,
        });
    }
    for (i, pair) in history.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            violations.push(InvariantViolation::StakeHistoryNotMonotonic {
                member: name.clone(),
                increment: i as u64 + 1,
            });
        }
    }
    if history.last().map(|e| e.stake) != Some(member.stake) {
        violations.push(InvariantViolation::StakeHistoryStale { member: name });
    }
    violations
}

/// Timing and participation bounds of a tallied proposal.
#[must_use]
pub fn check_proposal(proposal: &Proposal, execution_delay_hours: u64) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    if matches!(proposal.state, ProposalState::Passed | ProposalState::Executed) {
        let minimum = proposal.created_at.saturating_add(
            proposal
                .duration_hours
                .saturating_add(execution_delay_hours)
                .saturating_mul(SECONDS_PER_HOUR),
        );
        if proposal.executable_at < minimum {
            violations.push(InvariantViolation::ExecutableTooEarly {
                proposal: proposal.id,
                executable_at: proposal.executable_at,
                minimum,
            });
        }
    }
    if proposal.voter_count > proposal.member_count_snapshot {
        violations.push(InvariantViolation::TooManyVoters {
            proposal: proposal.id,
            voters: proposal.voter_count,
            members: proposal.member_count_snapshot,
        });
    }
    violations
}

/// Treasury balance is non-negative.
#[must_use]
pub fn check_treasury(asset: &str, balance: Amount) -> Option<InvariantViolation> {
    (balance.scaled() < 0).then(|| InvariantViolation::NegativeTreasury {
        asset: asset.to_string(),
        balance,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Address, Asset};

    fn member(name: &str, stake: i64, increment: u64) -> Member {
        Member {
            stake_increment: increment,
            ..Member::new(Address::parse(name).unwrap(), Amount::from_scaled(stake), 0)
        }
    }

    #[test]
    fn test_project_totals() {
        let members = vec![member("hive:a", 2_000, 0), member("hive:b", 3_000, 0)];
        let good = ProjectFinance {
            funds_asset: Asset::Hive,
            stake_total: Amount::from_scaled(5_000),
            member_count: 2,
        };
        assert!(check_project_totals(&good, &members).is_empty());

        let bad = ProjectFinance {
            member_count: 3,
            ..good
        };
        assert_eq!(check_project_totals(&bad, &members).len(), 1);
    }

    #[test]
    fn test_stake_history_checks() {
        let m = member("hive:a", 3_000, 1);
        let history = [
            StakeHistoryEntry {
                stake: Amount::from_scaled(1_000),
                timestamp: 10,
            },
            StakeHistoryEntry {
                stake: Amount::from_scaled(3_000),
                timestamp: 20,
            },
        ];
        assert!(check_stake_history(&m, &history).is_empty());

        let backwards = [history[1], history[0]];
        let violations = check_stake_history(&m, &backwards);
        assert!(violations
            .iter()
            .any(|v| matches!(v, InvariantViolation::StakeHistoryNotMonotonic { .. })));
    }

    #[test]
    fn test_negative_treasury() {
        assert!(check_treasury("hive", Amount::ZERO).is_none());
        assert!(check_treasury("hive", Amount::from_scaled(-1)).is_some());
    }
}
