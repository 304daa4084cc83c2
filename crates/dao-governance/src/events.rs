//! # Event Schema
//!
//! Governance events appended to the host log sink. Each renders as
//! `Event|key:value|...` with keys in a fixed order per event, so the log is
//! byte-identical across nodes.

use crate::domain::value_objects::{Address, Amount, Asset, ProposalState};
use std::fmt;

/// Log events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    ProjectCreated {
        project: u64,
        owner: Address,
        name: String,
    },
    MemberJoined {
        project: u64,
        address: Address,
        stake: Amount,
    },
    ExitRequested {
        project: u64,
        address: Address,
        ready_at: u64,
    },
    MemberLeft {
        project: u64,
        address: Address,
        refund: Amount,
    },
    AddFunds {
        project: u64,
        from: Address,
        amount: Amount,
        asset: Asset,
        to_stake: bool,
    },
    RemoveFunds {
        project: u64,
        to: String,
        amount: Amount,
        asset: Asset,
    },
    WhitelistAdd {
        project: u64,
        address: Address,
    },
    WhitelistRemove {
        project: u64,
        address: Address,
    },
    ConfigUpdated {
        project: u64,
        field: String,
        value: String,
    },
    ProposalCreated {
        proposal: u64,
        project: u64,
        creator: Address,
        options: u32,
        is_poll: bool,
    },
    ProposalState {
        proposal: u64,
        state: ProposalState,
    },
    ProposalTallied {
        proposal: u64,
        state: ProposalState,
        winning_option: i64,
        winning_weight: i64,
        voters: u64,
        quorum_required: u64,
    },
    Vote {
        proposal: u64,
        voter: Address,
        vote_id: u64,
        choice: u32,
        weight: i64,
    },
    ExecutionDelay {
        proposal: u64,
        executable_at: u64,
    },
    ProposalResult {
        proposal: u64,
        meta_changed: bool,
        funds_transferred: bool,
    },
}

impl Event {
    /// Event name, the first pipe field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ProjectCreated { .. } => "ProjectCreated",
            Self::MemberJoined { .. } => "MemberJoined",
            Self::ExitRequested { .. } => "ExitRequested",
            Self::MemberLeft { .. } => "MemberLeft",
            Self::AddFunds { .. } => "AddFunds",
            Self::RemoveFunds { .. } => "RemoveFunds",
            Self::WhitelistAdd { .. } => "WhitelistAdd",
            Self::WhitelistRemove { .. } => "WhitelistRemove",
            Self::ConfigUpdated { .. } => "ConfigUpdated",
            Self::ProposalCreated { .. } => "ProposalCreated",
            Self::ProposalState { .. } => "ProposalState",
            Self::ProposalTallied { .. } => "ProposalTallied",
            Self::Vote { .. } => "Vote",
            Self::ExecutionDelay { .. } => "ExecutionDelay",
            Self::ProposalResult { .. } => "ProposalResult",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::ProjectCreated {
                project,
                owner,
                name,
            } => vec![
                ("id", project.to_string()),
                ("owner", owner.to_string()),
                ("name", name.clone()),
            ],
            Self::MemberJoined {
                project,
                address,
                stake,
            } => vec![
                ("id", project.to_string()),
                ("by", address.to_string()),
                ("stake", stake.to_string()),
            ],
            Self::ExitRequested {
                project,
                address,
                ready_at,
            } => vec![
                ("id", project.to_string()),
                ("by", address.to_string()),
                ("readyAt", ready_at.to_string()),
            ],
            Self::MemberLeft {
                project,
                address,
                refund,
            } => vec![
                ("id", project.to_string()),
                ("by", address.to_string()),
                ("refund", refund.to_string()),
            ],
            Self::AddFunds {
                project,
                from,
                amount,
                asset,
                to_stake,
            } => vec![
                ("id", project.to_string()),
                ("by", from.to_string()),
                ("amount", amount.to_string()),
                ("asset", asset.to_string()),
                ("toStake", to_stake.to_string()),
            ],
            Self::RemoveFunds {
                project,
                to,
                amount,
                asset,
            } => vec![
                ("id", project.to_string()),
                ("to", to.clone()),
                ("amount", amount.to_string()),
                ("asset", asset.to_string()),
            ],
            Self::WhitelistAdd { project, address } | Self::WhitelistRemove { project, address } => {
                vec![("id", project.to_string()), ("address", address.to_string())]
            }
            Self::ConfigUpdated {
                project,
                field,
                value,
            } => vec![
                ("id", project.to_string()),
                ("field", field.clone()),
                ("value", value.clone()),
            ],
            Self::ProposalCreated {
                proposal,
                project,
                creator,
                options,
                is_poll,
            } => vec![
                ("id", proposal.to_string()),
                ("projectId", project.to_string()),
                ("by", creator.to_string()),
                ("options", options.to_string()),
                ("poll", is_poll.to_string()),
            ],
            Self::ProposalState { proposal, state } => {
                vec![("id", proposal.to_string()), ("state", state.to_string())]
            }
            Self::ProposalTallied {
                proposal,
                state,
                winning_option,
                winning_weight,
                voters,
                quorum_required,
            } => vec![
                ("id", proposal.to_string()),
                ("state", state.to_string()),
                ("winner", winning_option.to_string()),
                ("weight", winning_weight.to_string()),
                ("voters", voters.to_string()),
                ("quorum", quorum_required.to_string()),
            ],
            Self::Vote {
                proposal,
                voter,
                vote_id,
                choice,
                weight,
            } => vec![
                ("id", proposal.to_string()),
                ("by", voter.to_string()),
                ("voteId", vote_id.to_string()),
                ("choice", choice.to_string()),
                ("weight", weight.to_string()),
            ],
            Self::ExecutionDelay {
                proposal,
                executable_at,
            } => vec![
                ("id", proposal.to_string()),
                ("executableAt", executable_at.to_string()),
            ],
            Self::ProposalResult {
                proposal,
                meta_changed,
                funds_transferred,
            } => vec![
                ("id", proposal.to_string()),
                ("metaChanged", meta_changed.to_string()),
                ("fundsTransferred", funds_transferred.to_string()),
            ],
        }
    }
}

/// Pipes or newlines inside a value would break field splitting.
fn sanitize(value: &str) -> String {
    value.replace(['|', '\n'], " ")
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        for (key, value) in self.fields() {
            write!(f, "|{key}:{}", sanitize(&value))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_vote() {
        let event = Event::Vote {
            proposal: 3,
            voter: Address::parse("hive:bob").unwrap(),
            vote_id: 9,
            choice: 1,
            weight: 3000,
        };
        assert_eq!(
            event.to_string(),
            "Vote|id:3|by:hive:bob|voteId:9|choice:1|weight:3000"
        );
    }

    #[test]
    fn test_render_sanitizes_pipes() {
        let event = Event::ConfigUpdated {
            project: 1,
            field: "membershipNftPayload".into(),
            value: "{nft}|{caller}".into(),
        };
        assert_eq!(
            event.to_string(),
            "ConfigUpdated|id:1|field:membershipNftPayload|value:{nft} {caller}"
        );
    }
}
