//! # Voting
//!
//! Approval voting: the voter's full weight is added to every chosen option
//! and each chosen option counts the voter once. A receipt per
//! (proposal, voter) blocks re-voting.

use super::GovernanceService;
use crate::domain::args::VoteProposalArgs;
use crate::domain::entities::VoteReceipt;
use crate::domain::value_objects::{ProposalState, VotingSystem};
use crate::errors::DaoError;
use crate::events::Event;
use crate::keyspace::Counter;
use crate::ports::outbound::ChainHost;
use tracing::debug;

impl<H: ChainHost> GovernanceService<H> {
    /// Casts the caller's vote.
    pub fn proposals_vote(&mut self, args: VoteProposalArgs) -> Result<String, DaoError> {
        let env = self.store.env();
        let mut proposal = self.store.proposal(args.proposal_id)?;
        if proposal.state != ProposalState::Active {
            return Err(DaoError::ProposalNotActive(proposal.id));
        }
        let ends_at = proposal.voting_ends_at();
        if env.timestamp >= ends_at {
            return Err(DaoError::ProposalExpired {
                id: proposal.id,
                ended_at: ends_at,
            });
        }
        // Votes stay open while paused; execution is where the pause binds.
        let project = self.store.project(proposal.project_id)?;

        let mut member = self.store.require_member(project.id, &env.sender)?;
        if member.joined_at > proposal.created_at {
            return Err(DaoError::JoinedAfterCreation(proposal.id));
        }
        if self.store.vote_receipt(proposal.id, &env.sender)?.is_some() {
            return Err(DaoError::AlreadyVoted(proposal.id));
        }

        let mut choices: Vec<u32> = Vec::with_capacity(args.choices.len());
        for &choice in &args.choices {
            if choice >= proposal.option_count {
                return Err(DaoError::ChoiceOutOfRange {
                    choice,
                    options: proposal.option_count,
                });
            }
            if !choices.contains(&choice) {
                choices.push(choice);
            }
        }
        if choices.is_empty() {
            return Err(DaoError::EmptyChoices);
        }

        let weight = match project.config.voting_system {
            VotingSystem::Democratic => 1,
            VotingSystem::Stake => self
                .store
                .stake_at(project.id, &member, proposal.created_at)?
                .scaled(),
        };

        for &choice in &choices {
            let mut option = self.store.proposal_option(proposal.id, choice)?;
            option.weight_total = option.weight_total.saturating_add(weight);
            option.voter_count += 1;
            self.store.save_proposal_option(proposal.id, choice, &option)?;
        }

        let vote_id = self.store.next_id(Counter::Vote)?;
        self.store.save_vote_receipt(
            proposal.id,
            &env.sender,
            &VoteReceipt {
                vote_id,
                choices: choices.clone(),
                weight,
                timestamp: env.timestamp,
            },
        )?;
        proposal.voter_count += 1;
        self.store.save_proposal(&proposal)?;

        member.last_action_at = env.timestamp;
        member.reputation = member.reputation.saturating_add(1);
        self.store.save_member(project.id, &member)?;

        for &choice in &choices {
            self.store.emit(&Event::Vote {
                proposal: proposal.id,
                voter: env.sender.clone(),
                vote_id,
                choice,
                weight,
            });
        }
        debug!(proposal = proposal.id, voter = %env.sender, weight, ?choices, "vote recorded");
        Ok(format!("voted on proposal {}", proposal.id))
    }
}
