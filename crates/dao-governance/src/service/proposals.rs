//! # Proposal Engine
//!
//! ```text
//! Active ──(tally, met, not poll)──▶ Passed ──(execute)──▶ Executed
//! Active ──(tally, met, poll)──────▶ Closed
//! Active ──(tally, not met)────────▶ Failed
//! Active ──(cancel)────────────────▶ Cancelled
//! ```
//!
//! Payout beneficiaries are locked from creation until the proposal is
//! tallied or cancelled.

use super::validation::{validate_option_text, validate_text, validate_url};
use super::GovernanceService;
use crate::domain::args::CreateProposalArgs;
use crate::domain::entities::{Proposal, ProposalOption, NO_RESULT};
use crate::domain::tally::{compute_tally, TallyInput};
use crate::domain::value_objects::{Amount, ProposalState, VotingSystem, SECONDS_PER_HOUR};
use crate::errors::DaoError;
use crate::events::Event;
use crate::keyspace::Counter;
use crate::ports::outbound::{ChainHost, Intent};
use tracing::{debug, info};

impl<H: ChainHost> GovernanceService<H> {
    fn release_payout_locks(&mut self, proposal: &Proposal) -> Result<(), DaoError> {
        if let Some(outcome) = &proposal.outcome {
            for address in outcome.distinct_payout_addresses() {
                self.store.decrement_payout_lock(proposal.project_id, &address)?;
            }
        }
        Ok(())
    }

    fn set_state(&mut self, proposal: &mut Proposal, next: ProposalState) {
        debug_assert!(proposal.state.can_transition_to(next));
        proposal.state = next;
        self.store.emit(&Event::ProposalState {
            proposal: proposal.id,
            state: next,
        });
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    /// Opens a proposal on a project.
    pub fn proposal_create(&mut self, args: CreateProposalArgs) -> Result<String, DaoError> {
        let env = self.store.env();
        let project = self.store.project(args.project_id)?;
        if project.meta.paused && !args.outcome.is_pause_override() {
            return Err(DaoError::ProjectPaused(project.id));
        }
        let creator = self.store.member(project.id, &env.sender)?;
        if project.config.proposals_members_only && creator.is_none() {
            return Err(DaoError::OnlyMembers {
                action: "create proposals",
            });
        }

        let limits = &self.config;
        validate_text("proposal name", &args.name, limits.max_name_len, true)?;
        validate_text("proposal description", &args.description, limits.max_description_len, false)?;
        validate_text("proposal metadata", &args.metadata, limits.max_metadata_len, false)?;
        validate_url(&args.url, limits.max_url_len)?;
        if args.options.len() > limits.max_options {
            return Err(DaoError::InvalidField {
                field: "options",
                reason: format!("at most {} options", limits.max_options),
            });
        }
        for option in &args.options {
            validate_option_text(&option.text, limits.max_option_text_len)?;
            validate_url(&option.url, limits.max_url_len)?;
        }

        let (options, is_poll) = if args.options.is_empty() {
            (
                vec![ProposalOption::new("no", ""), ProposalOption::new("yes", "")],
                args.force_poll.unwrap_or(false),
            )
        } else {
            (
                args.options
                    .iter()
                    .map(|o| ProposalOption::new(o.text.trim(), o.url.as_str()))
                    .collect(),
                args.force_poll.unwrap_or(true),
            )
        };

        let minimum = project.config.proposal_duration_hours;
        let duration_hours = match args.duration_hours {
            None => minimum,
            Some(requested) if requested >= minimum => requested,
            Some(requested) => return Err(DaoError::DurationTooShort { requested, minimum }),
        };
        if project.config.voting_system == VotingSystem::Stake && !project.finance.stake_total.is_positive() {
            return Err(DaoError::ZeroStakeTotal);
        }

        let cost = project.config.proposal_cost;
        if cost.is_positive() {
            self.store
                .draw_from_intent(&self.config, project.finance.funds_asset, cost)?;
            self.store
                .treasury_add(project.id, project.finance.funds_asset, cost)?;
        }

        let id = self.store.next_id(Counter::Proposal)?;
        let proposal = Proposal {
            id,
            project_id: project.id,
            creator: env.sender.clone(),
            name: args.name,
            description: args.description,
            option_count: options.len() as u32,
            duration_hours,
            created_at: env.timestamp,
            state: ProposalState::Active,
            outcome: (!args.outcome.is_empty()).then_some(args.outcome),
            tx: env.tx_id.clone(),
            stake_snapshot: project.finance.stake_total,
            member_count_snapshot: project.finance.member_count,
            metadata: args.metadata,
            url: args.url,
            is_poll,
            result_option_id: NO_RESULT,
            executable_at: 0,
            cost_paid: if cost.is_positive() { cost } else { Amount::ZERO },
            voter_count: 0,
        };
        self.store.save_proposal(&proposal)?;
        for (index, option) in options.iter().enumerate() {
            self.store.save_proposal_option(id, index as u32, option)?;
        }
        if let Some(outcome) = &proposal.outcome {
            for address in outcome.distinct_payout_addresses() {
                self.store.increment_payout_lock(project.id, &address)?;
            }
        }
        if let Some(mut member) = creator {
            member.last_action_at = env.timestamp;
            self.store.save_member(project.id, &member)?;
        }

        self.store.emit(&Event::ProposalCreated {
            proposal: id,
            project: project.id,
            creator: env.sender,
            options: proposal.option_count,
            is_poll,
        });
        info!(proposal = id, project = project.id, poll = is_poll, duration_hours, "proposal created");
        Ok(format!("proposal {id} created"))
    }

    // =========================================================================
    // TALLY
    // =========================================================================

    /// Closes voting and decides the proposal.
    pub fn proposal_tally(&mut self, proposal_id: u64) -> Result<String, DaoError> {
        let env = self.store.env();
        let mut proposal = self.store.proposal(proposal_id)?;
        if proposal.state != ProposalState::Active {
            return Err(DaoError::ProposalNotActive(proposal_id));
        }
        let ends_at = proposal.voting_ends_at();
        if env.timestamp < ends_at {
            return Err(DaoError::TallyTooEarly {
                id: proposal_id,
                ends_at,
            });
        }

        let config = self.store.project_config(proposal.project_id)?;
        let options = self.store.proposal_options(&proposal)?;
        let tally = compute_tally(&TallyInput {
            options: &options,
            receipt_count: proposal.voter_count,
            member_count_snapshot: proposal.member_count_snapshot,
            stake_snapshot: proposal.stake_snapshot.scaled(),
            voting_system: config.voting_system,
            threshold_percent: config.threshold_percent,
            quorum_percent: config.quorum_percent,
            is_poll: proposal.is_poll,
            quorum_policy: self.config.quorum_policy,
            tie_policy: self.config.tie_policy,
        });

        match tally.state {
            ProposalState::Passed => {
                proposal.result_option_id = tally.winning_option.map_or(NO_RESULT, i64::from);
                proposal.executable_at = proposal.created_at.saturating_add(
                    proposal
                        .duration_hours
                        .saturating_add(config.execution_delay_hours)
                        .saturating_mul(SECONDS_PER_HOUR),
                );
                self.store.emit(&Event::ExecutionDelay {
                    proposal: proposal_id,
                    executable_at: proposal.executable_at,
                });
            }
            ProposalState::Closed => {
                proposal.result_option_id = tally.winning_option.map_or(NO_RESULT, i64::from);
            }
            _ => proposal.result_option_id = NO_RESULT,
        }
        self.release_payout_locks(&proposal)?;
        self.set_state(&mut proposal, tally.state);
        self.store.save_proposal(&proposal)?;

        self.store.emit(&Event::ProposalTallied {
            proposal: proposal_id,
            state: tally.state,
            winning_option: proposal.result_option_id,
            winning_weight: tally.winning_weight,
            voters: tally.voters,
            quorum_required: tally.quorum_required,
        });
        info!(
            proposal = proposal_id,
            state = %tally.state,
            voters = tally.voters,
            quorum_met = tally.quorum_met,
            threshold_met = tally.threshold_met,
            tied = tally.tied,
            "proposal tallied"
        );
        Ok(format!("proposal {proposal_id} {}", tally.state))
    }

    // =========================================================================
    // EXECUTE
    // =========================================================================

    /// Applies a passed proposal: payouts, then meta directives, then
    /// inter-contract calls.
    pub fn proposal_execute(&mut self, proposal_id: u64) -> Result<String, DaoError> {
        let env = self.store.env();
        let mut proposal = self.store.proposal(proposal_id)?;
        match proposal.state {
            ProposalState::Passed => {}
            ProposalState::Executed => return Err(DaoError::AlreadyExecuted(proposal_id)),
            other => {
                return Err(DaoError::ProposalNotPassed {
                    id: proposal_id,
                    state: other.to_string(),
                })
            }
        }
        let project = self.store.project(proposal.project_id)?;
        if project.meta.paused && !proposal.is_pause_override() {
            return Err(DaoError::ProjectPaused(project.id));
        }
        if env.timestamp < proposal.executable_at {
            return Err(DaoError::ProposalNotReady {
                id: proposal_id,
                ready_at: proposal.executable_at,
            });
        }
        let outcome = proposal.outcome_or_default();
        if !outcome.calls.is_empty() && env.sender != proposal.creator {
            return Err(DaoError::OnlyCreator);
        }

        let mut funds_transferred = false;
        for payout in &outcome.payouts {
            let asset = payout.asset.unwrap_or(project.finance.funds_asset);
            self.store.treasury_take(project.id, asset, payout.amount)?;
            self.store
                .host_mut()
                .transfer(&payout.address, payout.amount, asset)?;
            self.store.emit(&Event::RemoveFunds {
                project: project.id,
                to: payout.address.to_string(),
                amount: payout.amount,
                asset,
            });
            funds_transferred = true;
        }

        let mut meta_changed = false;
        for (directive, value) in &outcome.meta {
            meta_changed |= self.apply_directive(project.id, directive, value)?;
        }
        if meta_changed {
            self.check_directive_result(project.id)?;
        }

        for call in &outcome.calls {
            let mut intents = Vec::with_capacity(call.assets.len());
            for (&asset, &amount) in &call.assets {
                self.store.treasury_take(project.id, asset, amount)?;
                intents.push(Intent::transfer_allow(asset, amount));
            }
            let response = self
                .store
                .host_mut()
                .contract_call(&call.contract, &call.function, &call.payload, &intents)?;
            debug!(contract = %call.contract, function = %call.function, %response, "contract call returned");
            for (&asset, &amount) in &call.assets {
                self.store.emit(&Event::RemoveFunds {
                    project: project.id,
                    to: call.contract.clone(),
                    amount,
                    asset,
                });
                funds_transferred = true;
            }
        }

        self.set_state(&mut proposal, ProposalState::Executed);
        self.store.save_proposal(&proposal)?;
        self.store.emit(&Event::ProposalResult {
            proposal: proposal_id,
            meta_changed,
            funds_transferred,
        });
        info!(proposal = proposal_id, meta_changed, funds_transferred, "proposal executed");
        Ok(format!("proposal {proposal_id} executed"))
    }

    // =========================================================================
    // CANCEL
    // =========================================================================

    /// Withdraws an active proposal. When the owner cancels someone else's
    /// proposal the creation cost is refunded if the treasury still holds it.
    pub fn proposal_cancel(&mut self, proposal_id: u64) -> Result<String, DaoError> {
        let env = self.store.env();
        let mut proposal = self.store.proposal(proposal_id)?;
        if proposal.state != ProposalState::Active {
            return Err(DaoError::ProposalNotActive(proposal_id));
        }
        let project = self.store.project(proposal.project_id)?;
        let is_creator = env.sender == proposal.creator;
        if !is_creator && env.sender != project.meta.owner {
            return Err(DaoError::OnlyCreatorOrOwner {
                action: "cancel a proposal",
            });
        }

        if !is_creator && proposal.cost_paid.is_positive() {
            let asset = project.finance.funds_asset;
            if self.store.treasury_remove(project.id, asset, proposal.cost_paid)? {
                let creator = proposal.creator.clone();
                self.store
                    .host_mut()
                    .transfer(&creator, proposal.cost_paid, asset)?;
                self.store.emit(&Event::RemoveFunds {
                    project: project.id,
                    to: creator.to_string(),
                    amount: proposal.cost_paid,
                    asset,
                });
            } else {
                debug!(proposal = proposal_id, "treasury short, cost stays with project");
            }
        }

        self.release_payout_locks(&proposal)?;
        proposal.result_option_id = NO_RESULT;
        proposal.executable_at = 0;
        self.set_state(&mut proposal, ProposalState::Cancelled);
        self.store.save_proposal(&proposal)?;
        info!(proposal = proposal_id, by = %env.sender, "proposal cancelled");
        Ok(format!("proposal {proposal_id} cancelled"))
    }
}
