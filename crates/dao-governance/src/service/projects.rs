//! Project lifecycle: creation, funding, pause and ownership transfer.

use super::validation::validate_create_project;
use super::GovernanceService;
use crate::domain::args::{AddFundsArgs, CreateProjectArgs, PauseArgs, TransferOwnershipArgs};
use crate::domain::entities::{ProjectConfig, ProjectFinance, ProjectMeta};
use crate::domain::value_objects::{Address, Amount, VotingSystem};
use crate::errors::DaoError;
use crate::events::Event;
use crate::keyspace::Counter;
use crate::ports::outbound::ChainHost;
use tracing::info;

/// Fails unless `caller` owns the project.
pub(super) fn require_owner(meta: &ProjectMeta, caller: &Address, action: &'static str) -> Result<(), DaoError> {
    if &meta.owner == caller {
        Ok(())
    } else {
        Err(DaoError::OnlyOwner { action })
    }
}

impl<H: ChainHost> GovernanceService<H> {
    /// Creates a project. The caller becomes its owner and first member,
    /// staking under the same rule as a join.
    pub fn project_create(&mut self, args: CreateProjectArgs) -> Result<String, DaoError> {
        let env = self.store.env();
        let contract = self.store.contract_config()?.ok_or(DaoError::NotInitialized)?;
        if !contract.public_project_creation && contract.owner != env.sender {
            return Err(DaoError::OnlyOwner {
                action: "create projects",
            });
        }
        validate_create_project(&args, &self.config)?;

        let (funds_asset, stake) =
            self.take_entry_stake(args.voting_system, args.minimum_stake, None)?;
        let id = self.store.next_id(Counter::Project)?;

        let meta = ProjectMeta {
            owner: env.sender.clone(),
            name: args.name,
            description: args.description,
            paused: false,
            creation_tx: env.tx_id.clone(),
            metadata: args.metadata,
            url: args.url,
        };
        let config = ProjectConfig {
            voting_system: args.voting_system,
            threshold_percent: args.threshold_percent,
            quorum_percent: args.quorum_percent,
            proposal_duration_hours: args.proposal_duration_hours,
            execution_delay_hours: args.execution_delay_hours,
            leave_cooldown_hours: args.leave_cooldown_hours,
            proposal_cost: args.proposal_cost,
            minimum_stake: args.minimum_stake,
            membership_nft_contract: args.membership_nft_contract,
            membership_nft_function: args.membership_nft_function,
            membership_nft_id: args.membership_nft_id,
            membership_nft_payload: args.membership_nft_payload,
            proposals_members_only: args.proposals_members_only,
            whitelist_only: args.whitelist_only,
        };
        self.store.save_project_meta(id, &meta)?;
        self.store.save_project_config(id, &config)?;
        self.store.save_project_finance(
            id,
            &ProjectFinance {
                funds_asset,
                stake_total: Amount::ZERO,
                member_count: 0,
            },
        )?;
        self.store.create_member(id, &env.sender, stake, env.timestamp)?;

        self.store.emit(&Event::ProjectCreated {
            project: id,
            owner: env.sender.clone(),
            name: meta.name.clone(),
        });
        self.store.emit(&Event::MemberJoined {
            project: id,
            address: env.sender,
            stake,
        });
        info!(project = id, name = %meta.name, voting = %config.voting_system, %funds_asset, "project created");
        Ok(format!("project {id} created"))
    }

    /// Adds the intent's full remaining allowance either to the treasury or,
    /// with `to_stake`, to the caller's stake.
    pub fn project_funds(&mut self, project_id: u64, to_stake: bool) -> Result<String, DaoError> {
        let env = self.store.env();
        let project = self.store.project(project_id)?;
        if project.meta.paused {
            return Err(DaoError::ProjectPaused(project_id));
        }
        let budget = self
            .store
            .transfer_intent(&self.config)?
            .ok_or_else(|| DaoError::MissingIntent {
                asset: project.finance.funds_asset.to_string(),
            })?;
        let args = AddFundsArgs {
            project_id,
            amount: budget.remaining(),
            asset: budget.asset,
            to_stake,
        };
        if !args.amount.is_positive() {
            return Err(DaoError::InvalidAmount(args.amount.to_string()));
        }

        if args.to_stake {
            if project.config.voting_system != VotingSystem::Stake {
                return Err(DaoError::InvalidField {
                    field: "toStake",
                    reason: "project is not stake-based".to_string(),
                });
            }
            let mut member = self.store.require_member(project_id, &env.sender)?;
            if args.asset != project.finance.funds_asset {
                return Err(DaoError::IntentAssetMismatch {
                    expected: project.finance.funds_asset.to_string(),
                    found: args.asset.to_string(),
                });
            }
            self.store.draw_from_intent(&self.config, args.asset, args.amount)?;
            let stake = member
                .stake
                .checked_add(args.amount)
                .ok_or_else(|| DaoError::InvalidAmount(args.amount.to_string()))?;
            member.last_action_at = env.timestamp;
            self.store.change_stake(project_id, &mut member, stake, env.timestamp)?;
        } else {
            self.store.draw_from_intent(&self.config, args.asset, args.amount)?;
            self.store.treasury_add(project_id, args.asset, args.amount)?;
            if let Some(mut member) = self.store.member(project_id, &env.sender)? {
                member.last_action_at = env.timestamp;
                self.store.save_member(project_id, &member)?;
            }
        }

        self.store.emit(&Event::AddFunds {
            project: project_id,
            from: env.sender,
            amount: args.amount,
            asset: args.asset,
            to_stake: args.to_stake,
        });
        Ok(format!("added {} {} to project {project_id}", args.amount, args.asset))
    }

    /// Owner-only pause switch.
    pub fn project_pause(&mut self, args: PauseArgs) -> Result<String, DaoError> {
        let env = self.store.env();
        let mut meta = self.store.project_meta(args.project_id)?;
        require_owner(&meta, &env.sender, "pause the project")?;
        meta.paused = args.paused;
        self.store.save_project_meta(args.project_id, &meta)?;
        self.store.emit(&Event::ConfigUpdated {
            project: args.project_id,
            field: "paused".to_string(),
            value: args.paused.to_string(),
        });
        info!(project = args.project_id, paused = args.paused, "pause toggled");
        Ok(format!("project {} paused={}", args.project_id, args.paused))
    }

    /// Owner-only ownership transfer to an existing member.
    pub fn project_transfer(&mut self, args: TransferOwnershipArgs) -> Result<String, DaoError> {
        let env = self.store.env();
        let mut meta = self.store.project_meta(args.project_id)?;
        require_owner(&meta, &env.sender, "transfer ownership")?;
        self.store.require_member(args.project_id, &args.new_owner)?;
        meta.owner = args.new_owner.clone();
        self.store.save_project_meta(args.project_id, &meta)?;
        self.store.emit(&Event::ConfigUpdated {
            project: args.project_id,
            field: "owner".to_string(),
            value: args.new_owner.to_string(),
        });
        info!(project = args.project_id, owner = %args.new_owner, "ownership transferred");
        Ok(format!("project {} owner is now {}", args.project_id, args.new_owner))
    }
}
