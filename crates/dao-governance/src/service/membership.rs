//! # Membership & Admission Gate
//!
//! Join runs its gates in a fixed order: paused, membership NFT, whitelist,
//! then the voting-system stake rule.
//!
//! Leave honours payout locks and the project's leave cooldown.

use super::projects::require_owner;
use super::GovernanceService;
use crate::domain::args::WhitelistArgs;
use crate::domain::entities::ProjectConfig;
use crate::domain::value_objects::{Address, Amount, Asset, VotingSystem, SECONDS_PER_HOUR};
use crate::errors::DaoError;
use crate::events::Event;
use crate::ports::outbound::ChainHost;
use tracing::{debug, info};

/// True for an oracle answer of `true`, `yes` or a positive integer.
#[must_use]
pub fn is_truthy(response: &str) -> bool {
    let answer = response.trim().trim_matches('"').to_ascii_lowercase();
    matches!(answer.as_str(), "true" | "yes") || answer.parse::<u64>().is_ok_and(|n| n > 0)
}

impl<H: ChainHost> GovernanceService<H> {
    /// Draws the entry stake from the caller's intent.
    ///
    /// Democratic projects take exactly `minimum` (nothing when zero). Stake
    /// projects take the whole intent limit, which must be positive and at
    /// least `minimum`. `funds_asset` is `None` while the project is being
    /// created; the intent then decides it, falling back to hive.
    pub(super) fn take_entry_stake(
        &mut self,
        voting_system: VotingSystem,
        minimum: Amount,
        funds_asset: Option<Asset>,
    ) -> Result<(Asset, Amount), DaoError> {
        let intent = self.store.transfer_intent(&self.config)?;
        let missing = || DaoError::MissingIntent {
            asset: funds_asset.unwrap_or(Asset::Hive).to_string(),
        };
        match voting_system {
            VotingSystem::Democratic => {
                let asset = funds_asset
                    .or(intent.map(|i| i.asset))
                    .unwrap_or(Asset::Hive);
                if minimum.is_positive() {
                    self.store.draw_from_intent(&self.config, asset, minimum)?;
                    Ok((asset, minimum))
                } else {
                    Ok((asset, Amount::ZERO))
                }
            }
            VotingSystem::Stake => {
                let intent = intent.ok_or_else(missing)?;
                let asset = funds_asset.unwrap_or(intent.asset);
                let stake = intent.remaining();
                if !stake.is_positive() {
                    return Err(DaoError::InvalidAmount(stake.to_string()));
                }
                if stake < minimum {
                    return Err(DaoError::StakeBelowMinimum {
                        provided: stake.to_string(),
                        minimum: minimum.to_string(),
                    });
                }
                self.store.draw_from_intent(&self.config, asset, stake)?;
                Ok((asset, stake))
            }
        }
    }

    fn check_membership_nft(&mut self, config: &ProjectConfig, caller: &Address) -> Result<(), DaoError> {
        let contract = config.membership_nft_contract.as_deref().unwrap_or_default();
        let function = config
            .membership_nft_function
            .as_deref()
            .ok_or_else(|| DaoError::NftRequired {
                reason: "no oracle function configured".to_string(),
            })?;
        let payload = config.nft_payload_for(caller);
        let response = self
            .store
            .host_mut()
            .contract_call(contract, function, &payload, &[])
            .map_err(|e| DaoError::NftRequired {
                reason: e.to_string(),
            })?;
        if is_truthy(&response) {
            Ok(())
        } else {
            Err(DaoError::NftRequired {
                reason: format!("oracle answered {:?}", response.trim()),
            })
        }
    }

    /// Admits the caller to a project.
    pub fn project_join(&mut self, project_id: u64) -> Result<String, DaoError> {
        let env = self.store.env();
        let project = self.store.project(project_id)?;
        if project.meta.paused {
            return Err(DaoError::ProjectPaused(project_id));
        }
        if self.store.member(project_id, &env.sender)?.is_some() {
            return Err(DaoError::AlreadyMember(project_id));
        }
        if project.config.has_nft_gate() {
            self.check_membership_nft(&project.config, &env.sender)?;
        }
        if project.config.whitelist_only && !self.store.is_whitelisted(project_id, &env.sender)? {
            return Err(DaoError::WhitelistRequired);
        }
        let (_, stake) = self.take_entry_stake(
            project.config.voting_system,
            project.config.minimum_stake,
            Some(project.finance.funds_asset),
        )?;

        self.store.create_member(project_id, &env.sender, stake, env.timestamp)?;
        if project.config.whitelist_only {
            self.store.whitelist_delete(project_id, &env.sender)?;
        }
        self.store.emit(&Event::MemberJoined {
            project: project_id,
            address: env.sender.clone(),
            stake,
        });
        info!(project = project_id, member = %env.sender, %stake, "member joined");
        Ok(format!("joined project {project_id}"))
    }

    /// Leaves a project, refunding the stake. With a non-zero cooldown the
    /// first call records the request and a later call completes it.
    pub fn project_leave(&mut self, project_id: u64) -> Result<String, DaoError> {
        let env = self.store.env();
        let project = self.store.project(project_id)?;
        let mut member = self.store.require_member(project_id, &env.sender)?;
        if project.meta.owner == env.sender {
            return Err(DaoError::OwnerCannotLeave);
        }
        let locks = self.store.payout_lock(project_id, &env.sender)?;
        if locks > 0 {
            return Err(DaoError::PayoutLocked { locks });
        }

        let cooldown = project
            .config
            .leave_cooldown_hours
            .saturating_mul(SECONDS_PER_HOUR);
        if cooldown > 0 {
            if member.exit_requested == 0 {
                let ready_at = env.timestamp.saturating_add(cooldown);
                member.exit_requested = env.timestamp;
                self.store.save_member(project_id, &member)?;
                self.store.emit(&Event::ExitRequested {
                    project: project_id,
                    address: env.sender.clone(),
                    ready_at,
                });
                debug!(project = project_id, member = %env.sender, ready_at, "exit requested");
                return Ok(format!("exit requested, ready at {ready_at}"));
            }
            let ready_at = member.exit_requested.saturating_add(cooldown);
            if env.timestamp < ready_at {
                return Err(DaoError::CooldownNotPassed { ready_at });
            }
        }

        self.store.remove_member(project_id, &member)?;
        if member.stake.is_positive() {
            self.store
                .host_mut()
                .transfer(&env.sender, member.stake, project.finance.funds_asset)?;
        }
        self.store.emit(&Event::MemberLeft {
            project: project_id,
            address: env.sender.clone(),
            refund: member.stake,
        });
        info!(project = project_id, member = %env.sender, refund = %member.stake, "member left");
        Ok(format!("left project {project_id}"))
    }

    // =========================================================================
    // WHITELIST
    // =========================================================================

    /// Whitelists non-members that are not yet listed. Returns the addresses
    /// actually added.
    pub(super) fn whitelist_insert_all(&mut self, project_id: u64, addresses: &[Address]) -> Result<Vec<Address>, DaoError> {
        let mut added = Vec::new();
        for address in addresses {
            if self.store.member(project_id, address)?.is_some()
                || self.store.is_whitelisted(project_id, address)?
                || added.contains(address)
            {
                continue;
            }
            self.store.whitelist_insert(project_id, address)?;
            self.store.emit(&Event::WhitelistAdd {
                project: project_id,
                address: address.clone(),
            });
            added.push(address.clone());
        }
        Ok(added)
    }

    /// Removes listed non-members. Returns the addresses actually removed.
    pub(super) fn whitelist_remove_all(&mut self, project_id: u64, addresses: &[Address]) -> Result<Vec<Address>, DaoError> {
        let mut removed = Vec::new();
        for address in addresses {
            if self.store.member(project_id, address)?.is_some()
                || !self.store.is_whitelisted(project_id, address)?
            {
                continue;
            }
            self.store.whitelist_delete(project_id, address)?;
            self.store.emit(&Event::WhitelistRemove {
                project: project_id,
                address: address.clone(),
            });
            removed.push(address.clone());
        }
        Ok(removed)
    }

    pub fn project_whitelist_add(&mut self, args: WhitelistArgs) -> Result<String, DaoError> {
        let env = self.store.env();
        let meta = self.store.project_meta(args.project_id)?;
        require_owner(&meta, &env.sender, "manage the whitelist")?;
        let added = self.whitelist_insert_all(args.project_id, &args.addresses)?;
        Ok(format!("whitelisted: {}", join(&added)))
    }

    pub fn project_whitelist_remove(&mut self, args: WhitelistArgs) -> Result<String, DaoError> {
        let env = self.store.env();
        let meta = self.store.project_meta(args.project_id)?;
        require_owner(&meta, &env.sender, "manage the whitelist")?;
        let removed = self.whitelist_remove_all(args.project_id, &args.addresses)?;
        Ok(format!("removed from whitelist: {}", join(&removed)))
    }
}

fn join(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(Address::as_str)
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_truthiness() {
        assert!(is_truthy("true"));
        assert!(is_truthy(" YES "));
        assert!(is_truthy("\"true\""));
        assert!(is_truthy("3"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
        assert!(!is_truthy("-1"));
    }
}
