//! # Meta Directives
//!
//! Configuration and state mutations carried in a proposal outcome's meta
//! map. Directives run in key order; unknown names are skipped.

use super::validation::{validate_nft_payload, validate_percent, validate_url};
use super::GovernanceService;
use crate::domain::value_objects::{parse_flag, Address, Amount};
use crate::errors::DaoError;
use crate::events::Event;
use crate::ports::outbound::ChainHost;
use tracing::{debug, info};

fn bad(directive: &str, reason: impl Into<String>) -> DaoError {
    DaoError::InvalidDirective {
        directive: directive.to_string(),
        reason: reason.into(),
    }
}

fn hours(directive: &str, value: &str) -> Result<u64, DaoError> {
    value
        .trim()
        .parse()
        .map_err(|_| bad(directive, format!("{value:?} is not a whole number of hours")))
}

fn percent(directive: &str, field: &'static str, value: &str) -> Result<f64, DaoError> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| bad(directive, format!("{value:?} is not a number")))?;
    validate_percent(field, parsed)?;
    Ok(parsed)
}

fn flag(directive: &str, value: &str) -> Result<bool, DaoError> {
    parse_flag(value).ok_or_else(|| bad(directive, format!("{value:?} is not a flag")))
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn addresses(value: &str) -> Result<Vec<Address>, DaoError> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Address::parse)
        .collect()
}

impl<H: ChainHost> GovernanceService<H> {
    /// Applies one directive to `project_id`. Returns whether anything was
    /// recognized and applied.
    pub(super) fn apply_directive(&mut self, project_id: u64, directive: &str, value: &str) -> Result<bool, DaoError> {
        let mut config = self.store.project_config(project_id)?;
        let mut meta = self.store.project_meta(project_id)?;
        let mut rendered = value.trim().to_string();

        match directive {
            "update_threshold" => {
                config.threshold_percent = percent(directive, "threshold", value)?;
            }
            "update_quorum" => {
                config.quorum_percent = percent(directive, "quorum", value)?;
            }
            "update_proposalDuration" => {
                let duration = hours(directive, value)?;
                if duration == 0 {
                    return Err(bad(directive, "duration must be at least one hour"));
                }
                config.proposal_duration_hours = duration;
            }
            "update_executionDelay" => config.execution_delay_hours = hours(directive, value)?,
            "update_leaveCooldown" => config.leave_cooldown_hours = hours(directive, value)?,
            "update_proposalCost" => {
                config.proposal_cost = Amount::parse(value).map_err(|e| bad(directive, e.to_string()))?;
            }
            "update_membershipNFT" => config.membership_nft_id = optional(value),
            "update_membershipNFTContract" => config.membership_nft_contract = optional(value),
            "update_membershipNFTContractFunction" => {
                config.membership_nft_function = optional(value);
            }
            "update_membershipNFTPayload" => {
                validate_nft_payload(value.trim())?;
                config.membership_nft_payload = value.trim().to_string();
            }
            "update_proposalCreatorRestriction" => {
                config.proposals_members_only = flag(directive, value)?;
            }
            "update_whitelistOnly" => config.whitelist_only = flag(directive, value)?,
            "toggle_pause" => {
                meta.paused = match value.trim() {
                    "" => !meta.paused,
                    explicit => flag(directive, explicit)?,
                };
                rendered = meta.paused.to_string();
            }
            "update_owner" => {
                let owner = Address::parse(value).map_err(|e| bad(directive, e.to_string()))?;
                self.store.require_member(project_id, &owner)?;
                meta.owner = owner;
            }
            "update_url" => {
                validate_url(value.trim(), self.config.max_url_len)?;
                meta.url = value.trim().to_string();
            }
            "whitelist_add" => {
                let added = self.whitelist_insert_all(project_id, &addresses(value)?)?;
                return Ok(!added.is_empty());
            }
            "whitelist_remove" => {
                let removed = self.whitelist_remove_all(project_id, &addresses(value)?)?;
                return Ok(!removed.is_empty());
            }
            unknown => {
                debug!(project = project_id, directive = unknown, "unknown directive skipped");
                return Ok(false);
            }
        }

        self.store.save_project_config(project_id, &config)?;
        self.store.save_project_meta(project_id, &meta)?;
        self.store.emit(&Event::ConfigUpdated {
            project: project_id,
            field: directive.to_string(),
            value: rendered,
        });
        info!(project = project_id, directive, "directive applied");
        Ok(true)
    }

    /// Rules that span several directives, checked once the whole meta map
    /// has been applied.
    pub(super) fn check_directive_result(&self, project_id: u64) -> Result<(), DaoError> {
        let config = self.store.project_config(project_id)?;
        if config.membership_nft_contract.is_some() && config.membership_nft_function.is_none() {
            return Err(DaoError::InvalidField {
                field: "membership nft function",
                reason: "required when an nft contract is set".to_string(),
            });
        }
        Ok(())
    }
}
