//! # Payload Parser
//!
//! Thin deserializer from the pipe-delimited textual payloads to typed
//! argument records. Quoting and empty-field fallbacks are handled here;
//! business validation happens in the service layer.
//!
//! The outcome of `proposal_create` is JSON and is read with `serde_json`.

use crate::config::EngineConfig;
use crate::domain::args::{
    ContractInitArgs, CreateProjectArgs, CreateProposalArgs, PauseArgs, ProposalOptionArg,
    TransferOwnershipArgs, VoteProposalArgs, WhitelistArgs,
};
use crate::domain::entities::{InterContractCall, PayoutEntry, ProposalOutcome};
use crate::domain::value_objects::{parse_flag, Address, Amount, Asset, VotingSystem};
use crate::errors::DaoError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const PROJECT_CREATE_FIELDS: usize = 18;
const PROPOSAL_CREATE_FIELDS: usize = 9;

// =============================================================================
// FIELD HELPERS
// =============================================================================

/// Removes one pair of matching quotes around the whole payload.
#[must_use]
pub fn strip_quotes(raw: &str) -> &str {
    let trimmed = raw.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

fn fields(payload: &str, limit: usize) -> Vec<&str> {
    strip_quotes(payload).splitn(limit, '|').collect()
}

fn field<'a>(parts: &[&'a str], index: usize) -> &'a str {
    parts.get(index).copied().unwrap_or("").trim()
}

fn invalid(field: &'static str, raw: &str) -> DaoError {
    DaoError::InvalidField {
        field,
        reason: format!("cannot parse {raw:?}"),
    }
}

fn required<'a>(parts: &[&'a str], index: usize, name: &'static str) -> Result<&'a str, DaoError> {
    let value = field(parts, index);
    if value.is_empty() {
        return Err(DaoError::InvalidPayload(format!("missing {name}")));
    }
    Ok(value)
}

fn parse_id(raw: &str, name: &'static str) -> Result<u64, DaoError> {
    raw.trim().parse().map_err(|_| invalid(name, raw))
}

fn u64_or(raw: &str, name: &'static str, fallback: u64) -> Result<u64, DaoError> {
    if raw.is_empty() {
        return Ok(fallback);
    }
    parse_id(raw, name)
}

fn percent_or(raw: &str, name: &'static str, fallback: f64) -> Result<f64, DaoError> {
    if raw.is_empty() {
        return Ok(fallback);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(name, raw))
}

fn flag_or(raw: &str, name: &'static str, fallback: bool) -> Result<bool, DaoError> {
    if raw.is_empty() {
        return Ok(fallback);
    }
    parse_flag(raw).ok_or_else(|| invalid(name, raw))
}

fn amount_or(raw: &str, fallback: Amount) -> Result<Amount, DaoError> {
    if raw.is_empty() {
        return Ok(fallback);
    }
    Amount::parse(raw)
}

fn optional(raw: &str) -> Option<String> {
    (!raw.is_empty()).then(|| raw.to_string())
}

// =============================================================================
// ACTIONS
// =============================================================================

/// `public` or `owner-only`.
pub fn parse_contract_init(payload: &str) -> Result<ContractInitArgs, DaoError> {
    match strip_quotes(payload).to_ascii_lowercase().as_str() {
        "public" => Ok(ContractInitArgs {
            public_project_creation: true,
        }),
        "owner-only" | "owner_only" => Ok(ContractInitArgs {
            public_project_creation: false,
        }),
        other => Err(DaoError::InvalidPayload(format!(
            "expected public or owner-only, got {other:?}"
        ))),
    }
}

/// `name|description|metadata|url|votingSystem|threshold|quorum|duration|
/// executionDelay|leaveCooldown|proposalCost|minStake|nftContract|
/// nftFunction|nftId|membersOnly|whitelistOnly|nftPayload`
///
/// The NFT payload format is last so it may itself contain pipes.
pub fn parse_create_project(payload: &str, config: &EngineConfig) -> Result<CreateProjectArgs, DaoError> {
    let parts = fields(payload, PROJECT_CREATE_FIELDS);
    let defaults = &config.defaults;
    let voting_system = match field(&parts, 4) {
        "" => VotingSystem::default(),
        raw => raw.parse()?,
    };
    let nft_payload = parts.get(17).copied().unwrap_or("");

    Ok(CreateProjectArgs {
        name: required(&parts, 0, "project name")?.to_string(),
        description: field(&parts, 1).to_string(),
        metadata: field(&parts, 2).to_string(),
        url: field(&parts, 3).to_string(),
        voting_system,
        threshold_percent: percent_or(field(&parts, 5), "threshold", defaults.threshold_percent)?,
        quorum_percent: percent_or(field(&parts, 6), "quorum", defaults.quorum_percent)?,
        proposal_duration_hours: u64_or(field(&parts, 7), "proposal duration", defaults.proposal_duration_hours)?,
        execution_delay_hours: u64_or(field(&parts, 8), "execution delay", defaults.execution_delay_hours)?,
        leave_cooldown_hours: u64_or(field(&parts, 9), "leave cooldown", defaults.leave_cooldown_hours)?,
        proposal_cost: amount_or(field(&parts, 10), defaults.proposal_cost)?,
        minimum_stake: amount_or(field(&parts, 11), Amount::ZERO)?,
        membership_nft_contract: optional(field(&parts, 12)),
        membership_nft_function: optional(field(&parts, 13)),
        membership_nft_id: optional(field(&parts, 14)),
        proposals_members_only: flag_or(field(&parts, 15), "members only", defaults.proposals_members_only)?,
        whitelist_only: flag_or(field(&parts, 16), "whitelist only", false)?,
        membership_nft_payload: if nft_payload.trim().is_empty() {
            defaults.membership_nft_payload.clone()
        } else {
            nft_payload.trim().to_string()
        },
    })
}

/// A bare project or proposal id.
pub fn parse_id_payload(payload: &str, name: &'static str) -> Result<u64, DaoError> {
    let raw = strip_quotes(payload);
    if raw.is_empty() {
        return Err(DaoError::InvalidPayload(format!("missing {name}")));
    }
    parse_id(raw, name)
}

/// `projectId|toStake`. Amount and asset come from the transfer intent.
pub fn parse_funds(payload: &str) -> Result<(u64, bool), DaoError> {
    let parts = fields(payload, 2);
    let project = parse_id(required(&parts, 0, "project id")?, "project id")?;
    Ok((project, flag_or(field(&parts, 1), "to stake", false)?))
}

/// `projectId|addr;addr;...`
pub fn parse_whitelist(payload: &str) -> Result<WhitelistArgs, DaoError> {
    let parts = fields(payload, 2);
    let project_id = parse_id(required(&parts, 0, "project id")?, "project id")?;
    let addresses = field(&parts, 1)
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Address::parse)
        .collect::<Result<Vec<_>, _>>()?;
    if addresses.is_empty() {
        return Err(DaoError::InvalidPayload("no addresses given".to_string()));
    }
    Ok(WhitelistArgs {
        project_id,
        addresses,
    })
}

/// `projectId|true/false`
pub fn parse_pause(payload: &str) -> Result<PauseArgs, DaoError> {
    let parts = fields(payload, 2);
    let project_id = parse_id(required(&parts, 0, "project id")?, "project id")?;
    let raw = required(&parts, 1, "pause flag")?;
    Ok(PauseArgs {
        project_id,
        paused: parse_flag(raw).ok_or_else(|| invalid("pause flag", raw))?,
    })
}

/// `projectId|newOwner`
pub fn parse_transfer(payload: &str) -> Result<TransferOwnershipArgs, DaoError> {
    let parts = fields(payload, 2);
    Ok(TransferOwnershipArgs {
        project_id: parse_id(required(&parts, 0, "project id")?, "project id")?,
        new_owner: Address::parse(required(&parts, 1, "new owner")?)?,
    })
}

/// `projectId|name|description|duration|options|isPoll|url|metadata|outcomeJson`
///
/// Options are `;`-separated, each `text` or `text~url`.
pub fn parse_create_proposal(payload: &str) -> Result<CreateProposalArgs, DaoError> {
    let parts = fields(payload, PROPOSAL_CREATE_FIELDS);
    let duration_hours = match field(&parts, 3) {
        "" => None,
        raw => Some(parse_id(raw, "duration")?),
    };
    let force_poll = match field(&parts, 5) {
        "" => None,
        raw => Some(parse_flag(raw).ok_or_else(|| invalid("poll flag", raw))?),
    };
    let options = field(&parts, 4)
        .split(';')
        .filter(|s| !s.trim().is_empty())
        .map(|entry| match entry.split_once('~') {
            Some((text, url)) => ProposalOptionArg {
                text: text.trim().to_string(),
                url: url.trim().to_string(),
            },
            None => ProposalOptionArg {
                text: entry.trim().to_string(),
                url: String::new(),
            },
        })
        .collect();

    Ok(CreateProposalArgs {
        project_id: parse_id(required(&parts, 0, "project id")?, "project id")?,
        name: required(&parts, 1, "proposal name")?.to_string(),
        description: field(&parts, 2).to_string(),
        duration_hours,
        options,
        force_poll,
        url: field(&parts, 6).to_string(),
        metadata: field(&parts, 7).to_string(),
        outcome: parse_outcome(field(&parts, 8))?,
    })
}

/// `proposalId|i,j,...`; repeated indices collapse to the first.
pub fn parse_vote(payload: &str) -> Result<VoteProposalArgs, DaoError> {
    let parts = fields(payload, 2);
    let proposal_id = parse_id(required(&parts, 0, "proposal id")?, "proposal id")?;
    let mut choices: Vec<u32> = Vec::new();
    for raw in field(&parts, 1).split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let choice: u32 = raw.parse().map_err(|_| invalid("choice", raw))?;
        if !choices.contains(&choice) {
            choices.push(choice);
        }
    }
    if choices.is_empty() {
        return Err(DaoError::EmptyChoices);
    }
    Ok(VoteProposalArgs {
        proposal_id,
        choices,
    })
}

// =============================================================================
// OUTCOME JSON
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OutcomeDto {
    meta: BTreeMap<String, Value>,
    payouts: Vec<PayoutDto>,
    calls: Vec<CallDto>,
}

#[derive(Debug, Deserialize)]
struct PayoutDto {
    address: String,
    amount: Value,
    #[serde(default)]
    asset: String,
}

#[derive(Debug, Deserialize)]
struct CallDto {
    contract: String,
    function: String,
    #[serde(default)]
    payload: String,
    #[serde(default)]
    assets: BTreeMap<String, Value>,
}

/// Scalars render as their text; strings lose their quotes.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_amount(value: &Value) -> Result<Amount, DaoError> {
    let amount = Amount::parse(&scalar_text(value))?;
    if !amount.is_positive() {
        return Err(DaoError::InvalidAmount(amount.to_string()));
    }
    Ok(amount)
}

/// Reads the outcome JSON. An empty string is an empty outcome.
pub fn parse_outcome(raw: &str) -> Result<ProposalOutcome, DaoError> {
    if raw.trim().is_empty() {
        return Ok(ProposalOutcome::default());
    }
    let dto: OutcomeDto = serde_json::from_str(raw)
        .map_err(|e| DaoError::InvalidPayload(format!("outcome json: {e}")))?;

    let meta = dto
        .meta
        .iter()
        .map(|(k, v)| (k.clone(), scalar_text(v)))
        .collect();

    let payouts = dto
        .payouts
        .iter()
        .map(|p| {
            Ok(PayoutEntry {
                address: Address::parse(&p.address)?,
                amount: json_amount(&p.amount)?,
                asset: if p.asset.trim().is_empty() {
                    None
                } else {
                    Some(p.asset.parse::<Asset>()?)
                },
            })
        })
        .collect::<Result<Vec<_>, DaoError>>()?;

    let mut calls = Vec::with_capacity(dto.calls.len());
    for call in &dto.calls {
        if call.contract.trim().is_empty() || call.function.trim().is_empty() {
            return Err(DaoError::InvalidPayload(
                "contract call needs contract and function".to_string(),
            ));
        }
        let mut assets = BTreeMap::new();
        for (name, amount) in &call.assets {
            let asset: Asset = name.parse()?;
            if assets.insert(asset, json_amount(amount)?).is_some() {
                return Err(DaoError::DuplicateCallAsset(asset.to_string()));
            }
        }
        calls.push(InterContractCall {
            contract: call.contract.trim().to_string(),
            function: call.function.trim().to_string(),
            payload: call.payload.clone(),
            assets,
        });
    }

    Ok(ProposalOutcome {
        meta,
        payouts,
        calls,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"1|2\""), "1|2");
        assert_eq!(strip_quotes("'public'"), "public");
        assert_eq!(strip_quotes("\"unbalanced'"), "\"unbalanced'");
        assert_eq!(strip_quotes("\""), "\"");
    }

    #[test]
    fn test_contract_init() {
        assert!(parse_contract_init("public").unwrap().public_project_creation);
        assert!(!parse_contract_init("\"owner-only\"").unwrap().public_project_creation);
        assert!(parse_contract_init("everyone").is_err());
    }

    #[test]
    fn test_create_project_fallbacks() {
        let args = parse_create_project("dao|", &EngineConfig::default()).unwrap();
        assert_eq!(args.name, "dao");
        assert_eq!(args.voting_system, VotingSystem::Democratic);
        assert_eq!(args.threshold_percent, 50.001);
        assert_eq!(args.quorum_percent, 50.001);
        assert_eq!(args.proposal_duration_hours, 24);
        assert_eq!(args.execution_delay_hours, 4);
        assert_eq!(args.leave_cooldown_hours, 24);
        assert_eq!(args.proposal_cost, Amount::from_units(1));
        assert!(args.proposals_members_only);
        assert!(!args.whitelist_only);
        assert_eq!(args.membership_nft_contract, None);
        assert_eq!(args.membership_nft_payload, "{nft}|{caller}");
    }

    #[test]
    fn test_create_project_full() {
        let args = parse_create_project(
            "dao|desc|meta|https://x.io|stake|60|40|2|1|0|0.5|1.250|contract:nft|owns|7|false|true|{caller}|{nft}",
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(args.voting_system, VotingSystem::Stake);
        assert_eq!(args.threshold_percent, 60.0);
        assert_eq!(args.leave_cooldown_hours, 0);
        assert_eq!(args.proposal_cost, Amount::from_scaled(500));
        assert_eq!(args.minimum_stake, Amount::from_scaled(1250));
        assert_eq!(args.membership_nft_contract.as_deref(), Some("contract:nft"));
        assert!(!args.proposals_members_only);
        assert!(args.whitelist_only);
        assert_eq!(args.membership_nft_payload, "{caller}|{nft}");
    }

    #[test]
    fn test_create_project_rejects_garbage() {
        let config = EngineConfig::default();
        assert!(parse_create_project("", &config).is_err());
        assert!(parse_create_project("dao||||quadratic", &config).is_err());
        assert!(parse_create_project("dao|||||abc", &config).is_err());
        assert!(parse_create_project("dao||||||||||-1", &config).is_err());
    }

    #[test]
    fn test_proposal_options_and_outcome() {
        let args = parse_create_proposal(
            r#"3|Pay|desc|48|a~https://a.io;b||https://p.io|m|{"meta":{"update_quorum":60},"payouts":[{"address":"hive:alice","amount":"1.000","asset":"hive"},{"address":"hive:bob","amount":2}],"calls":[{"contract":"contract:x","function":"f","payload":"p|q","assets":{"hbd":"0.5"}}]}"#,
        )
        .unwrap();
        assert_eq!(args.project_id, 3);
        assert_eq!(args.duration_hours, Some(48));
        assert_eq!(args.force_poll, None);
        assert_eq!(args.options.len(), 2);
        assert_eq!(args.options[0].url, "https://a.io");
        assert_eq!(args.options[1].text, "b");
        assert_eq!(args.outcome.meta.get("update_quorum").map(String::as_str), Some("60"));
        assert_eq!(args.outcome.payouts[0].asset, Some(Asset::Hive));
        assert_eq!(args.outcome.payouts[1].asset, None);
        assert_eq!(args.outcome.payouts[1].amount, Amount::from_units(2));
        assert_eq!(args.outcome.calls[0].payload, "p|q");
        assert_eq!(args.outcome.calls[0].assets.get(&Asset::Hbd), Some(&Amount::from_scaled(500)));
    }

    #[test]
    fn test_outcome_duplicate_call_asset() {
        let err = parse_outcome(
            r#"{"calls":[{"contract":"c","function":"f","assets":{"hive":"1","HIVE":"2"}}]}"#,
        )
        .unwrap_err();
        assert_eq!(err, DaoError::DuplicateCallAsset("hive".to_string()));
        assert!(parse_outcome("{not json").is_err());
        assert!(parse_outcome("").unwrap().is_empty());
    }

    #[test]
    fn test_vote_dedups() {
        let args = parse_vote("4|1,0,1").unwrap();
        assert_eq!(args.proposal_id, 4);
        assert_eq!(args.choices, vec![1, 0]);
        assert_eq!(parse_vote("4|"), Err(DaoError::EmptyChoices));
        assert!(parse_vote("4|x").is_err());
    }

    #[test]
    fn test_small_payloads() {
        assert_eq!(parse_funds("2|true").unwrap(), (2, true));
        assert_eq!(parse_funds("2").unwrap(), (2, false));
        let wl = parse_whitelist("1|hive:a; hive:b;").unwrap();
        assert_eq!(wl.addresses.len(), 2);
        assert!(parse_whitelist("1|").is_err());
        assert!(parse_pause("1|yes").unwrap().paused);
        assert!(parse_pause("1").is_err());
        assert_eq!(parse_transfer("1|hive:c").unwrap().new_owner.as_str(), "hive:c");
        assert_eq!(parse_id_payload("\"7\"", "proposal id").unwrap(), 7);
        assert!(parse_id_payload("", "proposal id").is_err());
    }
}
