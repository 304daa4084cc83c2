//! Record encodings. Field order here is the persisted layout; new fields go
//! at the end and are read with [`Reader::get_trailing`].

use super::{Decode, Encode, Reader, Writer};
use crate::domain::args::{
    AddFundsArgs, CreateProjectArgs, CreateProposalArgs, ProposalOptionArg, VoteProposalArgs,
};
use crate::domain::entities::{
    ContractConfig, InterContractCall, Member, PayoutEntry, ProjectConfig, ProjectFinance,
    ProjectMeta, Proposal, ProposalOption, ProposalOutcome, StakeHistoryEntry, VoteReceipt,
    NO_RESULT,
};
use crate::domain::value_objects::{Address, Amount, Asset, ProposalState, VotingSystem};
use crate::errors::CodecError;
use std::collections::BTreeMap;

// =============================================================================
// PRIMITIVE HELPERS
// =============================================================================

fn put_address(w: &mut Writer, a: &Address) {
    w.put_str(a.as_str());
}

fn get_address(r: &mut Reader<'_>) -> Result<Address, CodecError> {
    r.get_str().map(Address::from_stored)
}

fn put_amount(w: &mut Writer, a: &Amount) {
    w.put_i64(a.scaled());
}

fn get_amount(r: &mut Reader<'_>) -> Result<Amount, CodecError> {
    r.get_i64().map(Amount::from_scaled)
}

fn get_asset(r: &mut Reader<'_>) -> Result<Asset, CodecError> {
    let raw = r.get_str()?;
    raw.parse().map_err(|_| CodecError::InvalidTag {
        what: "asset",
        value: raw,
    })
}

/// Empty string stands for "no asset" (legacy payouts).
fn get_optional_asset(r: &mut Reader<'_>) -> Result<Option<Asset>, CodecError> {
    let raw = r.get_str()?;
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| CodecError::InvalidTag {
        what: "asset",
        value: raw,
    })
}

fn put_opt_str(w: &mut Writer, v: Option<&String>) {
    w.put_option(v, |w, s| w.put_str(s));
}

fn get_opt_str(r: &mut Reader<'_>) -> Result<Option<String>, CodecError> {
    r.get_option(Reader::get_str)
}

fn get_voting_system(r: &mut Reader<'_>) -> Result<VotingSystem, CodecError> {
    let tag = r.get_u8()?;
    VotingSystem::from_tag(tag).ok_or(CodecError::InvalidTag {
        what: "voting system",
        value: tag.to_string(),
    })
}

fn get_state(r: &mut Reader<'_>) -> Result<ProposalState, CodecError> {
    let tag = r.get_u8()?;
    ProposalState::from_tag(tag).ok_or(CodecError::InvalidTag {
        what: "proposal state",
        value: tag.to_string(),
    })
}

// =============================================================================
// SCALARS (counters, payout locks, treasury entries)
// =============================================================================

impl Encode for u64 {
    fn encode(&self, w: &mut Writer) {
        w.put_u64(*self);
    }
}

impl Decode for u64 {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        r.get_u64()
    }
}

impl Encode for Amount {
    fn encode(&self, w: &mut Writer) {
        put_amount(w, self);
    }
}

impl Decode for Amount {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        get_amount(r)
    }
}

// =============================================================================
// CONTRACT / PROJECT
// =============================================================================

impl Encode for ContractConfig {
    fn encode(&self, w: &mut Writer) {
        put_address(w, &self.owner);
        w.put_bool(self.public_project_creation);
    }
}

impl Decode for ContractConfig {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            owner: get_address(r)?,
            public_project_creation: r.get_bool()?,
        })
    }
}

impl Encode for ProjectMeta {
    fn encode(&self, w: &mut Writer) {
        put_address(w, &self.owner);
        w.put_str(&self.name);
        w.put_str(&self.description);
        w.put_bool(self.paused);
        w.put_str(&self.creation_tx);
        w.put_str(&self.metadata);
        w.put_str(&self.url);
    }
}

impl Decode for ProjectMeta {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            owner: get_address(r)?,
            name: r.get_str()?,
            description: r.get_str()?,
            paused: r.get_bool()?,
            creation_tx: r.get_str()?,
            metadata: r.get_str()?,
            url: r.get_trailing(String::new(), Reader::get_str)?,
        })
    }
}

impl Encode for ProjectConfig {
    fn encode(&self, w: &mut Writer) {
        w.put_u8(self.voting_system.tag());
        w.put_f64(self.threshold_percent);
        w.put_f64(self.quorum_percent);
        w.put_u64(self.proposal_duration_hours);
        w.put_u64(self.execution_delay_hours);
        w.put_u64(self.leave_cooldown_hours);
        put_amount(w, &self.proposal_cost);
        put_amount(w, &self.minimum_stake);
        put_opt_str(w, self.membership_nft_contract.as_ref());
        put_opt_str(w, self.membership_nft_function.as_ref());
        put_opt_str(w, self.membership_nft_id.as_ref());
        w.put_str(&self.membership_nft_payload);
        w.put_bool(self.proposals_members_only);
        w.put_bool(self.whitelist_only);
    }
}

impl Decode for ProjectConfig {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            voting_system: get_voting_system(r)?,
            threshold_percent: r.get_f64()?,
            quorum_percent: r.get_f64()?,
            proposal_duration_hours: r.get_u64()?,
            execution_delay_hours: r.get_u64()?,
            leave_cooldown_hours: r.get_u64()?,
            proposal_cost: get_amount(r)?,
            minimum_stake: get_amount(r)?,
            membership_nft_contract: get_opt_str(r)?,
            membership_nft_function: get_opt_str(r)?,
            membership_nft_id: get_opt_str(r)?,
            membership_nft_payload: r.get_str()?,
            proposals_members_only: r.get_bool()?,
            whitelist_only: r.get_trailing(false, Reader::get_bool)?,
        })
    }
}

impl Encode for ProjectFinance {
    fn encode(&self, w: &mut Writer) {
        w.put_str(self.funds_asset.as_str());
        put_amount(w, &self.stake_total);
        w.put_u64(self.member_count);
    }
}

impl Decode for ProjectFinance {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            funds_asset: get_asset(r)?,
            stake_total: get_amount(r)?,
            member_count: r.get_u64()?,
        })
    }
}

// =============================================================================
// MEMBERS
// =============================================================================

impl Encode for Member {
    fn encode(&self, w: &mut Writer) {
        put_address(w, &self.address);
        put_amount(w, &self.stake);
        w.put_u64(self.joined_at);
        w.put_u64(self.last_action_at);
        w.put_u64(self.exit_requested);
        w.put_i64(self.reputation);
        w.put_u64(self.stake_increment);
    }
}

impl Decode for Member {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            address: get_address(r)?,
            stake: get_amount(r)?,
            joined_at: r.get_u64()?,
            last_action_at: r.get_u64()?,
            exit_requested: r.get_u64()?,
            reputation: r.get_i64()?,
            stake_increment: r.get_trailing(0, Reader::get_u64)?,
        })
    }
}

impl Encode for StakeHistoryEntry {
    fn encode(&self, w: &mut Writer) {
        put_amount(w, &self.stake);
        w.put_u64(self.timestamp);
    }
}

impl Decode for StakeHistoryEntry {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            stake: get_amount(r)?,
            timestamp: r.get_u64()?,
        })
    }
}

// =============================================================================
// PROPOSALS
// =============================================================================

fn put_payout(w: &mut Writer, p: &PayoutEntry) {
    put_address(w, &p.address);
    put_amount(w, &p.amount);
    w.put_str(p.asset.map_or("", |a| a.as_str()));
}

fn get_payout(r: &mut Reader<'_>) -> Result<PayoutEntry, CodecError> {
    Ok(PayoutEntry {
        address: get_address(r)?,
        amount: get_amount(r)?,
        asset: get_optional_asset(r)?,
    })
}

fn put_call(w: &mut Writer, c: &InterContractCall) {
    w.put_str(&c.contract);
    w.put_str(&c.function);
    w.put_str(&c.payload);
    w.put_map(c.assets.iter().map(|(a, v)| (a.as_str(), v)), put_amount);
}

fn get_call(r: &mut Reader<'_>) -> Result<InterContractCall, CodecError> {
    let contract = r.get_str()?;
    let function = r.get_str()?;
    let payload = r.get_str()?;
    let entries = r.get_seq(|r| Ok((get_asset(r)?, get_amount(r)?)))?;
    let mut assets = BTreeMap::new();
    for (asset, amount) in entries {
        if assets.insert(asset, amount).is_some() {
            return Err(CodecError::InvalidTag {
                what: "duplicate call asset",
                value: asset.to_string(),
            });
        }
    }
    Ok(InterContractCall {
        contract,
        function,
        payload,
        assets,
    })
}

impl Encode for ProposalOutcome {
    fn encode(&self, w: &mut Writer) {
        w.put_map(self.meta.iter().map(|(k, v)| (k.as_str(), v)), |w, v: &String| {
            w.put_str(v);
        });
        w.put_seq(&self.payouts, put_payout);
        w.put_seq(&self.calls, put_call);
    }
}

impl Decode for ProposalOutcome {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let meta = r
            .get_seq(|r| Ok((r.get_str()?, r.get_str()?)))?
            .into_iter()
            .collect();
        let payouts = r.get_seq(get_payout)?;
        let calls = r.get_trailing(Vec::new(), |r| r.get_seq(get_call))?;
        Ok(Self {
            meta,
            payouts,
            calls,
        })
    }
}

impl Encode for Proposal {
    fn encode(&self, w: &mut Writer) {
        w.put_u64(self.id);
        w.put_u64(self.project_id);
        put_address(w, &self.creator);
        w.put_str(&self.name);
        w.put_str(&self.description);
        w.put_u32(self.option_count);
        w.put_u64(self.duration_hours);
        w.put_u64(self.created_at);
        w.put_u8(self.state.tag());
        // Outcome is a nested length-prefixed blob so its own appended
        // fields cannot shift the proposal's.
        w.put_option(self.outcome.as_ref(), |w, o| w.put_bytes(&o.to_bytes()));
        w.put_str(&self.tx);
        put_amount(w, &self.stake_snapshot);
        w.put_u64(self.member_count_snapshot);
        w.put_str(&self.metadata);
        // appended
        w.put_str(&self.url);
        w.put_bool(self.is_poll);
        w.put_i64(self.result_option_id);
        w.put_u64(self.executable_at);
        put_amount(w, &self.cost_paid);
        w.put_u64(self.voter_count);
    }
}

impl Decode for Proposal {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            id: r.get_u64()?,
            project_id: r.get_u64()?,
            creator: get_address(r)?,
            name: r.get_str()?,
            description: r.get_str()?,
            option_count: r.get_u32()?,
            duration_hours: r.get_u64()?,
            created_at: r.get_u64()?,
            state: get_state(r)?,
            outcome: r.get_option(|r| ProposalOutcome::from_bytes(r.get_bytes()?))?,
            tx: r.get_str()?,
            stake_snapshot: get_amount(r)?,
            member_count_snapshot: r.get_u64()?,
            metadata: r.get_str()?,
            url: r.get_trailing(String::new(), Reader::get_str)?,
            is_poll: r.get_trailing(false, Reader::get_bool)?,
            result_option_id: r.get_trailing(NO_RESULT, Reader::get_i64)?,
            executable_at: r.get_trailing(0, Reader::get_u64)?,
            cost_paid: r.get_trailing(Amount::ZERO, get_amount)?,
            voter_count: r.get_trailing(0, Reader::get_u64)?,
        })
    }
}

impl Encode for ProposalOption {
    fn encode(&self, w: &mut Writer) {
        w.put_str(&self.text);
        w.put_str(&self.url);
        w.put_i64(self.weight_total);
        w.put_u64(self.voter_count);
    }
}

impl Decode for ProposalOption {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            text: r.get_str()?,
            url: r.get_str()?,
            weight_total: r.get_i64()?,
            voter_count: r.get_u64()?,
        })
    }
}

impl Encode for VoteReceipt {
    fn encode(&self, w: &mut Writer) {
        w.put_u64(self.vote_id);
        w.put_seq(&self.choices, |w, c| w.put_u32(*c));
        w.put_i64(self.weight);
        w.put_u64(self.timestamp);
    }
}

impl Decode for VoteReceipt {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            vote_id: r.get_u64()?,
            choices: r.get_seq(Reader::get_u32)?,
            weight: r.get_i64()?,
            timestamp: r.get_trailing(0, Reader::get_u64)?,
        })
    }
}

// =============================================================================
// ARGUMENT RECORDS
// =============================================================================

impl Encode for CreateProjectArgs {
    fn encode(&self, w: &mut Writer) {
        w.put_str(&self.name);
        w.put_str(&self.description);
        w.put_str(&self.metadata);
        w.put_str(&self.url);
        w.put_u8(self.voting_system.tag());
        w.put_f64(self.threshold_percent);
        w.put_f64(self.quorum_percent);
        w.put_u64(self.proposal_duration_hours);
        w.put_u64(self.execution_delay_hours);
        w.put_u64(self.leave_cooldown_hours);
        put_amount(w, &self.proposal_cost);
        put_amount(w, &self.minimum_stake);
        put_opt_str(w, self.membership_nft_contract.as_ref());
        put_opt_str(w, self.membership_nft_function.as_ref());
        put_opt_str(w, self.membership_nft_id.as_ref());
        w.put_str(&self.membership_nft_payload);
        w.put_bool(self.proposals_members_only);
        w.put_bool(self.whitelist_only);
    }
}

impl Decode for CreateProjectArgs {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            name: r.get_str()?,
            description: r.get_str()?,
            metadata: r.get_str()?,
            url: r.get_str()?,
            voting_system: get_voting_system(r)?,
            threshold_percent: r.get_f64()?,
            quorum_percent: r.get_f64()?,
            proposal_duration_hours: r.get_u64()?,
            execution_delay_hours: r.get_u64()?,
            leave_cooldown_hours: r.get_u64()?,
            proposal_cost: get_amount(r)?,
            minimum_stake: get_amount(r)?,
            membership_nft_contract: get_opt_str(r)?,
            membership_nft_function: get_opt_str(r)?,
            membership_nft_id: get_opt_str(r)?,
            membership_nft_payload: r.get_str()?,
            proposals_members_only: r.get_bool()?,
            whitelist_only: r.get_trailing(false, Reader::get_bool)?,
        })
    }
}

impl Encode for CreateProposalArgs {
    fn encode(&self, w: &mut Writer) {
        w.put_u64(self.project_id);
        w.put_str(&self.name);
        w.put_str(&self.description);
        w.put_option(self.duration_hours.as_ref(), |w, d| w.put_u64(*d));
        w.put_seq(&self.options, |w, o| {
            w.put_str(&o.text);
            w.put_str(&o.url);
        });
        w.put_option(self.force_poll.as_ref(), |w, p| w.put_bool(*p));
        w.put_str(&self.url);
        w.put_str(&self.metadata);
        w.put_bytes(&self.outcome.to_bytes());
    }
}

impl Decode for CreateProposalArgs {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            project_id: r.get_u64()?,
            name: r.get_str()?,
            description: r.get_str()?,
            duration_hours: r.get_option(Reader::get_u64)?,
            options: r.get_seq(|r| {
                Ok(ProposalOptionArg {
                    text: r.get_str()?,
                    url: r.get_str()?,
                })
            })?,
            force_poll: r.get_option(Reader::get_bool)?,
            url: r.get_str()?,
            metadata: r.get_str()?,
            outcome: ProposalOutcome::from_bytes(r.get_bytes()?)?,
        })
    }
}

impl Encode for VoteProposalArgs {
    fn encode(&self, w: &mut Writer) {
        w.put_u64(self.proposal_id);
        w.put_seq(&self.choices, |w, c| w.put_u32(*c));
    }
}

impl Decode for VoteProposalArgs {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            proposal_id: r.get_u64()?,
            choices: r.get_seq(Reader::get_u32)?,
        })
    }
}

impl Encode for AddFundsArgs {
    fn encode(&self, w: &mut Writer) {
        w.put_u64(self.project_id);
        put_amount(w, &self.amount);
        w.put_str(self.asset.as_str());
        w.put_bool(self.to_stake);
    }
}

impl Decode for AddFundsArgs {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            project_id: r.get_u64()?,
            amount: get_amount(r)?,
            asset: get_asset(r)?,
            to_stake: r.get_bool()?,
        })
    }
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

    fn sample_outcome() -> ProposalOutcome {
        let mut meta = BTreeMap::new();
        meta.insert("update_threshold".to_string(), "60".to_string());
        meta.insert("toggle_pause".to_string(), String::new());
        let mut assets = BTreeMap::new();
        assets.insert(Asset::Hive, Amount::from_units(2));
        assets.insert(Asset::Hbd, Amount::from_scaled(500));
        ProposalOutcome {
            meta,
            payouts: vec![
                PayoutEntry {
                    address: addr("hive:alice"),
                    amount: Amount::from_units(1),
                    asset: Some(Asset::Hive),
                },
                PayoutEntry {
                    address: addr("hive:alice"),
                    amount: Amount::from_units(1),
                    asset: None,
                },
            ],
            calls: vec![InterContractCall {
                contract: "contract:swap".into(),
                function: "deposit".into(),
                payload: "{\"pool\":1}".into(),
                assets,
            }],
        }
    }

    fn sample_proposal() -> Proposal {
        Proposal {
            id: 4,
            project_id: 1,
            creator: addr("hive:alice"),
            name: "Fund the meetup".into(),
            description: "pay for the venue".into(),
            option_count: 2,
            duration_hours: 24,
            created_at: 1_700_000_000,
            state: ProposalState::Active,
            outcome: Some(sample_outcome()),
            tx: "tx-1".into(),
            stake_snapshot: Amount::from_units(5),
            member_count_snapshot: 2,
            metadata: "{}".into(),
            url: "https://example.org/p/4".into(),
            is_poll: false,
            result_option_id: NO_RESULT,
            executable_at: 0,
            cost_paid: Amount::from_units(1),
            voter_count: 0,
        }
    }

    #[test]
    fn test_proposal_roundtrip() {
        let proposal = sample_proposal();
        let decoded = Proposal::from_bytes(&proposal.to_bytes()).unwrap();
        assert_eq!(decoded, proposal);
    }

    #[test]
    fn test_outcome_map_encoding_is_order_independent() {
        let mut a = ProposalOutcome::default();
        a.meta.insert("b".into(), "2".into());
        a.meta.insert("a".into(), "1".into());
        let mut b = ProposalOutcome::default();
        b.meta.insert("a".into(), "1".into());
        b.meta.insert("b".into(), "2".into());
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn test_legacy_proposal_without_url_decodes() {
        let current = sample_proposal();
        let mut w = Writer::new();
        w.put_u64(current.id);
        w.put_u64(current.project_id);
        w.put_str(current.creator.as_str());
        w.put_str(&current.name);
        w.put_str(&current.description);
        w.put_u32(current.option_count);
        w.put_u64(current.duration_hours);
        w.put_u64(current.created_at);
        w.put_u8(current.state.tag());
        w.put_option::<ProposalOutcome>(None, |w, o| w.put_bytes(&o.to_bytes()));
        w.put_str(&current.tx);
        w.put_i64(current.stake_snapshot.scaled());
        w.put_u64(current.member_count_snapshot);
        w.put_str(&current.metadata);
        let legacy = w.into_bytes();

        let decoded = Proposal::from_bytes(&legacy).unwrap();
        assert_eq!(decoded.url, "");
        assert!(!decoded.is_poll);
        assert_eq!(decoded.result_option_id, NO_RESULT);
        assert_eq!(decoded.voter_count, 0);

        let reencoded = decoded.to_bytes();
        assert!(reencoded.len() > legacy.len());
        assert_eq!(&reencoded[..legacy.len()], legacy.as_slice());
        // URL appears as a zero length prefix right after the legacy tail.
        assert_eq!(reencoded[legacy.len()], 0);
    }

    #[test]
    fn test_legacy_outcome_without_calls() {
        let mut w = Writer::new();
        w.put_varint(1);
        w.put_str("toggle_pause");
        w.put_str("");
        w.put_varint(0);
        let decoded = ProposalOutcome::from_bytes(&w.into_bytes()).unwrap();
        assert!(decoded.calls.is_empty());
        assert!(decoded.is_pause_override());
    }

    #[test]
    fn test_member_without_stake_increment() {
        let member = Member::new(addr("hive:bob"), Amount::from_units(3), 100);
        let bytes = member.to_bytes();
        let legacy = &bytes[..bytes.len() - 8];
        let decoded = Member::from_bytes(legacy).unwrap();
        assert_eq!(decoded.stake_increment, 0);
        assert_eq!(decoded.stake, member.stake);
    }

    #[test]
    fn test_project_records_roundtrip() {
        let meta = ProjectMeta {
            owner: addr("hive:alice"),
            name: "dao".into(),
            description: "a dao".into(),
            paused: true,
            creation_tx: "tx".into(),
            metadata: String::new(),
            url: "https://dao.example".into(),
        };
        assert_eq!(ProjectMeta::from_bytes(&meta.to_bytes()).unwrap(), meta);

        let config = ProjectConfig {
            voting_system: VotingSystem::Stake,
            threshold_percent: 50.001,
            quorum_percent: 33.3,
            proposal_duration_hours: 24,
            execution_delay_hours: 4,
            leave_cooldown_hours: 24,
            proposal_cost: Amount::from_units(1),
            minimum_stake: Amount::from_scaled(1),
            membership_nft_contract: Some("contract:nft".into()),
            membership_nft_function: None,
            membership_nft_id: Some("7".into()),
            membership_nft_payload: "{nft}|{caller}".into(),
            proposals_members_only: true,
            whitelist_only: true,
        };
        assert_eq!(ProjectConfig::from_bytes(&config.to_bytes()).unwrap(), config);

        let finance = ProjectFinance {
            funds_asset: Asset::Hbd,
            stake_total: Amount::from_units(9),
            member_count: 3,
        };
        assert_eq!(ProjectFinance::from_bytes(&finance.to_bytes()).unwrap(), finance);
    }

    #[test]
    fn test_args_roundtrip() {
        let create = CreateProposalArgs {
            project_id: 3,
            name: "n".into(),
            description: "d".into(),
            duration_hours: Some(48),
            options: vec![ProposalOptionArg {
                text: "yes".into(),
                url: String::new(),
            }],
            force_poll: Some(false),
            url: String::new(),
            metadata: String::new(),
            outcome: sample_outcome(),
        };
        assert_eq!(
            CreateProposalArgs::from_bytes(&create.to_bytes()).unwrap(),
            create
        );

        let vote = VoteProposalArgs {
            proposal_id: 9,
            choices: vec![0, 2],
        };
        assert_eq!(VoteProposalArgs::from_bytes(&vote.to_bytes()).unwrap(), vote);

        let funds = AddFundsArgs {
            project_id: 1,
            amount: Amount::from_units(2),
            asset: Asset::HbdSavings,
            to_stake: true,
        };
        assert_eq!(AddFundsArgs::from_bytes(&funds.to_bytes()).unwrap(), funds);
    }

    #[test]
    fn test_unknown_state_tag_rejected() {
        let mut bytes = sample_proposal().to_bytes();
        // id(8) + project(8) + creator + name + description + options(4)
        // + duration(8) + created_at(8) precede the state byte.
        let state_offset = 8
            + 8
            + 1
            + "hive:alice".len()
            + 1
            + "Fund the meetup".len()
            + 1
            + "pay for the venue".len()
            + 4
            + 8
            + 8;
        bytes[state_offset] = 9;
        assert!(matches!(
            Proposal::from_bytes(&bytes),
            Err(CodecError::InvalidTag { .. })
        ));
    }
}
