//! Shared harness: one governance service over an in-memory host, with a
//! manual clock and one host transaction per call.

#![allow(dead_code)]

use dao_governance::domain::{
    check_project_totals, check_stake_history, check_treasury, InvariantViolation,
};
use dao_governance::keyspace;
use dao_governance::prelude::*;
use tracing_subscriber::EnvFilter;

/// Block time the scenarios start at.
pub const T0: u64 = 1_700_000_000;

pub const OWNER: &str = "hive:owner";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn addr(raw: &str) -> Address {
    Address::parse(raw).unwrap()
}

pub fn amount(raw: &str) -> Amount {
    Amount::parse(raw).unwrap()
}

/// A single `transfer.allow` intent.
pub fn allow(asset: Asset, limit: &str) -> Vec<Intent> {
    vec![Intent::transfer_allow(asset, amount(limit))]
}

/// `project_create` payload with the fields the scenarios vary.
#[allow(clippy::too_many_arguments)]
pub fn project_payload(
    name: &str,
    voting: &str,
    threshold: &str,
    quorum: &str,
    duration: &str,
    delay: &str,
    cooldown: &str,
    cost: &str,
    min_stake: &str,
) -> String {
    format!(
        "{name}|a test project|||{voting}|{threshold}|{quorum}|{duration}|{delay}|{cooldown}|{cost}|{min_stake}||||true|false|"
    )
}

/// `proposal_create` payload: project, name, `;`-separated options and
/// outcome JSON; everything else falls back.
pub fn proposal_payload(project: u64, name: &str, options: &str, outcome: &str) -> String {
    format!("{project}|{name}|||{options}||||{outcome}")
}

pub struct Harness {
    pub dao: GovernanceService<InMemoryHost>,
    pub now: u64,
    tx: u64,
}

impl Harness {
    /// Initialized contract with public project creation, owned by [`OWNER`].
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut harness = Self::uninitialized(config);
        harness.call(OWNER, "contract_init", "public", Vec::new()).unwrap();
        harness
    }

    pub fn uninitialized(config: EngineConfig) -> Self {
        init_tracing();
        Self {
            dao: GovernanceService::new(InMemoryHost::new(), config),
            now: T0,
            tx: 0,
        }
    }

    /// Opens the next host transaction without running anything, so
    /// handlers can be called on `dao` directly.
    pub fn begin(&mut self, sender: &str, intents: Vec<Intent>) {
        self.tx += 1;
        let env = TxEnv {
            tx_id: format!("tx-{:06}", self.tx),
            sender: addr(sender),
            timestamp: self.now,
            intents,
        };
        self.dao.host_mut().begin_transaction(env);
    }

    /// Runs one action in its own host transaction; commits on success.
    pub fn call(
        &mut self,
        sender: &str,
        action: &str,
        payload: &str,
        intents: Vec<Intent>,
    ) -> Result<String, DaoError> {
        self.begin(sender, intents);
        let result = self.dao.invoke(action, payload);
        if result.is_ok() {
            self.dao.host_mut().commit();
        }
        result
    }

    pub fn advance(&mut self, seconds: u64) {
        self.now += seconds;
    }

    /// Gives `who` whole units of `asset` on the host.
    pub fn fund(&mut self, who: &str, asset: Asset, units: i64) {
        self.dao
            .host_mut()
            .set_balance(&addr(who), asset, Amount::from_units(units));
    }

    pub fn balance(&self, who: &str, asset: Asset) -> Amount {
        self.dao.host().balance(&addr(who), asset)
    }

    pub fn treasury(&self, project: u64, asset: Asset) -> Amount {
        self.dao.store().treasury_balance(project, asset).unwrap()
    }

    pub fn proposal(&self, id: u64) -> Proposal {
        self.dao.store().proposal(id).unwrap()
    }

    pub fn project(&self, id: u64) -> Project {
        self.dao.store().project(id).unwrap()
    }

    /// Committed member record, bypassing the transaction cache.
    pub fn member(&self, project: u64, who: &str) -> Option<Member> {
        self.dao
            .store()
            .load::<Member>(&keyspace::member(project, &addr(who)))
            .unwrap()
    }

    pub fn payout_lock(&self, project: u64, who: &str) -> u64 {
        self.dao.store().payout_lock(project, &addr(who)).unwrap()
    }

    pub fn digest(&self) -> String {
        self.dao.host().state_digest()
    }

    pub fn events(&self, name: &str) -> Vec<String> {
        self.dao
            .host()
            .events(name)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Every member and treasury invariant for `project`, given the
    /// addresses that may be members.
    pub fn audit(&self, project: u64, candidates: &[&str]) -> Vec<InvariantViolation> {
        let finance = self.project(project).finance;
        let members: Vec<Member> = candidates
            .iter()
            .filter_map(|who| self.member(project, who))
            .collect();
        let mut violations = check_project_totals(&finance, &members);
        for member in &members {
            let history = self.dao.store().stake_history(project, member).unwrap();
            violations.extend(check_stake_history(member, &history));
        }
        for asset in Asset::ALL {
            violations.extend(check_treasury(asset.as_str(), self.treasury(project, asset)));
        }
        violations
    }
}

