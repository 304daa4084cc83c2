//! Randomized stake top-ups: history lookups and project totals must agree
//! with a model kept alongside the engine.

mod common;

use common::*;
use dao_governance::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_stake_lookup_matches_model() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut h = Harness::new();
    h.fund(OWNER, Asset::Hive, 1_000);
    h.fund("hive:alice", Asset::Hive, 10_000);

    let payload = project_payload("Growth", "stake", "50", "50", "1", "0", "0", "0", "1");
    h.call(OWNER, "project_create", &payload, allow(Asset::Hive, "5.000")).unwrap();
    h.advance(60);
    h.call("hive:alice", "project_join", "0", allow(Asset::Hive, "1.500")).unwrap();

    let mut model: Vec<(u64, Amount)> = vec![(h.now, amount("1.500"))];
    let mut stake = amount("1.500");
    for _ in 0..25 {
        h.advance(rng.gen_range(60..=3_600));
        let top_up = Amount::from_scaled(rng.gen_range(1..=50_000));
        h.call(
            "hive:alice",
            "project_funds",
            "0|true",
            vec![Intent::transfer_allow(Asset::Hive, top_up)],
        )
        .unwrap();
        stake = stake.checked_add(top_up).unwrap();
        model.push((h.now, stake));
    }

    let member = h.member(0, "hive:alice").unwrap();
    assert_eq!(member.stake, stake);
    assert_eq!(member.stake_increment, 25);

    let store = h.dao.store();
    assert_eq!(store.stake_at(0, &member, model[0].0 - 1).unwrap(), Amount::ZERO);
    for window in model.windows(2) {
        let (at, expected) = window[0];
        let (next, _) = window[1];
        assert_eq!(store.stake_at(0, &member, at).unwrap(), expected);
        assert_eq!(store.stake_at(0, &member, next - 1).unwrap(), expected);
    }
    assert_eq!(store.stake_at(0, &member, u64::MAX).unwrap(), stake);

    let project = h.project(0);
    assert_eq!(
        project.finance.stake_total,
        amount("5.000").checked_add(stake).unwrap()
    );
    assert!(h.audit(0, &[OWNER, "hive:alice"]).is_empty());
    assert_eq!(h.treasury(0, Asset::Hive), Amount::ZERO);
    assert_eq!(h.events("AddFunds").len(), 25);
}

#[test]
fn test_votes_use_stake_at_creation() {
    let mut h = Harness::new();
    h.fund(OWNER, Asset::Hive, 100);
    h.fund("hive:alice", Asset::Hive, 100);

    let payload = project_payload("Snapshot", "stake", "50", "50", "1", "0", "0", "0", "1");
    h.call(OWNER, "project_create", &payload, allow(Asset::Hive, "4.000")).unwrap();
    h.call("hive:alice", "project_join", "0", allow(Asset::Hive, "2.000")).unwrap();
    h.advance(10);
    h.call(OWNER, "proposal_create", &proposal_payload(0, "Weigh", "", ""), Vec::new())
        .unwrap();
    assert_eq!(h.proposal(0).stake_snapshot, amount("6.000"));

    // Stake added after creation does not count.
    h.advance(10);
    h.call("hive:alice", "project_funds", "0|true", allow(Asset::Hive, "50.000")).unwrap();
    h.call("hive:alice", "proposals_vote", "0|1", Vec::new()).unwrap();

    let receipt = h
        .dao
        .store()
        .vote_receipt(0, &addr("hive:alice"))
        .unwrap()
        .unwrap();
    assert_eq!(receipt.weight, 2_000);
    assert_eq!(receipt.choices, vec![1]);

    h.advance(SECONDS_PER_HOUR);
    h.call(OWNER, "proposal_tally", "0", Vec::new()).unwrap();
    // 2.000 of a 6.000 snapshot misses the 50% threshold.
    assert_eq!(h.proposal(0).state, ProposalState::Failed);
}
