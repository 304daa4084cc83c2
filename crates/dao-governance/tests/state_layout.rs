//! Persisted state must be a pure function of the applied calls.

mod common;

use common::*;
use dao_governance::keyspace::{self, KeyFamily};
use dao_governance::prelude::*;

fn run(outcome: &str, whitelist: &str) -> Harness {
    let mut h = Harness::new();
    h.fund(OWNER, Asset::Hive, 10);
    h.fund("hive:alice", Asset::Hive, 10);
    let payload = project_payload("Layout", "stake", "50", "50", "1", "2", "0", "1", "1");
    h.call(OWNER, "project_create", &payload, allow(Asset::Hive, "2.000")).unwrap();
    h.call("hive:alice", "project_join", "0", allow(Asset::Hive, "3.000")).unwrap();
    h.call(OWNER, "project_whitelist_add", whitelist, Vec::new()).unwrap();
    h.call(OWNER, "proposal_create", &proposal_payload(0, "Tune", "", outcome), allow(Asset::Hive, "1.000"))
        .unwrap();
    h.call("hive:alice", "proposals_vote", "0|1", Vec::new()).unwrap();
    h
}

#[test]
fn test_digest_independent_of_input_order() {
    let a = run(
        r#"{"meta":{"update_quorum":"60","update_executionDelay":"3"}}"#,
        "0|hive:x;hive:y",
    );
    let b = run(
        r#"{"meta":{"update_executionDelay":"3","update_quorum":"60"}}"#,
        "0|hive:y;hive:x",
    );
    assert_eq!(a.digest(), b.digest());
    assert_eq!(a.dao.host().kv_len(), b.dao.host().kv_len());
}

#[test]
fn test_digest_tracks_content() {
    let a = run(r#"{"meta":{"update_quorum":"60"}}"#, "0|hive:x");
    let b = run(r#"{"meta":{"update_quorum":"61"}}"#, "0|hive:x");
    assert_ne!(a.digest(), b.digest());
}

#[test]
fn test_records_land_in_their_families() {
    let h = run("", "0|hive:x");
    let host = h.dao.host();

    let members = host.scan_prefix(&[KeyFamily::ProjectMember.prefix()]);
    assert_eq!(members.len(), 2);
    assert!(members
        .iter()
        .any(|(key, _)| *key == keyspace::member(0, &addr("hive:alice"))));

    let treasury = host.scan_prefix(&[KeyFamily::ProjectTreasury.prefix()]);
    assert_eq!(treasury.len(), 1);
    assert_eq!(treasury[0].0, keyspace::treasury(0, Asset::Hive));

    assert_eq!(host.scan_prefix(&[KeyFamily::ProjectWhitelist.prefix()]).len(), 1);
    assert_eq!(host.scan_prefix(&[KeyFamily::ProposalOption.prefix()]).len(), 2);
    assert_eq!(host.scan_prefix(&[KeyFamily::VoteReceipt.prefix()]).len(), 1);
    assert_eq!(host.scan_prefix(&[KeyFamily::MemberStakeHistory.prefix()]).len(), 2);
}
