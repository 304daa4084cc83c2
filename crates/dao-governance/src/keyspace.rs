//! # Keyspace
//!
//! Flat composite keys: `[family][id: u64 LE][suffix]`. Every record is
//! independently readable and writable; there are no nested maps.
//!
//! | Family | Prefix | Id | Suffix |
//! |--------|--------|----|--------|
//! | contract config | `0x00` | - | - |
//! | project meta / config / finance | `0x01` / `0x02` / `0x03` | project | - |
//! | member | `0x04` | project | address bytes |
//! | payout lock | `0x05` | project | address bytes |
//! | whitelist | `0x06` | project | address bytes |
//! | treasury | `0x07` | project | asset bytes |
//! | proposal meta | `0x10` | proposal | - |
//! | proposal option | `0x11` | proposal | index u32 LE |
//! | vote receipt | `0x20` | proposal | voter bytes |
//! | stake history | `0x22` | project | address bytes, increment u64 LE |
//! | counter | `0x30` | - | counter tag |

use crate::domain::value_objects::{Address, Asset};

/// Record family, the first byte of every key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyFamily {
    ContractConfig = 0x00,
    ProjectMeta = 0x01,
    ProjectConfig = 0x02,
    ProjectFinance = 0x03,
    ProjectMember = 0x04,
    ProjectPayoutLock = 0x05,
    ProjectWhitelist = 0x06,
    ProjectTreasury = 0x07,
    ProposalMeta = 0x10,
    ProposalOption = 0x11,
    VoteReceipt = 0x20,
    MemberStakeHistory = 0x22,
    Counter = 0x30,
}

impl KeyFamily {
    /// Prefix byte.
    #[must_use]
    pub const fn prefix(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Self::prefix`].
    #[must_use]
    pub const fn from_prefix(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::ContractConfig),
            0x01 => Some(Self::ProjectMeta),
            0x02 => Some(Self::ProjectConfig),
            0x03 => Some(Self::ProjectFinance),
            0x04 => Some(Self::ProjectMember),
            0x05 => Some(Self::ProjectPayoutLock),
            0x06 => Some(Self::ProjectWhitelist),
            0x07 => Some(Self::ProjectTreasury),
            0x10 => Some(Self::ProposalMeta),
            0x11 => Some(Self::ProposalOption),
            0x20 => Some(Self::VoteReceipt),
            0x22 => Some(Self::MemberStakeHistory),
            0x30 => Some(Self::Counter),
            _ => None,
        }
    }
}

/// Monotonic id counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Counter {
    Project = 0x01,
    Proposal = 0x02,
    Vote = 0x03,
}

// =============================================================================
// BUILDERS
// =============================================================================

fn with_id(family: KeyFamily, id: u64, suffix_len: usize) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 8 + suffix_len);
    key.push(family.prefix());
    key.extend_from_slice(&id.to_le_bytes());
    key
}

fn with_suffix(family: KeyFamily, id: u64, suffix: &[u8]) -> Vec<u8> {
    let mut key = with_id(family, id, suffix.len());
    key.extend_from_slice(suffix);
    key
}

#[must_use]
pub fn contract_config() -> Vec<u8> {
    vec![KeyFamily::ContractConfig.prefix()]
}

#[must_use]
pub fn counter(counter: Counter) -> Vec<u8> {
    vec![KeyFamily::Counter.prefix(), counter as u8]
}

#[must_use]
pub fn project_meta(project: u64) -> Vec<u8> {
    with_id(KeyFamily::ProjectMeta, project, 0)
}

#[must_use]
pub fn project_config(project: u64) -> Vec<u8> {
    with_id(KeyFamily::ProjectConfig, project, 0)
}

#[must_use]
pub fn project_finance(project: u64) -> Vec<u8> {
    with_id(KeyFamily::ProjectFinance, project, 0)
}

#[must_use]
pub fn member(project: u64, address: &Address) -> Vec<u8> {
    with_suffix(KeyFamily::ProjectMember, project, address.as_bytes())
}

#[must_use]
pub fn payout_lock(project: u64, address: &Address) -> Vec<u8> {
    with_suffix(KeyFamily::ProjectPayoutLock, project, address.as_bytes())
}

#[must_use]
pub fn whitelist(project: u64, address: &Address) -> Vec<u8> {
    with_suffix(KeyFamily::ProjectWhitelist, project, address.as_bytes())
}

#[must_use]
pub fn treasury(project: u64, asset: Asset) -> Vec<u8> {
    with_suffix(KeyFamily::ProjectTreasury, project, asset.as_str().as_bytes())
}

#[must_use]
pub fn proposal(proposal: u64) -> Vec<u8> {
    with_id(KeyFamily::ProposalMeta, proposal, 0)
}

#[must_use]
pub fn proposal_option(proposal: u64, index: u32) -> Vec<u8> {
    with_suffix(KeyFamily::ProposalOption, proposal, &index.to_le_bytes())
}

#[must_use]
pub fn vote_receipt(proposal: u64, voter: &Address) -> Vec<u8> {
    with_suffix(KeyFamily::VoteReceipt, proposal, voter.as_bytes())
}

#[must_use]
pub fn stake_history(project: u64, address: &Address, increment: u64) -> Vec<u8> {
    let mut key = with_id(
        KeyFamily::MemberStakeHistory,
        project,
        address.as_bytes().len() + 8,
    );
    key.extend_from_slice(address.as_bytes());
    key.extend_from_slice(&increment.to_le_bytes());
    key
}

/// Hex rendering for logs.
#[must_use]
pub fn display(key: &[u8]) -> String {
    hex::encode(key)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    #[test]
    fn test_layout() {
        assert_eq!(
            project_meta(1),
            vec![0x01, 1, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            proposal_option(2, 1),
            vec![0x11, 2, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0]
        );
        let key = treasury(0x0102, Asset::Hbd);
        assert_eq!(&key[..3], &[0x07, 0x02, 0x01]);
        assert_eq!(&key[9..], b"hbd");
    }

    #[test]
    fn test_treasury_keys_are_injective() {
        let mut seen = HashSet::new();
        for project in [0u64, 1, 2, 255, 256, u64::MAX] {
            for asset in Asset::ALL {
                assert!(seen.insert(treasury(project, asset)));
            }
        }
    }

    #[test]
    fn test_families_do_not_collide() {
        let a = addr("hive:alice");
        let keys = [
            project_meta(1),
            project_config(1),
            project_finance(1),
            member(1, &a),
            payout_lock(1, &a),
            whitelist(1, &a),
            treasury(1, Asset::Hive),
            proposal(1),
            proposal_option(1, 0),
            vote_receipt(1, &a),
            stake_history(1, &a, 0),
            counter(Counter::Project),
            contract_config(),
        ];
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
        for key in &keys {
            assert!(KeyFamily::from_prefix(key[0]).is_some());
        }
    }

    #[test]
    fn test_stake_history_suffix() {
        let key = stake_history(3, &addr("hive:bob"), 2);
        assert_eq!(key[0], 0x22);
        assert_eq!(&key[9..17], b"hive:bob");
        assert_eq!(&key[17..], &2u64.to_le_bytes());
    }
}
