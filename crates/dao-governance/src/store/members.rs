//! # Member Registry & Stake History
//!
//! Member records, their append-only stake history, payout-lock refcounts
//! and the project counters that must stay in step with them.
//!
//! ## Invariants
//!
//! - `ProjectFinance::member_count` equals the number of member records.
//! - `ProjectFinance::stake_total` equals the sum of member stakes.
//! - A member's highest history increment equals `stake_increment`.

use super::StateStore;
use crate::domain::entities::{Member, StakeHistoryEntry};
use crate::domain::value_objects::{Address, Amount};
use crate::errors::DaoError;
use crate::keyspace;
use crate::ports::outbound::ChainHost;
use tracing::debug;

impl<H: ChainHost> StateStore<H> {
    // =========================================================================
    // MEMBER RECORDS
    // =========================================================================

    /// Reads a member through the transaction cache.
    pub fn member(&mut self, project: u64, address: &Address) -> Result<Option<Member>, DaoError> {
        self.sync();
        let key = keyspace::member(project, address);
        if let Some(cached) = self.cache.member(&key) {
            return Ok(cached);
        }
        let loaded: Option<Member> = self.load(&key)?;
        self.cache.put_member(key, loaded.clone());
        Ok(loaded)
    }

    /// Like [`Self::member`] but fails with [`DaoError::NotMember`].
    pub fn require_member(&mut self, project: u64, address: &Address) -> Result<Member, DaoError> {
        self.member(project, address)?
            .ok_or_else(|| DaoError::NotMember {
                project,
                address: address.to_string(),
            })
    }

    /// Writes a member record and refreshes the cache. Does not touch
    /// project counters.
    pub fn save_member(&mut self, project: u64, member: &Member) -> Result<(), DaoError> {
        let key = keyspace::member(project, &member.address);
        self.save(&key, member)?;
        self.cache.put_member(key, Some(member.clone()));
        Ok(())
    }

    /// Enrolls a member: writes the record and history entry 0, then bumps
    /// the project's member count and stake total.
    pub fn create_member(&mut self, project: u64, address: &Address, stake: Amount, now: u64) -> Result<Member, DaoError> {
        if self.member(project, address)?.is_some() {
            return Err(DaoError::AlreadyMember(project));
        }
        let member = Member::new(address.clone(), stake, now);
        self.save_member(project, &member)?;
        self.save_stake_entry(project, address, 0, StakeHistoryEntry { stake, timestamp: now })?;

        let mut finance = self.project_finance(project)?;
        finance.member_count += 1;
        finance.stake_total = finance
            .stake_total
            .checked_add(stake)
            .ok_or_else(|| DaoError::InvalidAmount(stake.to_string()))?;
        self.save_project_finance(project, &finance)?;
        debug!(project, member = %address, %stake, "member created");
        Ok(member)
    }

    /// Sets a new stake: appends a history entry at the next increment and
    /// moves the project stake total by the difference.
    pub fn change_stake(&mut self, project: u64, member: &mut Member, stake: Amount, now: u64) -> Result<(), DaoError> {
        let delta = stake
            .checked_sub(member.stake)
            .ok_or_else(|| DaoError::InvalidAmount(stake.to_string()))?;
        member.stake_increment += 1;
        member.stake = stake;
        self.save_stake_entry(
            project,
            &member.address,
            member.stake_increment,
            StakeHistoryEntry { stake, timestamp: now },
        )?;
        self.save_member(project, member)?;

        let mut finance = self.project_finance(project)?;
        finance.stake_total = finance
            .stake_total
            .checked_add(delta)
            .ok_or_else(|| DaoError::InvalidAmount(stake.to_string()))?;
        self.save_project_finance(project, &finance)?;
        debug!(project, member = %member.address, %stake, increment = member.stake_increment, "stake changed");
        Ok(())
    }

    /// Deletes a member with its whole stake history and decrements the
    /// project counters.
    ///
    /// # Errors
    ///
    /// [`DaoError::PayoutLocked`] while any proposal names the member as a
    /// payout beneficiary.
    pub fn remove_member(&mut self, project: u64, member: &Member) -> Result<(), DaoError> {
        let locks = self.payout_lock(project, &member.address)?;
        if locks > 0 {
            return Err(DaoError::PayoutLocked { locks });
        }
        for increment in 0..=member.stake_increment {
            self.delete_raw(&keyspace::stake_history(project, &member.address, increment))?;
        }
        let key = keyspace::member(project, &member.address);
        self.delete_raw(&key)?;
        self.cache.put_member(key, None);

        let mut finance = self.project_finance(project)?;
        finance.member_count = finance.member_count.saturating_sub(1);
        finance.stake_total = finance
            .stake_total
            .checked_sub(member.stake)
            .ok_or_else(|| DaoError::InvalidAmount(member.stake.to_string()))?;
        self.save_project_finance(project, &finance)?;
        debug!(project, member = %member.address, "member removed");
        Ok(())
    }

    // =========================================================================
    // STAKE HISTORY
    // =========================================================================

    pub fn stake_entry(&self, project: u64, address: &Address, increment: u64) -> Result<Option<StakeHistoryEntry>, DaoError> {
        self.load(&keyspace::stake_history(project, address, increment))
    }

    fn save_stake_entry(&mut self, project: u64, address: &Address, increment: u64, entry: StakeHistoryEntry) -> Result<(), DaoError> {
        self.save(&keyspace::stake_history(project, address, increment), &entry)
    }

    /// Entries 0..=stake_increment in increment order. Missing entries are
    /// skipped.
    pub fn stake_history(&self, project: u64, member: &Member) -> Result<Vec<StakeHistoryEntry>, DaoError> {
        let mut entries = Vec::new();
        for increment in 0..=member.stake_increment {
            if let Some(entry) = self.stake_entry(project, &member.address, increment)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Stake that was current at `timestamp`: scans from the newest increment
    /// down and returns the first entry not later than `timestamp`. Zero when
    /// every entry is later.
    pub fn stake_at(&self, project: u64, member: &Member, timestamp: u64) -> Result<Amount, DaoError> {
        for increment in (0..=member.stake_increment).rev() {
            if let Some(entry) = self.stake_entry(project, &member.address, increment)? {
                if entry.timestamp <= timestamp {
                    return Ok(entry.stake);
                }
            }
        }
        Ok(Amount::ZERO)
    }

    // =========================================================================
    // PAYOUT LOCKS
    // =========================================================================

    pub fn payout_lock(&self, project: u64, address: &Address) -> Result<u64, DaoError> {
        Ok(self.load(&keyspace::payout_lock(project, address))?.unwrap_or(0))
    }

    pub fn increment_payout_lock(&mut self, project: u64, address: &Address) -> Result<u64, DaoError> {
        let next = self.payout_lock(project, address)? + 1;
        self.save(&keyspace::payout_lock(project, address), &next)?;
        Ok(next)
    }

    /// Decrements the refcount, deleting the record at zero.
    pub fn decrement_payout_lock(&mut self, project: u64, address: &Address) -> Result<u64, DaoError> {
        let key = keyspace::payout_lock(project, address);
        let next = self.payout_lock(project, address)?.saturating_sub(1);
        if next == 0 {
            self.delete_raw(&key)?;
        } else {
            self.save(&key, &next)?;
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use crate::adapters::memory_host::InMemoryHost;
    use crate::codec::Encode;
    use crate::domain::entities::{Member, ProjectFinance};
    use crate::domain::invariants::{check_project_totals, check_stake_history};
    use crate::domain::value_objects::{Address, Amount, Asset};
    use crate::errors::DaoError;
    use crate::keyspace;
    use crate::ports::outbound::{ChainHost, TxEnv};
    use crate::store::StateStore;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn store_with_project() -> StateStore<InMemoryHost> {
        let mut store = StateStore::new(InMemoryHost::new(), 8);
        store
            .save_project_finance(
                0,
                &ProjectFinance {
                    funds_asset: Asset::Hive,
                    stake_total: Amount::ZERO,
                    member_count: 0,
                },
            )
            .unwrap();
        store
    }

    #[test]
    fn test_create_member_updates_totals() {
        let mut store = store_with_project();
        let a = store.create_member(0, &addr("hive:a"), Amount::from_units(2), 100).unwrap();
        let b = store.create_member(0, &addr("hive:b"), Amount::from_units(3), 100).unwrap();

        let finance = store.project_finance(0).unwrap();
        assert_eq!(finance.member_count, 2);
        assert_eq!(finance.stake_total, Amount::from_units(5));
        assert!(check_project_totals(&finance, &[a, b]).is_empty());

        assert_eq!(
            store.create_member(0, &addr("hive:a"), Amount::ZERO, 101),
            Err(DaoError::AlreadyMember(0))
        );
    }

    #[test]
    fn test_stake_at_scans_downward() {
        let mut store = store_with_project();
        let mut m = store.create_member(0, &addr("hive:a"), Amount::from_units(1), 100).unwrap();
        store.change_stake(0, &mut m, Amount::from_units(4), 200).unwrap();
        store.change_stake(0, &mut m, Amount::from_units(2), 300).unwrap();

        assert_eq!(store.stake_at(0, &m, 50).unwrap(), Amount::ZERO);
        assert_eq!(store.stake_at(0, &m, 100).unwrap(), Amount::from_units(1));
        assert_eq!(store.stake_at(0, &m, 250).unwrap(), Amount::from_units(4));
        assert_eq!(store.stake_at(0, &m, 1_000).unwrap(), Amount::from_units(2));

        let history = store.stake_history(0, &m).unwrap();
        assert_eq!(history.len(), 3);
        assert!(check_stake_history(&m, &history).is_empty());
        assert_eq!(store.project_finance(0).unwrap().stake_total, Amount::from_units(2));
    }

    #[test]
    fn test_remove_blocked_by_payout_lock() {
        let mut store = store_with_project();
        let a = addr("hive:a");
        let mut m = store.create_member(0, &a, Amount::from_units(1), 100).unwrap();
        store.change_stake(0, &mut m, Amount::from_units(2), 150).unwrap();
        store.increment_payout_lock(0, &a).unwrap();

        assert_eq!(store.remove_member(0, &m), Err(DaoError::PayoutLocked { locks: 1 }));

        assert_eq!(store.decrement_payout_lock(0, &a).unwrap(), 0);
        store.remove_member(0, &m).unwrap();
        assert!(store.member(0, &a).unwrap().is_none());
        assert!(store.stake_entry(0, &a, 0).unwrap().is_none());
        assert!(store.stake_entry(0, &a, 1).unwrap().is_none());

        let finance = store.project_finance(0).unwrap();
        assert_eq!(finance.member_count, 0);
        assert_eq!(finance.stake_total, Amount::ZERO);
    }

    #[test]
    fn test_member_reads_see_same_tx_writes() {
        let mut store = store_with_project();
        let a = addr("hive:a");
        assert!(store.member(0, &a).unwrap().is_none());
        store.create_member(0, &a, Amount::ZERO, 1).unwrap();
        assert!(store.member(0, &a).unwrap().is_some());
        assert_eq!(store.cache().member_len(), 1);
    }

    #[test]
    fn test_host_tx_change_flushes_cached_reads() {
        let mut store = store_with_project();
        let tx = |id: &str, sender: &str, timestamp: u64| TxEnv {
            tx_id: id.to_string(),
            sender: addr(sender),
            timestamp,
            intents: Vec::new(),
        };
        store.host_mut().begin_transaction(tx("tx-1", "hive:a", 10));
        assert_eq!(store.env().sender, addr("hive:a"));
        let b = addr("hive:b");
        assert!(store.member(0, &b).unwrap().is_none());

        // Written behind the cache, as a later transaction would.
        let record = Member::new(b.clone(), Amount::ZERO, 10);
        store
            .host_mut()
            .state_set(&keyspace::member(0, &b), &record.to_bytes())
            .unwrap();
        assert!(store.member(0, &b).unwrap().is_none());

        store.host_mut().begin_transaction(tx("tx-2", "hive:b", 20));
        assert_eq!(store.member(0, &b).unwrap(), Some(record));
        let env = store.env();
        assert_eq!(env.sender, b);
        assert_eq!(env.timestamp, 20);
        assert_eq!(store.cache().tx_id(), Some("tx-2"));
    }
}
