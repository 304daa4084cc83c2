//! # Per-Transaction Cache
//!
//! Memoizes the env snapshot, the resolved transfer intent and member records
//! for the duration of one host transaction.
//!
//! ## Invalidation
//!
//! Entries are tagged implicitly with the transaction id observed when they
//! were filled. Observing a different id flushes everything, the same way a
//! head change flushes a block-tagged account cache.

use crate::domain::entities::Member;
use crate::domain::value_objects::{Amount, Asset};
use crate::ports::outbound::TxEnv;
use lru::LruCache;
use std::num::NonZeroUsize;

/// A resolved `transfer.allow` intent and how much of it this transaction
/// has drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntentBudget {
    pub asset: Asset,
    pub limit: Amount,
    pub drawn: Amount,
}

impl IntentBudget {
    /// Allowance not yet drawn.
    #[must_use]
    pub fn remaining(&self) -> Amount {
        self.limit
            .checked_sub(self.drawn)
            .unwrap_or(Amount::ZERO)
    }
}

/// Transaction-scoped memoization.
pub struct TxCache {
    tx_id: Option<String>,
    env: Option<TxEnv>,
    /// `Some(None)` records that the env carries no usable intent.
    intent: Option<Option<IntentBudget>>,
    /// Keyed by the member's composite key; `None` caches a miss.
    members: LruCache<Vec<u8>, Option<Member>>,
}

impl TxCache {
    /// Cache holding at most `member_capacity` members.
    #[must_use]
    pub fn new(member_capacity: usize) -> Self {
        let cap = NonZeroUsize::new(member_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            tx_id: None,
            env: None,
            intent: None,
            members: LruCache::new(cap),
        }
    }

    /// Records the transaction id; flushes when it differs from the last one.
    /// Returns true if a flush happened.
    pub fn observe(&mut self, tx_id: &str) -> bool {
        if self.tx_id.as_deref() == Some(tx_id) {
            return false;
        }
        self.clear();
        self.tx_id = Some(tx_id.to_string());
        true
    }

    /// Drops every entry, including the observed id.
    pub fn clear(&mut self) {
        self.tx_id = None;
        self.env = None;
        self.intent = None;
        self.members.clear();
    }

    #[must_use]
    pub fn tx_id(&self) -> Option<&str> {
        self.tx_id.as_deref()
    }

    #[must_use]
    pub fn env(&self) -> Option<&TxEnv> {
        self.env.as_ref()
    }

    pub fn set_env(&mut self, env: TxEnv) {
        self.env = Some(env);
    }

    #[must_use]
    pub fn intent(&self) -> Option<Option<IntentBudget>> {
        self.intent
    }

    pub fn set_intent(&mut self, intent: Option<IntentBudget>) {
        self.intent = Some(intent);
    }

    /// `None` when not cached; `Some(None)` for a cached miss.
    pub fn member(&mut self, key: &[u8]) -> Option<Option<Member>> {
        self.members.get(key).cloned()
    }

    pub fn put_member(&mut self, key: Vec<u8>, member: Option<Member>) {
        self.members.put(key, member);
    }

    /// Members currently memoized.
    #[must_use]
    pub fn member_len(&self) -> usize {
        self.members.len()
    }
}
