//! # DAO Governance Engine
//!
//! On-chain governance for Hive-style smart-contract hosts: projects with
//! members, treasuries and weighted proposals, persisted as byte-stable
//! records in the host's key-value state.
//!
//! ## Purpose
//!
//! A project owner opens a project, members join under a democratic or
//! stake-weighted voting system, and proposals move through
//! `Active -> Passed/Failed/Closed -> Executed` or `Active -> Cancelled`.
//! Passed proposals pay out treasury funds, rewrite project configuration and
//! call other contracts.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | `stake_total` equals the sum of member stakes | `store/members.rs`, `domain/invariants.rs` |
//! | `member_count` equals the number of member records | `store/members.rs`, `domain/invariants.rs` |
//! | Stake history timestamps are non-decreasing | `store/members.rs` - `change_stake()` |
//! | Treasury balances never go negative | `store/treasury.rs` |
//! | One receipt per (proposal, voter) | `service/voting.rs` |
//! | Terminal proposal states never change | `domain/value_objects.rs` - `ProposalState::can_transition_to()` |
//! | A failed call leaves no state behind | `service/mod.rs` - `GovernanceApi::invoke()` |
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Keyspace | `keyspace.rs` | Family-prefixed key layout |
//! | Codec | `codec/` | Length-prefixed binary record encoding |
//! | Store | `store/` | Typed state access with a per-transaction cache |
//! | Tally | `domain/tally.rs` | Quorum, threshold and winner selection |
//! | Service | `service/` | Action handlers and the abort wrapper |
//! | In-memory host | `adapters/memory_host.rs` | Test host with snapshots |
//!
//! ## Usage Example
//!
//! ```ignore
//! use dao_governance::prelude::*;
//!
//! let mut dao = GovernanceService::new(InMemoryHost::new(), EngineConfig::default());
//! dao.host_mut().begin_transaction(env);
//! dao.invoke("contract_init", "public")?;
//! dao.host_mut().commit();
//! ```

// Crate-level lints
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod codec;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod keyspace;
pub mod ports;
pub mod service;
pub mod store;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        ContractConfig, InterContractCall, Member, PayoutEntry, Project, ProjectConfig,
        ProjectFinance, ProjectMeta, Proposal, ProposalOption, ProposalOutcome,
        StakeHistoryEntry, VoteReceipt,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        Address, Amount, Asset, ProposalState, VotingSystem, SECONDS_PER_HOUR,
    };

    // Tally
    pub use crate::domain::tally::{compute_tally, QuorumPolicy, TiePolicy};

    // Ports
    pub use crate::ports::inbound::{Action, GovernanceApi};
    pub use crate::ports::outbound::{ChainHost, Intent, TxEnv};

    // Adapters
    pub use crate::adapters::{InMemoryHost, CONTRACT_ADDRESS};

    // Service
    pub use crate::service::{GovernanceService, ServiceStats};

    // Configuration, errors and events
    pub use crate::config::{EngineConfig, ProjectDefaults};
    pub use crate::errors::{DaoError, ErrorKind};
    pub use crate::events::Event;
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
