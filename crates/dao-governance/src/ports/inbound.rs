//! # Driving Ports (API - Inbound)
//!
//! The entry points the host routes calls to. Each action takes a single
//! textual payload and returns a short success string; failures abort the
//! transaction.

use crate::errors::DaoError;
use std::fmt;
use std::str::FromStr;

/// Every callable action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    ContractInit,
    ProjectCreate,
    ProjectJoin,
    ProjectLeave,
    ProjectFunds,
    ProjectWhitelistAdd,
    ProjectWhitelistRemove,
    ProjectPause,
    ProjectTransfer,
    ProposalCreate,
    ProposalsVote,
    ProposalTally,
    ProposalExecute,
    ProposalCancel,
}

impl Action {
    /// The dispatch table, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::ContractInit,
        Self::ProjectCreate,
        Self::ProjectJoin,
        Self::ProjectLeave,
        Self::ProjectFunds,
        Self::ProjectWhitelistAdd,
        Self::ProjectWhitelistRemove,
        Self::ProjectPause,
        Self::ProjectTransfer,
        Self::ProposalCreate,
        Self::ProposalsVote,
        Self::ProposalTally,
        Self::ProposalExecute,
        Self::ProposalCancel,
    ];

    /// Name the host routes on.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ContractInit => "contract_init",
            Self::ProjectCreate => "project_create",
            Self::ProjectJoin => "project_join",
            Self::ProjectLeave => "project_leave",
            Self::ProjectFunds => "project_funds",
            Self::ProjectWhitelistAdd => "project_whitelist_add",
            Self::ProjectWhitelistRemove => "project_whitelist_remove",
            Self::ProjectPause => "project_pause",
            Self::ProjectTransfer => "project_transfer",
            Self::ProposalCreate => "proposal_create",
            Self::ProposalsVote => "proposals_vote",
            Self::ProposalTally => "proposal_tally",
            Self::ProposalExecute => "proposal_execute",
            Self::ProposalCancel => "proposal_cancel",
        }
    }

    /// Everything except `contract_init` needs an initialized contract.
    #[must_use]
    pub const fn requires_init(&self) -> bool {
        !matches!(self, Self::ContractInit)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = DaoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| DaoError::UnknownAction(s.to_string()))
    }
}

/// Primary driving port.
pub trait GovernanceApi {
    /// Routes `payload` to the handler for `action`.
    ///
    /// # Errors
    ///
    /// Any [`DaoError`]; the transaction has been aborted when this returns
    /// `Err`.
    fn invoke(&mut self, action: &str, payload: &str) -> Result<String, DaoError>;
}
