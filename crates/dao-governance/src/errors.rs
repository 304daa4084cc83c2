//! # Error Types
//!
//! All error types for the governance engine. Every error is fatal to the
//! current transaction: the dispatcher hands its display string to the host
//! abort primitive.

use thiserror::Error;

// =============================================================================
// ERROR KIND
// =============================================================================

/// Coarse classification of a [`DaoError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Contract init state is wrong for the call.
    Initialization,
    /// Caller lacks the required role.
    Authorization,
    /// Malformed or out-of-range input.
    Validation,
    /// Record is in the wrong lifecycle state.
    State,
    /// Not enough funds or intent allowance.
    Resource,
    /// Membership exit rules not satisfied.
    Lifecycle,
    /// Persisted bytes could not be decoded.
    Codec,
    /// A host primitive failed.
    Host,
}

// =============================================================================
// DAO ERRORS
// =============================================================================

/// Errors raised by entry-point handlers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DaoError {
    // --- Initialization ---
    /// Any action other than `contract_init` before init.
    #[error("contract not initialized")]
    NotInitialized,

    /// `contract_init` called twice.
    #[error("contract already initialized")]
    AlreadyInitialized,

    // --- Authorization ---
    /// Only the contract or project owner may do this.
    #[error("only the owner can {action}")]
    OnlyOwner { action: &'static str },

    /// Only the proposal creator or project owner may do this.
    #[error("only the proposal creator or project owner can {action}")]
    OnlyCreatorOrOwner { action: &'static str },

    /// Only the proposal creator may execute inter-contract calls.
    #[error("only the proposal creator can execute a proposal with contract calls")]
    OnlyCreator,

    /// Caller must be a project member.
    #[error("only members can {action}")]
    OnlyMembers { action: &'static str },

    /// Whitelist-only project and caller is not whitelisted.
    #[error("whitelist approval required")]
    WhitelistRequired,

    /// Membership NFT gate rejected the caller.
    #[error("membership nft ownership required: {reason}")]
    NftRequired { reason: String },

    /// Project owner cannot leave its own project.
    #[error("project owner cannot leave the project")]
    OwnerCannotLeave,

    // --- Validation ---
    /// Payload could not be parsed.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Unknown action name.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// Asset not accepted.
    #[error("invalid asset: {0}")]
    InvalidAsset(String),

    /// Amount malformed or out of range.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Address malformed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A text field is empty or too long.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Option text empty or over the limit.
    #[error("option text must be 1..={max} characters")]
    InvalidOptionText { max: usize },

    /// URL must use https.
    #[error("url must start with https://")]
    UrlNotHttps,

    /// URL over the limit.
    #[error("url too long: {len} > {max}")]
    UrlTooLong { len: usize, max: usize },

    /// Vote choice beyond the option count.
    #[error("choice {choice} out of range (options: {options})")]
    ChoiceOutOfRange { choice: u32, options: u32 },

    /// Vote with an empty choice set.
    #[error("at least one choice is required")]
    EmptyChoices,

    /// Same asset listed twice on one contract call.
    #[error("duplicate asset {0} in contract call")]
    DuplicateCallAsset(String),

    /// Stake voting with nothing staked.
    #[error("stake-based project has zero total stake")]
    ZeroStakeTotal,

    /// Percent outside (0, 100].
    #[error("{field} must be within (0, 100], got {value}")]
    InvalidPercent { field: &'static str, value: f64 },

    /// Membership payload must carry both placeholders.
    #[error("membership nft payload must contain {{nft}} and {{caller}}")]
    InvalidNftPayload,

    /// Requested proposal duration under the project minimum.
    #[error("proposal duration {requested}h is below the project minimum of {minimum}h")]
    DurationTooShort { requested: u64, minimum: u64 },

    /// Directive value could not be applied.
    #[error("invalid value for {directive}: {reason}")]
    InvalidDirective { directive: String, reason: String },

    // --- State ---
    /// Project does not exist.
    #[error("project {0} not found")]
    ProjectNotFound(u64),

    /// Proposal does not exist.
    #[error("proposal {0} not found")]
    ProposalNotFound(u64),

    /// Project paused and no override applies.
    #[error("project {0} is paused")]
    ProjectPaused(u64),

    /// Proposal is not active.
    #[error("proposal {0} is not active")]
    ProposalNotActive(u64),

    /// Voting window is over.
    #[error("proposal {id} voting ended at {ended_at}")]
    ProposalExpired { id: u64, ended_at: u64 },

    /// Tally before the voting window is over.
    #[error("proposal {id} is still running, wait until {ends_at}")]
    TallyTooEarly { id: u64, ends_at: u64 },

    /// Execution before executable-at.
    #[error("proposal {id} not ready, executable at {ready_at}")]
    ProposalNotReady { id: u64, ready_at: u64 },

    /// Execution of a proposal that did not pass.
    #[error("proposal {id} has not passed (state: {state})")]
    ProposalNotPassed { id: u64, state: String },

    /// Second execution.
    #[error("proposal {0} already executed")]
    AlreadyExecuted(u64),

    /// Receipt already exists.
    #[error("already voted on proposal {0}")]
    AlreadyVoted(u64),

    /// Member joined after the proposal snapshot.
    #[error("member joined after proposal {0} was created")]
    JoinedAfterCreation(u64),

    /// Caller is already a member.
    #[error("already a member of project {0}")]
    AlreadyMember(u64),

    /// Address is not a member.
    #[error("{address} is not a member of project {project}")]
    NotMember { project: u64, address: String },

    // --- Resource ---
    /// Treasury cannot cover the amount.
    #[error("insufficient treasury balance for {asset}: required {required}, available {available}")]
    InsufficientTreasury {
        asset: String,
        required: String,
        available: String,
    },

    /// No usable transfer intent.
    #[error("transfer intent required for {asset}")]
    MissingIntent { asset: String },

    /// Transfer intent limit too small.
    #[error("insufficient intent limit: required {required}, available {available}")]
    InsufficientIntent { required: String, available: String },

    /// Intent asset differs from the one required.
    #[error("intent asset {found} does not match required asset {expected}")]
    IntentAssetMismatch { expected: String, found: String },

    /// Stake under the project minimum.
    #[error("stake {provided} is below the minimum of {minimum}")]
    StakeBelowMinimum { provided: String, minimum: String },

    // --- Lifecycle ---
    /// Leave cooldown not elapsed.
    #[error("leave cooldown not passed, retry after {ready_at}")]
    CooldownNotPassed { ready_at: u64 },

    /// Member is a pending payout beneficiary.
    #[error("member is locked by {locks} pending payout(s)")]
    PayoutLocked { locks: u64 },

    // --- Nested ---
    /// Decoding persisted bytes failed.
    #[error("decode error: {0}")]
    Codec(#[from] CodecError),

    /// Host primitive failed.
    #[error("host error: {0}")]
    Host(#[from] HostError),
}

impl DaoError {
    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotInitialized | Self::AlreadyInitialized => ErrorKind::Initialization,
            Self::OnlyOwner { .. }
            | Self::OnlyCreatorOrOwner { .. }
            | Self::OnlyCreator
            | Self::OnlyMembers { .. }
            | Self::WhitelistRequired
            | Self::NftRequired { .. }
            | Self::OwnerCannotLeave => ErrorKind::Authorization,
            Self::InvalidPayload(_)
            | Self::UnknownAction(_)
            | Self::InvalidAsset(_)
            | Self::InvalidAmount(_)
            | Self::InvalidAddress(_)
            | Self::InvalidField { .. }
            | Self::InvalidOptionText { .. }
            | Self::UrlNotHttps
            | Self::UrlTooLong { .. }
            | Self::ChoiceOutOfRange { .. }
            | Self::EmptyChoices
            | Self::DuplicateCallAsset(_)
            | Self::ZeroStakeTotal
            | Self::InvalidPercent { .. }
            | Self::InvalidNftPayload
            | Self::DurationTooShort { .. }
            | Self::InvalidDirective { .. } => ErrorKind::Validation,
            Self::ProjectNotFound(_)
            | Self::ProposalNotFound(_)
            | Self::ProjectPaused(_)
            | Self::ProposalNotActive(_)
            | Self::ProposalExpired { .. }
            | Self::TallyTooEarly { .. }
            | Self::ProposalNotReady { .. }
            | Self::ProposalNotPassed { .. }
            | Self::AlreadyExecuted(_)
            | Self::AlreadyVoted(_)
            | Self::JoinedAfterCreation(_)
            | Self::AlreadyMember(_)
            | Self::NotMember { .. } => ErrorKind::State,
            Self::InsufficientTreasury { .. }
            | Self::MissingIntent { .. }
            | Self::InsufficientIntent { .. }
            | Self::IntentAssetMismatch { .. }
            | Self::StakeBelowMinimum { .. } => ErrorKind::Resource,
            Self::CooldownNotPassed { .. } | Self::PayoutLocked { .. } => ErrorKind::Lifecycle,
            Self::Codec(_) => ErrorKind::Codec,
            Self::Host(_) => ErrorKind::Host,
        }
    }
}

// =============================================================================
// CODEC ERRORS
// =============================================================================

/// Errors from decoding persisted records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Buffer ended before a field was complete.
    #[error("unexpected end of input at offset {offset}: needed {needed} more byte(s)")]
    UnexpectedEof { offset: usize, needed: usize },

    /// Varint longer than 10 bytes or overflowing u64.
    #[error("invalid varint at offset {0}")]
    InvalidVarint(usize),

    /// String bytes are not UTF-8.
    #[error("invalid utf-8 string at offset {0}")]
    InvalidUtf8(usize),

    /// Presence flag or bool byte other than 0/1.
    #[error("invalid flag byte 0x{value:02x} at offset {offset}")]
    InvalidFlag { offset: usize, value: u8 },

    /// Enum discriminant or tag out of range.
    #[error("invalid {what}: {value}")]
    InvalidTag { what: &'static str, value: String },
}

// =============================================================================
// HOST ERRORS
// =============================================================================

/// Errors reported by host primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// KV store failure.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Draw or transfer failed.
    #[error("transfer failed: {0}")]
    Transfer(String),

    /// Inter-contract call failed.
    #[error("contract call {contract}.{function} failed: {reason}")]
    ContractCall {
        contract: String,
        function: String,
        reason: String,
    },
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(DaoError::NotInitialized.kind(), ErrorKind::Initialization);
        assert_eq!(DaoError::WhitelistRequired.kind(), ErrorKind::Authorization);
        assert_eq!(DaoError::UrlNotHttps.kind(), ErrorKind::Validation);
        assert_eq!(DaoError::AlreadyVoted(1).kind(), ErrorKind::State);
        assert_eq!(DaoError::PayoutLocked { locks: 2 }.kind(), ErrorKind::Lifecycle);
        assert_eq!(
            DaoError::from(CodecError::InvalidVarint(3)).kind(),
            ErrorKind::Codec
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DaoError::WhitelistRequired.to_string(),
            "whitelist approval required"
        );
        assert_eq!(
            DaoError::ProposalNotActive(7).to_string(),
            "proposal 7 is not active"
        );
        assert_eq!(
            DaoError::InvalidNftPayload.to_string(),
            "membership nft payload must contain {nft} and {caller}"
        );
    }
}
