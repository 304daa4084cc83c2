//! # Value Objects
//!
//! Immutable domain primitives: addresses, assets, fixed-point amounts and the
//! small enums persisted as single bytes.

use crate::errors::DaoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seconds per hour; all configured durations are in hours.
pub const SECONDS_PER_HOUR: u64 = 3600;

/// Maximum accepted address length.
pub const MAX_ADDRESS_LEN: usize = 128;

// =============================================================================
// ADDRESS
// =============================================================================

/// A chain account or contract address in its textual form (`hive:alice`).
///
/// Keys embed the raw bytes of this string, so it must never contain the
/// payload delimiters.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Validates and wraps an address.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::InvalidAddress`] when the string is empty, too long,
    /// or contains whitespace or one of `|`, `;`, `,`.
    pub fn parse(raw: &str) -> Result<Self, DaoError> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.len() > MAX_ADDRESS_LEN
            || trimmed
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '|' | ';' | ','))
        {
            return Err(DaoError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wraps a string read back from storage without validation.
    #[must_use]
    pub fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    /// Returns the textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the raw bytes used as a key suffix.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = DaoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// =============================================================================
// ASSET
// =============================================================================

/// Assets the host can move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    /// HIVE.
    Hive,
    /// HBD.
    Hbd,
    /// HBD held in savings.
    HbdSavings,
}

impl Asset {
    /// All known assets.
    pub const ALL: [Self; 3] = [Self::Hive, Self::Hbd, Self::HbdSavings];

    /// Canonical lowercase name, also the key suffix.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hive => "hive",
            Self::Hbd => "hbd",
            Self::HbdSavings => "hbd_savings",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Asset {
    type Err = DaoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hive" => Ok(Self::Hive),
            "hbd" => Ok(Self::Hbd),
            "hbd_savings" => Ok(Self::HbdSavings),
            _ => Err(DaoError::InvalidAsset(s.to_string())),
        }
    }
}

// =============================================================================
// AMOUNT (fixed point, three decimals)
// =============================================================================

/// A signed amount scaled by 1000 (`1.000` is stored as `1000`).
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Scale factor between display units and stored units.
    pub const SCALE: i64 = 1000;

    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Wraps an already-scaled value.
    #[must_use]
    pub const fn from_scaled(raw: i64) -> Self {
        Self(raw)
    }

    /// Builds an amount from whole units.
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units * Self::SCALE)
    }

    /// Returns the scaled integer.
    #[must_use]
    pub const fn scaled(&self) -> i64 {
        self.0
    }

    /// True for zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// True for strictly positive amounts.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checked addition.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Parses a decimal string with at most three fractional digits.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::InvalidAmount`] for negative, malformed, over-precise
    /// or overflowing input.
    pub fn parse(raw: &str) -> Result<Self, DaoError> {
        let s = raw.trim();
        let invalid = || DaoError::InvalidAmount(raw.to_string());
        if s.is_empty() || s.starts_with('-') || s.starts_with('+') {
            return Err(invalid());
        }
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > 3
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut frac_scaled: i64 = 0;
        for (i, digit) in frac.chars().enumerate() {
            let d = i64::from(digit.to_digit(10).ok_or_else(invalid)?);
            frac_scaled += d * 10_i64.pow(2 - i as u32);
        }
        whole
            .checked_mul(Self::SCALE)
            .and_then(|w| w.checked_add(frac_scaled))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({self})")
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = Self::SCALE.unsigned_abs();
        write!(f, "{sign}{}.{:03}", abs / scale, abs % scale)
    }
}

impl FromStr for Amount {
    type Err = DaoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// =============================================================================
// VOTING SYSTEM
// =============================================================================

/// How vote weight is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingSystem {
    /// One member, one vote.
    #[default]
    Democratic,
    /// Weight equals stake at proposal creation.
    Stake,
}

impl VotingSystem {
    /// Persisted tag.
    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Democratic => 0,
            Self::Stake => 1,
        }
    }

    /// Inverse of [`Self::tag`].
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Democratic),
            1 => Some(Self::Stake),
            _ => None,
        }
    }
}

impl FromStr for VotingSystem {
    type Err = DaoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "democratic" | "0" => Ok(Self::Democratic),
            "stake" | "stake_based" | "1" => Ok(Self::Stake),
            _ => Err(DaoError::InvalidField {
                field: "voting system",
                reason: format!("unknown voting system {s:?}"),
            }),
        }
    }
}

impl fmt::Display for VotingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Democratic => f.write_str("democratic"),
            Self::Stake => f.write_str("stake"),
        }
    }
}

// =============================================================================
// PROPOSAL STATE
// =============================================================================

/// Lifecycle state of a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalState {
    /// Open for votes.
    Active,
    /// Poll that met quorum and threshold.
    Closed,
    /// Executable proposal that met quorum and threshold.
    Passed,
    /// Outcome applied.
    Executed,
    /// Quorum or threshold missed.
    Failed,
    /// Withdrawn by creator or owner.
    Cancelled,
}

impl ProposalState {
    /// Persisted tag.
    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Active => 0,
            Self::Closed => 1,
            Self::Passed => 2,
            Self::Executed => 3,
            Self::Failed => 4,
            Self::Cancelled => 5,
        }
    }

    /// Inverse of [`Self::tag`].
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Active),
            1 => Some(Self::Closed),
            2 => Some(Self::Passed),
            3 => Some(Self::Executed),
            4 => Some(Self::Failed),
            5 => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Lowercase name used in events.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Passed => "passed",
            Self::Executed => "executed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// True for states that never change again.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Executed | Self::Closed | Self::Failed | Self::Cancelled
        )
    }

    /// The only permitted edges: Active to {Closed, Passed, Failed, Cancelled}
    /// and Passed to Executed.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Active,
                Self::Closed | Self::Passed | Self::Failed | Self::Cancelled
            ) | (Self::Passed, Self::Executed)
        )
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// FLAGS
// =============================================================================

/// Parses `1/0`, `true/false` or `yes/no`, case-insensitively.
#[must_use]
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_parse() {
        assert_eq!(Amount::parse("1").unwrap().scaled(), 1000);
        assert_eq!(Amount::parse("1.5").unwrap().scaled(), 1500);
        assert_eq!(Amount::parse("0.001").unwrap().scaled(), 1);
        assert_eq!(Amount::parse(".25").unwrap().scaled(), 250);
        assert_eq!(Amount::parse("12.345").unwrap().scaled(), 12_345);
        assert!(Amount::parse("1.2345").is_err());
        assert!(Amount::parse("-1").is_err());
        assert!(Amount::parse("abc").is_err());
        assert!(Amount::parse("").is_err());
        assert!(Amount::parse(".").is_err());
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::from_scaled(1000).to_string(), "1.000");
        assert_eq!(Amount::from_scaled(2).to_string(), "0.002");
        assert_eq!(Amount::from_scaled(-1500).to_string(), "-1.500");
    }

    #[test]
    fn test_address_validation() {
        assert!(Address::parse("hive:alice").is_ok());
        assert!(Address::parse("").is_err());
        assert!(Address::parse("hive:a|b").is_err());
        assert!(Address::parse("hive:a;b").is_err());
        assert!(Address::parse("hive: a").is_err());
        assert_eq!(Address::parse(" hive:bob ").unwrap().as_str(), "hive:bob");
    }

    #[test]
    fn test_asset_parse() {
        assert_eq!("HIVE".parse::<Asset>().unwrap(), Asset::Hive);
        assert_eq!("hbd_savings".parse::<Asset>().unwrap(), Asset::HbdSavings);
        assert!("btc".parse::<Asset>().is_err());
    }

    #[test]
    fn test_state_transitions() {
        use ProposalState::*;
        assert!(Active.can_transition_to(Passed));
        assert!(Active.can_transition_to(Cancelled));
        assert!(Passed.can_transition_to(Executed));
        assert!(!Passed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Active));
        assert!(!Executed.can_transition_to(Executed));
        for state in [Closed, Executed, Failed, Cancelled] {
            assert!(state.is_terminal());
            assert!(!state.can_transition_to(Active));
        }
    }

    #[test]
    fn test_tags_roundtrip() {
        for tag in 0..6 {
            assert_eq!(ProposalState::from_tag(tag).unwrap().tag(), tag);
        }
        assert!(ProposalState::from_tag(6).is_none());
        assert!(VotingSystem::from_tag(2).is_none());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("YES"), Some(true));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag(" no "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
