//! # Engine Configuration
//!
//! Deployment-time knobs: accepted assets, tally policies, field limits and
//! the fallbacks applied to empty payload fields.

use crate::domain::tally::{QuorumPolicy, TiePolicy};
use crate::domain::value_objects::{Amount, Asset};
use serde::{Deserialize, Serialize};

/// Fallbacks for empty `project_create` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDefaults {
    pub threshold_percent: f64,
    pub quorum_percent: f64,
    pub proposal_duration_hours: u64,
    pub execution_delay_hours: u64,
    pub leave_cooldown_hours: u64,
    pub proposal_cost: Amount,
    pub proposals_members_only: bool,
    pub membership_nft_payload: String,
}

impl Default for ProjectDefaults {
    fn default() -> Self {
        Self {
            threshold_percent: 50.001,
            quorum_percent: 50.001,
            proposal_duration_hours: 24,
            execution_delay_hours: 4,
            leave_cooldown_hours: 24,
            proposal_cost: Amount::from_units(1),
            proposals_members_only: true,
            membership_nft_payload: "{nft}|{caller}".to_string(),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Assets accepted on transfer intents.
    pub allowed_assets: Vec<Asset>,
    /// Quorum numerator counting.
    pub quorum_policy: QuorumPolicy,
    /// Handling of tied winning weights.
    pub tie_policy: TiePolicy,
    /// Upper bound on members memoized per transaction.
    pub member_cache_capacity: usize,
    pub max_name_len: usize,
    pub max_description_len: usize,
    pub max_metadata_len: usize,
    pub max_option_text_len: usize,
    pub max_url_len: usize,
    pub max_options: usize,
    pub defaults: ProjectDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allowed_assets: Asset::ALL.to_vec(),
            quorum_policy: QuorumPolicy::default(),
            tie_policy: TiePolicy::default(),
            member_cache_capacity: 256,
            max_name_len: 128,
            max_description_len: 4096,
            max_metadata_len: 4096,
            max_option_text_len: 500,
            max_url_len: 512,
            max_options: 32,
            defaults: ProjectDefaults::default(),
        }
    }
}

impl EngineConfig {
    /// Loads a configuration from JSON; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed input.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// True when `asset` may arrive on an intent.
    #[must_use]
    pub fn accepts(&self, asset: Asset) -> bool {
        self.allowed_assets.contains(&asset)
    }
}
