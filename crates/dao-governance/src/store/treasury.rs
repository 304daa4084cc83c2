//! # Treasury Ledger
//!
//! One scaled balance per (project, asset). There is no conversion between
//! assets and a missing entry reads as zero.

use super::StateStore;
use crate::domain::value_objects::{Amount, Asset};
use crate::errors::DaoError;
use crate::keyspace;
use crate::ports::outbound::ChainHost;
use tracing::debug;

impl<H: ChainHost> StateStore<H> {
    /// Current balance of `asset` in the project treasury.
    pub fn treasury_balance(&self, project: u64, asset: Asset) -> Result<Amount, DaoError> {
        Ok(self
            .load(&keyspace::treasury(project, asset))?
            .unwrap_or(Amount::ZERO))
    }

    /// Credits the treasury.
    ///
    /// # Errors
    ///
    /// [`DaoError::InvalidAmount`] for a negative amount or on overflow.
    pub fn treasury_add(&mut self, project: u64, asset: Asset, amount: Amount) -> Result<(), DaoError> {
        if amount < Amount::ZERO {
            return Err(DaoError::InvalidAmount(amount.to_string()));
        }
        let balance = self.treasury_balance(project, asset)?;
        let next = balance
            .checked_add(amount)
            .ok_or_else(|| DaoError::InvalidAmount(amount.to_string()))?;
        debug!(project, %asset, %amount, balance = %next, "treasury credit");
        self.save(&keyspace::treasury(project, asset), &next)
    }

    /// Debits the treasury. Returns `false` and leaves state untouched when
    /// the balance is short.
    pub fn treasury_remove(
        &mut self,
        project: u64,
        asset: Asset,
        amount: Amount,
    ) -> Result<bool, DaoError> {
        if amount < Amount::ZERO {
            return Err(DaoError::InvalidAmount(amount.to_string()));
        }
        let balance = self.treasury_balance(project, asset)?;
        let next = match balance.checked_sub(amount) {
            Some(next) if next >= Amount::ZERO => next,
            _ => return Ok(false),
        };
        debug!(project, %asset, %amount, balance = %next, "treasury debit");
        self.save(&keyspace::treasury(project, asset), &next)?;
        Ok(true)
    }

    /// Debits the treasury or fails with [`DaoError::InsufficientTreasury`].
    pub fn treasury_take(&mut self, project: u64, asset: Asset, amount: Amount) -> Result<(), DaoError> {
        if self.treasury_remove(project, asset, amount)? {
            return Ok(());
        }
        Err(DaoError::InsufficientTreasury {
            asset: asset.to_string(),
            required: amount.to_string(),
            available: self.treasury_balance(project, asset)?.to_string(),
        })
    }
}
