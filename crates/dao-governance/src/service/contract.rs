//! `contract_init`.

use super::GovernanceService;
use crate::domain::args::ContractInitArgs;
use crate::domain::entities::ContractConfig;
use crate::errors::DaoError;
use crate::ports::outbound::ChainHost;
use tracing::info;

impl<H: ChainHost> GovernanceService<H> {
    /// Writes the contract singleton; the caller becomes contract owner.
    pub fn contract_init(&mut self, args: ContractInitArgs) -> Result<String, DaoError> {
        if self.store.contract_config()?.is_some() {
            return Err(DaoError::AlreadyInitialized);
        }
        let env = self.store.env();
        let config = ContractConfig {
            owner: env.sender,
            public_project_creation: args.public_project_creation,
        };
        self.store.save_contract_config(&config)?;
        info!(owner = %config.owner, public = config.public_project_creation, "contract initialized");
        Ok("contract initialized".to_string())
    }
}
