use crate::{deploy::creation_code, submit, Action, Outcome, TxOptions};
use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolCall;
use artifact::Artifact;
use binding::proxy::{address_from_slot, slot_key, IUUPSUpgradeable, IMPLEMENTATION_SLOT};
use tracing::{debug, info};

/// Upgrade input data.
#[derive(Debug, Clone)]
pub struct Upgrade {
    /// UUPS proxy to upgrade
    pub proxy: Address,
    /// New implementation
    pub artifact: Artifact,
}

/// A confirmed upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upgraded {
    pub proxy: Address,
    /// Implementation before the upgrade
    pub previous: Address,
    /// Implementation after the upgrade
    pub implementation: Address,
    /// The `upgradeToAndCall` transaction
    pub outcome: Outcome,
}

pub struct UpgradeAction<P> {
    provider: P,
    action: Upgrade,
    options: TxOptions,
}

impl<P: Provider + Clone> UpgradeAction<P> {
    pub const fn new(provider: P, action: Upgrade, options: TxOptions) -> Self {
        Self {
            provider,
            action,
            options,
        }
    }

    /// Read the implementation address from the proxy's ERC-1967 slot.
    pub async fn current_implementation(&self) -> eyre::Result<Address> {
        let word = self
            .provider
            .get_storage_at(self.action.proxy, slot_key(IMPLEMENTATION_SLOT))
            .await?;
        Ok(address_from_slot(word))
    }
}

impl<P> Action for UpgradeAction<P>
where
    P: Provider + Clone,
{
    type Output = Upgraded;

    async fn is_ready(&self) -> eyre::Result<bool> {
        if !self.action.artifact.is_deployable() || self.action.proxy == Address::ZERO {
            return Ok(false);
        }

        let code = self.provider.get_code_at(self.action.proxy).await?;
        if code.is_empty() {
            debug!(proxy = %self.action.proxy, "No code at proxy address");
            return Ok(false);
        }

        Ok(self.current_implementation().await? != Address::ZERO)
    }

    async fn execute(&self) -> eyre::Result<Upgraded> {
        if !self.is_ready().await? {
            eyre::bail!(
                "{} is not an ERC-1967 proxy or {} has no bytecode",
                self.action.proxy,
                self.action.artifact.contract_name
            );
        }

        let previous = self.current_implementation().await?;
        let artifact = &self.action.artifact;

        let tx = TransactionRequest::default().with_deploy_code(creation_code(artifact, &[])?);
        let receipt = submit(&self.provider, tx, self.options, &artifact.contract_name).await?;
        let implementation = receipt
            .contract_address
            .ok_or_else(|| eyre::eyre!("No contract address in implementation receipt"))?;

        // UUPS implementations must report the slot they are meant to live in
        let uuid = IUUPSUpgradeable::new(implementation, &self.provider)
            .proxiableUUID()
            .call()
            .await
            .map_err(|e| eyre::eyre!("{} is not UUPS upgradeable: {e}", artifact.contract_name))?;
        if uuid != IMPLEMENTATION_SLOT {
            eyre::bail!("{} reports an unsupported proxiable UUID {uuid}", artifact.contract_name);
        }

        let calldata = IUUPSUpgradeable::upgradeToAndCallCall {
            newImplementation: implementation,
            data: Bytes::new(),
        }
        .abi_encode();
        let tx = TransactionRequest::default()
            .with_to(self.action.proxy)
            .with_input(calldata);
        let receipt = submit(&self.provider, tx, self.options, "upgradeToAndCall").await?;

        let current = self.current_implementation().await?;
        if current != implementation {
            eyre::bail!("Proxy implementation is {current} after upgrade, expected {implementation}");
        }

        info!(
            proxy = %self.action.proxy,
            previous = %previous,
            implementation = %implementation,
            tx_hash = %receipt.transaction_hash,
            "Proxy upgraded."
        );

        Ok(Upgraded {
            proxy: self.action.proxy,
            previous,
            implementation,
            outcome: Outcome::from(&receipt),
        })
    }

    fn description(&self) -> String {
        format!(
            "Upgrading proxy {} to a new {} implementation",
            self.action.proxy, self.action.artifact.contract_name
        )
    }
}
