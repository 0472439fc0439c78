pub mod deploy;
pub mod upgrade;

use alloy_network::TransactionBuilder;
use alloy_primitives::TxHash;
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_rpc_types_eth::TransactionReceipt;
use std::future::Future;
use tracing::info;

/// Trait for executable onchain actions.
pub trait Action: Send + Sync {
    /// What a successful execution produces.
    type Output;

    /// Check to see if the action is ready to be executed.
    ///
    /// Returns true if all preconditions are met.
    fn is_ready(&self) -> impl Future<Output = eyre::Result<bool>> + Send;

    /// Execute the action, waiting for every transaction it sends to be mined.
    fn execute(&self) -> impl Future<Output = eyre::Result<Self::Output>> + Send;

    /// Get a human-readable description of this action.
    fn description(&self) -> String;
}

/// Per-network transaction policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxOptions {
    /// Fixed legacy gas price in wei; fee estimation is used when unset
    pub gas_price: Option<u128>,
    /// Log gas usage of every mined transaction
    pub report_gas: bool,
}

/// Mined transaction summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number where transaction was included
    pub block_number: Option<u64>,
    /// Gas used
    pub gas_used: u64,
    /// Price paid per unit of gas
    pub effective_gas_price: u128,
}

impl From<&TransactionReceipt> for Outcome {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            effective_gas_price: receipt.effective_gas_price,
        }
    }
}

/// Send a transaction and wait for its receipt.
///
/// Fails if the transaction reverts.
pub(crate) async fn submit<P>(
    provider: &P,
    mut tx: TransactionRequest,
    options: TxOptions,
    label: &str,
) -> eyre::Result<TransactionReceipt>
where
    P: Provider,
{
    if let Some(gas_price) = options.gas_price {
        tx = tx.with_gas_price(gas_price);
    }

    let pending = provider.send_transaction(tx).await?;
    let tx_hash = *pending.tx_hash();
    info!(%tx_hash, "{label} transaction sent, waiting for confirmation");

    let receipt = pending.get_receipt().await?;

    if !receipt.status() {
        eyre::bail!("{label} transaction {tx_hash} reverted");
    }

    if options.report_gas {
        info!(
            action = label,
            tx_hash = %receipt.transaction_hash,
            gas_used = receipt.gas_used,
            gas_price = receipt.effective_gas_price,
            "Gas report"
        );
    }

    Ok(receipt)
}
