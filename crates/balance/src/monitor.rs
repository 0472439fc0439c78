use crate::{Balance, Monitor};
use alloy_primitives::Address;
use alloy_provider::Provider;
use eyre::Result;
use tracing::debug;

// Balance monitor implementation.
pub struct BalanceMonitor<P> {
    provider: P,
}

impl<P> BalanceMonitor<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> Monitor for BalanceMonitor<P>
where
    P: Provider + Clone,
{
    async fn native_balance(&self, address: Address) -> Result<Balance> {
        debug!("Querying native balance: address={}", address);

        let amount = self.provider.get_balance(address).await?;

        Ok(Balance {
            holder: address,
            amount,
        })
    }
}
