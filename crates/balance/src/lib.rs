//! Balance lookups for accounts on an EVM network.
//!
//! Provides a small [`Monitor`] abstraction over a provider so the CLI
//! commands can query native balances for arbitrary addresses and for the
//! configured signer.

pub mod monitor;

use alloy_primitives::{utils::format_ether, Address, U256};
use serde::{Deserialize, Serialize};
use std::{fmt, future::Future};

/// Represents a native balance at a specific point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// The address holding the balance
    pub holder: Address,
    /// The balance amount in wei
    pub amount: U256,
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ETH", format_ether(self.amount))
    }
}

/// Trait for monitoring balances on a blockchain.
pub trait Monitor: Send + Sync {
    /// Query the native balance of `address`.
    fn native_balance(&self, address: Address)
        -> impl Future<Output = eyre::Result<Balance>> + Send;
}
