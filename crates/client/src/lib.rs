//! RPC providers and signers built from resolved network profiles.

mod account;

pub use account::{derive_account, signer_from_profile, DERIVED_ACCOUNTS};

use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use config::NetworkProfile;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error connecting to the RPC endpoint
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Error deriving accounts from a mnemonic
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// `FROM` does not match any configured account
    #[error("Account {0} is not available from the configured private key or mnemonic")]
    UnknownAccount(Address),

    /// The node reports a different chain than the network declares
    #[error("Chain ID mismatch: network expects {expected}, node reports {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Convenience function to create an ethereum rpc provider from url.
pub async fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}

/// Create a provider that signs with `signer`.
pub fn create_wallet_provider(
    rpc_url: &str,
    signer: PrivateKeySigner,
) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;

    let wallet = EthereumWallet::from(signer);

    let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

    Ok(provider)
}

/// Check the node's chain ID against the one the profile declares.
///
/// Profiles without a chain ID accept any node.
pub async fn ensure_chain_id<P>(provider: &P, profile: &NetworkProfile) -> Result<(), ClientError>
where
    P: Provider,
{
    let Some(expected) = profile.chain_id else {
        return Ok(());
    };

    let actual = provider
        .get_chain_id()
        .await
        .map_err(|e| ClientError::Connection(format!("{}", e)))?;

    debug!(network = %profile.name, expected, actual, "Checked chain ID");

    if actual != expected {
        return Err(ClientError::ChainMismatch { expected, actual });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url() {
        let result = create_provider("not a url").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_wallet_url() {
        let signer: PrivateKeySigner =
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
                .parse()
                .unwrap();
        let result = create_wallet_provider("not a url", signer);
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }
}
