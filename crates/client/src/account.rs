//! Signer selection from a resolved [`AccountSource`].

use crate::ClientError;
use alloy_primitives::Address;
use alloy_signer_local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use config::{AccountSource, NetworkProfile};

/// Number of mnemonic accounts searched when `FROM` pins an address.
pub const DERIVED_ACCOUNTS: u32 = 20;

/// Derive the account at `index` on the standard `m/44'/60'/0'/0/{index}` path.
pub fn derive_account(phrase: &str, index: u32) -> Result<PrivateKeySigner, ClientError> {
    MnemonicBuilder::<English>::default()
        .phrase(phrase)
        .index(index)
        .and_then(|builder| builder.build())
        .map_err(|e| ClientError::InvalidMnemonic(e.to_string()))
}

/// Select the signing account for a network profile.
///
/// A private key yields exactly one account. A mnemonic yields the first
/// derived account, or the one matching `from` among the first
/// [`DERIVED_ACCOUNTS`].
pub fn signer_from_profile(profile: &NetworkProfile) -> Result<PrivateKeySigner, ClientError> {
    match &profile.account_source {
        AccountSource::PrivateKey(key) => {
            let signer: PrivateKeySigner = key
                .parse()
                .map_err(|e| ClientError::InvalidPrivateKey(format!("{}", e)))?;
            match profile.from {
                Some(from) if from != signer.address() => Err(ClientError::UnknownAccount(from)),
                _ => Ok(signer),
            }
        }
        AccountSource::Mnemonic(phrase) => match profile.from {
            Some(from) => find_account(phrase, from),
            None => derive_account(phrase, 0),
        },
    }
}

fn find_account(phrase: &str, from: Address) -> Result<PrivateKeySigner, ClientError> {
    for index in 0..DERIVED_ACCOUNTS {
        let signer = derive_account(phrase, index)?;
        if signer.address() == from {
            return Ok(signer);
        }
    }

    Err(ClientError::UnknownAccount(from))
}
