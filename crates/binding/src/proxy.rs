//! ERC-1967 proxy and UUPS upgrade bindings.

use alloy_primitives::{b256, Address, B256, U256};
use alloy_sol_types::sol;

/// `keccak256("eip1967.proxy.implementation") - 1`
pub const IMPLEMENTATION_SLOT: B256 =
    b256!("0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

sol! {
    /// OpenZeppelin ERC1967Proxy. Only the constructor is needed to build
    /// deployment calldata; the bytecode comes from the compiled artifact.
    contract ERC1967Proxy {
        constructor(address implementation, bytes memory _data) payable;

        /// Emitted when the implementation is upgraded
        event Upgraded(address indexed implementation);
    }

    /// UUPS upgradeable implementation (OpenZeppelin v5)
    #[sol(rpc)]
    interface IUUPSUpgradeable {
        /// Emitted when the implementation is upgraded
        event Upgraded(address indexed implementation);

        /// Implementation slot the contract expects to live in
        function proxiableUUID() external view returns (bytes32);

        /// Upgrade the proxy and optionally call into the new implementation
        function upgradeToAndCall(address newImplementation, bytes calldata data) external payable;
    }
}

/// Storage slot key as the `U256` expected by `eth_getStorageAt`.
pub const fn slot_key(slot: B256) -> U256 {
    U256::from_be_bytes(slot.0)
}

/// Decode an address stored right-aligned in a storage word.
pub fn address_from_slot(word: U256) -> Address {
    Address::from_word(B256::from(word.to_be_bytes::<32>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, keccak256};
    use alloy_sol_types::SolConstructor;

    fn eip1967_slot(label: &str) -> B256 {
        let hash = U256::from_be_bytes(keccak256(label.as_bytes()).0);
        B256::from((hash - U256::from(1)).to_be_bytes::<32>())
    }

    #[test]
    fn test_slots_match_eip1967() {
        assert_eq!(IMPLEMENTATION_SLOT, eip1967_slot("eip1967.proxy.implementation"));
    }

    #[test]
    fn test_address_from_slot() {
        let implementation = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
        let word = U256::from_be_slice(implementation.as_slice());
        assert_eq!(address_from_slot(word), implementation);
        assert_eq!(address_from_slot(U256::ZERO), Address::ZERO);
    }

    #[test]
    fn test_proxy_constructor_encoding() {
        let implementation = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
        let call = ERC1967Proxy::constructorCall {
            implementation,
            _data: vec![0x81, 0x29, 0xfc, 0x1c].into(),
        };
        let encoded = call.abi_encode();

        // address word, offset word, length word, one padded data word
        assert_eq!(encoded.len(), 4 * 32);
        assert_eq!(&encoded[12..32], implementation.as_slice());
        assert_eq!(encoded[95], 4);
    }
}
