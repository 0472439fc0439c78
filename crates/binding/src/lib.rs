//! Contract bindings used by the deployer.
//!
//! - ERC-1967 proxy constructor and storage slots
//! - UUPS upgrade interface
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod proxy;
