//! Network, verification and compiler configuration for the deployer.
//!
//! This crate provides:
//! - The network registry (built-in TOML plus optional overlay file)
//! - Network profile resolution (endpoint, chain ID, gas policy, accounts)
//! - Block explorer verification profiles
//! - The Solidity compiler profile
//!
//! Resolution is pure: every operation takes an explicit [`Env`] and
//! [`Defaults`] and performs no network I/O.

pub mod compiler;
pub mod defaults;
pub mod env;
pub mod error;
pub mod network;
pub mod verification;

pub use compiler::{build_compiler_profile, CompilerProfile, CompilerSettings, Optimizer};
pub use defaults::{CustomEndpoint, Defaults, NetworkTemplate, VerificationEntry};
pub use env::{report_gas, Env};
pub use error::ConfigError;
pub use network::{resolve_network, AccountSource, NetworkProfile, DEFAULT_TEST_MNEMONIC};
pub use verification::{resolve_verification, VerificationProfile, NO_API_KEY};
