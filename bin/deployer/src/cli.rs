//! Command-line surface.

use alloy_primitives::{Address, Bytes};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "deployer")]
#[command(about = "Deploy, upgrade and verify contracts across EVM networks")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Network to run against
    #[arg(short, long, global = true, env = "NETWORK", default_value = "hardhat")]
    pub network: String,

    /// TOML file adding or overriding networks
    #[arg(long, global = true, env = "NETWORKS_FILE")]
    pub networks_file: Option<PathBuf>,

    /// Directory holding compiled contract artifacts
    #[arg(long, global = true, default_value = "artifacts")]
    pub artifacts: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the native balance of an account
    Balance {
        #[arg(long)]
        address: Address,
    },

    /// Deploy a contract
    Deploy {
        #[arg(long)]
        contract_name: String,

        /// Deploy behind an ERC1967 proxy and call `initialize`
        #[arg(long)]
        upgradable: bool,

        /// Arguments as a JSON array, e.g. '["hello", 42]'. Passed to the
        /// constructor, or to `initialize` with --upgradable
        #[arg(long)]
        args: Option<String>,
    },

    /// Upgrade a UUPS proxy to a freshly deployed implementation
    Upgrade {
        #[arg(long)]
        contract_name: String,

        #[arg(long)]
        proxy_address: Address,
    },

    /// Print the native balance of the configured signer
    #[command(alias = "signerBalance")]
    SignerBalance,

    /// Verify deployed sources on the network's block explorer
    Verify {
        #[arg(long)]
        address: Address,

        /// Fully qualified contract name, e.g. contracts/Token.sol:Token
        #[arg(long)]
        contract: String,

        /// Standard JSON input file; read from the build info when omitted
        #[arg(long)]
        input: Option<PathBuf>,

        /// Long compiler version; read from the build info when omitted
        #[arg(long)]
        compiler_version: Option<String>,

        /// ABI-encoded constructor arguments
        #[arg(long, default_value = "0x")]
        constructor_args: Bytes,
    },

    /// Print the resolved configuration with secrets redacted
    Config,
}
