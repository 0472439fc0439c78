pub mod cli;

use action::{
    deploy::{Deploy, DeployAction, Deployment},
    upgrade::{Upgrade, UpgradeAction, Upgraded},
    Action, TxOptions,
};
use alloy_primitives::{Address, Bytes};
use alloy_provider::Provider;
use artifact::ArtifactStore;
use balance::{monitor::BalanceMonitor, Balance, Monitor};
use cli::GlobalArgs;
use config::{
    build_compiler_profile, report_gas, resolve_network, resolve_verification, CompilerProfile,
    Defaults, Env, NetworkProfile,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use verify::{Verifier, VerifyRequest, VerifyStatus};

/// Artifact name of the proxy used for upgradable deployments.
pub const PROXY_CONTRACT: &str = "ERC1967Proxy";

/// Everything a command needs, resolved once at startup.
#[derive(Debug)]
pub struct Context {
    pub env: Env,
    pub defaults: Defaults,
    pub network: NetworkProfile,
    pub compiler: CompilerProfile,
    pub artifacts: ArtifactStore,
}

/// Verification inputs from the command line.
#[derive(Debug, Clone)]
pub struct VerifyArgs {
    pub address: Address,
    pub contract: String,
    pub input: Option<PathBuf>,
    pub compiler_version: Option<String>,
    pub constructor_args: Bytes,
}

impl Context {
    /// Load the network registry, then resolve the selected network and the
    /// compiler profile. Any configuration error surfaces here, before a
    /// command touches the network.
    pub fn resolve(global: &GlobalArgs, env: Env) -> eyre::Result<Self> {
        let defaults = Defaults::load(global.networks_file.as_deref())?;
        let network = resolve_network(&global.network, &env, &defaults)?;
        let compiler = build_compiler_profile(&env, &defaults)?;

        if !network.local && network.account_source.is_test_mnemonic() {
            warn!(
                network = %network.name,
                "Using the public test mnemonic on a non-local network; set PRIVATE_KEY or MNEMONIC"
            );
        }

        debug!(
            network = %network.name,
            chain_id = ?network.chain_id,
            gas_price = ?network.gas_price,
            solc = %compiler.primary(),
            "Resolved network"
        );

        Ok(Self {
            env,
            defaults,
            network,
            compiler,
            artifacts: ArtifactStore::new(&global.artifacts),
        })
    }

    pub fn tx_options(&self) -> TxOptions {
        TxOptions {
            gas_price: self.network.gas_price.map(u128::from),
            report_gas: report_gas(&self.env),
        }
    }

    /// Signing provider, checked against the network's chain ID.
    async fn wallet_provider(&self) -> eyre::Result<impl Provider + Clone> {
        let signer = client::signer_from_profile(&self.network)?;
        info!(network = %self.network.name, signer = %signer.address(), "Using signer");

        let provider = client::create_wallet_provider(&self.network.endpoint_url, signer)?;
        client::ensure_chain_id(&provider, &self.network).await?;

        Ok(provider)
    }

    /// Native balance of `address`.
    pub async fn balance(&self, address: Address) -> eyre::Result<Balance> {
        let provider = client::create_provider(&self.network.endpoint_url).await?;
        client::ensure_chain_id(&provider, &self.network).await?;

        BalanceMonitor::new(provider).native_balance(address).await
    }

    /// Native balance of the configured signer.
    pub async fn signer_balance(&self) -> eyre::Result<Balance> {
        let signer = client::signer_from_profile(&self.network)?;
        self.balance(signer.address()).await
    }

    /// Deploy `contract_name`, optionally behind a fresh ERC1967 proxy.
    ///
    /// `args` feed the constructor, or the matching `initialize` overload for
    /// upgradable deployments.
    pub async fn deploy(
        &self,
        contract_name: &str,
        upgradable: bool,
        args: Vec<String>,
    ) -> eyre::Result<Deployment> {
        let artifact = self.artifacts.load(contract_name)?;

        let proxy = if upgradable {
            Some(self.artifacts.load(PROXY_CONTRACT)?)
        } else {
            None
        };

        let provider = self.wallet_provider().await?;
        let action = DeployAction::new(
            provider,
            Deploy {
                artifact,
                args,
                proxy,
            },
            self.tx_options(),
        );

        run(&action).await
    }

    /// Upgrade the UUPS proxy at `proxy` to a new `contract_name` implementation.
    pub async fn upgrade(&self, contract_name: &str, proxy: Address) -> eyre::Result<Upgraded> {
        let artifact = self.artifacts.load(contract_name)?;
        let provider = self.wallet_provider().await?;
        let action = UpgradeAction::new(provider, Upgrade { proxy, artifact }, self.tx_options());

        run(&action).await
    }

    /// Verify deployed sources and return the explorer page on success.
    pub async fn verify(&self, args: VerifyArgs) -> eyre::Result<(VerifyStatus, String)> {
        let profile = resolve_verification(&self.network.name, &self.env, &self.defaults)?;
        let request = self.verify_request(args)?;

        let verifier = Verifier::new(profile)?;
        info!(
            address = %request.address,
            contract = %request.contract_name,
            explorer = %verifier.profile().explorer,
            "Submitting sources for verification"
        );

        let status = verifier.verify(&request).await?;
        Ok((status, verifier.profile().address_url(request.address)))
    }

    fn verify_request(&self, args: VerifyArgs) -> eyre::Result<VerifyRequest> {
        let needs_artifact = args.input.is_none()
            || args.compiler_version.is_none()
            || !args.contract.contains(':');

        let (contract_name, build_info) = if needs_artifact {
            let artifact = self.artifacts.load(&args.contract)?;
            let name = match &artifact.source_name {
                Some(source) => format!("{source}:{}", artifact.contract_name),
                None => args.contract.clone(),
            };
            let build_info = if args.input.is_none() || args.compiler_version.is_none() {
                let info = self.artifacts.build_info(&artifact)?;
                if !self.compiler.supports(&info.solc_version) {
                    warn!(
                        contract = %name,
                        solc = %info.solc_version,
                        configured = ?self.compiler.versions,
                        "Artifact was compiled with a compiler version that is not configured"
                    );
                }
                Some(info)
            } else {
                None
            };
            (name, build_info)
        } else {
            (args.contract.clone(), None)
        };

        let input = match (&args.input, &build_info) {
            (Some(path), _) => read_json(path)?,
            (None, Some(info)) => info.input.clone(),
            (None, None) => eyre::bail!("No standard JSON input for {}", args.contract),
        };

        let compiler_version = match (args.compiler_version, &build_info) {
            (Some(version), _) => version,
            (None, Some(info)) => info.solc_long_version.clone(),
            (None, None) => eyre::bail!("No compiler version for {}", args.contract),
        };

        Ok(VerifyRequest {
            address: args.address,
            contract_name,
            compiler_version,
            input,
            constructor_args: args.constructor_args,
        })
    }

    /// Resolved configuration with secrets redacted.
    pub fn config_report(&self) -> eyre::Result<Value> {
        let verification = resolve_verification(&self.network.name, &self.env, &self.defaults)
            .inspect_err(|e| debug!(error = %e, "No verification profile"))
            .ok();
        Ok(json!({
            "network": self.network,
            "verification": verification,
            "compiler": self.compiler,
            "reportGas": report_gas(&self.env),
        }))
    }
}

/// Check preconditions, then execute.
pub async fn run<A: Action>(action: &A) -> eyre::Result<A::Output> {
    info!("{}", action.description());

    if !action.is_ready().await? {
        eyre::bail!("Not ready: {}", action.description());
    }

    action.execute().await
}

/// Parse `--args` into per-parameter strings for ABI coercion.
///
/// Strings are taken verbatim; numbers, booleans and nested arrays keep their
/// JSON text.
pub fn parse_deploy_args(raw: Option<&str>) -> eyre::Result<Vec<String>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| eyre::eyre!("Constructor arguments are not valid JSON: {e}"))?;
    let Value::Array(items) = value else {
        eyre::bail!("Constructor arguments must be a JSON array");
    };

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}

fn read_json(path: &Path) -> eyre::Result<Value> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("Failed to read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&contents)?)
}
