use crate::{submit, Action, Outcome, TxOptions};
use alloy_dyn_abi::{DynSolValue, JsonAbiExt, Specifier};
use alloy_network::TransactionBuilder;
use alloy_json_abi::Param;
use alloy_primitives::{Address, Bytes};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolConstructor;
use artifact::Artifact;
use binding::proxy::ERC1967Proxy;
use tracing::{info, warn};

/// Deploy input data.
#[derive(Debug, Clone)]
pub struct Deploy {
    /// Contract to deploy
    pub artifact: Artifact,
    /// Arguments coerced to the ABI types. They go to the constructor, or to
    /// the matching `initialize` overload when deploying behind a proxy.
    pub args: Vec<String>,
    /// ERC1967Proxy artifact; when set the contract is deployed as an
    /// implementation behind a fresh proxy
    pub proxy: Option<Artifact>,
}

/// A confirmed deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// Address to interact with (the proxy for upgradable deployments)
    pub address: Address,
    /// Implementation behind the proxy
    pub implementation: Option<Address>,
    /// The last transaction sent
    pub outcome: Outcome,
}

pub struct DeployAction<P> {
    provider: P,
    action: Deploy,
    options: TxOptions,
}

impl<P: Provider + Clone> DeployAction<P> {
    pub const fn new(provider: P, action: Deploy, options: TxOptions) -> Self {
        Self {
            provider,
            action,
            options,
        }
    }

    async fn create(&self, code: Bytes, label: &str) -> eyre::Result<(Address, Outcome)> {
        let tx = TransactionRequest::default().with_deploy_code(code);
        let receipt = submit(&self.provider, tx, self.options, label).await?;

        let address = receipt
            .contract_address
            .ok_or_else(|| eyre::eyre!("No contract address in {label} receipt"))?;

        Ok((address, Outcome::from(&receipt)))
    }
}

impl<P> Action for DeployAction<P>
where
    P: Provider + Clone,
{
    type Output = Deployment;

    async fn is_ready(&self) -> eyre::Result<bool> {
        let artifact = &self.action.artifact;
        if !artifact.is_deployable() {
            return Ok(false);
        }

        match &self.action.proxy {
            Some(proxy) => Ok(proxy.is_deployable()
                && creation_code(artifact, &[]).is_ok()
                && initializer_data(artifact, &self.action.args).is_ok()),
            None => Ok(creation_code(artifact, &self.action.args).is_ok()),
        }
    }

    async fn execute(&self) -> eyre::Result<Deployment> {
        let artifact = &self.action.artifact;
        if !artifact.is_deployable() {
            eyre::bail!(
                "{} has no bytecode (interface or abstract contract?)",
                artifact.contract_name
            );
        }

        let Some(proxy) = &self.action.proxy else {
            let code = creation_code(artifact, &self.action.args)?;
            let (address, outcome) = self.create(code, &artifact.contract_name).await?;

            info!(
                contract = %artifact.contract_name,
                address = %address,
                tx_hash = %outcome.tx_hash,
                block_number = outcome.block_number,
                "Contract deployed."
            );
            return Ok(Deployment {
                address,
                implementation: None,
                outcome,
            });
        };

        // encode everything before the first transaction goes out
        let code = creation_code(artifact, &[])?;
        let init_data = initializer_data(artifact, &self.action.args)?;
        if init_data.is_empty() {
            warn!(
                contract = %artifact.contract_name,
                "No initialize function, proxy is deployed without an initializer call"
            );
        }

        let (implementation, _) = self.create(code, &artifact.contract_name).await?;
        let code = proxy_creation_code(proxy, implementation, init_data)?;
        let (address, outcome) = self.create(code, &proxy.contract_name).await?;

        info!(
            contract = %artifact.contract_name,
            proxy = %address,
            implementation = %implementation,
            tx_hash = %outcome.tx_hash,
            "Upgradable contract deployed."
        );

        Ok(Deployment {
            address,
            implementation: Some(implementation),
            outcome,
        })
    }

    fn description(&self) -> String {
        match &self.action.proxy {
            Some(_) => format!(
                "Deploying {} behind an ERC1967 proxy",
                self.action.artifact.contract_name
            ),
            None => format!("Deploying {}", self.action.artifact.contract_name),
        }
    }
}

/// Creation bytecode followed by the ABI-encoded constructor arguments.
pub fn creation_code(artifact: &Artifact, args: &[String]) -> eyre::Result<Bytes> {
    let mut code = artifact.bytecode.to_vec();

    match &artifact.abi.constructor {
        Some(constructor) => {
            if constructor.inputs.len() != args.len() {
                eyre::bail!(
                    "{} expects {} constructor argument(s), got {}",
                    artifact.contract_name,
                    constructor.inputs.len(),
                    args.len()
                );
            }

            let values = coerce_args(&constructor.inputs, args)?;
            code.extend(constructor.abi_encode_input(&values)?);
        }
        None if !args.is_empty() => {
            eyre::bail!(
                "{} has no constructor but {} argument(s) were given",
                artifact.contract_name,
                args.len()
            );
        }
        None => {}
    }

    Ok(code.into())
}

/// Calldata for the `initialize` overload taking `args`.
///
/// Empty when the contract has no initializer and no arguments were given.
/// Fails when an initializer exists but no overload matches the argument count.
pub fn initializer_data(artifact: &Artifact, args: &[String]) -> eyre::Result<Bytes> {
    if !artifact.has_initializer() {
        if !args.is_empty() {
            eyre::bail!(
                "{} has no initialize function but {} argument(s) were given",
                artifact.contract_name,
                args.len()
            );
        }
        return Ok(Bytes::new());
    }

    let function = artifact.initializer(args.len()).ok_or_else(|| {
        eyre::eyre!(
            "{} has no initialize overload taking {} argument(s)",
            artifact.contract_name,
            args.len()
        )
    })?;

    let values = coerce_args(&function.inputs, args)?;
    Ok(function.abi_encode_input(&values)?.into())
}

fn coerce_args(params: &[Param], args: &[String]) -> eyre::Result<Vec<DynSolValue>> {
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty = param.resolve()?;
            ty.coerce_str(arg).map_err(|e| {
                eyre::eyre!("Invalid value {arg:?} for `{}` ({}): {e}", param.name, param.ty)
            })
        })
        .collect()
}

/// Proxy creation bytecode pointing at `implementation` and calling `init_data`.
pub fn proxy_creation_code(
    proxy: &Artifact,
    implementation: Address,
    init_data: Bytes,
) -> eyre::Result<Bytes> {
    if !proxy.is_deployable() {
        eyre::bail!("{} has no bytecode", proxy.contract_name);
    }

    let args = ERC1967Proxy::constructorCall {
        implementation,
        _data: init_data,
    }
    .abi_encode();

    let mut code = proxy.bytecode.to_vec();
    code.extend(args);

    Ok(code.into())
}
