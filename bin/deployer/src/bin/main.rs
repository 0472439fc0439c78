use clap::Parser;
use config::Env;
use deployer::{
    cli::{Cli, Command},
    parse_deploy_args, Context, VerifyArgs,
};
use std::process::ExitCode;
use tracing::{error, info};
use verify::VerifyStatus;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> eyre::Result<()> {
    let ctx = Context::resolve(&cli.global, Env::from_process())?;
    info!(network = %ctx.network.name, "Loaded configuration");

    match cli.command {
        Command::Balance { address } => {
            let balance = ctx.balance(address).await?;
            println!("{balance}");
        }
        Command::SignerBalance => {
            let balance = ctx.signer_balance().await?;
            println!("{}: {balance}", balance.holder);
        }
        Command::Deploy {
            contract_name,
            upgradable,
            args,
        } => {
            let args = parse_deploy_args(args.as_deref())?;
            let deployment = ctx
                .deploy(&contract_name, upgradable, args)
                .await?;

            match deployment.implementation {
                Some(implementation) => {
                    println!("Proxy deployed at {}", deployment.address);
                    println!("Implementation deployed at {implementation}");
                }
                None => println!("Contract deployed at {}", deployment.address),
            }
            println!("Transaction: {}", deployment.outcome.tx_hash);
        }
        Command::Upgrade {
            contract_name,
            proxy_address,
        } => {
            let upgraded = ctx.upgrade(&contract_name, proxy_address).await?;
            println!("Proxy {} upgraded", upgraded.proxy);
            println!("Previous implementation: {}", upgraded.previous);
            println!("New implementation: {}", upgraded.implementation);
            println!("Transaction: {}", upgraded.outcome.tx_hash);
        }
        Command::Verify {
            address,
            contract,
            input,
            compiler_version,
            constructor_args,
        } => {
            let (status, url) = ctx
                .verify(VerifyArgs {
                    address,
                    contract,
                    input,
                    compiler_version,
                    constructor_args,
                })
                .await?;

            match status {
                VerifyStatus::Verified => println!("Successfully verified: {url}"),
                VerifyStatus::AlreadyVerified => println!("Already verified: {url}"),
            }
        }
        Command::Config => {
            let report = ctx.config_report()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
