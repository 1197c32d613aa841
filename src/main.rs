use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ethers::types::Address;
use log::info;
use std::sync::Arc;

use dexliquid::{
    balances::{read_balances, truncate_display},
    config::AppConfig,
    core::LiquidityManager,
    gateway::{evm::SignerClient, EvmGateway, LiquidityGateway},
    networks::{self, list_networks, Network, NetworkId},
    notify::ConsoleNotifier,
    session::{AmountInputs, Session},
    store::FileStorage,
    utils::setup_logger,
};

#[derive(Debug, Parser)]
#[command(name = "dexliquid", about = "Add and remove dex liquidity across EVM networks")]
struct Cli {
    /// Network id (core, xdc, tlos, base, neon); overrides NETWORK
    #[arg(short, long, global = true, value_parser = clap::value_parser!(NetworkId))]
    network: Option<NetworkId>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List supported networks
    Networks,
    /// Show wallet and pool balances
    Balances,
    /// Approve the dex and add liquidity
    Add {
        /// Native amount, or "max" for the wallet balance
        #[arg(long)]
        native: String,
        /// Token amount, or "max" for the wallet balance
        #[arg(long)]
        token: String,
    },
    /// Remove liquidity
    Remove {
        #[arg(long)]
        native: String,
        #[arg(long)]
        token: String,
    },
    /// Show the total and action log
    History,
    /// Compare the stored total with the total replayed from the log
    Audit,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    config.validate_all()?;
    setup_logger(config.log_level)?;

    let storage = FileStorage::new(&config.storage_path);
    let session = Arc::new(Session::open(Box::new(storage), config.network));
    if let Some(id) = cli.network {
        session.select_network(id).await;
    }
    let network = session.selected_network().await;
    info!("Using network {} (chain {})", network.display_name, network.chain_id);

    match cli.command {
        Command::Networks => print_networks(network),
        Command::History => print_history(&session, network).await,
        Command::Audit => print_audit(&session, network).await,
        Command::Balances => {
            let gateway = connect(&config, network)?;
            let account = gateway
                .connect()
                .await
                .ok_or_else(|| anyhow!("Please connect your wallet to continue."))?;
            let contracts = networks::addresses_for(network.id)?;
            let snapshot = read_balances(&gateway, &contracts, account).await?;

            println!("{} on {}", format!("{:?}", account).bold(), network.display_name);
            println!(
                "  {:>8}  {}",
                network.native_token_symbol,
                truncate_display(&snapshot.wallet_native)
            );
            println!(
                "  {:>8}  {}",
                snapshot.token_symbol,
                truncate_display(&snapshot.wallet_token)
            );
            println!("Pool {:?}", contracts.dex_contract);
            println!("  {:>8}  {}", network.native_token_symbol, snapshot.dex_native);
            println!("  {:>8}  {}", snapshot.token_symbol, snapshot.dex_token);
        }
        Command::Add { native, token } => {
            let (manager, account) = prepare(&config, &session, network, &native, &token).await?;
            let inputs = session.inputs().await;
            manager
                .add_liquidity(network.id, account, &inputs.native, &inputs.token)
                .await?;
            print_history(&session, network).await;
        }
        Command::Remove { native, token } => {
            let (manager, account) = prepare(&config, &session, network, &native, &token).await?;
            let inputs = session.inputs().await;
            manager
                .remove_liquidity(network.id, account, &inputs.native, &inputs.token)
                .await?;
            print_history(&session, network).await;
        }
    }

    Ok(())
}

type Gateway = EvmGateway<SignerClient>;

fn connect(config: &AppConfig, network: &Network) -> Result<Gateway> {
    EvmGateway::with_signer(
        &config.rpc_url(network.id)?,
        network.chain_id,
        config.require_private_key()?,
        config.confirmations,
    )
}

/// Connect the wallet, fill the inputs (resolving "max") and build a manager.
async fn prepare(
    config: &AppConfig,
    session: &Arc<Session>,
    network: &Network,
    native: &str,
    token: &str,
) -> Result<(LiquidityManager<Gateway>, Address)> {
    let gateway = connect(config, network)?;
    let account = gateway
        .connect()
        .await
        .ok_or_else(|| anyhow!("Please connect your wallet to continue."))?;

    let mut inputs = AmountInputs {
        native: native.to_string(),
        token: token.to_string(),
    };
    if native.eq_ignore_ascii_case("max") || token.eq_ignore_ascii_case("max") {
        let contracts = networks::addresses_for(network.id)?;
        let snapshot = read_balances(&gateway, &contracts, account).await.ok();
        if native.eq_ignore_ascii_case("max") {
            inputs.use_max_native(snapshot.as_ref().map(|s| s.wallet_native.as_str()));
        }
        if token.eq_ignore_ascii_case("max") {
            inputs.use_max_token(snapshot.as_ref().map(|s| s.wallet_token.as_str()));
        }
    }
    session.set_inputs(inputs).await;

    let manager = LiquidityManager::new(
        Arc::new(gateway),
        session.clone(),
        Arc::new(ConsoleNotifier),
    )
    .with_allowance_revoke(config.revoke_allowance_on_failure);
    Ok((manager, account))
}

fn print_networks(selected: &Network) {
    for network in list_networks() {
        let marker = if network.id == selected.id { "*" } else { " " };
        println!(
            "{} {:<5} {:<5} chain {:<10} {}",
            marker, network.id, network.native_token_symbol, network.chain_id, network.explorer_url
        );
    }
}

async fn print_history(session: &Session, network: &Network) {
    let ledger = session.ledger().await;
    println!(
        "{}",
        format!(
            "Total Liquidity for {}: {}",
            network.display_name,
            ledger.total(network.id)
        )
        .bold()
    );
    println!("Liquidity Action Logs for {}:", network.display_name);
    for entry in ledger.logs(network.id) {
        let line = format!(
            "{} - {} {} {} by {}",
            entry.timestamp, entry.action, entry.amount, network.native_token_symbol, entry.wallet
        );
        println!("{}", line.green());
    }
}

async fn print_audit(session: &Session, network: &Network) {
    let ledger = session.ledger().await;
    let stored = ledger.total(network.id);
    let derived = ledger.derived_total(network.id);
    let line = format!(
        "{}: stored total {}, replayed from {} log entries {}",
        network.display_name,
        stored,
        ledger.logs(network.id).len(),
        derived
    );
    if (stored - derived).abs() < 1e-9 {
        println!("{}", line.green());
    } else {
        println!("{}", line.yellow());
    }
}
