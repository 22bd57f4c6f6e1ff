//! Koban command line interface.
//!
//! Runs the smart-wallet signing flow and the individual wallet
//! operations against the wallet API, printing results as JSON.
//! Credentials and signer material are read from the environment;
//! see [`koban::config::Settings`] for the variables.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use koban::agent::WalletAgent;
use koban::chain::{Chain, WalletType};
use koban::client::types::ProvisionedWallet;
use koban::client::{SharedWalletService, WalletApiClient};
use koban::config::{ConfigError, Settings};
use koban::flow::{FlowConfig, FlowOperation, PollPolicy, SigningFlow};
use koban::registry::WalletRegistry;
use koban::signer::{sign_operation_hash, signer_address};
use koban::tools::DEFAULT_FAUCET_AMOUNT;
use koban::{Error, SignerError};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the default chain.
const ENV_CHAIN: &str = "WALLET_CHAIN";

/// Errors surfaced by the CLI.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Wallet(#[from] Error),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The flow ran to a report, but the report is a failure.
    #[error("signing flow failed: {0}")]
    Flow(String),
}

#[derive(Debug, Parser)]
#[command(name = "koban", author, version, about = "Smart-wallet signing flows from the command line", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Provision a wallet and run the full signing flow
    Flow(FlowArgs),
    /// Provision a new wallet bound to the configured signer
    CreateWallet(CreateWalletArgs),
    /// Show a wallet's USDC balance
    Balance(BalanceArgs),
    /// Request test USDC from the faucet
    Faucet(FaucetArgs),
    /// Transfer USDC out of an existing wallet
    Transfer(TransferArgs),
    /// Sign a user operation hash with the configured key
    Sign(SignArgs),
    /// Submit a signature for a pending transaction
    Submit(SubmitArgs),
    /// Fetch the current state of a transaction
    Status(StatusArgs),
    /// Print the wallet tool definitions as JSON
    Tools,
}

#[derive(Debug, Args)]
struct FlowArgs {
    /// Chain to run the flow on
    #[arg(long, default_value = "base-sepolia", env = ENV_CHAIN)]
    chain: String,

    /// Seconds between verification polls
    #[arg(long, default_value_t = 5)]
    poll_interval: u64,

    /// Verification polls before giving up
    #[arg(long, default_value_t = 6)]
    poll_attempts: u32,

    /// Transfer USDC to this address instead of a templated transaction
    #[arg(long, requires = "amount")]
    transfer_to: Option<String>,

    /// USDC amount for --transfer-to
    #[arg(long, requires = "transfer_to")]
    amount: Option<f64>,
}

#[derive(Debug, Args)]
struct CreateWalletArgs {
    /// Wallet kind to provision
    #[arg(long, default_value = "evm-smart-wallet")]
    wallet_type: String,
}

#[derive(Debug, Args)]
struct BalanceArgs {
    /// Wallet address to inspect
    wallet: String,

    /// Chain to query
    #[arg(long, default_value = "base-sepolia", env = ENV_CHAIN)]
    chain: String,
}

#[derive(Debug, Args)]
struct FaucetArgs {
    /// Wallet address to fund
    wallet: String,

    /// USDC amount to request
    #[arg(long, default_value_t = DEFAULT_FAUCET_AMOUNT)]
    amount: f64,

    /// Chain to fund on
    #[arg(long, default_value = "base-sepolia", env = ENV_CHAIN)]
    chain: String,
}

#[derive(Debug, Args)]
struct TransferArgs {
    /// Source wallet address
    from: String,

    /// USDC amount to move
    #[arg(long)]
    amount: f64,

    /// Recipient address; defaults to the treasury wallet
    #[arg(long)]
    to: Option<String>,

    /// Chain to transfer on
    #[arg(long, default_value = "base-sepolia", env = ENV_CHAIN)]
    chain: String,

    /// Seconds between verification polls
    #[arg(long, default_value_t = 5)]
    poll_interval: u64,

    /// Verification polls before giving up
    #[arg(long, default_value_t = 6)]
    poll_attempts: u32,
}

#[derive(Debug, Args)]
struct SignArgs {
    /// User operation hash to sign, 0x-prefixed hex
    hash: String,
}

#[derive(Debug, Args)]
struct SubmitArgs {
    /// Wallet address the transaction belongs to
    wallet: String,

    /// Transaction id assigned by the backend
    transaction_id: String,

    /// 0x-prefixed hex signature to record
    signature: String,

    /// Wallet kind, used to derive the signer id
    #[arg(long, default_value = "evm-smart-wallet")]
    wallet_type: String,

    /// Chain the transaction targets
    #[arg(long, default_value = "base-sepolia", env = ENV_CHAIN)]
    chain: String,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Wallet address the transaction belongs to
    wallet: String,

    /// Transaction id assigned by the backend
    transaction_id: String,

    /// Chain the transaction targets
    #[arg(long, default_value = "base-sepolia", env = ENV_CHAIN)]
    chain: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("koban={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Flow(args) => cmd_flow(&settings, args).await,
        Commands::CreateWallet(args) => cmd_create_wallet(&settings, &args).await,
        Commands::Balance(args) => cmd_balance(&settings, &args).await,
        Commands::Faucet(args) => cmd_faucet(&settings, &args).await,
        Commands::Transfer(args) => cmd_transfer(&settings, args).await,
        Commands::Sign(args) => cmd_sign(&settings, &args),
        Commands::Submit(args) => cmd_submit(&settings, &args).await,
        Commands::Status(args) => cmd_status(&settings, &args).await,
        Commands::Tools => cmd_tools(&settings),
    }
}

fn connect(settings: &Settings) -> Result<SharedWalletService, CliError> {
    let client = WalletApiClient::from_settings(settings)?;
    Ok(Arc::new(client))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Provision a wallet and drive it through the whole signing pipeline.
async fn cmd_flow(settings: &Settings, args: FlowArgs) -> Result<(), CliError> {
    let service = connect(settings)?;
    let mut config = FlowConfig::from_settings(settings)
        .with_chain(Chain::parse(&args.chain))
        .with_poll(PollPolicy::new(
            Duration::from_secs(args.poll_interval),
            args.poll_attempts,
        ));
    if let (Some(to), Some(amount)) = (args.transfer_to, args.amount) {
        config = config.with_operation(FlowOperation::UsdcTransfer { to, amount });
    }

    let flow = SigningFlow::new(config);
    let mut registry = WalletRegistry::new();

    let report = tokio::select! {
        report = flow.run(service.as_ref(), &mut registry) => report,
        _ = tokio::signal::ctrl_c() => {
            println!("\nInterrupted.");
            return Ok(());
        }
    };

    print_json(&report)?;
    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::Flow(report.message))
    }
}

async fn cmd_create_wallet(settings: &Settings, args: &CreateWalletArgs) -> Result<(), CliError> {
    let service = connect(settings)?;
    let wallet_type = WalletType::parse(&args.wallet_type)?;
    let wallet = service
        .create_wallet(wallet_type, &settings.signer_address)
        .await?;
    print_json(&wallet)
}

async fn cmd_balance(settings: &Settings, args: &BalanceArgs) -> Result<(), CliError> {
    let service = connect(settings)?;
    let chain = Chain::parse(&args.chain);
    let balance = service.usdc_balance(&args.wallet, &chain).await?;
    print_json(&serde_json::json!({
        "walletAddress": args.wallet,
        "chain": chain.name(),
        "token": "USDC",
        "balance": balance,
    }))
}

async fn cmd_faucet(settings: &Settings, args: &FaucetArgs) -> Result<(), CliError> {
    let service = connect(settings)?;
    let chain = Chain::parse(&args.chain);
    service
        .request_faucet_funds(&args.wallet, &chain, args.amount)
        .await?;
    print_json(&serde_json::json!({
        "walletAddress": args.wallet,
        "chain": chain.name(),
        "amount": args.amount,
        "message": "faucet funds requested",
    }))
}

/// Build, sign, submit, and verify a USDC transfer out of `from`.
async fn cmd_transfer(settings: &Settings, args: TransferArgs) -> Result<(), CliError> {
    let service = connect(settings)?;
    let chain = Chain::parse(&args.chain);
    let to = args.to.unwrap_or_else(|| settings.treasury_address.clone());

    // The wallet was provisioned in an earlier run; the configured
    // signer must be the one bound to it.
    let wallet = ProvisionedWallet::existing(
        args.from,
        WalletType::EvmSmartWallet,
        settings.signer_address.clone(),
    );

    let config = FlowConfig::from_settings(settings)
        .with_chain(chain)
        .with_poll(PollPolicy::new(
            Duration::from_secs(args.poll_interval),
            args.poll_attempts,
        ))
        .with_operation(FlowOperation::UsdcTransfer {
            to,
            amount: args.amount,
        });

    let report = SigningFlow::new(config)
        .run_for_wallet(service.as_ref(), &wallet)
        .await;

    print_json(&report)?;
    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::Flow(report.message))
    }
}

fn cmd_sign(settings: &Settings, args: &SignArgs) -> Result<(), CliError> {
    let signature = sign_operation_hash(&settings.signer_private_key, &args.hash)?;
    let address = signer_address(&settings.signer_private_key)?;
    print_json(&serde_json::json!({
        "hash": args.hash,
        "signature": signature,
        "signerAddress": address,
    }))
}

async fn cmd_submit(settings: &Settings, args: &SubmitArgs) -> Result<(), CliError> {
    let service = connect(settings)?;
    let chain = Chain::parse(&args.chain);
    let wallet_type = WalletType::parse(&args.wallet_type)?;
    let signer_id = wallet_type.signer_id(&settings.signer_address);
    let transaction = service
        .submit_signature(
            &args.wallet,
            &chain,
            &args.transaction_id,
            &signer_id,
            &args.signature,
        )
        .await?;
    print_json(&transaction)
}

async fn cmd_status(settings: &Settings, args: &StatusArgs) -> Result<(), CliError> {
    let service = connect(settings)?;
    let chain = Chain::parse(&args.chain);
    let transaction = service
        .get_transaction(&args.wallet, &chain, &args.transaction_id)
        .await?;
    print_json(&transaction)
}

fn cmd_tools(settings: &Settings) -> Result<(), CliError> {
    let service = connect(settings)?;
    let agent = WalletAgent::from_settings(service, settings);
    print_json(&agent.definitions())
}
