//! `staking-cli`: administer the pNFT staking program
//!
//! Every command prints its result to stdout (a signature, or JSON for the
//! `*-info` commands); logs go to stderr.

// Compiler warning configuration
#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use staking_cli::{
    config::{expand_home, Cluster, Config},
    metrics::metrics,
    wallet::{parse_address, read_keypair},
    CoSign, Session, StakingAdmin,
};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "staking.toml", env = "STAKING_CONFIG")]
    config: String,

    /// Named cluster (overrides the config file)
    #[arg(long, value_enum, env = "STAKING_CLUSTER")]
    cluster: Option<Cluster>,

    /// Explicit RPC URL (overrides --cluster)
    #[arg(long, env = "STAKING_RPC_URL")]
    rpc: Option<String>,

    /// Fee payer / operator keypair file
    #[arg(short, long, env = "STAKING_KEYPAIR")]
    keypair: Option<String>,

    /// Token Auth Rules ruleset passed to lock/unlock
    #[arg(long, env = "STAKING_AUTH_RULES")]
    auth_rules: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "STAKING_LOG_JSON")]
    log_json: bool,

    /// Print Prometheus metrics to stderr after the command
    #[arg(long)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the global pool with the wallet as admin
    Init,
    /// Hand administration to another address
    ChangeAdmin {
        /// Base58 address or path to a keypair file
        new_admin: String,
    },
    /// Create the wallet's user pool
    InitUser,
    /// Lock a pNFT into the wallet's user pool
    Lock {
        mint: String,
        /// Admin keypair co-signing the transaction
        #[arg(long)]
        cosigner: Option<String>,
    },
    /// Release a pNFT from the wallet's user pool
    Unlock {
        mint: String,
        #[arg(long)]
        cosigner: Option<String>,
    },
    /// Print the global pool admin as JSON
    GlobalInfo,
    /// Print a user pool as JSON
    UserInfo {
        /// Pool owner; defaults to the wallet
        #[arg(long)]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be applied before clap reads STAKING_* variables
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_logging(args.verbose, args.log_json)?;
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(&args.config)?;
    if let Some(cluster) = args.cluster {
        config.cluster.name = cluster;
        config.cluster.rpc_url = None;
    }
    if let Some(rpc) = &args.rpc {
        config.cluster.rpc_url = Some(rpc.clone());
    }
    if let Some(keypair) = &args.keypair {
        config.wallet.keypair_path = keypair.clone();
    }
    if let Some(auth_rules) = &args.auth_rules {
        config.program.auth_rules = Some(auth_rules.clone());
    }

    let session = Session::bootstrap(
        &config.cluster,
        &config.program,
        &config.wallet.keypair_path,
    )
    .context("Failed to start session")?;
    let admin = StakingAdmin::new(session, config.compute_budget.clone());

    let result = run(&admin, &config, args.command).await;

    if args.print_metrics {
        eprintln!("{}", metrics().gather_text());
    }
    result
}

async fn run(admin: &StakingAdmin, config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Init => {
            let signature = admin.init_project().await?;
            println!("{}", signature);
        }
        Command::ChangeAdmin { new_admin } => {
            let signature = admin.change_admin(&new_admin).await?;
            println!("{}", signature);
        }
        Command::InitUser => {
            let signature = admin.initialize_user_pool().await?;
            println!("{}", signature);
        }
        Command::Lock { mint, cosigner } => {
            let mint = parse_address(&mint)?;
            let cosigner = load_cosigner(
                cosigner.or_else(|| config.wallet.cosigner_keypair_path.clone()),
            )?;
            let cosign = cosigner.as_ref().map_or(CoSign::Disabled, CoSign::With);
            let outcome = admin.lock_pnft(&mint, cosign).await?;
            println!("{}", outcome.signature());
        }
        Command::Unlock { mint, cosigner } => {
            let mint = parse_address(&mint)?;
            let cosigner = load_cosigner(
                cosigner.or_else(|| config.wallet.cosigner_keypair_path.clone()),
            )?;
            let cosign = cosigner.as_ref().map_or(CoSign::Disabled, CoSign::With);
            let outcome = admin.unlock_pnft(&mint, cosign).await?;
            println!("{}", outcome.signature());
        }
        Command::GlobalInfo => {
            let info = admin.get_global_info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::UserInfo { user } => {
            let user = user.as_deref().map(parse_address).transpose()?;
            let state = admin.get_user_state(user.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }
    Ok(())
}

fn load_cosigner(path: Option<String>) -> Result<Option<solana_sdk::signature::Keypair>> {
    path.map(|p| read_keypair(Path::new(&expand_home(&p))))
        .transpose()
        .context("Failed to load co-signer keypair")
}

/// Initialize logging subsystem
fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let env_filter = if verbose {
        "staking_cli=debug,info"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| env_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))
    } else {
        warn!("Config file '{}' not found, using defaults", path);
        Ok(Config::default())
    }
}
