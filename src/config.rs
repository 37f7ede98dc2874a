//! Configuration module for the staking admin client
//!
//! Configuration is loaded from a TOML file (after `.env` is applied to the
//! process environment); CLI flags and `STAKING_*` environment variables
//! override individual fields in `main`.

use crate::errors::{StakingError, StakingResult};
use crate::tx_builder::ComputeBudget;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Network selection
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Signing identities
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Staking program accounts
    #[serde(default)]
    pub program: ProgramConfig,

    /// Compute budget per operation
    #[serde(default)]
    pub compute_budget: ComputeBudgetConfig,
}

/// Named Solana clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    MainnetBeta,
    Devnet,
    Testnet,
    Localnet,
}

impl Cluster {
    /// Public JSON-RPC endpoint of the cluster
    pub fn url(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::Localnet => "http://127.0.0.1:8899",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::Localnet => "localnet",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Named cluster, used when no explicit RPC URL is given
    #[serde(default = "default_cluster")]
    pub name: Cluster,

    /// Explicit RPC endpoint; wins over `name`
    #[serde(default)]
    pub rpc_url: Option<String>,
}

impl ClusterConfig {
    /// Endpoint to connect to
    pub fn endpoint(&self) -> String {
        match &self.rpc_url {
            Some(url) => url.clone(),
            None => self.name.url().to_string(),
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            name: default_cluster(),
            rpc_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path to the fee payer / operator keypair file
    #[serde(default = "default_keypair_path")]
    pub keypair_path: String,

    /// Admin keypair co-signing lock/unlock transactions
    #[serde(default)]
    pub cosigner_keypair_path: Option<String>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair_path: default_keypair_path(),
            cosigner_keypair_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Token Auth Rules ruleset of the staked collection, base58
    #[serde(default)]
    pub auth_rules: Option<String>,
}

/// Compute budget attached to each transaction kind; `None` sends no
/// compute budget instructions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeBudgetConfig {
    #[serde(default = "default_initialize_global_budget")]
    pub initialize_global: Option<ComputeBudget>,
    #[serde(default)]
    pub change_admin: Option<ComputeBudget>,
    #[serde(default)]
    pub initialize_user: Option<ComputeBudget>,
    #[serde(default)]
    pub lock_position: Option<ComputeBudget>,
    #[serde(default)]
    pub unlock_position: Option<ComputeBudget>,
}

impl Default for ComputeBudgetConfig {
    fn default() -> Self {
        Self {
            initialize_global: default_initialize_global_budget(),
            change_admin: None,
            initialize_user: None,
            lock_position: None,
            unlock_position: None,
        }
    }
}

// Default value functions
fn default_cluster() -> Cluster { Cluster::Devnet }
fn default_keypair_path() -> String { "~/.config/solana/id.json".to_string() }
fn default_initialize_global_budget() -> Option<ComputeBudget> {
    Some(ComputeBudget::new(5_000_000, 200_000))
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> StakingResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| StakingError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> StakingResult<Self> {
        toml::from_str(content).map_err(|e| StakingError::Config(e.to_string()))
    }

    /// Load configuration after applying `.env` to the environment
    pub fn from_file_with_env(path: impl AsRef<Path>) -> StakingResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_file(path)
    }
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path.to_string(),
    }
}
