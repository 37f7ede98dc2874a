//! Session bootstrap: ledger connection, signing wallet and program binding

use crate::config::{expand_home, ClusterConfig, ProgramConfig};
use crate::errors::StakingResult;
use crate::program::STAKING_PROGRAM_ID;
use crate::rpc::{connect, LedgerClient};
use crate::tx_builder::{AnchorInstructionBuilder, StakingInstructionBuilder};
use crate::wallet::{parse_address, WalletManager};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::info;

/// Handle to the staking program: its id and instruction encoder
#[derive(Clone)]
pub struct ProgramClient {
    pub program_id: Pubkey,
    pub builder: Arc<dyn StakingInstructionBuilder>,
}

impl ProgramClient {
    pub fn new(builder: Arc<dyn StakingInstructionBuilder>) -> Self {
        Self {
            program_id: builder.program_id(),
            builder,
        }
    }

    /// Client for the deployed program using the Anchor encoding
    pub fn anchor(program_id: Pubkey) -> Self {
        Self::new(Arc::new(AnchorInstructionBuilder::new(program_id)))
    }

    /// Anchor client for the deployed program with the configured accounts
    pub fn from_config(config: &ProgramConfig) -> StakingResult<Self> {
        let mut builder = AnchorInstructionBuilder::new(STAKING_PROGRAM_ID);
        if let Some(auth_rules) = &config.auth_rules {
            builder = builder.with_auth_rules(parse_address(auth_rules)?);
        }
        Ok(Self::new(Arc::new(builder)))
    }
}

impl std::fmt::Debug for ProgramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramClient")
            .field("program_id", &self.program_id)
            .finish()
    }
}

/// Everything an operation needs to talk to the network
#[derive(Clone)]
pub struct Session {
    pub ledger: Arc<dyn LedgerClient>,
    pub wallet: WalletManager,
    pub program: ProgramClient,
}

impl Session {
    /// Assemble a session from parts; used with injected ledgers
    pub fn new(ledger: Arc<dyn LedgerClient>, wallet: WalletManager, program: ProgramClient) -> Self {
        Self {
            ledger,
            wallet,
            program,
        }
    }

    /// Connect to the configured cluster with the key file at `keypair_path`
    ///
    /// No network I/O happens here; a bad key file or program setting aborts
    /// before any connection is attempted.
    pub fn bootstrap(
        cluster: &ClusterConfig,
        program: &ProgramConfig,
        keypair_path: &str,
    ) -> StakingResult<Self> {
        let wallet = WalletManager::from_file(expand_home(keypair_path))?;
        let program = ProgramClient::from_config(program)?;
        let endpoint = cluster.endpoint();
        let ledger = connect(&endpoint);

        info!(
            endpoint = %endpoint,
            wallet = %wallet.pubkey(),
            program_id = %program.program_id,
            "Session ready"
        );

        Ok(Self::new(ledger, wallet, program))
    }

    pub fn payer(&self) -> Pubkey {
        self.wallet.pubkey()
    }
}
