//! Staking program identity and account layouts
//!
//! The staking program is an external collaborator: this module only knows
//! its address, its seed constants, how to locate its accounts and how to
//! read the bytes it stores in them.

pub mod args;
pub mod pda;
pub mod state;

use sha2::{Digest, Sha256};
use solana_sdk::{pubkey, pubkey::Pubkey};

pub use pda::{derive_address, global_pool_address, user_pool_address};
pub use args::ChangeAdminArgs;
pub use state::{GlobalPoolView, LockedItem, UserPoolView};

/// Address of the deployed staking program
pub const STAKING_PROGRAM_ID: Pubkey = pubkey!("G9u9Qr5UV8ngfgwZqkMN1S3jfRu3Ha4hZthyFocpmSgs");

/// Metaplex Token Metadata program
pub const TOKEN_METADATA_PROGRAM_ID: Pubkey =
    pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

/// Metaplex Token Auth Rules program
pub const AUTH_RULES_PROGRAM_ID: Pubkey = pubkey!("auth9SigNpDKz4sJJ1DfCTuZrZNSAgh9sFD3rboVmgg");

/// Seed of the singleton global pool PDA
pub const GLOBAL_AUTHORITY_SEED: &str = "global-authority";

/// Seed combined with the user's address for the per-user pool account
pub const USER_POOL_SEED: &str = "user-pool";

/// Upper bound on positions a single user pool can hold
pub const MAX_LOCKED_ITEMS: usize = 100;

/// Instruction discriminator: first 8 bytes of sha256("global:<name>")
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    discriminator("global", name)
}

/// Account discriminator: first 8 bytes of sha256("account:<Name>")
pub fn account_discriminator(name: &str) -> [u8; 8] {
    discriminator("account", name)
}

fn discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let hash = Sha256::digest(format!("{}:{}", namespace, name).as_bytes());
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&hash[..8]);
    disc
}
