//! Wallet management module

use crate::errors::{StakingError, StakingResult};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Signing identity loaded from a key file
pub struct WalletManager {
    keypair: Arc<Keypair>,
}

impl WalletManager {
    /// Load a keypair file
    ///
    /// Accepts the Solana CLI format (JSON array of 64 integers) and the raw
    /// 64-byte form.
    pub fn from_file(path: impl AsRef<Path>) -> StakingResult<Self> {
        let keypair = read_keypair(path.as_ref())?;
        Ok(Self {
            keypair: Arc::new(keypair),
        })
    }

    /// Create a new wallet manager from a keypair
    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    /// Get the public key
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Get a reference to the keypair
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl Clone for WalletManager {
    fn clone(&self) -> Self {
        Self {
            keypair: Arc::clone(&self.keypair),
        }
    }
}

/// Read and validate a keypair file
pub fn read_keypair(path: &Path) -> StakingResult<Keypair> {
    let display = path.display().to_string();
    let keypair_bytes = std::fs::read(path).map_err(|e| StakingError::key_load(&display, e))?;

    // JSON (solana-keygen format) first; 64 raw bytes only when the file is
    // not JSON text.
    let secret: Vec<u8> = match serde_json::from_slice(&keypair_bytes) {
        Ok(secret) => secret,
        Err(_) if keypair_bytes.len() == 64 && !is_json_array_text(&keypair_bytes) => {
            keypair_bytes
        }
        Err(e) => {
            return Err(StakingError::key_load(
                &display,
                format!("not a JSON byte array: {}", e),
            ))
        }
    };

    if secret.len() != 64 {
        return Err(StakingError::key_load(
            &display,
            format!("expected 64 bytes, got {}", secret.len()),
        ));
    }
    if secret.iter().all(|&b| b == 0) {
        return Err(StakingError::key_load(&display, "all-zero key rejected"));
    }

    Keypair::try_from(secret.as_slice())
        .map_err(|e| StakingError::key_load(&display, format!("invalid keypair bytes: {}", e)))
}

fn is_json_array_text(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| {
        b.is_ascii_digit() || matches!(b, b'[' | b']' | b',' | b' ' | b'\t' | b'\r' | b'\n')
    })
}

/// Resolve a new-admin argument to an address
///
/// The input is tried as a base58 address first, then as a path to a key
/// file whose public key is used.
pub fn resolve_admin_identifier(input: &str) -> StakingResult<Pubkey> {
    let address_error = match Pubkey::from_str(input) {
        Ok(pubkey) => return Ok(pubkey),
        Err(e) => e.to_string(),
    };

    match read_keypair(Path::new(input)) {
        Ok(keypair) => Ok(keypair.pubkey()),
        Err(keyfile_error) => Err(StakingError::InvalidAdminIdentifier {
            input: input.to_string(),
            address_error,
            keyfile_error: keyfile_error.to_string(),
        }),
    }
}

/// Parse a base58 address argument
pub fn parse_address(input: &str) -> StakingResult<Pubkey> {
    Pubkey::from_str(input).map_err(|e| StakingError::InvalidAddress {
        input: input.to_string(),
        reason: e.to_string(),
    })
}
