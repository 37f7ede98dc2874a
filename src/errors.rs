//! Error taxonomy for staking operations
//!
//! Only "account does not exist" is recovered locally (as `Ok(None)` from the
//! state reader). Everything else reaches the caller as a [`StakingError`].

use crate::program::state::DecodeError;
use crate::rpc::RpcError;
use crate::tx_builder::TransactionBuilderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StakingError {
    /// Key file missing, unparsable or not a valid secret key
    #[error("Failed to load keypair from {path}: {reason}")]
    KeyLoad { path: String, reason: String },

    /// Neither a base58 address nor a loadable key file
    #[error("Invalid admin identifier '{input}': not an address ({address_error}) and not a key file ({keyfile_error})")]
    InvalidAdminIdentifier {
        input: String,
        address_error: String,
        keyfile_error: String,
    },

    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    /// Global pool has not been initialized
    #[error("Global pool {address} does not exist; run init first")]
    GlobalStateAbsent { address: String },

    /// Account exists but its bytes do not match the expected layout
    #[error("Failed to decode account {address}: {source}")]
    AccountDecode {
        address: String,
        #[source]
        source: DecodeError,
    },

    /// Account exists but is owned by another program
    #[error("Account {address} is owned by {owner}, expected {expected}")]
    AccountOwner {
        address: String,
        owner: String,
        expected: String,
    },

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Build(#[from] TransactionBuilderError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type StakingResult<T> = Result<T, StakingError>;

impl StakingError {
    /// Whether re-running the whole operation might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Rpc(e) => e.is_retryable(),
            Self::Build(e) => e.is_retryable(),

            Self::KeyLoad { .. } => false,
            Self::InvalidAdminIdentifier { .. } => false,
            Self::InvalidAddress { .. } => false,
            Self::GlobalStateAbsent { .. } => false,
            Self::AccountDecode { .. } => false,
            Self::AccountOwner { .. } => false,
            Self::Config(_) => false,
        }
    }

    /// Get the error category for metrics and observability
    pub fn category(&self) -> &'static str {
        match self {
            Self::KeyLoad { .. } => "key_load",
            Self::InvalidAdminIdentifier { .. } => "admin_identifier",
            Self::InvalidAddress { .. } => "address",
            Self::GlobalStateAbsent { .. } => "absent",
            Self::AccountDecode { .. } => "decode",
            Self::AccountOwner { .. } => "owner",
            Self::Rpc(_) => "rpc",
            Self::Build(e) => e.category(),
            Self::Config(_) => "config",
        }
    }

    pub fn key_load(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::KeyLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StakingError::GlobalStateAbsent {
            address: "Gp1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Global pool Gp1 does not exist; run init first"
        );

        let err = StakingError::InvalidAddress {
            input: "xyz".to_string(),
            reason: "Invalid Base58 string".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid address 'xyz': Invalid Base58 string");
    }

    #[test]
    fn test_rpc_errors_keep_retryability() {
        let err: StakingError = RpcError::Transport {
            endpoint: "http://localhost:8899".to_string(),
            message: "connection refused".to_string(),
        }
        .into();
        assert!(err.is_retryable());
        assert_eq!(err.category(), "rpc");

        let err: StakingError = RpcError::TransactionFailed {
            endpoint: "http://localhost:8899".to_string(),
            reason: "custom program error: 0x1770".to_string(),
        }
        .into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_categories() {
        assert_eq!(StakingError::key_load("id.json", "missing").category(), "key_load");
        assert_eq!(
            StakingError::from(TransactionBuilderError::Signing("x".to_string())).category(),
            "signing"
        );
        assert!(!StakingError::Config("bad".to_string()).is_retryable());
        assert!(!StakingError::GlobalStateAbsent {
            address: "Gp1".to_string()
        }
        .is_retryable());
    }
}
