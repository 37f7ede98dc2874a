//! Error types for transaction building
//!
//! Covers everything between "we have business parameters" and "we have a
//! signed, serialized transaction": instruction encoding, compute budget
//! planning, signing and (de)serialization of wire bytes.

use thiserror::Error;

/// Error type for all transaction builder operations
#[derive(Error, Debug)]
pub enum TransactionBuilderError {
    /// Failed to build an instruction for a specific program
    #[error("Instruction build error (program={program}): {reason}")]
    InstructionBuild {
        /// The program the instruction targets
        program: String,
        /// Detailed reason for the failure
        reason: String,
    },

    /// Failed to sign the transaction
    ///
    /// Typically a keypair that is not a required signer of the message,
    /// or a transaction that has no recent blockhash yet.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Compute budget instructions must precede program instructions
    #[error("Invalid instruction order: {0}")]
    InvalidInstructionOrder(String),

    /// Transaction bytes could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid builder parameters
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TransactionBuilderError {
    /// Check if this error is potentially retryable
    ///
    /// Build errors are deterministic in their inputs.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InstructionBuild { .. } => false,
            Self::Signing(_) => false,
            Self::InvalidInstructionOrder(_) => false,
            Self::Serialization(_) => false,
            Self::Configuration(_) => false,
        }
    }

    /// Get the error category for metrics and observability
    pub fn category(&self) -> &'static str {
        match self {
            Self::InstructionBuild { .. } => "instruction",
            Self::Signing(_) => "signing",
            Self::InvalidInstructionOrder(_) => "validation",
            Self::Serialization(_) => "serialization",
            Self::Configuration(_) => "config",
        }
    }
}

// Convenience constructors for common error scenarios
impl TransactionBuilderError {
    /// Create an instruction build error for a specific program
    pub fn instruction_failed(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InstructionBuild {
            program: program.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid instruction order error
    pub fn invalid_order(reason: impl Into<String>) -> Self {
        Self::InvalidInstructionOrder(reason.into())
    }

    pub fn from_signer_error(err: solana_sdk::signer::SignerError) -> Self {
        Self::Signing(err.to_string())
    }

    pub fn from_bincode(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
