//! Transaction envelope carried from the builder to the submission pipeline
//!
//! A `TxEnvelope` is ephemeral: it is produced by a builder, signed,
//! serialized and broadcast within one operation and never persisted.
//! It tracks which [`SubmissionStage`] the transaction has reached so logs
//! and errors can say where a submission stopped.

use crate::tx_builder::errors::TransactionBuilderError;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::Transaction,
};
use std::fmt;

/// Lifecycle of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionStage {
    Built,
    Signed,
    Serialized,
    Broadcast,
    Pending,
    Confirmed,
    Failed,
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Built => "built",
            Self::Signed => "signed",
            Self::Serialized => "serialized",
            Self::Broadcast => "broadcast",
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A transaction on its way to the network
#[derive(Debug, Clone)]
pub struct TxEnvelope {
    /// The transaction itself
    pub tx: Transaction,

    /// Signers required by the message header, fee payer first
    pub required_signers: Vec<Pubkey>,

    stage: SubmissionStage,
}

impl TxEnvelope {
    /// Wrap a freshly built (unsigned) transaction
    pub fn new(tx: Transaction) -> Self {
        let required = tx.message.header.num_required_signatures as usize;
        let required_signers = tx.message.account_keys.iter().take(required).copied().collect();
        Self {
            tx,
            required_signers,
            stage: SubmissionStage::Built,
        }
    }

    /// Decode wire bytes (bincode, as produced by [`TxEnvelope::to_bytes`])
    ///
    /// The stage is inferred from whether every required signature is present.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionBuilderError> {
        let tx: Transaction =
            bincode::deserialize(bytes).map_err(TransactionBuilderError::from_bincode)?;
        let mut envelope = Self::new(tx);
        if envelope.tx.is_signed() {
            envelope.stage = SubmissionStage::Signed;
        }
        Ok(envelope)
    }

    pub fn stage(&self) -> SubmissionStage {
        self.stage
    }

    /// Fee payer signature, if it has been applied
    ///
    /// This is the transaction id once broadcast.
    pub fn fee_payer_signature(&self) -> Option<Signature> {
        self.tx
            .signatures
            .first()
            .copied()
            .filter(|sig| *sig != Signature::default())
    }

    /// Sign with the given keypairs, keeping signatures already present
    pub fn partial_sign(&mut self, signers: &[&Keypair]) -> Result<(), TransactionBuilderError> {
        let blockhash = self.tx.message.recent_blockhash;
        self.tx
            .try_partial_sign(signers, blockhash)
            .map_err(TransactionBuilderError::from_signer_error)?;
        if self.tx.is_signed() {
            self.stage = SubmissionStage::Signed;
        }
        Ok(())
    }

    /// Encode to wire bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, TransactionBuilderError> {
        let bytes = bincode::serialize(&self.tx).map_err(TransactionBuilderError::from_bincode)?;
        self.stage = SubmissionStage::Serialized;
        Ok(bytes)
    }
}
