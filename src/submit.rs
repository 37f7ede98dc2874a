//! Submission pipeline
//!
//! Two paths reach the network:
//! - [`send_with_provider`]: instructions in, the session wallet pays and
//!   signs, the client sends and waits for `confirmed`.
//! - [`add_admin_sign_and_confirm`]: already-signed wire bytes in, an
//!   optional co-signature is added, then the raw transaction is broadcast
//!   and polled. Bytes whose signature is already confirmed are not sent
//!   again.
//!
//! Both are single attempts; failures come back as typed errors.

use crate::errors::{StakingError, StakingResult};
use crate::metrics::{metrics, Timer};
use crate::rpc::{LedgerClient, RpcError};
use crate::session::Session;
use crate::structured_logging::OperationLogger;
use crate::tx_builder::{SubmissionStage, TransactionBuilderError, TxEnvelope};
use solana_sdk::{
    instruction::Instruction,
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};

/// Extra signature applied on the raw-broadcast path
#[derive(Clone, Copy)]
pub enum CoSign<'a> {
    Disabled,
    With(&'a Keypair),
}

impl CoSign<'_> {
    pub fn pubkey(&self) -> Option<Pubkey> {
        match self {
            Self::Disabled => None,
            Self::With(kp) => Some(kp.pubkey()),
        }
    }
}

impl std::fmt::Debug for CoSign<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::With(kp) => write!(f, "With({})", kp.pubkey()),
        }
    }
}

/// How a raw submission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Broadcast by this call and confirmed
    Confirmed(Signature),
    /// Already confirmed before this call; nothing was broadcast
    AlreadyConfirmed(Signature),
}

impl SubmissionOutcome {
    pub fn signature(&self) -> Signature {
        match self {
            Self::Confirmed(sig) | Self::AlreadyConfirmed(sig) => *sig,
        }
    }
}

/// Pay for, sign and send `instructions` with the session wallet
pub async fn send_with_provider(
    session: &Session,
    logger: &OperationLogger,
    instructions: &[Instruction],
) -> StakingResult<Signature> {
    let payer = session.payer();
    let blockhash = session.ledger.get_latest_blockhash().await?;

    let message = Message::new_with_blockhash(instructions, Some(&payer), &blockhash);
    let mut envelope = TxEnvelope::new(Transaction::new_unsigned(message));
    logger.log_stage(envelope.stage(), None);

    envelope.partial_sign(&[session.wallet.keypair()])?;
    if !envelope.tx.is_signed() {
        return Err(TransactionBuilderError::Signing(
            "transaction requires signers other than the session wallet".to_string(),
        )
        .into());
    }
    let signature = envelope.fee_payer_signature();
    logger.log_stage(envelope.stage(), signature.as_ref());

    metrics().tx_submitted.inc();
    logger.log_stage(SubmissionStage::Broadcast, signature.as_ref());
    let timer = Timer::new();

    match session.ledger.send_and_confirm_transaction(&envelope.tx).await {
        Ok(signature) => {
            let elapsed = timer.observe_duration(&metrics().submit_latency);
            metrics().tx_confirmed.inc();
            logger.log_confirmed(&signature, elapsed.as_millis() as u64);
            Ok(signature)
        }
        Err(e) => {
            metrics().tx_failed.inc();
            logger.log_failure(SubmissionStage::Failed, &e.to_string());
            Err(e.into())
        }
    }
}

/// Co-sign and broadcast serialized transaction bytes, then wait for
/// `confirmed`
///
/// The fee payer's signature must already be present; it identifies the
/// transaction for the idempotence check.
pub async fn add_admin_sign_and_confirm(
    ledger: &dyn LedgerClient,
    logger: &OperationLogger,
    tx_bytes: &[u8],
    cosign: CoSign<'_>,
) -> StakingResult<SubmissionOutcome> {
    let mut envelope = TxEnvelope::from_bytes(tx_bytes)?;

    if let CoSign::With(keypair) = cosign {
        envelope.partial_sign(&[keypair])?;
    }
    if !envelope.tx.is_signed() {
        return Err(TransactionBuilderError::Signing(format!(
            "{} of {} required signatures missing",
            envelope
                .tx
                .signatures
                .iter()
                .filter(|s| **s == Signature::default())
                .count(),
            envelope.required_signers.len()
        ))
        .into());
    }
    let signature = envelope.fee_payer_signature().ok_or_else(|| {
        StakingError::from(TransactionBuilderError::Signing(
            "fee payer signature missing".to_string(),
        ))
    })?;
    logger.log_stage(envelope.stage(), Some(&signature));

    let bytes = envelope.to_bytes()?;
    logger.log_stage(envelope.stage(), Some(&signature));
    tracing::debug!(signature = %signature, size = bytes.len(), "Transaction serialized");

    match ledger.get_signature_status(&signature).await? {
        Some(Ok(())) => {
            metrics().tx_already_confirmed.inc();
            logger.log_already_confirmed(&signature);
            return Ok(SubmissionOutcome::AlreadyConfirmed(signature));
        }
        Some(Err(tx_err)) => {
            metrics().tx_failed.inc();
            let err = RpcError::transaction_failed(&tx_err, &ledger.endpoint());
            logger.log_failure(SubmissionStage::Failed, &err.to_string());
            return Err(err.into());
        }
        None => {}
    }

    metrics().tx_submitted.inc();
    let timer = Timer::new();

    if let Err(e) = ledger.send_raw_transaction(&envelope.tx, false).await {
        metrics().tx_failed.inc();
        logger.log_failure(SubmissionStage::Broadcast, &e.to_string());
        return Err(e.into());
    }
    logger.log_stage(SubmissionStage::Broadcast, Some(&signature));
    logger.log_stage(SubmissionStage::Pending, Some(&signature));

    if let Err(e) = ledger.confirm_signature(&signature).await {
        metrics().tx_failed.inc();
        logger.log_failure(SubmissionStage::Pending, &e.to_string());
        return Err(e.into());
    }

    let elapsed = timer.observe_duration(&metrics().submit_latency);
    metrics().tx_confirmed.inc();
    logger.log_stage(SubmissionStage::Confirmed, Some(&signature));
    logger.log_confirmed(&signature, elapsed.as_millis() as u64);
    Ok(SubmissionOutcome::Confirmed(signature))
}
