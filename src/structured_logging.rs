//! Structured logging for staking operations

use crate::observability::TraceContext;
use crate::tx_builder::SubmissionStage;
use solana_sdk::{pubkey::Pubkey, signature::Signature};

/// Structured logger for submission and state-read events
#[derive(Debug, Clone)]
pub struct OperationLogger {
    context_id: String,
    operation: String,
}

impl OperationLogger {
    pub fn new(context_id: String, operation: &str) -> Self {
        Self {
            context_id,
            operation: operation.to_string(),
        }
    }

    /// Logger bound to a trace context's correlation id
    pub fn for_context(ctx: &TraceContext) -> Self {
        Self::new(ctx.correlation_id().to_string(), &ctx.operation)
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn log_stage(&self, stage: SubmissionStage, signature: Option<&Signature>) {
        tracing::debug!(
            context_id = %self.context_id,
            operation = %self.operation,
            stage = %stage,
            signature = ?signature.map(|s| s.to_string()),
            "Submission stage"
        );
    }

    pub fn log_confirmed(&self, signature: &Signature, latency_ms: u64) {
        tracing::info!(
            context_id = %self.context_id,
            operation = %self.operation,
            signature = %signature,
            latency_ms = %latency_ms,
            "Transaction confirmed"
        );
    }

    pub fn log_already_confirmed(&self, signature: &Signature) {
        tracing::info!(
            context_id = %self.context_id,
            operation = %self.operation,
            signature = %signature,
            "Transaction already confirmed, skipping broadcast"
        );
    }

    pub fn log_failure(&self, stage: SubmissionStage, error: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            operation = %self.operation,
            stage = %stage,
            error = %error,
            "Submission failed"
        );
    }

    pub fn log_account_fetch(&self, account: &str, address: &Pubkey, found: bool) {
        tracing::debug!(
            context_id = %self.context_id,
            account = %account,
            address = %address,
            found = %found,
            "Account fetched"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_takes_correlation_id() {
        let ctx = TraceContext::new("init_project");
        let logger = OperationLogger::for_context(&ctx);
        assert_eq!(logger.context_id(), ctx.correlation_id().as_str());

        // Emitting without a subscriber is a no-op
        logger.log_stage(SubmissionStage::Built, None);
        logger.log_confirmed(&Signature::default(), 12);
        logger.log_failure(SubmissionStage::Broadcast, "rejected");
    }
}
