//! `LedgerClient` over the nonblocking JSON-RPC client

use super::{LedgerClient, RpcError, RpcResult};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::config::RpcSendTransactionConfig;
use solana_sdk::{
    account::Account,
    commitment_config::{CommitmentConfig, CommitmentLevel},
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, TransactionError},
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// RPC client bound to `url` at `confirmed` commitment
///
/// Construction does no I/O; the first request opens the connection.
pub fn connect(url: &str) -> Arc<RpcClient> {
    Arc::new(RpcClient::new_with_commitment(
        url.to_string(),
        CommitmentConfig::confirmed(),
    ))
}

#[async_trait]
impl LedgerClient for RpcClient {
    fn endpoint(&self) -> String {
        self.url()
    }

    async fn get_latest_blockhash(&self) -> RpcResult<Hash> {
        RpcClient::get_latest_blockhash(self)
            .await
            .map_err(|e| RpcError::from_client_error(e, &self.url()))
    }

    #[instrument(skip(self), fields(endpoint = %self.url()))]
    async fn get_account(&self, address: &Pubkey) -> RpcResult<Option<Account>> {
        let response = self
            .get_account_with_commitment(address, self.commitment())
            .await
            .map_err(|e| RpcError::from_client_error(e, &self.url()))?;
        debug!(slot = response.context.slot, found = response.value.is_some(), "Account fetched");
        Ok(response.value)
    }

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> RpcResult<u64> {
        RpcClient::get_minimum_balance_for_rent_exemption(self, data_len)
            .await
            .map_err(|e| RpcError::from_client_error(e, &self.url()))
    }

    async fn send_and_confirm_transaction(&self, tx: &Transaction) -> RpcResult<Signature> {
        RpcClient::send_and_confirm_transaction(self, tx)
            .await
            .map_err(|e| RpcError::from_client_error(e, &self.url()))
    }

    async fn send_raw_transaction(
        &self,
        tx: &Transaction,
        skip_preflight: bool,
    ) -> RpcResult<Signature> {
        let config = RpcSendTransactionConfig {
            skip_preflight,
            preflight_commitment: Some(CommitmentLevel::Confirmed),
            ..RpcSendTransactionConfig::default()
        };
        self.send_transaction_with_config(tx, config)
            .await
            .map_err(|e| RpcError::from_client_error(e, &self.url()))
    }

    async fn confirm_signature(&self, signature: &Signature) -> RpcResult<()> {
        let endpoint = self.url();
        self.poll_for_signature_with_commitment(signature, self.commitment())
            .await
            .map_err(|e| RpcError::from_client_error(e, &endpoint))?;

        match LedgerClient::get_signature_status(self, signature).await? {
            Some(Ok(())) => Ok(()),
            Some(Err(tx_err)) => Err(RpcError::transaction_failed(&tx_err, &endpoint)),
            None => Err(RpcError::Internal(format!(
                "signature {} vanished after confirmation",
                signature
            ))),
        }
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> RpcResult<Option<Result<(), TransactionError>>> {
        self.get_signature_status_with_commitment(signature, self.commitment())
            .await
            .map_err(|e| RpcError::from_client_error(e, &self.url()))
    }
}
