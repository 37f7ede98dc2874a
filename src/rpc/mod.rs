//! Ledger access
//!
//! Every network round-trip the client makes goes through [`LedgerClient`].
//! The production implementation is the nonblocking `RpcClient`; tests plug
//! in `test_utils::MockLedger`.

use async_trait::async_trait;
use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::{Transaction, TransactionError},
};

pub mod rpc_client;
pub mod rpc_errors;

pub use rpc_client::connect;
pub use rpc_errors::RpcError;

pub type RpcResult<T> = Result<T, RpcError>;

/// Network operations used by the session, reader and submission pipeline
///
/// All calls use `confirmed` commitment.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Endpoint URL, for logs and error context
    fn endpoint(&self) -> String;

    async fn get_latest_blockhash(&self) -> RpcResult<Hash>;

    /// `Ok(None)` when the account does not exist
    async fn get_account(&self, address: &Pubkey) -> RpcResult<Option<Account>>;

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> RpcResult<u64>;

    /// Broadcast a signed transaction and wait for confirmation
    async fn send_and_confirm_transaction(&self, tx: &Transaction) -> RpcResult<Signature>;

    /// Broadcast a signed transaction without waiting
    async fn send_raw_transaction(&self, tx: &Transaction, skip_preflight: bool)
        -> RpcResult<Signature>;

    /// Wait until `signature` is confirmed, surfacing on-chain failure
    async fn confirm_signature(&self, signature: &Signature) -> RpcResult<()>;

    /// `None` if the network has not seen the signature
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> RpcResult<Option<Result<(), TransactionError>>>;
}
