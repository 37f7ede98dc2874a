//! Test Utilities Module
//!
//! In-memory ledger for deterministic tests of the session, reader and
//! submission pipeline without a validator.
//!
//! These utilities are only compiled when running tests or when the
//! `test_utils` feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use crate::program::{
    instruction_discriminator, ChangeAdminArgs, GlobalPoolView, LockedItem, UserPoolView,
    MAX_LOCKED_ITEMS,
};
use crate::rpc::{LedgerClient, RpcError, RpcResult};
use async_trait::async_trait;
use borsh::BorshDeserialize;
use solana_sdk::{
    account::Account,
    hash::Hash,
    instruction::InstructionError,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, TransactionError},
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

const ENDPOINT: &str = "mock://ledger";

/// Program error returned when a signer is not the current admin
pub const UNAUTHORIZED: u32 = 6000;

/// Accounts of lock_pnft / unlock_pnft before the optional co-signer
const POSITION_ACCOUNTS: usize = 14;

/// Ledger double that executes the staking program's account effects
///
/// Only the effects observable through the state reader are emulated:
/// global pool creation and admin changes, user pool creation, and
/// lock/unlock bookkeeping. Compute budget and system instructions are
/// accepted and ignored.
pub struct MockLedger {
    program_id: Pubkey,
    accounts: Mutex<HashMap<Pubkey, Account>>,
    statuses: Mutex<HashMap<Signature, Result<(), TransactionError>>>,
    sent: Mutex<Vec<Transaction>>,
    broadcasts: AtomicUsize,
    fail_next: Mutex<Option<RpcError>>,
    blockhash: Hash,
    rent_lamports: u64,
}

impl MockLedger {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            accounts: Mutex::new(HashMap::new()),
            statuses: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            broadcasts: AtomicUsize::new(0),
            fail_next: Mutex::new(None),
            blockhash: Hash::new_unique(),
            rent_lamports: 1_000_000,
        }
    }

    pub fn blockhash(&self) -> Hash {
        self.blockhash
    }

    /// Insert or replace an account
    pub async fn set_account(&self, address: Pubkey, account: Account) {
        self.accounts.lock().await.insert(address, account);
    }

    /// Account owned by the program holding `data`
    pub fn program_account(&self, data: Vec<u8>) -> Account {
        Account {
            lamports: self.rent_lamports,
            data,
            owner: self.program_id,
            executable: false,
            rent_epoch: 0,
        }
    }

    pub async fn set_signature_status(
        &self,
        signature: Signature,
        status: Result<(), TransactionError>,
    ) {
        self.statuses.lock().await.insert(signature, status);
    }

    /// Make the next network call that sends a transaction fail with `err`
    pub async fn fail_next_send(&self, err: RpcError) {
        *self.fail_next.lock().await = Some(err);
    }

    /// Number of transactions broadcast on any path
    pub fn broadcast_count(&self) -> usize {
        self.broadcasts.load(Ordering::SeqCst)
    }

    pub async fn sent_transactions(&self) -> Vec<Transaction> {
        self.sent.lock().await.clone()
    }

    async fn take_failure(&self) -> Option<RpcError> {
        self.fail_next.lock().await.take()
    }

    /// Verify, execute and record `tx`, returning its signature
    async fn process(&self, tx: &Transaction) -> RpcResult<Signature> {
        self.broadcasts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.take_failure().await {
            return Err(err);
        }

        if tx.verify().is_err() {
            return Err(RpcError::transaction_failed(
                &TransactionError::SignatureFailure,
                ENDPOINT,
            ));
        }
        let signature = tx.signatures[0];
        self.sent.lock().await.push(tx.clone());

        let result = {
            let mut accounts = self.accounts.lock().await;
            let mut staged = accounts.clone();
            let result = self.execute(tx, &mut staged);
            if result.is_ok() {
                *accounts = staged;
            }
            result
        };

        self.statuses
            .lock()
            .await
            .insert(signature, result.clone());
        match result {
            Ok(()) => Ok(signature),
            Err(e) => Err(RpcError::transaction_failed(&e, ENDPOINT)),
        }
    }

    fn execute(
        &self,
        tx: &Transaction,
        accounts: &mut HashMap<Pubkey, Account>,
    ) -> Result<(), TransactionError> {
        let keys = &tx.message.account_keys;
        for (index, ix) in tx.message.instructions.iter().enumerate() {
            if *ix.program_id(keys) != self.program_id {
                continue;
            }
            let ix_accounts: Vec<Pubkey> = ix.accounts.iter().map(|i| keys[*i as usize]).collect();
            let fail = |e: InstructionError| TransactionError::InstructionError(index as u8, e);

            if ix.data.len() < 8 {
                return Err(fail(InstructionError::InvalidInstructionData));
            }
            let (disc, args) = ix.data.split_at(8);

            if disc == instruction_discriminator("initialize") {
                let (admin, pool) = (ix_accounts[0], ix_accounts[1]);
                if accounts.contains_key(&pool) {
                    return Err(fail(InstructionError::AccountAlreadyInitialized));
                }
                let view = GlobalPoolView {
                    admin,
                    total_locked_count: 0,
                };
                accounts.insert(pool, self.program_account(view.encode()));
            } else if disc == instruction_discriminator("change_admin") {
                let (signer, pool) = (ix_accounts[0], ix_accounts[1]);
                let mut view = read_global(accounts, &pool).map_err(fail)?;
                if view.admin != signer {
                    return Err(fail(InstructionError::Custom(UNAUTHORIZED)));
                }
                let args = ChangeAdminArgs::try_from_slice(args)
                    .map_err(|_| fail(InstructionError::InvalidInstructionData))?;
                view.admin = Pubkey::new_from_array(args.new_admin);
                accounts.insert(pool, self.program_account(view.encode()));
            } else if disc == instruction_discriminator("initialize_user") {
                let (owner, pool) = (ix_accounts[0], ix_accounts[1]);
                let view = UserPoolView {
                    owner,
                    item_count: 0,
                    items: Vec::new(),
                };
                accounts.insert(pool, self.program_account(view.encode()));
            } else if disc == instruction_discriminator("lock_pnft") {
                let (global, user_pool, mint) = (ix_accounts[1], ix_accounts[2], ix_accounts[4]);
                check_cosigner(accounts, &global, &ix_accounts).map_err(fail)?;
                let mut pool = read_user(accounts, &user_pool).map_err(fail)?;
                if pool.holds(&mint) || pool.items.len() >= MAX_LOCKED_ITEMS {
                    return Err(fail(InstructionError::InvalidArgument));
                }
                pool.items.push(LockedItem {
                    mint,
                    locked_at: 1_700_000_000,
                });
                pool.item_count = pool.items.len() as u64;
                let mut global_view = read_global(accounts, &global).map_err(fail)?;
                global_view.total_locked_count += 1;
                accounts.insert(user_pool, self.program_account(pool.encode()));
                accounts.insert(global, self.program_account(global_view.encode()));
            } else if disc == instruction_discriminator("unlock_pnft") {
                let (global, user_pool, mint) = (ix_accounts[1], ix_accounts[2], ix_accounts[4]);
                check_cosigner(accounts, &global, &ix_accounts).map_err(fail)?;
                let mut pool = read_user(accounts, &user_pool).map_err(fail)?;
                if !pool.holds(&mint) {
                    return Err(fail(InstructionError::InvalidArgument));
                }
                pool.items.retain(|item| item.mint != mint);
                pool.item_count = pool.items.len() as u64;
                let mut global_view = read_global(accounts, &global).map_err(fail)?;
                global_view.total_locked_count = global_view.total_locked_count.saturating_sub(1);
                accounts.insert(user_pool, self.program_account(pool.encode()));
                accounts.insert(global, self.program_account(global_view.encode()));
            } else {
                return Err(fail(InstructionError::InvalidInstructionData));
            }
        }
        Ok(())
    }
}

/// A trailing co-signer on a position instruction must be the current admin
fn check_cosigner(
    accounts: &HashMap<Pubkey, Account>,
    global: &Pubkey,
    ix_accounts: &[Pubkey],
) -> Result<(), InstructionError> {
    match ix_accounts.get(POSITION_ACCOUNTS) {
        Some(cosigner) if read_global(accounts, global)?.admin != *cosigner => {
            Err(InstructionError::Custom(UNAUTHORIZED))
        }
        _ => Ok(()),
    }
}

fn read_global(
    accounts: &HashMap<Pubkey, Account>,
    address: &Pubkey,
) -> Result<GlobalPoolView, InstructionError> {
    let account = accounts
        .get(address)
        .ok_or(InstructionError::UninitializedAccount)?;
    GlobalPoolView::decode(&account.data).map_err(|_| InstructionError::InvalidAccountData)
}

fn read_user(
    accounts: &HashMap<Pubkey, Account>,
    address: &Pubkey,
) -> Result<UserPoolView, InstructionError> {
    let account = accounts
        .get(address)
        .ok_or(InstructionError::UninitializedAccount)?;
    UserPoolView::decode(&account.data).map_err(|_| InstructionError::InvalidAccountData)
}

#[async_trait]
impl LedgerClient for MockLedger {
    fn endpoint(&self) -> String {
        ENDPOINT.to_string()
    }

    async fn get_latest_blockhash(&self) -> RpcResult<Hash> {
        Ok(self.blockhash)
    }

    async fn get_account(&self, address: &Pubkey) -> RpcResult<Option<Account>> {
        Ok(self.accounts.lock().await.get(address).cloned())
    }

    async fn get_minimum_balance_for_rent_exemption(&self, _data_len: usize) -> RpcResult<u64> {
        Ok(self.rent_lamports)
    }

    async fn send_and_confirm_transaction(&self, tx: &Transaction) -> RpcResult<Signature> {
        self.process(tx).await
    }

    async fn send_raw_transaction(
        &self,
        tx: &Transaction,
        _skip_preflight: bool,
    ) -> RpcResult<Signature> {
        self.process(tx).await
    }

    async fn confirm_signature(&self, signature: &Signature) -> RpcResult<()> {
        match self.statuses.lock().await.get(signature) {
            Some(Ok(())) => Ok(()),
            Some(Err(e)) => Err(RpcError::transaction_failed(e, ENDPOINT)),
            None => Err(RpcError::Timeout {
                endpoint: ENDPOINT.to_string(),
                message: format!("signature {} never landed", signature),
            }),
        }
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> RpcResult<Option<Result<(), TransactionError>>> {
        Ok(self.statuses.lock().await.get(signature).cloned())
    }
}
