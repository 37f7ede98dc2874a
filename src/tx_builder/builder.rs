//! Staking instruction builders
//!
//! [`StakingInstructionBuilder`] is the seam between orchestration and the
//! program's wire encoding: one method per instruction kind, typed inputs,
//! instruction or transaction out. [`AnchorInstructionBuilder`] encodes the
//! deployed program's Anchor interface.

use crate::program::{
    args::instruction_data,
    instruction_discriminator,
    pda::{
        global_pool_address, master_edition_address, metadata_address, token_account_address,
        token_record_address, user_pool_address,
    },
    ChangeAdminArgs, UserPoolView, AUTH_RULES_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID,
    USER_POOL_SEED,
};
use crate::tx_builder::errors::TransactionBuilderError;
use crate::tx_builder::instructions::{plan_instructions, sanity_check_ix_order, ComputeBudget};
use solana_sdk::{
    hash::Hash,
    instruction::{AccountMeta, Instruction},
    message::Message,
    pubkey::Pubkey,
    system_program, sysvar,
    transaction::Transaction,
};

/// Instruction encoding capability for the staking program
pub trait StakingInstructionBuilder: Send + Sync {
    /// Program the built instructions target
    fn program_id(&self) -> Pubkey;

    /// Create the global pool with `admin` as administrator
    fn initialize_global(&self, admin: &Pubkey) -> Result<Instruction, TransactionBuilderError>;

    /// Hand administration of the global pool from `admin` to `new_admin`
    fn change_admin(
        &self,
        admin: &Pubkey,
        new_admin: &Pubkey,
    ) -> Result<Instruction, TransactionBuilderError>;

    /// Allocate and initialize `owner`'s user pool, funded with `rent_lamports`
    fn initialize_user(
        &self,
        owner: &Pubkey,
        rent_lamports: u64,
    ) -> Result<Vec<Instruction>, TransactionBuilderError>;

    /// Unsigned transaction locking `mint` into `owner`'s user pool
    ///
    /// `cosigner`, when given, is appended as a required read-only signer.
    /// `budget` instructions, when given, precede the program instruction.
    fn lock_position(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
        cosigner: Option<&Pubkey>,
        recent_blockhash: Hash,
        budget: Option<ComputeBudget>,
    ) -> Result<Transaction, TransactionBuilderError>;

    /// Unsigned transaction releasing `mint` from `owner`'s user pool
    fn unlock_position(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
        cosigner: Option<&Pubkey>,
        recent_blockhash: Hash,
        budget: Option<ComputeBudget>,
    ) -> Result<Transaction, TransactionBuilderError>;
}

/// Anchor-encoded builder for the deployed staking program
#[derive(Debug, Clone)]
pub struct AnchorInstructionBuilder {
    program_id: Pubkey,
    /// Authorization rules account for pNFT transfers, if the collection uses one
    auth_rules: Option<Pubkey>,
}

impl AnchorInstructionBuilder {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            auth_rules: None,
        }
    }

    pub fn with_auth_rules(mut self, auth_rules: Pubkey) -> Self {
        self.auth_rules = Some(auth_rules);
        self
    }

    fn global_pool(&self) -> Pubkey {
        global_pool_address(&self.program_id).0
    }

    fn user_pool(&self, owner: &Pubkey) -> Result<Pubkey, TransactionBuilderError> {
        user_pool_address(owner, &self.program_id).map_err(|e| {
            TransactionBuilderError::instruction_failed(self.program_id.to_string(), e.to_string())
        })
    }

    /// Shared account list of lock_pnft / unlock_pnft
    fn pnft_accounts(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<AccountMeta>, TransactionBuilderError> {
        let token_account = token_account_address(owner, mint);
        // Anchor encodes an absent optional account as the program's own id.
        let auth_rules = self.auth_rules.unwrap_or(self.program_id);

        Ok(vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new(self.global_pool(), false),
            AccountMeta::new(self.user_pool(owner)?, false),
            AccountMeta::new(token_account, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(master_edition_address(mint), false),
            AccountMeta::new(token_record_address(mint, &token_account), false),
            AccountMeta::new(metadata_address(mint), false),
            AccountMeta::new_readonly(auth_rules, false),
            AccountMeta::new_readonly(sysvar::instructions::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(TOKEN_METADATA_PROGRAM_ID, false),
            AccountMeta::new_readonly(AUTH_RULES_PROGRAM_ID, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ])
    }

    fn position_transaction(
        &self,
        name: &str,
        owner: &Pubkey,
        mint: &Pubkey,
        cosigner: Option<&Pubkey>,
        recent_blockhash: Hash,
        budget: Option<ComputeBudget>,
    ) -> Result<Transaction, TransactionBuilderError> {
        let mut accounts = self.pnft_accounts(owner, mint)?;
        if let Some(cosigner) = cosigner {
            accounts.push(AccountMeta::new_readonly(*cosigner, true));
        }
        let ix = Instruction::new_with_bytes(
            self.program_id,
            &instruction_discriminator(name),
            accounts,
        );
        let plan = plan_instructions(budget, vec![ix])?;
        sanity_check_ix_order(&plan.instructions)?;
        let message =
            Message::new_with_blockhash(&plan.instructions, Some(owner), &recent_blockhash);
        Ok(Transaction::new_unsigned(message))
    }
}

impl StakingInstructionBuilder for AnchorInstructionBuilder {
    fn program_id(&self) -> Pubkey {
        self.program_id
    }

    fn initialize_global(&self, admin: &Pubkey) -> Result<Instruction, TransactionBuilderError> {
        Ok(Instruction::new_with_bytes(
            self.program_id,
            &instruction_discriminator("initialize"),
            vec![
                AccountMeta::new(*admin, true),
                AccountMeta::new(self.global_pool(), false),
                AccountMeta::new_readonly(system_program::id(), false),
                AccountMeta::new_readonly(sysvar::rent::id(), false),
            ],
        ))
    }

    fn change_admin(
        &self,
        admin: &Pubkey,
        new_admin: &Pubkey,
    ) -> Result<Instruction, TransactionBuilderError> {
        let args = ChangeAdminArgs {
            new_admin: new_admin.to_bytes(),
        };
        let data = instruction_data("change_admin", &args)
            .map_err(|e| TransactionBuilderError::Serialization(e.to_string()))?;

        Ok(Instruction::new_with_bytes(
            self.program_id,
            &data,
            vec![
                AccountMeta::new(*admin, true),
                AccountMeta::new(self.global_pool(), false),
            ],
        ))
    }

    fn initialize_user(
        &self,
        owner: &Pubkey,
        rent_lamports: u64,
    ) -> Result<Vec<Instruction>, TransactionBuilderError> {
        let user_pool = self.user_pool(owner)?;

        #[allow(deprecated)]
        let create_ix = solana_sdk::system_instruction::create_account_with_seed(
            owner,
            &user_pool,
            owner,
            USER_POOL_SEED,
            rent_lamports,
            UserPoolView::LEN as u64,
            &self.program_id,
        );

        let init_ix = Instruction::new_with_bytes(
            self.program_id,
            &instruction_discriminator("initialize_user"),
            vec![
                AccountMeta::new(*owner, true),
                AccountMeta::new(user_pool, false),
            ],
        );

        Ok(vec![create_ix, init_ix])
    }

    fn lock_position(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
        cosigner: Option<&Pubkey>,
        recent_blockhash: Hash,
        budget: Option<ComputeBudget>,
    ) -> Result<Transaction, TransactionBuilderError> {
        self.position_transaction("lock_pnft", owner, mint, cosigner, recent_blockhash, budget)
    }

    fn unlock_position(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
        cosigner: Option<&Pubkey>,
        recent_blockhash: Hash,
        budget: Option<ComputeBudget>,
    ) -> Result<Transaction, TransactionBuilderError> {
        self.position_transaction("unlock_pnft", owner, mint, cosigner, recent_blockhash, budget)
    }
}
