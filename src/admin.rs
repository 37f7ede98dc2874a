//! Administrative operations on the staking program
//!
//! [`StakingAdmin`] is the surface the CLI drives: every method opens a
//! [`TraceContext`], builds through the session's instruction builder and
//! submits through [`crate::submit`].

use crate::config::ComputeBudgetConfig;
use crate::errors::{StakingError, StakingResult};
use crate::observability::TraceContext;
use crate::program::{GlobalPoolView, UserPoolView};
use crate::reader::{self, GlobalInfo};
use crate::session::Session;
use crate::structured_logging::OperationLogger;
use crate::submit::{add_admin_sign_and_confirm, send_with_provider, CoSign, SubmissionOutcome};
use crate::tx_builder::{plan_instructions, sanity_check_ix_order, ComputeBudget, TxEnvelope};
use crate::wallet::resolve_admin_identifier;
use solana_sdk::{
    instruction::Instruction, pubkey::Pubkey, signature::Signature, transaction::Transaction,
};
use tracing::{debug, info, Instrument};

pub struct StakingAdmin {
    session: Session,
    budgets: ComputeBudgetConfig,
}

impl StakingAdmin {
    pub fn new(session: Session, budgets: ComputeBudgetConfig) -> Self {
        Self { session, budgets }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Create the global pool with the session wallet as admin
    pub async fn init_project(&self) -> StakingResult<Signature> {
        let ctx = TraceContext::new("init_project");
        async {
            let admin = self.session.payer();
            let ix = self.session.program.builder.initialize_global(&admin)?;
            let signature = self
                .submit_planned(&ctx, self.budgets.initialize_global, vec![ix])
                .await?;
            info!(admin = %admin, signature = %signature, "Global pool initialized");
            Ok::<_, StakingError>(signature)
        }
        .instrument(ctx.span())
        .await
    }

    /// Hand administration to `new_admin`, a base58 address or a key file path
    pub async fn change_admin(&self, new_admin: &str) -> StakingResult<Signature> {
        let ctx = TraceContext::new("change_admin");
        async {
            let new_admin = resolve_admin_identifier(new_admin)?;
            let ix = self
                .session
                .program
                .builder
                .change_admin(&self.session.payer(), &new_admin)?;
            let signature = self
                .submit_planned(&ctx, self.budgets.change_admin, vec![ix])
                .await?;
            info!(new_admin = %new_admin, signature = %signature, "Admin changed");
            Ok::<_, StakingError>(signature)
        }
        .instrument(ctx.span())
        .await
    }

    /// Allocate and initialize the session wallet's user pool
    pub async fn initialize_user_pool(&self) -> StakingResult<Signature> {
        let ctx = TraceContext::new("initialize_user_pool");
        async {
            let owner = self.session.payer();
            let rent = self
                .session
                .ledger
                .get_minimum_balance_for_rent_exemption(UserPoolView::LEN)
                .await?;
            let ixs = self.session.program.builder.initialize_user(&owner, rent)?;
            let signature = self
                .submit_planned(&ctx, self.budgets.initialize_user, ixs)
                .await?;
            info!(owner = %owner, rent_lamports = rent, signature = %signature, "User pool initialized");
            Ok::<_, StakingError>(signature)
        }
        .instrument(ctx.span())
        .await
    }

    /// Lock `mint` into the session wallet's user pool
    ///
    /// With [`CoSign::With`], the co-signer is a required signer of the
    /// transaction and signs it after the wallet.
    pub async fn lock_pnft(
        &self,
        mint: &Pubkey,
        cosign: CoSign<'_>,
    ) -> StakingResult<SubmissionOutcome> {
        let ctx = TraceContext::new("lock_pnft");
        async {
            let owner = self.session.payer();
            let blockhash = self.session.ledger.get_latest_blockhash().await?;
            let tx = self.session.program.builder.lock_position(
                &owner,
                mint,
                cosign.pubkey().as_ref(),
                blockhash,
                self.budgets.lock_position,
            )?;
            self.submit_raw(&ctx, tx, cosign).await
        }
        .instrument(ctx.span())
        .await
    }

    /// Release `mint` from the session wallet's user pool
    pub async fn unlock_pnft(
        &self,
        mint: &Pubkey,
        cosign: CoSign<'_>,
    ) -> StakingResult<SubmissionOutcome> {
        let ctx = TraceContext::new("unlock_pnft");
        async {
            let owner = self.session.payer();
            let blockhash = self.session.ledger.get_latest_blockhash().await?;
            let tx = self.session.program.builder.unlock_position(
                &owner,
                mint,
                cosign.pubkey().as_ref(),
                blockhash,
                self.budgets.unlock_position,
            )?;
            self.submit_raw(&ctx, tx, cosign).await
        }
        .instrument(ctx.span())
        .await
    }

    pub async fn get_global_state(&self) -> StakingResult<Option<GlobalPoolView>> {
        let ctx = TraceContext::new("get_global_state");
        let logger = OperationLogger::for_context(&ctx);
        reader::get_global_state(&self.session, &logger)
            .instrument(ctx.span())
            .await
    }

    /// `user` defaults to the session wallet
    pub async fn get_user_state(&self, user: Option<&Pubkey>) -> StakingResult<Option<UserPoolView>> {
        let ctx = TraceContext::new("get_user_state");
        let logger = OperationLogger::for_context(&ctx);
        let user = user.copied().unwrap_or_else(|| self.session.payer());
        reader::get_user_state(&self.session, &logger, &user)
            .instrument(ctx.span())
            .await
    }

    pub async fn get_global_info(&self) -> StakingResult<GlobalInfo> {
        let ctx = TraceContext::new("get_global_info");
        let logger = OperationLogger::for_context(&ctx);
        reader::get_global_info(&self.session, &logger)
            .instrument(ctx.span())
            .await
    }

    async fn submit_planned(
        &self,
        ctx: &TraceContext,
        budget: Option<ComputeBudget>,
        program_ixs: Vec<Instruction>,
    ) -> StakingResult<Signature> {
        let plan = plan_instructions(budget, program_ixs)?;
        sanity_check_ix_order(&plan.instructions)?;
        debug!(
            operation = %ctx.operation,
            instructions = plan.instructions.len(),
            compute_budget = plan.has_compute_budget,
            "Instruction plan ready"
        );

        let child = ctx.child_span("send_with_provider");
        let logger = OperationLogger::for_context(&child);
        send_with_provider(&self.session, &logger, &plan.instructions)
            .instrument(child.span())
            .await
    }

    async fn submit_raw(
        &self,
        ctx: &TraceContext,
        tx: Transaction,
        cosign: CoSign<'_>,
    ) -> StakingResult<SubmissionOutcome> {
        let mut envelope = TxEnvelope::new(tx);
        envelope.partial_sign(&[self.session.wallet.keypair()])?;
        let bytes = envelope.to_bytes()?;

        let child = ctx.child_span("add_admin_sign_and_confirm");
        let logger = OperationLogger::for_context(&child);
        let outcome =
            add_admin_sign_and_confirm(self.session.ledger.as_ref(), &logger, &bytes, cosign)
                .instrument(child.span())
                .await?;
        info!(
            operation = %ctx.operation,
            signature = %outcome.signature(),
            outcome = ?outcome,
            "Position transaction settled"
        );
        Ok(outcome)
    }
}
