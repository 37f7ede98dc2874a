//! Transaction Builder
//!
//! Everything needed to turn business parameters into a transaction the
//! submission pipeline can sign and broadcast:
//! - **errors**: builder error taxonomy
//! - **builder**: per-instruction-kind capability trait and the Anchor encoding
//! - **instructions**: compute budget planning and ordering checks
//! - **output**: the transaction envelope and its submission stages
//!
//! ## Instruction ordering
//!
//! When an operation carries a compute budget, the budget instructions come
//! first, followed by the program instructions:
//!
//! ```rust,no_run
//! use staking_cli::tx_builder::{plan_instructions, ComputeBudget};
//! # fn example(init_ix: solana_sdk::instruction::Instruction) -> Result<(), staking_cli::tx_builder::TransactionBuilderError> {
//! let plan = plan_instructions(Some(ComputeBudget::new(5_000_000, 200_000)), vec![init_ix])?;
//! assert!(plan.has_compute_budget);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub use errors::TransactionBuilderError;

mod builder;
mod instructions;
mod output;

pub use builder::{AnchorInstructionBuilder, StakingInstructionBuilder};
pub use instructions::{plan_instructions, sanity_check_ix_order, ComputeBudget, InstructionPlan};
pub use output::{SubmissionStage, TxEnvelope};
