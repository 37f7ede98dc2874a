//! Instruction planning and ordering validation
//!
//! A planned transaction has the shape:
//! 1. Compute budget instructions (CU limit, CU price), if the operation has a budget
//! 2. Program instructions, in the order the builder produced them
//!
//! Which operations carry a compute budget is a per-operation setting
//! (see [`crate::config::ComputeBudgetConfig`]); nothing here assumes a default.

use crate::tx_builder::errors::TransactionBuilderError;
use serde::{Deserialize, Serialize};
use solana_sdk::{compute_budget::ComputeBudgetInstruction, instruction::Instruction};

/// Compute budget attached to a single transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeBudget {
    /// Price per compute unit in micro-lamports (0 = skip this instruction)
    pub unit_price_micro_lamports: u64,

    /// Compute unit limit (0 = skip this instruction)
    pub unit_limit: u32,
}

impl ComputeBudget {
    pub fn new(unit_price_micro_lamports: u64, unit_limit: u32) -> Self {
        Self {
            unit_price_micro_lamports,
            unit_limit,
        }
    }

    /// Compute budget instructions for this budget, limit first
    pub fn instructions(&self) -> Vec<Instruction> {
        let mut ixs = Vec::with_capacity(2);
        if self.unit_limit > 0 {
            ixs.push(ComputeBudgetInstruction::set_compute_unit_limit(
                self.unit_limit,
            ));
        }
        if self.unit_price_micro_lamports > 0 {
            ixs.push(ComputeBudgetInstruction::set_compute_unit_price(
                self.unit_price_micro_lamports,
            ));
        }
        ixs
    }
}

/// Plan of instructions ready to be wrapped into a transaction
#[derive(Debug, Clone)]
pub struct InstructionPlan {
    /// The ordered list of instructions for the transaction
    pub instructions: Vec<Instruction>,

    /// Whether the plan starts with compute budget instructions
    pub has_compute_budget: bool,
}

/// Prefix program instructions with the optional compute budget
///
/// # Errors
///
/// Returns `TransactionBuilderError::Configuration` if `program_ixs` is empty
/// or if a program instruction carries no accounts.
pub fn plan_instructions(
    budget: Option<ComputeBudget>,
    program_ixs: Vec<Instruction>,
) -> Result<InstructionPlan, TransactionBuilderError> {
    if program_ixs.is_empty() {
        return Err(TransactionBuilderError::Configuration(
            "No program instructions to plan".to_string(),
        ));
    }
    if let Some(ix) = program_ixs.iter().find(|ix| ix.accounts.is_empty()) {
        return Err(TransactionBuilderError::Configuration(format!(
            "Instruction for program {} has no accounts",
            ix.program_id
        )));
    }

    let budget_ixs = budget.map(|b| b.instructions()).unwrap_or_default();
    let has_compute_budget = !budget_ixs.is_empty();

    let mut instructions = Vec::with_capacity(budget_ixs.len() + program_ixs.len());
    instructions.extend(budget_ixs);
    instructions.extend(program_ixs);

    Ok(InstructionPlan {
        instructions,
        has_compute_budget,
    })
}

/// Validate that no compute budget instruction follows a program instruction
/// (debug/test only)
///
/// # Errors
///
/// Returns `TransactionBuilderError::InvalidInstructionOrder` if the list is
/// empty or if a compute budget instruction appears after a program instruction.
#[cfg(debug_assertions)]
pub fn sanity_check_ix_order(instructions: &[Instruction]) -> Result<(), TransactionBuilderError> {
    if instructions.is_empty() {
        return Err(TransactionBuilderError::invalid_order(
            "Instruction list is empty",
        ));
    }

    let is_budget = |ix: &Instruction| ix.program_id == solana_sdk::compute_budget::id();

    let mut seen_program_ix = false;
    for (idx, ix) in instructions.iter().enumerate() {
        if is_budget(ix) {
            if seen_program_ix {
                return Err(TransactionBuilderError::invalid_order(format!(
                    "Compute budget instruction at position {} follows a program instruction",
                    idx
                )));
            }
        } else {
            seen_program_ix = true;
        }
    }

    if !seen_program_ix {
        return Err(TransactionBuilderError::invalid_order(
            "Transaction contains only compute budget instructions",
        ));
    }

    Ok(())
}

#[cfg(not(debug_assertions))]
#[inline]
pub fn sanity_check_ix_order(_instructions: &[Instruction]) -> Result<(), TransactionBuilderError> {
    Ok(())
}
