//! Staking admin client
//!
//! Library behind the `staking-cli` binary: session bootstrap, program
//! account views, instruction builders, the submission pipeline and the
//! administrative operations built on them.

pub mod admin;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod observability;
pub mod program;
pub mod reader;
pub mod rpc;
pub mod session;
pub mod structured_logging;
pub mod submit;
pub mod tx_builder;
pub mod wallet;

pub mod test_utils;

pub use admin::StakingAdmin;
pub use errors::{StakingError, StakingResult};
pub use reader::GlobalInfo;
pub use session::{ProgramClient, Session};
pub use submit::{CoSign, SubmissionOutcome};

// Re-export commonly used types
pub use solana_sdk::{pubkey::Pubkey, signature::Signature};
