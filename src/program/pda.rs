//! Account locator
//!
//! Pure derivations of the addresses the staking program reads and writes.
//! These must stay bit-for-bit identical to what the program derives
//! internally; a mismatch makes every call target the wrong account.

use crate::program::{GLOBAL_AUTHORITY_SEED, TOKEN_METADATA_PROGRAM_ID, USER_POOL_SEED};
use solana_sdk::pubkey::{Pubkey, PubkeyError};

/// Seeded address owned by `program_id`, based on `owner`
///
/// Same inputs always produce the same address.
///
/// # Errors
///
/// Returns `PubkeyError` if the seed exceeds the maximum seed length or the
/// program id is not a legal owner.
pub fn derive_address(seed: &str, owner: &Pubkey, program_id: &Pubkey) -> Result<Pubkey, PubkeyError> {
    Pubkey::create_with_seed(owner, seed, program_id)
}

/// Global pool PDA and its bump
pub fn global_pool_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[GLOBAL_AUTHORITY_SEED.as_bytes()], program_id)
}

/// Per-user pool account, seeded from the user's address
///
/// # Errors
///
/// See [`derive_address`].
pub fn user_pool_address(user: &Pubkey, program_id: &Pubkey) -> Result<Pubkey, PubkeyError> {
    derive_address(USER_POOL_SEED, user, program_id)
}

/// Metaplex metadata account of `mint`
pub fn metadata_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            b"metadata",
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

/// Metaplex master edition account of `mint`
pub fn master_edition_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            b"metadata",
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
            b"edition",
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

/// Token record of a programmable NFT held in `token_account`
pub fn token_record_address(mint: &Pubkey, token_account: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            b"metadata",
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
            b"token_record",
            token_account.as_ref(),
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

/// Associated token account of `owner` for `mint`
pub fn token_account_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address(owner, mint)
}
