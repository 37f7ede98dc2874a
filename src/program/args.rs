//! Borsh-encoded instruction arguments
//!
//! Anchor appends the Borsh encoding of an instruction's arguments to its
//! 8-byte discriminator.

use borsh::{BorshDeserialize, BorshSerialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ChangeAdminArgs {
    pub new_admin: [u8; 32],
}

/// Discriminator of `name` followed by the Borsh encoding of `args`
pub fn instruction_data<T: BorshSerialize>(name: &str, args: &T) -> std::io::Result<Vec<u8>> {
    let mut data = super::instruction_discriminator(name).to_vec();
    args.serialize(&mut data)?;
    Ok(data)
}
