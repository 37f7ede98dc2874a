//! Typed read-only views of the staking program's accounts
//!
//! Every account is an 8-byte Anchor discriminator followed by a `#[repr(C)]`
//! body with no padding:
//!
//! ```text
//! GlobalPool  | disc[8] | admin[32] | total_locked_count: u64 |
//! UserPool    | disc[8] | owner[32] | item_count: u64 | items[MAX_LOCKED_ITEMS] |
//! LockedItem  | mint[32] | locked_at: i64 |
//! ```
//!
//! The `Pod` bodies mirror the on-chain bytes; the `*View` types are what the
//! rest of the crate works with.

use crate::program::{account_discriminator, MAX_LOCKED_ITEMS};
use bytemuck::{Pod, PodCastError, Zeroable};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::mem::size_of;
use thiserror::Error;

/// Reasons account bytes cannot be read as the expected view
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("account data too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("discriminator mismatch for {account}")]
    Discriminator { account: &'static str },

    #[error("account body does not match the {account} layout: {reason:?}")]
    Layout {
        account: &'static str,
        reason: PodCastError,
    },

    #[error("item count {count} exceeds capacity {capacity}")]
    ItemCount { count: u64, capacity: usize },
}

const DISC_LEN: usize = 8;

/// Account body stored behind an Anchor discriminator
pub trait AccountLayout: Pod {
    /// Anchor account name hashed into the discriminator
    const ACCOUNT_NAME: &'static str;
    /// Discriminator plus body
    const LEN: usize = DISC_LEN + size_of::<Self>();

    fn load(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < Self::LEN {
            return Err(DecodeError::TooShort {
                expected: Self::LEN,
                actual: data.len(),
            });
        }
        if data[..DISC_LEN] != account_discriminator(Self::ACCOUNT_NAME) {
            return Err(DecodeError::Discriminator {
                account: Self::ACCOUNT_NAME,
            });
        }
        // Account buffers carry no alignment guarantee past the discriminator.
        bytemuck::try_pod_read_unaligned::<Self>(&data[DISC_LEN..Self::LEN]).map_err(|reason| {
            DecodeError::Layout {
                account: Self::ACCOUNT_NAME,
                reason,
            }
        })
    }

    fn store(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(&account_discriminator(Self::ACCOUNT_NAME));
        data.extend_from_slice(bytemuck::bytes_of(self));
        data
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GlobalPool {
    pub admin: [u8; 32],
    pub total_locked_count: u64,
}

impl AccountLayout for GlobalPool {
    const ACCOUNT_NAME: &'static str = "GlobalPool";
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct LockedItemData {
    pub mint: [u8; 32],
    pub locked_at: i64,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct UserPool {
    pub owner: [u8; 32],
    pub item_count: u64,
    pub items: [LockedItemData; MAX_LOCKED_ITEMS],
}

impl AccountLayout for UserPool {
    const ACCOUNT_NAME: &'static str = "UserPool";
}

/// Singleton program configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlobalPoolView {
    #[serde(serialize_with = "serialize_pubkey")]
    pub admin: Pubkey,
    pub total_locked_count: u64,
}

/// One locked position inside a user pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockedItem {
    #[serde(serialize_with = "serialize_pubkey")]
    pub mint: Pubkey,
    pub locked_at: i64,
}

/// Per-user pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPoolView {
    #[serde(serialize_with = "serialize_pubkey")]
    pub owner: Pubkey,
    pub item_count: u64,
    pub items: Vec<LockedItem>,
}

impl From<&GlobalPool> for GlobalPoolView {
    fn from(raw: &GlobalPool) -> Self {
        Self {
            admin: Pubkey::new_from_array(raw.admin),
            total_locked_count: raw.total_locked_count,
        }
    }
}

impl From<&GlobalPoolView> for GlobalPool {
    fn from(view: &GlobalPoolView) -> Self {
        Self {
            admin: view.admin.to_bytes(),
            total_locked_count: view.total_locked_count,
        }
    }
}

impl From<&LockedItemData> for LockedItem {
    fn from(raw: &LockedItemData) -> Self {
        Self {
            mint: Pubkey::new_from_array(raw.mint),
            locked_at: raw.locked_at,
        }
    }
}

impl From<&LockedItem> for LockedItemData {
    fn from(item: &LockedItem) -> Self {
        Self {
            mint: item.mint.to_bytes(),
            locked_at: item.locked_at,
        }
    }
}

impl GlobalPoolView {
    pub const ACCOUNT_NAME: &'static str = GlobalPool::ACCOUNT_NAME;
    pub const LEN: usize = GlobalPool::LEN;

    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        GlobalPool::load(data).map(|raw| Self::from(&raw))
    }

    pub fn encode(&self) -> Vec<u8> {
        GlobalPool::from(self).store()
    }
}

impl UserPoolView {
    pub const ACCOUNT_NAME: &'static str = UserPool::ACCOUNT_NAME;
    pub const LEN: usize = UserPool::LEN;

    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let raw = UserPool::load(data)?;
        if raw.item_count > MAX_LOCKED_ITEMS as u64 {
            return Err(DecodeError::ItemCount {
                count: raw.item_count,
                capacity: MAX_LOCKED_ITEMS,
            });
        }

        Ok(Self {
            owner: Pubkey::new_from_array(raw.owner),
            item_count: raw.item_count,
            items: raw.items[..raw.item_count as usize]
                .iter()
                .map(LockedItem::from)
                .collect(),
        })
    }

    /// Full zero-copy sized account data, unused slots zeroed
    pub fn encode(&self) -> Vec<u8> {
        let mut raw = UserPool::zeroed();
        raw.owner = self.owner.to_bytes();
        for (slot, item) in raw.items.iter_mut().zip(&self.items) {
            *slot = LockedItemData::from(item);
        }
        raw.item_count = self.items.len().min(MAX_LOCKED_ITEMS) as u64;
        raw.store()
    }

    /// Whether `mint` is currently locked in this pool
    pub fn holds(&self, mint: &Pubkey) -> bool {
        self.items.iter().any(|item| item.mint == *mint)
    }
}

fn serialize_pubkey<S: serde::Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(size_of::<GlobalPool>(), 40);
        assert_eq!(size_of::<LockedItemData>(), 40);
        assert_eq!(size_of::<UserPool>(), 40 + 40 * MAX_LOCKED_ITEMS);
        assert_eq!(GlobalPoolView::LEN, 48);
        assert_eq!(UserPoolView::LEN, 8 + 40 + 40 * MAX_LOCKED_ITEMS);
    }

    #[test]
    fn test_global_pool_decode() {
        let view = GlobalPoolView {
            admin: Pubkey::new_unique(),
            total_locked_count: 7,
        };
        let data = view.encode();
        assert_eq!(data.len(), GlobalPoolView::LEN);
        assert_eq!(GlobalPoolView::decode(&data).unwrap(), view);
    }

    #[test]
    fn test_global_pool_field_offsets() {
        let admin = Pubkey::new_unique();
        let data = GlobalPoolView {
            admin,
            total_locked_count: 0x0102,
        }
        .encode();

        assert_eq!(&data[..8], &account_discriminator("GlobalPool"));
        assert_eq!(&data[8..40], admin.as_ref());
        assert_eq!(&data[40..48], &0x0102u64.to_le_bytes());
    }

    #[test]
    fn test_decode_from_unaligned_buffer() {
        let view = GlobalPoolView {
            admin: Pubkey::new_unique(),
            total_locked_count: 9,
        };
        let mut padded = vec![0u8];
        padded.extend_from_slice(&view.encode());

        assert_eq!(GlobalPoolView::decode(&padded[1..]).unwrap(), view);
    }

    #[test]
    fn test_global_pool_rejects_wrong_discriminator() {
        let mut data = GlobalPoolView {
            admin: Pubkey::new_unique(),
            total_locked_count: 0,
        }
        .encode();
        data[0] ^= 0xff;
        assert_eq!(
            GlobalPoolView::decode(&data),
            Err(DecodeError::Discriminator {
                account: "GlobalPool"
            })
        );
    }

    #[test]
    fn test_user_pool_bytes_are_not_a_global_pool() {
        let data = UserPoolView {
            owner: Pubkey::new_unique(),
            item_count: 0,
            items: vec![],
        }
        .encode();
        assert!(matches!(
            GlobalPoolView::decode(&data),
            Err(DecodeError::Discriminator { .. })
        ));
    }

    #[test]
    fn test_short_data_is_rejected() {
        assert_eq!(
            GlobalPoolView::decode(&[0u8; 10]),
            Err(DecodeError::TooShort {
                expected: GlobalPoolView::LEN,
                actual: 10
            })
        );
        let global = GlobalPoolView {
            admin: Pubkey::default(),
            total_locked_count: 0,
        }
        .encode();
        assert!(matches!(
            UserPoolView::decode(&global),
            Err(DecodeError::TooShort { .. })
        ));
    }

    #[test]
    fn test_user_pool_decodes_only_live_items() {
        let mint_a = Pubkey::new_unique();
        let mint_b = Pubkey::new_unique();
        let view = UserPoolView {
            owner: Pubkey::new_unique(),
            item_count: 2,
            items: vec![
                LockedItem {
                    mint: mint_a,
                    locked_at: 1_700_000_000,
                },
                LockedItem {
                    mint: mint_b,
                    locked_at: -1,
                },
            ],
        };

        let data = view.encode();
        assert_eq!(data.len(), UserPoolView::LEN);
        let decoded = UserPoolView::decode(&data).unwrap();
        assert_eq!(decoded, view);
        assert!(decoded.holds(&mint_a));
        assert!(!decoded.holds(&Pubkey::new_unique()));
    }

    #[test]
    fn test_user_pool_rejects_oversized_count() {
        let mut raw = UserPool::zeroed();
        raw.item_count = MAX_LOCKED_ITEMS as u64 + 1;
        assert!(matches!(
            UserPoolView::decode(&raw.store()),
            Err(DecodeError::ItemCount { .. })
        ));
    }

    #[test]
    fn test_view_serializes_base58() {
        let admin = Pubkey::new_unique();
        let json = serde_json::to_value(GlobalPoolView {
            admin,
            total_locked_count: 3,
        })
        .unwrap();
        assert_eq!(json["admin"], admin.to_string());
        assert_eq!(json["total_locked_count"], 3);
    }
}
